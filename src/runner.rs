use std::process::{Command, Stdio};

use anyhow::Result;
use chrono::Utc;

use crate::errors::BenchError;
use crate::types::ScriptOutcome;

/// Executes script text and reports how it went.
///
/// A non-zero exit is returned in the outcome, not as an error.
pub trait ScriptRunner {
    fn run(&self, script: &str) -> Result<ScriptOutcome>;
}

/// Runs the script with `bash -c` and blocks until it exits.
///
/// Stdin is closed so nothing in the script can wait on the terminal.
#[derive(Debug, Clone, Default)]
pub struct BashRunner {
    /// Collect stdout/stderr into the outcome instead of inheriting them.
    pub capture: bool,
}

impl BashRunner {
    pub fn new(capture: bool) -> Self {
        Self { capture }
    }
}

impl ScriptRunner for BashRunner {
    fn run(&self, script: &str) -> Result<ScriptOutcome> {
        let started_at = Utc::now();

        let (out, err) = if self.capture {
            (Stdio::piped(), Stdio::piped())
        } else {
            (Stdio::inherit(), Stdio::inherit())
        };

        let child = Command::new("bash")
            .arg("-c")
            .arg(script)
            .arg("compiletime-bench")
            .stdin(Stdio::null())
            .stdout(out)
            .stderr(err)
            .spawn()
            .map_err(|source| BenchError::Spawn { source })?;

        let output = child.wait_with_output()?;

        Ok(ScriptOutcome {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_stderr() {
        let outcome = BashRunner::new(true)
            .run("echo hello\necho oops >&2\n")
            .unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.stdout, "hello\n");
        assert_eq!(outcome.stderr, "oops\n");
        assert!(outcome.finished_at >= outcome.started_at);
    }

    #[test]
    fn non_zero_exit_is_not_an_error() {
        let outcome = BashRunner::new(true).run("exit 3\n").unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.exit_code, Some(3));
    }

    #[test]
    fn failing_command_does_not_stop_script() {
        let outcome = BashRunner::new(true)
            .run("false\necho after\n")
            .unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.stdout, "after\n");
    }

    #[test]
    fn stdin_is_closed() {
        let outcome = BashRunner::new(true).run("cat\necho done\n").unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.stdout, "done\n");
    }

    #[test]
    fn time_keyword_output_matches_timeformat() {
        let outcome = BashRunner::new(true)
            .run("TIMEFORMAT=$'real %3R\\nuser %3U\\nsys %3S'\n{ time true ; } 2>&1\n")
            .unwrap();
        let lines: Vec<&str> = outcome.stdout.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("real "));
        assert!(lines[1].starts_with("user "));
        assert!(lines[2].starts_with("sys "));
    }
}
