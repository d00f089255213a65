use std::path::Path;

use crate::config::BenchConfig;
use crate::errors::BenchError;
use crate::types::{COMPILETIME_LOG, DELIMITER, ReportKind};

/// Render the benchmark script for `config`.
///
/// Pure: the same config always yields the same bytes. Every configured value
/// is single-quoted except `check_command`, which is emitted as a command line.
pub fn render_script(config: &BenchConfig) -> String {
    let builds: String = ReportKind::ALL
        .iter()
        .map(|kind| {
            fill_template(
                BUILD_TEMPLATE,
                &[
                    ("LABEL", kind.file_name().trim_end_matches(".txt")),
                    ("LOG", kind.file_name()),
                    ("CARGO_ARGS", kind.cargo_args()),
                    ("COMPILETIME_LOG", COMPILETIME_LOG),
                    ("DELIMITER", DELIMITER),
                ],
            )
        })
        .collect();

    let output_dir = shell_escape_single_quote(&config.output_dir.to_string_lossy());
    let repo_url = shell_escape_single_quote(&config.repo_url);
    let clone_dir = shell_escape_single_quote(&config.clone_dir);
    let sdk_dir = shell_escape_single_quote(&config.sdk_dir);
    let rustflags = shell_escape_single_quote(&config.rustflags);
    let skip_pattern = shell_escape_single_quote(&config.skip_pattern);

    fill_template(
        SCRIPT_TEMPLATE,
        &[
            ("OUTPUT_DIR", output_dir.as_str()),
            ("REPO_URL", repo_url.as_str()),
            ("CLONE_DIR", clone_dir.as_str()),
            ("CHECK_COMMAND", config.check_command.as_str()),
            ("SDK_DIR", sdk_dir.as_str()),
            ("RUSTFLAGS", rustflags.as_str()),
            ("SKIP_PATTERN", skip_pattern.as_str()),
            ("BUILDS", builds.as_str()),
            ("COMPILETIME_LOG", COMPILETIME_LOG),
            ("DELIMITER", DELIMITER),
        ],
    )
}

/// Substitute `{{NAME}}` placeholders in one pass, so substituted values are
/// never rescanned. Unknown placeholders are left as written.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            rest = &rest[open..];
            break;
        };
        let name = &after[..close];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(name);
                out.push_str("}}");
            }
        }
        rest = &after[close + 2..];
    }

    out.push_str(rest);
    out
}

const SCRIPT_TEMPLATE: &str = r#"#!/usr/bin/env bash
set -u

mkdir -p {{OUTPUT_DIR}}
OUTPUT_DIR="$(cd {{OUTPUT_DIR}} && pwd)"
TIMEFORMAT=$'real %3R\nuser %3U\nsys %3S'

git clone {{REPO_URL}} {{CLONE_DIR}}
cd {{CLONE_DIR}}

{{CHECK_COMMAND}}
WORKDIR=$(pwd)
PATH_TO_GENERATED_SDK="$WORKDIR"/{{SDK_DIR}}
export RUSTFLAGS={{RUSTFLAGS}}

for i in $(ls "$PATH_TO_GENERATED_SDK"); do
    if [[ "$i" == *{{SKIP_PATTERN}}* ]]; then
        continue
    fi
    cd "$PATH_TO_GENERATED_SDK/$i"
{{BUILDS}}
    echo "{{DELIMITER}}" >> "$OUTPUT_DIR/{{COMPILETIME_LOG}}"
done
"#;

// One timed build per report kind, appended to that kind's log.
const BUILD_TEMPLATE: &str = r#"
    # {{LABEL}}
    echo "sdk $i" >> "$OUTPUT_DIR/{{LOG}}"
    { time cargo build{{CARGO_ARGS}} >> "$OUTPUT_DIR/{{COMPILETIME_LOG}}" 2>&1 ; } 2>> "$OUTPUT_DIR/{{LOG}}"
    echo "{{DELIMITER}}" >> "$OUTPUT_DIR/{{LOG}}"
"#;

/// Create or overwrite the script file.
pub fn write_script(path: &Path, text: &str) -> Result<(), BenchError> {
    let to_err = |source| BenchError::ScriptWrite {
        path: path.to_path_buf(),
        source,
    };

    std::fs::write(path, text).map_err(to_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(to_err)?;
    }

    Ok(())
}

/// Wraps a string in single quotes, escaping internal single quotes as `'\''`.
pub fn shell_escape_single_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_contains_clone_url() {
        let script = render_script(&BenchConfig::default());
        assert!(script.contains("git clone 'https://github.com/awslabs/smithy-rs.git' 'smithy-rs'"));
    }

    #[test]
    fn script_writes_delimiter_three_times_per_target() {
        let script = render_script(&BenchConfig::default());
        assert_eq!(script.matches(DELIMITER).count(), 3);
        assert!(script.contains(&format!("echo \"{DELIMITER}\" >> \"$OUTPUT_DIR/unoptimized.txt\"")));
        assert!(script.contains(&format!("echo \"{DELIMITER}\" >> \"$OUTPUT_DIR/optimized.txt\"")));
        assert!(script.contains(&format!("echo \"{DELIMITER}\" >> \"$OUTPUT_DIR/compiletime.txt\"")));
    }

    #[test]
    fn script_is_byte_identical_across_renders() {
        let config = BenchConfig::default();
        assert_eq!(render_script(&config), render_script(&config));
    }

    #[test]
    fn script_skips_each_entry_by_name() {
        let script = render_script(&BenchConfig::default());
        assert!(script.contains("if [[ \"$i\" == *'aws-'* ]]; then"));
        assert!(!script.contains("$PATH_TO_GENERATED_SDK == "));
    }

    #[test]
    fn script_times_debug_and_release_builds() {
        let script = render_script(&BenchConfig::default());
        assert!(script.contains("{ time cargo build >> \"$OUTPUT_DIR/compiletime.txt\" 2>&1 ; } 2>> \"$OUTPUT_DIR/unoptimized.txt\""));
        assert!(script.contains("{ time cargo build --release >> \"$OUTPUT_DIR/compiletime.txt\" 2>&1 ; } 2>> \"$OUTPUT_DIR/optimized.txt\""));
        assert!(script.contains("TIMEFORMAT=$'real %3R\\nuser %3U\\nsys %3S'"));
    }

    #[test]
    fn script_sets_environment_and_workdir() {
        let script = render_script(&BenchConfig::default());
        assert!(script.starts_with("#!/usr/bin/env bash\n"));
        assert!(script.contains("./gradlew :aws:sdk:cargoCheck\n"));
        assert!(script.contains("WORKDIR=$(pwd)\n"));
        assert!(script.contains("export RUSTFLAGS='--cfg aws-sdk-unstable'"));
        assert!(script.contains("PATH_TO_GENERATED_SDK=\"$WORKDIR\"/'aws/sdk/build/aws-sdk/sdk'"));
    }

    #[test]
    fn script_quotes_configured_values() {
        let config = BenchConfig {
            clone_dir: "it's here".to_string(),
            ..BenchConfig::default()
        };
        let script = render_script(&config);
        assert!(script.contains("cd 'it'\\''s here'"));
    }

    #[test]
    fn write_script_overwrites_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compile-all.sh");
        std::fs::write(&path, "stale").unwrap();

        let text = render_script(&BenchConfig::default());
        write_script(&path, &text).unwrap();
        let first = std::fs::read(&path).unwrap();
        write_script(&path, &text).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, text.as_bytes());
        assert_eq!(first, second);
    }

    #[test]
    fn write_script_into_missing_dir_errors() {
        let err = write_script(Path::new("/tmp/does-not-exist/x/compile-all.sh"), "").unwrap_err();
        assert!(matches!(err, BenchError::ScriptWrite { .. }));
    }

    #[test]
    fn fill_template_is_single_pass() {
        let out = fill_template("a={{A}} b={{B}}", &[("A", "{{B}}"), ("B", "2")]);
        assert_eq!(out, "a={{B}} b=2");
    }

    #[test]
    fn fill_template_keeps_unknown_and_unclosed_placeholders() {
        assert_eq!(fill_template("x {{NOPE}} y", &[]), "x {{NOPE}} y");
        assert_eq!(fill_template("x {{OPEN", &[("OPEN", "v")]), "x {{OPEN");
    }

    #[test]
    fn default_script_layout() {
        let script = render_script(&BenchConfig::default());
        let expected_head = "\
#!/usr/bin/env bash
set -u

mkdir -p '.'
OUTPUT_DIR=\"$(cd '.' && pwd)\"
TIMEFORMAT=$'real %3R\\nuser %3U\\nsys %3S'

git clone 'https://github.com/awslabs/smithy-rs.git' 'smithy-rs'
cd 'smithy-rs'

./gradlew :aws:sdk:cargoCheck
";
        assert!(script.starts_with(expected_head), "{script}");
        assert!(script.ends_with(&format!(
            "    echo \"{DELIMITER}\" >> \"$OUTPUT_DIR/optimized.txt\"\n\n    echo \"{DELIMITER}\" >> \"$OUTPUT_DIR/compiletime.txt\"\ndone\n"
        )));
        assert!(!script.contains("{{"));
    }

    #[test]
    fn test_shell_escape_single_quote() {
        assert_eq!(shell_escape_single_quote("plain"), "'plain'");
        assert_eq!(shell_escape_single_quote("it's"), "'it'\\''s'");
        assert_eq!(shell_escape_single_quote(""), "''");
    }
}
