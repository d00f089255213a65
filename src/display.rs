use std::path::PathBuf;

use owo_colors::{OwoColorize, Stream};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::types::{FormattedReport, Record, ScriptOutcome};

/// Format a duration as a compact "1h 02m 03s" style string.
pub fn format_elapsed(duration: chrono::Duration) -> String {
    let secs = duration.num_seconds().max(0);
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// One line for the script result.
pub fn format_outcome(outcome: &ScriptOutcome) -> String {
    let status = match outcome.exit_code {
        Some(0) => "ok".if_supports_color(Stream::Stdout, |s| s.green()).to_string(),
        Some(code) => format!("exit {}", code)
            .if_supports_color(Stream::Stdout, |s| s.red())
            .to_string(),
        None => "killed by signal"
            .if_supports_color(Stream::Stdout, |s| s.red())
            .to_string(),
    };
    format!(
        "Benchmark script: {} after {}\n",
        status,
        format_elapsed(outcome.elapsed())
    )
}

/// One aligned line per written markdown report.
pub fn format_reports(reports: &[FormattedReport]) -> String {
    let mut out = String::new();

    let width = reports
        .iter()
        .map(|r| r.output.to_string_lossy().len())
        .max()
        .unwrap_or(0);

    for report in reports {
        let path = format!("{:<width$}", report.output.to_string_lossy(), width = width);
        let path_colored = path
            .if_supports_color(Stream::Stdout, |s| s.cyan())
            .to_string();
        let rows = if report.rows == 1 { "row" } else { "rows" };
        let source = format!("(from {})", report.source.display())
            .if_supports_color(Stream::Stdout, |s| s.dimmed())
            .to_string();
        out.push_str(&format!(
            "  {}  {} {}, {} columns {}\n",
            path_colored, report.rows, rows, report.columns, source
        ));
    }

    out
}

/// Parsed records of each file, serialized as an object keyed by path.
pub struct FileRecords<'a>(pub &'a [(PathBuf, Vec<Record>)]);

impl Serialize for FileRecords<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (path, records) in self.0 {
            map.serialize_entry(&path.to_string_lossy(), records)?;
        }
        map.end()
    }
}

/// JSON object mapping each file path, in the order given, to an array of
/// its records with keys in record order.
pub fn format_json(files: &[(PathBuf, Vec<Record>)]) -> String {
    serde_json::to_string_pretty(&FileRecords(files)).unwrap_or_else(|_| "{}".to_string())
}
