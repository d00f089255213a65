use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::BenchConfig;
use crate::report;
use crate::runner::ScriptRunner;
use crate::script;
use crate::types::{FormattedReport, ReportKind, ScriptOutcome};

/// Everything a full run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub outcome: ScriptOutcome,
    pub reports: Vec<FormattedReport>,
}

/// Render the script and write it to the configured path.
pub fn prepare_script(config: &BenchConfig) -> Result<String> {
    let text = script::render_script(config);
    script::write_script(&config.script_path, &text)?;
    tracing::info!(path = %config.script_path.display(), "wrote benchmark script");
    Ok(text)
}

/// Accumulator files for both build profiles, in report order.
pub fn default_report_paths(config: &BenchConfig) -> Vec<PathBuf> {
    ReportKind::ALL
        .iter()
        .map(|kind| config.report_path(kind.file_name()))
        .collect()
}

/// Format each file in turn, stopping at the first failure.
pub fn format_reports(paths: &[PathBuf]) -> Result<Vec<FormattedReport>> {
    paths.iter().map(|p| format_one(p)).collect()
}

fn format_one(path: &Path) -> Result<FormattedReport> {
    tracing::info!(path = %path.display(), "formatting report");
    report::format_report(path)
}

/// Write the script, run it to completion, then format both reports.
///
/// A failing script is only logged; formatting decides the result.
pub fn run_benchmark(config: &BenchConfig, runner: &dyn ScriptRunner) -> Result<RunSummary> {
    let text = prepare_script(config)?;

    tracing::info!("running benchmark script, this clones and builds every target");
    let outcome = runner.run(&text)?;

    log_outcome(&outcome);

    let reports = format_reports(&default_report_paths(config))?;
    Ok(RunSummary { outcome, reports })
}

/// Lines of captured stderr repeated in the failure warning.
const FAILURE_TAIL_LINES: usize = 20;

/// Last `count` lines of `text`, without the trailing newline.
pub fn tail_lines(text: &str, count: usize) -> &str {
    let trimmed = text.trim_end_matches('\n');
    let start = trimmed
        .match_indices('\n')
        .rev()
        .nth(count.saturating_sub(1))
        .map(|(i, _)| i + 1)
        .unwrap_or(0);
    if count == 0 { "" } else { &trimmed[start..] }
}

fn log_outcome(outcome: &ScriptOutcome) {
    if !outcome.stdout.is_empty() {
        tracing::debug!(stdout = %outcome.stdout, "captured script stdout");
    }
    if !outcome.stderr.is_empty() {
        tracing::debug!(stderr = %outcome.stderr, "captured script stderr");
    }

    let seconds = outcome.elapsed().num_seconds();
    if outcome.success() {
        tracing::info!(seconds, "benchmark script finished");
        return;
    }

    let tail = tail_lines(&outcome.stderr, FAILURE_TAIL_LINES);
    if tail.is_empty() {
        tracing::warn!(
            exit_code = ?outcome.exit_code,
            seconds,
            "benchmark script exited unsuccessfully"
        );
    } else {
        tracing::warn!(
            exit_code = ?outcome.exit_code,
            seconds,
            stderr = %tail,
            "benchmark script exited unsuccessfully"
        );
    }
}
