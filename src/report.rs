use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::errors::BenchError;
use crate::table::SparseTable;
use crate::types::{DELIMITER, Field, FormattedReport, Record};

/// Tokenize one line. Blank lines yield `None`; anything other than exactly
/// two whitespace-separated tokens is an error.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Field>, BenchError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        [] => Ok(None),
        [key, value] => Ok(Some(Field {
            key: (*key).to_string(),
            value: (*value).to_string(),
        })),
        other => Err(BenchError::MalformedLine {
            line: line_no,
            tokens: other.len(),
            content: line.to_string(),
        }),
    }
}

/// Parse the lines of one chunk. `first_line` is the 1-based file line the
/// chunk starts on, used for error messages.
pub fn parse_chunk(chunk: &str, first_line: usize) -> Result<Record, BenchError> {
    let mut record = Record::new();
    for (offset, line) in chunk.lines().enumerate() {
        if let Some(field) = parse_line(line, first_line + offset)? {
            record.insert(field);
        }
    }
    Ok(record)
}

/// Split accumulator contents on the delimiter and parse every piece.
///
/// Leading and trailing pieces are kept, so a file ending in the delimiter
/// yields a trailing empty record and an empty input yields one.
pub fn parse_report(contents: &str) -> Result<Vec<Record>, BenchError> {
    let mut records = Vec::new();
    let mut line = 1;

    for chunk in contents.split(DELIMITER) {
        records.push(parse_chunk(chunk, line)?);
        line += chunk.matches('\n').count();
    }

    Ok(records)
}

pub fn read_report(path: &Path) -> Result<Vec<Record>, BenchError> {
    let contents = std::fs::read_to_string(path).map_err(|source| BenchError::ReportRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_report(&contents)
}

/// `unoptimized.txt` -> `unoptimized.md`.
pub fn markdown_path(path: &Path) -> PathBuf {
    path.with_extension("md")
}

/// Read, parse and render `path` into its markdown sibling.
///
/// Nothing is written when the file fails to parse.
pub fn format_report(path: &Path) -> Result<FormattedReport> {
    let records = read_report(path)?;
    let table = SparseTable::from_records(&records);
    let output = markdown_path(path);

    std::fs::write(&output, table.to_markdown()).map_err(|source| BenchError::ReportWrite {
        path: output.clone(),
        source,
    })?;

    tracing::debug!(
        source = %path.display(),
        output = %output.display(),
        rows = table.row_count(),
        "wrote markdown report"
    );

    Ok(FormattedReport {
        source: path.to_path_buf(),
        output,
        rows: table.row_count(),
        columns: table.columns().len(),
    })
}
