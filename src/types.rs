use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Separates per-target records in every accumulator file.
pub const DELIMITER: &str = "=======================================";

/// Receives the raw cargo output, one delimited block per target.
pub const COMPILETIME_LOG: &str = "compiletime.txt";

/// One `key value` line from a timing chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: String,
    pub value: String,
}

/// Key/value set parsed from one chunk, in first-seen key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field. A repeated key overwrites the earlier value in place.
    pub fn insert(&mut self, field: Field) {
        match self.fields.iter_mut().find(|f| f.key == field.key) {
            Some(existing) => existing.value = field.value,
            None => self.fields.push(field),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// A chunk with no fields, e.g. the piece after the trailing delimiter.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(Field {
                key: key.into(),
                value: value.into(),
            });
        }
        record
    }
}

// Serialized as a JSON object keeping field order.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.key, &field.value)?;
        }
        map.end()
    }
}

/// Which accumulator a report is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    Unoptimized,
    Optimized,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::Unoptimized, ReportKind::Optimized];

    pub fn file_name(self) -> &'static str {
        match self {
            ReportKind::Unoptimized => "unoptimized.txt",
            ReportKind::Optimized => "optimized.txt",
        }
    }

    /// Extra cargo arguments for the build this log times.
    pub fn cargo_args(self) -> &'static str {
        match self {
            ReportKind::Unoptimized => "",
            ReportKind::Optimized => " --release",
        }
    }
}

/// Result of running the generated script.
#[derive(Debug, Clone)]
pub struct ScriptOutcome {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScriptOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// A markdown report written next to its accumulator file.
#[derive(Debug, Clone)]
pub struct FormattedReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_first_seen_order() {
        let record: Record = [("sdk", "s3"), ("real", "1.0"), ("user", "0.5")]
            .into_iter()
            .collect();
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["sdk", "real", "user"]);
    }

    #[test]
    fn record_repeated_key_overwrites_in_place() {
        let record: Record = [("sdk", "s3"), ("real", "1.0"), ("sdk", "ec2")]
            .into_iter()
            .collect();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("sdk"), Some("ec2"));
        assert_eq!(record.keys().next(), Some("sdk"));
    }

    #[test]
    fn record_serializes_in_field_order() {
        let record: Record = [("time", "1.23"), ("name", "sdk-a")].into_iter().collect();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"time":"1.23","name":"sdk-a"}"#);
    }

    #[test]
    fn report_kind_file_names() {
        assert_eq!(ReportKind::Unoptimized.file_name(), "unoptimized.txt");
        assert_eq!(ReportKind::Optimized.file_name(), "optimized.txt");
    }
}
