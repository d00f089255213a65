use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    #[error("Line {line}: expected `key value`, found {tokens} token(s): {content:?}")]
    MalformedLine {
        line: usize,
        tokens: usize,
        content: String,
    },

    #[error("Failed to read report file {path}: {source}")]
    ReportRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write markdown report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write script {path}: {source}")]
    ScriptWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to start bash: {source}")]
    Spawn { source: std::io::Error },

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {detail}")]
    ConfigParse { path: PathBuf, detail: String },
}
