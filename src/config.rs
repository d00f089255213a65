use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use crate::errors::BenchError;

const LOCAL_CONFIG: &str = "compiletime-bench.toml";

/// Knobs for the generated script. Defaults reproduce the stock benchmark.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    pub repo_url: String,
    pub clone_dir: String,
    pub check_command: String,
    /// Generated SDK directory, relative to the clone.
    pub sdk_dir: String,
    pub rustflags: String,
    /// Entries whose name contains this are not timed.
    pub skip_pattern: String,
    pub script_path: PathBuf,
    /// Where the accumulator and markdown files live.
    pub output_dir: PathBuf,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            repo_url: "https://github.com/awslabs/smithy-rs.git".to_string(),
            clone_dir: "smithy-rs".to_string(),
            check_command: "./gradlew :aws:sdk:cargoCheck".to_string(),
            sdk_dir: "aws/sdk/build/aws-sdk/sdk".to_string(),
            rustflags: "--cfg aws-sdk-unstable".to_string(),
            skip_pattern: "aws-".to_string(),
            script_path: PathBuf::from("compile-all.sh"),
            output_dir: PathBuf::from("."),
        }
    }
}

impl BenchConfig {
    pub fn report_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

/// Parse a TOML config document.
pub fn parse_config(contents: &str, path: &Path) -> Result<BenchConfig, BenchError> {
    toml::from_str(contents).map_err(|e| BenchError::ConfigParse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

fn read_config(path: &Path) -> Result<BenchConfig, BenchError> {
    let contents = std::fs::read_to_string(path).map_err(|source| BenchError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&contents, path)
}

/// Resolve the config: an explicit path must exist; otherwise the working
/// directory and then the user config dir are tried before falling back to
/// defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<BenchConfig> {
    if let Some(path) = explicit {
        return Ok(read_config(path)?);
    }

    let mut candidates = vec![PathBuf::from(LOCAL_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("compiletime-bench").join("config.toml"));
    }

    for path in candidates {
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading config");
            return Ok(read_config(&path)?);
        }
    }

    Ok(BenchConfig::default())
}
