//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.merge-results.toml` files.

use crate::models::CANONICAL_COLUMNS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".merge-results.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// File discovery settings.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Where result files are found and which ones are merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Directory holding the per-run result files.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// File name glob patterns, visited in order.
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            patterns: default_patterns(),
        }
    }
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("result")
}

pub(crate) fn default_patterns() -> Vec<String> {
    vec!["bert_*.csv", "distilbert_*.csv", "roberta_*.csv"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Merged table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output file name, written inside the results directory.
    #[serde(default = "default_output_file")]
    pub file_name: String,

    /// Output column order. Columns absent from every input are dropped.
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: default_output_file(),
            columns: default_columns(),
        }
    }
}

pub(crate) fn default_output_file() -> String {
    "merge-result.csv".to_string()
}

fn default_columns() -> Vec<String> {
    CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.dir {
            self.discovery.results_dir = dir.clone();
        }
        if let Some(ref patterns) = args.patterns {
            self.discovery.patterns = patterns.clone();
        }
        if let Some(ref output) = args.output {
            self.output.file_name = output.clone();
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Full path of the merged output file.
    pub fn output_path(&self) -> PathBuf {
        self.discovery.results_dir.join(&self.output.file_name)
    }

    /// Check settings that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.discovery.patterns.is_empty() {
            anyhow::bail!("At least one file pattern is required");
        }
        if self.discovery.patterns.iter().any(|p| p.trim().is_empty()) {
            anyhow::bail!("File patterns must not be empty");
        }
        if self.output.columns.is_empty() {
            anyhow::bail!("At least one output column is required");
        }
        if self.output.file_name.is_empty() || self.output.file_name.contains(['/', '\\']) {
            anyhow::bail!(
                "Output file name must be a plain file name: {:?}",
                self.output.file_name
            );
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
