//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// merge-results - combine per-run training results into one table
///
/// Collects the BERT, DistilBERT and RoBERTa result CSVs from the results
/// directory, labels every row with the model, preprocessing flag and
/// learning rate taken from its file name, and writes merge-result.csv.
///
/// Examples:
///   merge-results
///   merge-results --dir runs/2024-05 --summary-format json
///   merge-results --pattern "bert_*.csv" --dry-run
///   merge-results --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory holding the result files
    ///
    /// Defaults to `result`, or the value from .merge-results.toml.
    #[arg(short, long, value_name = "DIR", env = "MERGE_RESULTS_DIR")]
    pub dir: Option<PathBuf>,

    /// Output file name, written inside the results directory
    #[arg(short, long, value_name = "NAME")]
    pub output: Option<String>,

    /// File name patterns to merge (comma-separated)
    ///
    /// Example: --pattern "bert_*.csv,roberta_*.csv"
    #[arg(short, long = "pattern", value_name = "GLOB", value_delimiter = ',')]
    pub patterns: Option<Vec<String>>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .merge-results.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Format of the console summary
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub summary_format: SummaryFormat,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: list the files that would be merged and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .merge-results.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Format of the console summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SummaryFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// JSON document
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref patterns) = self.patterns {
            if patterns.iter().any(|p| p.trim().is_empty()) {
                return Err("Patterns must not be empty".to_string());
            }
        }

        if let Some(ref output) = self.output {
            if output.is_empty() || output.contains(['/', '\\']) {
                return Err(format!(
                    "Output must be a file name without directories: {}",
                    output
                ));
            }
        }

        if let Some(ref dir) = self.dir {
            if dir.exists() && !dir.is_dir() {
                return Err(format!(
                    "Results path is not a directory: {}",
                    dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
