//! Data models for the result merger.
//!
//! This module contains the core data structures used throughout the
//! application: run labels inferred from file names, in-memory tables,
//! and the merge summary.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Canonical output column order.
pub const CANONICAL_COLUMNS: [&str; 16] = [
    "model",
    "preprocessing",
    "learning_rate",
    "epoch",
    "train_loss",
    "val_accuracy",
    "val_mcc",
    "val_macro_precision",
    "val_macro_recall",
    "val_macro_f1",
    "test_accuracy",
    "test_mcc",
    "test_macro_precision",
    "test_macro_recall",
    "test_macro_f1",
    "source_file",
];

pub const MODEL_COLUMN: &str = "model";
pub const PREPROCESSING_COLUMN: &str = "preprocessing";
pub const LEARNING_RATE_COLUMN: &str = "learning_rate";
pub const EPOCH_COLUMN: &str = "epoch";
pub const SOURCE_FILE_COLUMN: &str = "source_file";

/// Label used when a file name carries no recognizable marker.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Model family a result file was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    Bert,
    DistilBert,
    Roberta,
    Unknown,
}

impl ModelFamily {
    /// Returns the label written into the `model` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::Bert => "BERT",
            ModelFamily::DistilBert => "DistilBERT",
            ModelFamily::Roberta => "RoBERTa",
            ModelFamily::Unknown => UNKNOWN_LABEL,
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the text-preprocessing step was applied for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preprocessing {
    Yes,
    No,
    Unknown,
}

impl Preprocessing {
    /// Returns the label written into the `preprocessing` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Preprocessing::Yes => "Yes",
            Preprocessing::No => "No",
            Preprocessing::Unknown => UNKNOWN_LABEL,
        }
    }
}

impl fmt::Display for Preprocessing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Learning rate encoded in a result file name.
///
/// Kept as a label: the value is never used numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LearningRate {
    Lr1e5,
    Lr2e5,
    Lr3e5,
    Lr4e5,
    Lr5e5,
    Unknown,
}

impl LearningRate {
    /// All recognized learning rates, in the order file names are checked.
    pub const KNOWN: [LearningRate; 5] = [
        LearningRate::Lr1e5,
        LearningRate::Lr2e5,
        LearningRate::Lr3e5,
        LearningRate::Lr4e5,
        LearningRate::Lr5e5,
    ];

    /// Returns the label written into the `learning_rate` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningRate::Lr1e5 => "1e-05",
            LearningRate::Lr2e5 => "2e-05",
            LearningRate::Lr3e5 => "3e-05",
            LearningRate::Lr4e5 => "4e-05",
            LearningRate::Lr5e5 => "5e-05",
            LearningRate::Unknown => UNKNOWN_LABEL,
        }
    }
}

impl fmt::Display for LearningRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything inferred about a run from its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLabels {
    pub model: ModelFamily,
    pub preprocessing: Preprocessing,
    pub learning_rate: LearningRate,
    /// Base file name the labels were inferred from.
    pub source_file: String,
}

/// A loaded CSV table: a header plus rows of literal cell text.
///
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates an empty table with the given header.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Sets every cell of `name` to `value`, appending the column if missing.
    pub fn set_column(&mut self, name: &str, value: &str) {
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = value.to_string();
                }
            }
            None => {
                self.headers.push(name.to_string());
                for row in &mut self.rows {
                    row.push(value.to_string());
                }
            }
        }
    }

    /// Returns the cells of one column, if present.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }
}

/// A file that could not be loaded.
#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Row count for one (model, preprocessing) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub model: String,
    pub preprocessing: String,
    pub rows: usize,
}

/// Summary of one merge run.
#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    /// Where the merged table was written.
    pub output_path: PathBuf,
    /// Total rows in the merged table.
    pub total_rows: usize,
    /// Files loaded and merged.
    pub files_processed: usize,
    /// Files skipped because they could not be loaded.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files_failed: Vec<FailedFile>,
    /// Columns written, in output order.
    pub columns: Vec<String>,
    /// Row counts grouped by (model, preprocessing), ascending by key.
    pub groups: Vec<GroupCount>,
}
