//! CSV table loading.
//!
//! Reads one result file into a [`Table`] of literal cell text. Failures
//! are returned as [`LoadError`] so the caller can report the file and
//! move on to the next one.

use crate::models::Table;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Error type for a single file that could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("no columns to parse from file")]
    Empty,
    #[error("expected {expected} fields in line {line}, saw {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// Load a CSV file with a header row.
pub fn load_table(path: &Path) -> Result<Table, LoadError> {
    let file = File::open(path)?;
    let table = read_table(file)?;
    debug!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

/// Read CSV data with a header row.
///
/// Blank lines, including lines of only whitespace, are skipped. Rows
/// shorter than the header are padded with empty cells; longer rows are an
/// error.
pub fn read_table<R: Read>(reader: R) -> Result<Table, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = csv_reader.records().filter(|record| match record {
        Ok(record) => !is_blank_line(record),
        Err(_) => true,
    });

    let header = match records.next() {
        Some(record) => record?,
        None => return Err(LoadError::Empty),
    };
    let headers = dedupe_headers(header.iter());
    let width = headers.len();

    let mut table = Table::new(headers);

    for record in records {
        let record = record?;
        if record.len() > width {
            return Err(LoadError::TooManyFields {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: width,
                found: record.len(),
            });
        }

        let mut row: Vec<String> = record.iter().map(String::from).collect();
        row.resize(width, String::new());
        table.rows.push(row);
    }

    Ok(table)
}

/// A line holding nothing but whitespace parses as one blank field.
fn is_blank_line(record: &csv::StringRecord) -> bool {
    record.len() == 1 && record[0].trim().is_empty()
}

/// Make header names unique by suffixing repeats with `.1`, `.2`, ...
fn dedupe_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let names: Vec<&str> = names.collect();
    let mut used: HashSet<String> = HashSet::new();
    let mut headers = Vec::with_capacity(names.len());

    for name in names {
        let mut candidate = name.to_string();
        let mut suffix = 1;
        while used.contains(&candidate) {
            candidate = format!("{}.{}", name, suffix);
            suffix += 1;
        }
        used.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_table() {
        let data = "epoch,train_loss,val_accuracy\n1,0.5,0.81\n2,0.4,0.84\n";
        let table = read_table(data.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["epoch", "train_loss", "val_accuracy"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1], vec!["2", "0.4", "0.84"]);
    }

    #[test]
    fn test_read_table_keeps_literal_text() {
        let data = "epoch,train_loss\n01,5.000e-01\n";
        let table = read_table(data.as_bytes()).unwrap();

        assert_eq!(table.rows[0], vec!["01", "5.000e-01"]);
    }

    #[test]
    fn test_read_table_header_only() {
        let table = read_table("epoch,train_loss\n".as_bytes()).unwrap();

        assert_eq!(table.headers.len(), 2);
        assert!(table.is_empty());
    }

    #[test]
    fn test_read_table_empty_input() {
        let err = read_table("".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }

    #[test]
    fn test_read_table_pads_short_rows() {
        let table = read_table("a,b,c\n1,2\n".as_bytes()).unwrap();
        assert_eq!(table.rows[0], vec!["1", "2", ""]);
    }

    #[test]
    fn test_read_table_rejects_long_rows() {
        let err = read_table("a,b\n1,2\n1,2,3\n".as_bytes()).unwrap_err();

        match err {
            LoadError::TooManyFields {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_read_table_skips_whitespace_lines() {
        let data = "epoch,train_loss\n9,0.4\n   \n10,0.3\n  \n";
        let table = read_table(data.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.column("epoch"), Some(vec!["9", "10"]));
    }

    #[test]
    fn test_read_table_whitespace_before_header() {
        let table = read_table(" \n\t\nepoch\n1\n".as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["epoch"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_read_table_whitespace_only_input() {
        let err = read_table("  \n \n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }

    #[test]
    fn test_read_table_keeps_rows_of_empty_fields() {
        let table = read_table("a,b\n,\n".as_bytes()).unwrap();
        assert_eq!(table.rows, vec![vec!["".to_string(), "".to_string()]]);
    }

    #[test]
    fn test_read_table_quoted_fields() {
        let data = "epoch,note\n1,\"contains, comma\"\n";
        let table = read_table(data.as_bytes()).unwrap();

        assert_eq!(table.rows[0][1], "contains, comma");
    }

    #[test]
    fn test_dedupe_headers() {
        let headers = dedupe_headers(["a", "b", "a", "a"].into_iter());
        assert_eq!(headers, vec!["a", "b", "a.1", "a.2"]);
    }

    #[test]
    fn test_load_table_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_table(&temp_dir.path().join("missing.csv")).unwrap_err();

        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_load_table_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bert_t_1e-05.csv");
        std::fs::write(&path, b"epoch\n\xff\xfe\n").unwrap();

        assert!(matches!(load_table(&path), Err(LoadError::Csv(_))));
    }
}
