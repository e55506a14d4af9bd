//! One merge run, end to end.
//!
//! Discovers result files, loads and labels each one, aggregates them,
//! writes the merged table, and returns the summary. A file that fails to
//! load is reported and skipped; the run carries on with the rest.

use crate::analysis;
use crate::config::Config;
use crate::loader::{self, LoadError};
use crate::models::{FailedFile, MergeSummary, Table};
use crate::report;
use crate::scanner::{FileScanner, ScanConfig};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info, warn};

/// Options for a merge run.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Suppress per-file console lines and the progress bar.
    pub quiet: bool,
}

/// Result of a merge run that produced an output file.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The merged table as written.
    pub table: Table,
    /// Counts and paths for reporting.
    pub summary: MergeSummary,
}

/// Load one result file and stamp its run labels onto every row.
pub fn load_annotated(path: &Path) -> Result<Table, LoadError> {
    let mut table = loader::load_table(path)?;
    let labels = analysis::infer_labels(path);
    debug!(
        "{} -> model={} preprocessing={} learning_rate={}",
        labels.source_file, labels.model, labels.preprocessing, labels.learning_rate
    );
    analysis::annotate(&mut table, &labels);
    Ok(table)
}

/// Merge every matching result file into the configured output file.
///
/// Returns `Ok(None)` when no file could be merged; nothing is written in
/// that case.
pub fn merge_results(config: &Config, options: &MergeOptions) -> Result<Option<MergeOutcome>> {
    let scanner = FileScanner::new(
        config.discovery.results_dir.clone(),
        ScanConfig::from(config),
    );
    let files = scanner.scan()?;

    if files.is_empty() {
        info!(
            "No files matching {:?} in {}",
            config.discovery.patterns,
            scanner.results_dir().display()
        );
        return Ok(None);
    }

    info!("Found {} result files", files.len());

    let progress = create_progress_bar(files.len() as u64, options.quiet);
    let mut tables = Vec::with_capacity(files.len());
    let mut failed = Vec::new();

    for file in &files {
        if !options.quiet {
            progress_line(&progress, format!("Processing: {}", file.path.display()));
        }

        match load_annotated(&file.path) {
            Ok(table) => tables.push(table),
            Err(e) => {
                warn!("Failed to load {}: {}", file.path.display(), e);
                progress_error(
                    &progress,
                    format!("Error processing {}: {}", file.path.display(), e),
                );
                failed.push(FailedFile {
                    path: file.path.clone(),
                    error: e.to_string(),
                });
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();

    if tables.is_empty() {
        warn!("None of the {} matching files could be loaded", files.len());
        return Ok(None);
    }

    let merged = analysis::aggregate(&tables, &config.output.columns);
    if merged.is_empty() {
        warn!("Matching files hold no data rows; writing header only");
    }
    let output_path = config.output_path();
    report::write_table(&merged, &output_path)?;

    info!(
        "Merged {} rows from {} files into {}",
        merged.len(),
        tables.len(),
        output_path.display()
    );

    let summary = MergeSummary {
        output_path,
        total_rows: merged.len(),
        files_processed: tables.len(),
        files_failed: failed,
        columns: merged.headers.clone(),
        groups: analysis::count_by_group(&merged),
    };

    Ok(Some(MergeOutcome {
        table: merged,
        summary,
    }))
}

/// Create the file progress bar, hidden in quiet mode.
fn create_progress_bar(total: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Print a line without tearing the progress bar.
fn progress_line(pb: &ProgressBar, line: String) {
    if pb.is_hidden() {
        println!("{}", line);
    } else {
        pb.println(line);
    }
}

/// Print an error line on stderr, clearing the progress bar while it is written.
fn progress_error(pb: &ProgressBar, line: String) {
    pb.suspend(|| eprintln!("{}", line));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(dir: &Path) -> Config {
        let mut config = Config::default();
        config.discovery.results_dir = dir.to_path_buf();
        config
    }

    fn quiet() -> MergeOptions {
        MergeOptions { quiet: true }
    }

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_merge_two_bert_runs() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "bert_t_2e-05.csv", "epoch,train_loss\n1,0.5\n");
        write(temp_dir.path(), "bert_nt_3e-05.csv", "epoch,train_loss\n1,0.6\n");

        let outcome = merge_results(&config_for(temp_dir.path()), &quiet())
            .unwrap()
            .unwrap();

        let written = fs::read_to_string(temp_dir.path().join("merge-result.csv")).unwrap();
        assert_eq!(
            written,
            "model,preprocessing,learning_rate,epoch,train_loss,source_file\n\
             BERT,No,3e-05,1,0.6,bert_nt_3e-05.csv\n\
             BERT,Yes,2e-05,1,0.5,bert_t_2e-05.csv\n"
        );
        assert_eq!(outcome.summary.total_rows, 2);
        assert_eq!(outcome.summary.files_processed, 2);
        assert_eq!(outcome.summary.groups.len(), 2);
        assert_eq!(outcome.summary.groups[0].preprocessing, "No");
    }

    #[test]
    fn test_empty_directory_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();

        let outcome = merge_results(&config_for(temp_dir.path()), &quiet()).unwrap();

        assert!(outcome.is_none());
        assert!(!temp_dir.path().join("merge-result.csv").exists());
    }

    #[test]
    fn test_missing_directory_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_for(&temp_dir.path().join("result"));

        assert!(merge_results(&config, &quiet()).unwrap().is_none());
    }

    #[test]
    fn test_unrecognized_name_is_still_merged() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "unknownmodel_results.csv", "epoch,train_loss\n1,0.7\n");
        write(temp_dir.path(), "roberta_t_1e-05.csv", "epoch,train_loss\n1,0.4\n");

        let mut config = config_for(temp_dir.path());
        config.discovery.patterns.push("unknownmodel_*.csv".to_string());

        let outcome = merge_results(&config, &quiet()).unwrap().unwrap();
        let table = &outcome.table;

        assert_eq!(table.len(), 2);
        // "RoBERTa" < "unknown" as text.
        assert_eq!(table.rows[1][0], "unknown");
        assert_eq!(table.rows[1][1], "unknown");
        assert_eq!(table.rows[1][2], "unknown");
        assert_eq!(
            table.column("source_file").unwrap()[1],
            "unknownmodel_results.csv"
        );
    }

    #[test]
    fn test_bad_file_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "bert_t_1e-05.csv", "epoch,train_loss\n1,0.5\n2,0.4\n");
        write(temp_dir.path(), "bert_t_2e-05.csv", "");
        write(temp_dir.path(), "roberta_nt_1e-05.csv", "epoch\n1,2,3\n");

        let outcome = merge_results(&config_for(temp_dir.path()), &quiet())
            .unwrap()
            .unwrap();

        assert_eq!(outcome.summary.total_rows, 2);
        assert_eq!(outcome.summary.files_processed, 1);
        assert_eq!(outcome.summary.files_failed.len(), 2);
    }

    #[test]
    fn test_bad_file_is_skipped_with_progress_bar() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "bert_t_1e-05.csv", "epoch\n1\n");
        write(temp_dir.path(), "bert_t_2e-05.csv", "");

        let options = MergeOptions { quiet: false };
        let outcome = merge_results(&config_for(temp_dir.path()), &options)
            .unwrap()
            .unwrap();

        assert_eq!(outcome.summary.files_processed, 1);
        assert_eq!(outcome.summary.files_failed.len(), 1);
        assert!(outcome.summary.files_failed[0]
            .path
            .ends_with("bert_t_2e-05.csv"));
    }

    #[test]
    fn test_whitespace_lines_are_not_rows() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "bert_t_1e-05.csv",
            "epoch,train_loss\n9,0.4\n10,0.3\n  \n",
        );

        let outcome = merge_results(&config_for(temp_dir.path()), &quiet())
            .unwrap()
            .unwrap();

        assert_eq!(outcome.summary.total_rows, 2);
        assert_eq!(outcome.table.column("epoch"), Some(vec!["9", "10"]));
    }

    #[test]
    fn test_all_files_bad_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "bert_t_1e-05.csv", "");

        let outcome = merge_results(&config_for(temp_dir.path()), &quiet()).unwrap();

        assert!(outcome.is_none());
        assert!(!temp_dir.path().join("merge-result.csv").exists());
    }

    #[test]
    fn test_row_count_and_source_file_per_row() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "distilbert_t_4e-05.csv",
            "epoch,train_loss\n1,0.5\n2,0.4\n3,0.3\n",
        );
        write(temp_dir.path(), "roberta_nt_5e-05.csv", "epoch,val_mcc\n1,0.2\n2,0.3\n");
        write(temp_dir.path(), "bert_nt_1e-05.csv", "epoch\n");

        let outcome = merge_results(&config_for(temp_dir.path()), &quiet())
            .unwrap()
            .unwrap();
        let table = &outcome.table;

        assert_eq!(table.len(), 5);
        assert_eq!(outcome.summary.files_processed, 3);
        for row in &table.rows {
            let model = &row[0];
            let source = table.column_index("source_file").map(|i| &row[i]).unwrap();
            match model.as_str() {
                "DistilBERT" => assert_eq!(source, "distilbert_t_4e-05.csv"),
                "RoBERTa" => assert_eq!(source, "roberta_nt_5e-05.csv"),
                other => panic!("unexpected model {}", other),
            }
        }
        assert_eq!(
            table.headers,
            vec![
                "model",
                "preprocessing",
                "learning_rate",
                "epoch",
                "train_loss",
                "val_mcc",
                "source_file"
            ]
        );
    }

    #[test]
    fn test_source_labels_are_overridden() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "roberta_t_3e-05.csv",
            "model,preprocessing,learning_rate,epoch\nroberta-base,no,0.00003,1\n",
        );

        let outcome = merge_results(&config_for(temp_dir.path()), &quiet())
            .unwrap()
            .unwrap();

        assert_eq!(outcome.table.rows[0][..4], ["RoBERTa", "Yes", "3e-05", "1"]);
    }

    #[test]
    fn test_previous_output_is_not_an_input() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "bert_t_1e-05.csv", "epoch\n1\n");

        let mut config = config_for(temp_dir.path());
        config.discovery.patterns = vec!["*.csv".to_string()];

        merge_results(&config, &quiet()).unwrap();
        let outcome = merge_results(&config, &quiet()).unwrap().unwrap();

        assert_eq!(outcome.summary.files_processed, 1);
        assert_eq!(outcome.summary.total_rows, 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "bert_t_1e-05.csv", "epoch,train_loss\n2,0.4\n1,0.5\n");
        write(temp_dir.path(), "bert_t_2e-05.csv", "epoch,train_loss\n1,0.6\n");
        write(temp_dir.path(), "distilbert_nt_1e-05.csv", "epoch,train_loss\n10,0.1\n9,0.2\n");
        let output = temp_dir.path().join("merge-result.csv");
        let config = config_for(temp_dir.path());

        merge_results(&config, &quiet()).unwrap();
        let first = fs::read(&output).unwrap();
        merge_results(&config, &quiet()).unwrap();
        let second = fs::read(&output).unwrap();

        assert_eq!(first, second);
        let text = String::from_utf8(first).unwrap();
        let epochs: Vec<&str> = text
            .lines()
            .skip(1)
            .map(|l| l.split(',').nth(3).unwrap())
            .collect();
        assert_eq!(epochs, vec!["1", "2", "1", "9", "10"]);
    }
}
