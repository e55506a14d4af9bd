//! Run label inference from result file names.
//!
//! Training jobs encode their configuration in the file name, e.g.
//! `distilbert_nt_3e-05.csv`. This module recovers the model family,
//! preprocessing flag, and learning rate, and stamps them onto a table.

use crate::models::{
    LearningRate, ModelFamily, Preprocessing, RunLabels, Table, LEARNING_RATE_COLUMN,
    MODEL_COLUMN, PREPROCESSING_COLUMN, SOURCE_FILE_COLUMN,
};
use std::path::Path;

/// Name markers checked in order; the first one found wins.
///
/// `distilbert_` contains `bert_`, so the DistilBERT and RoBERTa markers
/// must come before the plain BERT ones.
const MODEL_MARKERS: [(&str, ModelFamily, Preprocessing); 6] = [
    ("distilbert_t_", ModelFamily::DistilBert, Preprocessing::Yes),
    ("distilbert_nt_", ModelFamily::DistilBert, Preprocessing::No),
    ("roberta_t_", ModelFamily::Roberta, Preprocessing::Yes),
    ("roberta_nt_", ModelFamily::Roberta, Preprocessing::No),
    ("bert_t_", ModelFamily::Bert, Preprocessing::Yes),
    ("bert_nt_", ModelFamily::Bert, Preprocessing::No),
];

/// Infer the learning rate from a `_<lr>.csv` suffix.
pub fn infer_learning_rate(file_name: &str) -> LearningRate {
    LearningRate::KNOWN
        .into_iter()
        .find(|lr| file_name.contains(&format!("_{}.csv", lr.as_str())))
        .unwrap_or(LearningRate::Unknown)
}

/// Infer the model family and preprocessing flag from the file name.
pub fn infer_model(file_name: &str) -> (ModelFamily, Preprocessing) {
    MODEL_MARKERS
        .iter()
        .find(|(marker, _, _)| file_name.contains(marker))
        .map(|(_, model, preprocessing)| (*model, *preprocessing))
        .unwrap_or((ModelFamily::Unknown, Preprocessing::Unknown))
}

/// Infer all run labels for a result file.
pub fn infer_labels(path: &Path) -> RunLabels {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let (model, preprocessing) = infer_model(&file_name);

    RunLabels {
        model,
        preprocessing,
        learning_rate: infer_learning_rate(&file_name),
        source_file: file_name,
    }
}

/// Stamp run labels onto every row, replacing any values already present.
pub fn annotate(table: &mut Table, labels: &RunLabels) {
    table.set_column(LEARNING_RATE_COLUMN, labels.learning_rate.as_str());
    table.set_column(MODEL_COLUMN, labels.model.as_str());
    table.set_column(PREPROCESSING_COLUMN, labels.preprocessing.as_str());
    table.set_column(SOURCE_FILE_COLUMN, &labels.source_file);
}
