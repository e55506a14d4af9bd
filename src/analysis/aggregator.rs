//! Table aggregation and statistics.
//!
//! This module concatenates annotated tables, projects them onto the
//! output schema, sorts the rows, and computes grouped row counts.

use crate::models::{
    GroupCount, Table, EPOCH_COLUMN, LEARNING_RATE_COLUMN, MODEL_COLUMN, PREPROCESSING_COLUMN,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// How a sort key column compares its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Plain string comparison.
    Text,
    /// Numeric when every non-empty cell parses as a number, else text.
    Inferred,
}

/// Row order of the merged table.
///
/// `learning_rate` compares as text on purpose: all recognized values
/// share one exponent, so text order equals numeric order.
pub const MERGE_SORT_KEYS: [(&str, SortMode); 4] = [
    (MODEL_COLUMN, SortMode::Text),
    (PREPROCESSING_COLUMN, SortMode::Text),
    (LEARNING_RATE_COLUMN, SortMode::Text),
    (EPOCH_COLUMN, SortMode::Inferred),
];

/// Concatenate tables into one.
///
/// The result has the union of all columns in first-seen order. Rows
/// from a table lacking a column get an empty cell there.
pub fn concat_tables(tables: &[Table]) -> Table {
    let mut headers: Vec<String> = Vec::new();
    for table in tables {
        for header in &table.headers {
            if !headers.contains(header) {
                headers.push(header.clone());
            }
        }
    }

    let mut merged = Table::new(headers);

    for table in tables {
        let mapping: Vec<Option<usize>> = merged
            .headers
            .iter()
            .map(|h| table.column_index(h))
            .collect();

        for row in &table.rows {
            let merged_row = mapping
                .iter()
                .map(|idx| idx.map(|i| row[i].clone()).unwrap_or_default())
                .collect();
            merged.rows.push(merged_row);
        }
    }

    merged
}

/// Keep only the listed columns that exist, in the listed order.
pub fn select_columns(table: &Table, order: &[String]) -> Table {
    let kept: Vec<(String, usize)> = order
        .iter()
        .filter_map(|name| table.column_index(name).map(|idx| (name.clone(), idx)))
        .collect();

    if kept.len() < order.len() {
        debug!(
            "Dropping {} output columns absent from every input",
            order.len() - kept.len()
        );
    }

    Table {
        headers: kept.iter().map(|(name, _)| name.clone()).collect(),
        rows: table
            .rows
            .iter()
            .map(|row| kept.iter().map(|(_, idx)| row[*idx].clone()).collect())
            .collect(),
    }
}

/// Comparable form of a single cell.
#[derive(Debug, Clone, Copy)]
enum CellKey<'a> {
    Number(f64),
    Text(&'a str),
    Missing,
}

impl CellKey<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellKey::Missing, CellKey::Missing) => Ordering::Equal,
            (CellKey::Missing, _) => Ordering::Greater,
            (_, CellKey::Missing) => Ordering::Less,
            (CellKey::Number(a), CellKey::Number(b)) => a.total_cmp(b),
            (CellKey::Text(a), CellKey::Text(b)) => a.cmp(b),
            // A column is keyed uniformly, so mixed pairs never occur.
            (CellKey::Number(_), CellKey::Text(_)) => Ordering::Less,
            (CellKey::Text(_), CellKey::Number(_)) => Ordering::Greater,
        }
    }
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Decide whether an inferred column compares numerically.
fn is_numeric_column(table: &Table, idx: usize) -> bool {
    let mut saw_value = false;
    for row in &table.rows {
        let cell = &row[idx];
        if cell.is_empty() {
            continue;
        }
        if parse_number(cell).is_none() {
            return false;
        }
        saw_value = true;
    }
    saw_value
}

/// Stable sort of rows by the given key columns, ascending.
///
/// Key columns missing from the table are ignored. Empty cells sort last.
pub fn sort_rows(table: &mut Table, keys: &[(&str, SortMode)]) {
    let resolved: Vec<(usize, bool)> = keys
        .iter()
        .filter_map(|(name, mode)| {
            let idx = table.column_index(name)?;
            let numeric = *mode == SortMode::Inferred && is_numeric_column(table, idx);
            Some((idx, numeric))
        })
        .collect();

    if resolved.is_empty() {
        return;
    }

    table.rows.sort_by(|a, b| {
        for &(idx, numeric) in &resolved {
            let ordering = cell_key(&a[idx], numeric).compare(&cell_key(&b[idx], numeric));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn cell_key(cell: &str, numeric: bool) -> CellKey<'_> {
    if cell.is_empty() {
        return CellKey::Missing;
    }
    if numeric {
        parse_number(cell).map_or(CellKey::Missing, CellKey::Number)
    } else {
        CellKey::Text(cell)
    }
}

/// Concatenate, project onto `columns`, and sort into merge order.
pub fn aggregate(tables: &[Table], columns: &[String]) -> Table {
    let concatenated = concat_tables(tables);
    let mut merged = select_columns(&concatenated, columns);
    sort_rows(&mut merged, &MERGE_SORT_KEYS);
    merged
}

/// Count rows per (model, preprocessing), ascending by key.
pub fn count_by_group(table: &Table) -> Vec<GroupCount> {
    let (Some(models), Some(flags)) = (
        table.column(MODEL_COLUMN),
        table.column(PREPROCESSING_COLUMN),
    ) else {
        return Vec::new();
    };

    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for (model, flag) in models.into_iter().zip(flags) {
        *counts.entry((model, flag)).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((model, preprocessing), rows)| GroupCount {
            model: model.to_string(),
            preprocessing: preprocessing.to_string(),
            rows,
        })
        .collect()
}
