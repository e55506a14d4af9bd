//! Merged table writing.
//!
//! The table is written to a temporary file next to the destination and
//! renamed into place, so readers never observe a half-written file.

use crate::models::Table;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Write a table as CSV: header row, minimal quoting, `\n` line endings.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(&table.headers)?;
    for row in &table.rows {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Write a table to `path`, replacing any existing file atomically.
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    write_csv(table, temp.as_file_mut())
        .with_context(|| format!("Failed to write merged table for {}", path.display()))?;

    temp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to flush merged table for {}", path.display()))?;

    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    debug!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}
