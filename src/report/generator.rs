//! Merge summary rendering.
//!
//! This module renders the [`MergeSummary`] of a run either as console
//! text or as a JSON document.

use crate::models::{GroupCount, MergeSummary};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Generate the text summary printed after a merge.
pub fn generate_text_summary(summary: &MergeSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n✅ Merged results saved to: {}\n",
        summary.output_path.display()
    ));
    output.push_str(&format!("   Total rows: {}\n", summary.total_rows));
    output.push_str(&format!(
        "   Total files processed: {}\n",
        summary.files_processed
    ));

    if !summary.files_failed.is_empty() {
        output.push_str(&format!(
            "   ⚠️  Files skipped: {}\n",
            summary.files_failed.len()
        ));
        for failed in &summary.files_failed {
            output.push_str(&format!(
                "     - {}: {}\n",
                failed.path.display(),
                failed.error
            ));
        }
    }

    output.push_str(&generate_group_section(&summary.groups));

    output
}

/// Generate the per-(model, preprocessing) row count table.
fn generate_group_section(groups: &[GroupCount]) -> String {
    let mut section = String::new();

    section.push_str("\n📊 Summary by model:\n");

    if groups.is_empty() {
        section.push_str("   (no model labels in output)\n");
        return section;
    }

    let model_width = groups
        .iter()
        .map(|g| g.model.len())
        .max()
        .unwrap_or(0)
        .max("model".len());
    let flag_width = groups
        .iter()
        .map(|g| g.preprocessing.len())
        .max()
        .unwrap_or(0)
        .max("preprocessing".len());

    section.push_str(&format!(
        "   {:<mw$}  {:<fw$}  {}\n",
        "model",
        "preprocessing",
        "rows",
        mw = model_width,
        fw = flag_width
    ));
    for group in groups {
        section.push_str(&format!(
            "   {:<mw$}  {:<fw$}  {}\n",
            group.model,
            group.preprocessing,
            group.rows,
            mw = model_width,
            fw = flag_width
        ));
    }

    section
}

/// JSON form of the summary, stamped with the time it was produced.
#[derive(Debug, Serialize)]
struct SummaryDocument<'a> {
    merged_at: DateTime<Utc>,
    #[serde(flatten)]
    summary: &'a MergeSummary,
}

/// Generate a JSON summary.
pub fn generate_json_summary(summary: &MergeSummary) -> Result<String> {
    let document = SummaryDocument {
        merged_at: Utc::now(),
        summary,
    };
    serde_json::to_string_pretty(&document).map_err(Into::into)
}
