//! Output generation.
//!
//! Writing the merged table to disk and rendering the run summary.

pub mod generator;
pub mod writer;

pub use generator::{generate_json_summary, generate_text_summary};
pub use writer::write_table;
