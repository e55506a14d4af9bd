//! Analysis modules.
//!
//! Label inference for individual result files and aggregation of the
//! annotated tables into the merged result.

pub mod aggregator;
pub mod annotator;

pub use aggregator::*;
pub use annotator::{annotate, infer_labels};
