//! Report module - summarizing reduction results

pub mod reduct_report;
pub mod summary;

pub use reduct_report::*;
pub use summary::*;
