//! Quickreduct: Rough-Set Attribute Reduction Library
//!
//! Finds a minimal subset of condition attributes that preserves the
//! discriminating power of a decision table, using greedy forward search
//! followed by backward inspection. New record batches can be folded into an
//! existing reduct without repartitioning the whole table.

pub mod cli;
pub mod reduct;
pub mod report;
pub mod utils;
