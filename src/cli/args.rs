//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::reduct::{InspectOrder, MetricKind, PartitionStrategy, ReductConfig};

/// Quickreduct - Find a minimal attribute subset that preserves a decision table's discriminating power
#[derive(Parser, Debug)]
#[command(name = "quickreduct")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Decision column name.
    /// Every other column is treated as a condition attribute.
    #[arg(short, long)]
    pub target: String,

    /// Significance metric used to score attribute subsets.
    /// Options: "positive-region" (default), "dependency", "entropy", "discernibility"
    #[arg(long, default_value = "positive-region")]
    pub metric: MetricKind,

    /// Partitioning strategy for grouping records into equivalence classes.
    /// Options: "hash" (default, near-linear) or "sequential" (quadratic, equality only)
    #[arg(long, default_value = "hash")]
    pub partitioner: PartitionStrategy,

    /// Tolerance below which two significance values count as equal.
    /// 0.0 demands an exact match with the significance of all attributes.
    #[arg(long, default_value = "0.0", value_parser = validate_deviation)]
    pub deviation: f64,

    /// Order in which reduct attributes are tried for removal.
    /// Options: "reversed" (default, last added goes first) or "as-given"
    #[arg(long, default_value = "reversed")]
    pub inspect_order: InspectOrder,

    /// Start forward search from the empty set instead of the core
    #[arg(long, default_value = "false")]
    pub no_core: bool,

    /// Score candidate attributes in parallel
    #[arg(long, default_value = "false")]
    pub parallel: bool,

    /// Inspect the reduct in groups of this many attributes.
    /// Without it, attributes are inspected one at a time.
    #[arg(long, value_parser = validate_positive)]
    pub group_size: Option<usize>,

    /// Split the table into this many batches and fold them in one by one.
    /// 1 reduces the whole table at once.
    #[arg(long, default_value = "1", value_parser = validate_positive)]
    pub batches: usize,

    /// Columns to drop before processing (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub drop_columns: Vec<String>,

    /// Write a JSON report of the reduction to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

impl Cli {
    /// Engine settings from the command line.
    pub fn reduct_config(&self) -> ReductConfig {
        ReductConfig {
            deviation: self.deviation,
            inspect_order: self.inspect_order,
            seed_with_core: !self.no_core,
            parallel: self.parallel,
            inspect_group_size: self.group_size,
        }
    }

    /// Whether the table is folded in through streaming updates.
    pub fn is_streaming(&self) -> bool {
        self.batches > 1
    }
}

/// Validator for deviation parameter
fn validate_deviation(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !value.is_finite() || value < 0.0 {
        Err(format!(
            "deviation must be a non-negative number, got {}",
            value
        ))
    } else {
        Ok(value)
    }
}

/// Validator for group size and batch count
fn validate_positive(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid count", s))?;

    if value == 0 {
        Err("value must be at least 1".to_string())
    } else {
        Ok(value)
    }
}
