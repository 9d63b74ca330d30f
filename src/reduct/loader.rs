//! Decision table loader for CSV and Parquet files
//!
//! Every column becomes an integer attribute: integer and boolean columns are
//! taken as-is, integral floats are cast, and string columns are
//! dictionary-encoded in order of first appearance. Rough-set reduction works
//! on discrete values, so nulls and fractional floats are rejected rather
//! than guessed at.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use polars::prelude::*;

use super::record::{AttributeValue, DecisionTable, Record, RecordId, Schema};

/// A decision table together with its column names.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: DecisionTable,
    pub columns: Vec<String>,
}

impl LoadedTable {
    pub fn decision_column(&self) -> &str {
        &self.columns[self.table.schema().decision]
    }

    pub fn attribute_name(&self, attribute: usize) -> &str {
        self.columns
            .get(attribute)
            .map(String::as_str)
            .unwrap_or("?")
    }

    /// Names for a list of attribute indices, in the same order.
    pub fn attribute_names(&self, attributes: &[usize]) -> Vec<String> {
        attributes
            .iter()
            .map(|&a| self.attribute_name(a).to_string())
            .collect()
    }
}

/// Load a dataset from a file (CSV or Parquet based on extension)
///
/// `infer_schema_length` of 0 means a full scan for CSV schema inference.
pub fn load_dataframe(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    lf.collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))
}

/// Convert a DataFrame into a decision table with `target` as decision.
pub fn dataframe_to_table(df: &DataFrame, target: &str) -> Result<LoadedTable> {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let decision = columns.iter().position(|c| c == target).with_context(|| {
        format!(
            "Target column '{}' not found in dataset. Available columns: {:?}",
            target, columns
        )
    })?;

    if columns.len() < 2 {
        bail!("Dataset needs at least one condition column besides the target");
    }

    let encoded: Vec<Vec<AttributeValue>> = df
        .get_columns()
        .iter()
        .map(encode_column)
        .collect::<Result<_>>()?;

    let rows = df.height();
    let records = (0..rows)
        .map(|row| {
            let values = encoded.iter().map(|col| col[row]).collect();
            Record::new(row as RecordId, values)
        })
        .collect();

    let schema = Schema::new(columns.len(), decision)?;
    let table = DecisionTable::new(schema, records)?;
    Ok(LoadedTable { table, columns })
}

/// Load a file, drop `drop_columns`, and build the decision table.
pub fn load_decision_table(
    path: &Path,
    target: &str,
    drop_columns: &[String],
    infer_schema_length: usize,
) -> Result<LoadedTable> {
    let mut df = load_dataframe(path, infer_schema_length)?;

    if drop_columns.iter().any(|c| c == target) {
        bail!("Target column '{}' cannot be dropped", target);
    }
    if !drop_columns.is_empty() {
        df = df.drop_many(drop_columns.iter().map(String::as_str));
    }

    dataframe_to_table(&df, target)
}

fn encode_column(col: &Column) -> Result<Vec<AttributeValue>> {
    let name = col.name().to_string();
    let nulls = col.null_count();
    if nulls > 0 {
        bail!(
            "Column '{}' contains {} missing value(s); records must be complete",
            name,
            nulls
        );
    }

    let dtype = col.dtype();
    if dtype.is_integer() || *dtype == DataType::Boolean {
        let cast = col.cast(&DataType::Int64)?;
        Ok(cast.i64()?.into_iter().flatten().collect())
    } else if dtype.is_float() {
        let cast = col.cast(&DataType::Float64)?;
        let mut values = Vec::with_capacity(cast.len());
        for v in cast.f64()?.into_iter().flatten() {
            if !v.is_finite() || v.fract() != 0.0 {
                bail!(
                    "Column '{}' contains non-integral value {}; discretize it before reduction",
                    name,
                    v
                );
            }
            values.push(v as AttributeValue);
        }
        Ok(values)
    } else if *dtype == DataType::String {
        let mut codes: HashMap<String, AttributeValue> = HashMap::new();
        let mut values = Vec::with_capacity(col.len());
        for v in col.str()?.into_iter().flatten() {
            let next = codes.len() as AttributeValue;
            values.push(*codes.entry(v.to_string()).or_insert(next));
        }
        Ok(values)
    } else {
        bail!("Column '{}' has unsupported type {}", name, dtype)
    }
}
