//! Shared test utilities and fixture generators

use polars::prelude::*;
use quickreduct::reduct::{DecisionTable, Record, RecordId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;

/// The four-record table used throughout the documentation
///
/// Three condition attributes followed by the decision:
/// - records 0 and 2 are identical
/// - records 1 and 3 agree on attribute 0 but differ in decision
pub fn example_rows() -> Vec<Vec<i64>> {
    vec![
        vec![1, 1, 1, 0],
        vec![2, 2, 1, 1],
        vec![1, 1, 1, 0],
        vec![2, 3, 3, 0],
    ]
}

pub fn example_table() -> DecisionTable {
    DecisionTable::from_rows(example_rows(), 3).unwrap()
}

/// Random table with `conditions` attributes drawn from `0..values` and a
/// decision drawn from `0..decisions` (stored last). Usually inconsistent.
pub fn random_table(
    seed: u64,
    rows: usize,
    conditions: usize,
    values: i64,
    decisions: i64,
) -> DecisionTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows: Vec<Vec<i64>> = (0..rows)
        .map(|_| {
            let mut row: Vec<i64> = (0..conditions).map(|_| rng.gen_range(0..values)).collect();
            row.push(rng.gen_range(0..decisions));
            row
        })
        .collect();
    DecisionTable::from_rows(rows, conditions).unwrap()
}

/// Random consistent table whose decision is a function of attributes 0 and 2
///
/// Attributes 1, 3 and 4 are noise; attribute 5 duplicates attribute 0.
pub fn dependent_table(seed: u64, rows: usize) -> DecisionTable {
    DecisionTable::from_rows(dependent_rows(seed, rows), 6).unwrap()
}

pub fn dependent_rows(seed: u64, rows: usize) -> Vec<Vec<i64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..rows)
        .map(|_| {
            let a: i64 = rng.gen_range(0..3);
            let c: i64 = rng.gen_range(0..3);
            vec![
                a,
                rng.gen_range(0..4),
                c,
                rng.gen_range(0..2),
                rng.gen_range(0..5),
                a,
                (a + c) % 3,
            ]
        })
        .collect()
}

/// Records with ids starting at `first_id`
pub fn records_from(first_id: RecordId, rows: Vec<Vec<i64>>) -> Vec<Record> {
    rows.into_iter()
        .enumerate()
        .map(|(i, values)| Record::new(first_id + i as RecordId, values))
        .collect()
}

/// DataFrame version of the documentation table with readable names
pub fn create_example_dataframe() -> DataFrame {
    df! {
        "colour" => ["red", "blue", "red", "blue"],
        "size" => [1i64, 2, 1, 3],
        "weight" => [1.0f64, 1.0, 1.0, 3.0],
        "label" => [0i32, 1, 0, 0],
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}
