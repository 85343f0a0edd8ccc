//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::{Rng, SeedableRng};
use sift::pipeline::Table;
use std::path::PathBuf;
use tempfile::TempDir;

/// Wrap a DataFrame in a Table with inferred kinds
pub fn table(df: DataFrame) -> Table {
    Table::new(df).unwrap()
}

/// A DataFrame with one instance of every kind of redundancy
///
/// - `id`: categorical identifier, never pruned by correlation
/// - `a` / `a_copy`: exact duplicates
/// - `b`: `10 * a`, perfectly correlated with larger variance
/// - `noise`: uncorrelated with `a`
/// - `segment` / `segment_copy`: duplicate categorical columns
pub fn create_redundancy_dataframe() -> DataFrame {
    df! {
        "id" => ["r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8"],
        "a" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
        "a_copy" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
        "b" => [10.0f64, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0],
        "noise" => [5.0f64, 1.0, 8.0, 2.0, 9.0, 3.0, 7.0, 4.0],
        "segment" => ["x", "y", "x", "y", "x", "y", "x", "y"],
        "segment_copy" => ["x", "y", "x", "y", "x", "y", "x", "y"],
    }
    .unwrap()
}

/// A DataFrame with constant, binary and continuous columns
pub fn create_subset_dataframe() -> DataFrame {
    df! {
        "constant" => [3.0f64, 3.0, 3.0, 3.0, 3.0, 3.0],
        "label" => ["k", "k", "k", "k", "k", "k"],
        "flag" => [0i32, 1, 0, 1, 0, 1],
        "doubled_flag" => [0.0f64, 2.0, 0.0, 2.0, 0.0, 2.0],
        "x" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0],
        "y" => [3.0f64, 5.0, 7.0, 9.0, 11.0, 13.0],
        "z" => [4.0f64, 9.0, 1.0, 7.0, 2.0, 6.0],
    }
    .unwrap()
}

/// A DataFrame with a single extreme value per numeric column
pub fn create_outlier_dataframe() -> DataFrame {
    df! {
        "value" => [1.0f64, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0, 4.0, 100.0],
        "steady" => [10.0f64, 11.0, 9.0, 10.0, 12.0, 8.0, 10.0, 11.0, 9.0],
        "name" => ["a", "b", "c", "d", "e", "f", "g", "h", "i"],
    }
    .unwrap()
}

/// Seeded random numeric DataFrame; every fourth column is a noisy copy of an earlier one
pub fn create_random_dataframe(rows: usize, cols: usize, seed: u64) -> DataFrame {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut data: Vec<Vec<f64>> = Vec::with_capacity(cols);

    for i in 0..cols {
        let values: Vec<f64> = if i % 4 == 3 {
            data[i - 3]
                .iter()
                .map(|v| v + rng.gen::<f64>() * 0.5)
                .collect()
        } else {
            (0..rows).map(|_| rng.gen::<f64>() * 100.0).collect()
        };
        data.push(values);
    }

    let columns: Vec<Column> = data
        .into_iter()
        .enumerate()
        .map(|(i, values)| Column::new(format!("feature_{}", i).into(), values))
        .collect();

    DataFrame::new(columns).unwrap()
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

/// Assert that a table contains specific columns
pub fn assert_has_columns(table: &Table, expected_cols: &[&str]) {
    for col in expected_cols {
        assert!(
            table.contains(col),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            table.column_names()
        );
    }
}

/// Assert that a table does NOT contain specific columns
pub fn assert_missing_columns(table: &Table, unexpected_cols: &[&str]) {
    for col in unexpected_cols {
        assert!(
            !table.contains(col),
            "Unexpected column still present: '{}'",
            col
        );
    }
}
