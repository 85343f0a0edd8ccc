//! Tests for dataset loading and saving

use sift::pipeline::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_load_csv_file() {
    let mut df = create_redundancy_dataframe();
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    let (loaded, rows, cols, memory_mb) = load_dataset_with_progress(&csv_path, 100).unwrap();

    assert_eq!(rows, 8);
    assert_eq!(cols, 7);
    assert_eq!(loaded.shape(), (8, 7));
    assert!(memory_mb > 0.0);
}

#[test]
fn test_load_table_infers_kinds() {
    let mut df = create_redundancy_dataframe();
    let (_temp_dir, parquet_path) = create_temp_parquet(&mut df);

    let t = load_table(&parquet_path, 100).unwrap();

    assert_eq!(t.kind("id"), Some(ColumnKind::Categorical));
    assert_eq!(t.kind("a"), Some(ColumnKind::Numeric));
    assert_eq!(t.numeric_columns(), vec!["a", "a_copy", "b", "noise"]);
}

#[test]
fn test_get_column_names() {
    let mut df = create_outlier_dataframe();
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    let names = get_column_names(&csv_path).unwrap();

    assert_eq!(names, vec!["value", "steady", "name"]);
}

#[test]
fn test_unsupported_format() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("data.xlsx");
    std::fs::write(&path, "not a table").unwrap();

    let result = load_dataset_with_progress(&path, 100);
    assert!(result.is_err());
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("Unsupported file format"));
}

#[test]
fn test_nonexistent_file() {
    let result = load_table(std::path::Path::new("/nonexistent/data.csv"), 100);
    assert!(result.is_err());
}

#[test]
fn test_csv_with_missing_values() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("missing.csv");
    std::fs::write(&csv_path, "x,label\n1.5,a\n,b\n3.0,\n").unwrap();

    let t = load_table(&csv_path, 0).unwrap();

    assert_eq!(t.numeric_values("x").unwrap(), vec![Some(1.5), None, Some(3.0)]);
    assert_eq!(t.kind("label"), Some(ColumnKind::Categorical));
}

#[test]
fn test_save_table_to_parquet_and_csv() {
    let t = table(create_outlier_dataframe());
    let temp_dir = tempfile::TempDir::new().unwrap();

    for name in ["out.parquet", "out.csv"] {
        let path = temp_dir.path().join(name);
        save_table(&t, &path).unwrap();
        let reloaded = load_table(&path, 100).unwrap();
        assert_eq!(reloaded.column_names(), t.column_names());
        assert_eq!(reloaded.height(), t.height());
    }
}

#[test]
fn test_save_rejects_unknown_extension() {
    let mut df = create_outlier_dataframe();
    let temp_dir = tempfile::TempDir::new().unwrap();

    assert!(save_dataset(&mut df, &temp_dir.path().join("out.txt")).is_err());
}

#[test]
fn test_file_format_from_path() {
    use std::path::Path;

    assert_eq!(FileFormat::from_path(Path::new("a.CSV")).unwrap(), FileFormat::Csv);
    assert_eq!(
        FileFormat::from_path(Path::new("dir/a.parquet")).unwrap(),
        FileFormat::Parquet
    );
    assert!(FileFormat::from_path(Path::new("noext")).is_err());
}
