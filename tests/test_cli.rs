//! Tests for CLI argument parsing and the sift binary

use assert_cmd::Command;
use clap::Parser;
use polars::prelude::*;
use predicates::prelude::*;
use sift::cli::{derive_path, Cli, Commands};
use sift::pipeline::DuplicateKeep;
use std::path::PathBuf;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_reduce_default_values() {
    let cli = Cli::parse_from(["sift", "reduce", "-i", "data.csv"]);

    assert!(!cli.no_confirm, "Default no_confirm should be false");
    assert_eq!(cli.infer_schema_length, 10000);
    assert_eq!(cli.log_level, "info");

    let Commands::Reduce(args) = cli.command else {
        panic!("expected reduce subcommand");
    };
    assert_eq!(args.correlation_threshold, 0.98);
    assert!(args.protect.is_empty());
    assert!(!args.no_trace);
    assert!(args.report.is_none());
}

#[test]
fn test_reduce_protect_list_and_output_derivation() {
    let cli = Cli::parse_from([
        "sift",
        "reduce",
        "-i",
        "/path/to/data.parquet",
        "--protect",
        "id,target",
        "--no-confirm",
    ]);

    assert!(cli.no_confirm);
    let Commands::Reduce(args) = cli.command else {
        panic!("expected reduce subcommand");
    };
    assert_eq!(args.protect, vec!["id", "target"]);
    assert_eq!(
        args.output_path(),
        PathBuf::from("/path/to/data_reduced.parquet")
    );
}

#[test]
fn test_select_defaults_and_explicit_output() {
    let cli = Cli::parse_from(["sift", "select", "-i", "data.csv", "-o", "subset.csv"]);

    let Commands::Select(args) = cli.command else {
        panic!("expected select subcommand");
    };
    assert_eq!(args.correlation_threshold, 0.95);
    assert_eq!(args.output_path(), PathBuf::from("subset.csv"));
}

#[test]
fn test_outlier_output_paths() {
    let cli = Cli::parse_from([
        "sift",
        "outliers",
        "-i",
        "/data/sales.csv",
        "--columns",
        "price,qty",
    ]);

    let Commands::Outliers(args) = cli.command else {
        panic!("expected outliers subcommand");
    };
    assert_eq!(args.iqr_multiplier, 1.5);
    assert_eq!(args.z_threshold, 3.0);
    assert_eq!(
        args.requested_columns(),
        Some(vec!["price".to_string(), "qty".to_string()])
    );

    let outputs = args.output_paths();
    assert_eq!(
        outputs.flagged,
        PathBuf::from("/data/sales_with_outliers_flag.csv")
    );
    assert_eq!(outputs.cleaned, PathBuf::from("/data/sales_cleaned.csv"));
    assert_eq!(
        outputs.removed,
        PathBuf::from("/data/sales_removed_outliers.csv")
    );
}

#[test]
fn test_dedup_defaults_and_keep_strategy() {
    let cli = Cli::parse_from(["sift", "dedup", "-i", "/data/orders.parquet"]);
    let Commands::Dedup(args) = cli.command else {
        panic!("expected dedup subcommand");
    };
    assert_eq!(args.keep, DuplicateKeep::First);
    assert_eq!(args.subset_columns(), None);
    assert_eq!(
        args.output_path(),
        PathBuf::from("/data/orders_deduplicated.parquet")
    );

    let cli = Cli::parse_from([
        "sift", "dedup", "-i", "orders.csv", "--subset", "order_id,line", "--keep", "none",
    ]);
    let Commands::Dedup(args) = cli.command else {
        panic!("expected dedup subcommand");
    };
    assert_eq!(args.keep, DuplicateKeep::DropAll);
    assert_eq!(
        args.subset_columns(),
        Some(&["order_id".to_string(), "line".to_string()][..])
    );

    assert!(Cli::try_parse_from(["sift", "dedup", "-i", "x.csv", "--keep", "middle"]).is_err());
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(Cli::try_parse_from([
        "sift",
        "reduce",
        "-i",
        "d.csv",
        "--correlation-threshold",
        "1.5"
    ])
    .is_err());
    assert!(Cli::try_parse_from([
        "sift",
        "select",
        "-i",
        "d.csv",
        "--correlation-threshold",
        "0"
    ])
    .is_err());
    assert!(
        Cli::try_parse_from(["sift", "outliers", "-i", "d.csv", "--z-threshold", "-2"]).is_err()
    );
    assert!(Cli::try_parse_from(["sift", "reduce"]).is_err());
}

#[test]
fn test_derive_path_without_parent() {
    assert_eq!(
        derive_path(std::path::Path::new("data.csv"), "cleaned"),
        PathBuf::from("data_cleaned.csv")
    );
}

#[test]
fn test_binary_reduce_writes_output_and_report() {
    let mut df = create_redundancy_dataframe();
    let (temp_dir, csv_path) = create_temp_csv(&mut df);
    let report_path = temp_dir.path().join("report.json");

    Command::cargo_bin("sift")
        .unwrap()
        .args(["reduce", "--no-confirm", "-i"])
        .arg(&csv_path)
        .arg("--report")
        .arg(&report_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("REDUCTION SUMMARY"));

    let output = temp_dir.path().join("test_data_reduced.csv");
    let reduced = sift::pipeline::load_table(&output, 100).unwrap();
    assert_eq!(reduced.column_names(), vec!["id", "b", "noise", "segment"]);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["kind"], "redundancy");
    assert_eq!(report["removed"].as_array().unwrap().len(), 3);
}

#[test]
fn test_binary_outliers_writes_three_files() {
    let mut df = create_outlier_dataframe();
    let (temp_dir, csv_path) = create_temp_csv(&mut df);

    Command::cargo_bin("sift")
        .unwrap()
        .args(["outliers", "--no-confirm", "-i"])
        .arg(&csv_path)
        .assert()
        .success();

    let cleaned = sift::pipeline::load_table(&temp_dir.path().join("test_data_cleaned.csv"), 100)
        .unwrap();
    let removed =
        sift::pipeline::load_table(&temp_dir.path().join("test_data_removed_outliers.csv"), 100)
            .unwrap();
    assert_eq!(cleaned.height(), 8);
    assert_eq!(removed.height(), 1);
    assert!(temp_dir
        .path()
        .join("test_data_with_outliers_flag.csv")
        .exists());
}

#[test]
fn test_binary_rejects_unsupported_input() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("data.txt");
    std::fs::write(&path, "a,b\n1,2\n").unwrap();

    Command::cargo_bin("sift")
        .unwrap()
        .args(["select", "--no-confirm", "-i"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn test_binary_dedup_keeps_last_per_subset() {
    let mut df = df! {
        "id" => [1i64, 2, 1, 3, 2],
        "v" => [10.0f64, 20.0, 11.0, 30.0, 25.0],
    }
    .unwrap();
    let (temp_dir, csv_path) = create_temp_csv(&mut df);

    Command::cargo_bin("sift")
        .unwrap()
        .args(["dedup", "--no-confirm", "--subset", "id", "--keep", "last", "-i"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("duplicate row(s) removed"));

    let output = temp_dir.path().join("test_data_deduplicated.csv");
    let deduplicated = sift::pipeline::load_table(&output, 100).unwrap();
    assert_eq!(
        deduplicated.numeric_values("v").unwrap(),
        vec![Some(11.0), Some(30.0), Some(25.0)]
    );
}

#[test]
fn test_binary_dedup_rejects_unknown_subset_column() {
    let mut df = create_redundancy_dataframe();
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    Command::cargo_bin("sift")
        .unwrap()
        .args(["dedup", "--no-confirm", "--subset", "ghost", "-i"])
        .arg(&csv_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn test_binary_no_trace_silences_skipped_pruning_notice() {
    let mut df = df! {
        "id" => [1i64, 2, 3],
        "segment" => ["a", "b", "c"],
    }
    .unwrap();
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    Command::cargo_bin("sift")
        .unwrap()
        .args(["reduce", "--no-confirm", "--no-trace", "-i"])
        .arg(&csv_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipping correlation pruning").not());
}

#[test]
fn test_binary_warns_once_about_unknown_protected_column() {
    let mut df = create_redundancy_dataframe();
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    Command::cargo_bin("sift")
        .unwrap()
        .args(["reduce", "--no-confirm", "--protect", "ghost", "-i"])
        .arg(&csv_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Ignoring protected column(s)").count(1))
        .stdout(predicate::str::contains("not found").not());
}
