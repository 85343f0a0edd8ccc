//! Integration tests for duplicate row removal

use polars::prelude::*;
use sift::pipeline::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

/// Rows 0 and 2 are exact duplicates; rows 1 and 4 share an id only
fn orders() -> Table {
    table(df! {
        "id" => [1i64, 2, 1, 3, 2],
        "v" => [10.0f64, 20.0, 10.0, 30.0, 25.0],
        "region" => ["n", "s", "n", "e", "s"],
    }
    .unwrap())
}

fn values(t: &Table) -> Vec<Option<f64>> {
    t.numeric_values("v").unwrap()
}

#[test]
fn test_whole_rows_keep_first() {
    let (deduplicated, removed) =
        remove_duplicate_rows(&orders(), None, DuplicateKeep::First).unwrap();

    assert_eq!(removed, 1);
    assert_eq!(
        values(&deduplicated),
        vec![Some(10.0), Some(20.0), Some(30.0), Some(25.0)]
    );
    assert_eq!(deduplicated.column_names(), vec!["id", "v", "region"]);
}

#[test]
fn test_whole_rows_keep_last_preserves_order() {
    let (deduplicated, removed) =
        remove_duplicate_rows(&orders(), None, DuplicateKeep::Last).unwrap();

    assert_eq!(removed, 1);
    assert_eq!(
        deduplicated.numeric_values("id").unwrap(),
        vec![Some(2.0), Some(1.0), Some(3.0), Some(2.0)]
    );
}

#[test]
fn test_whole_rows_drop_all_duplicates() {
    let (deduplicated, removed) =
        remove_duplicate_rows(&orders(), None, DuplicateKeep::DropAll).unwrap();

    assert_eq!(removed, 2);
    assert_eq!(values(&deduplicated), vec![Some(20.0), Some(30.0), Some(25.0)]);
}

#[test]
fn test_subset_keep_strategies() {
    let subset = vec!["id".to_string()];
    let t = orders();

    let (first, removed) =
        remove_duplicate_rows(&t, Some(subset.as_slice()), DuplicateKeep::First).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(values(&first), vec![Some(10.0), Some(20.0), Some(30.0)]);

    let (last, _) = remove_duplicate_rows(&t, Some(subset.as_slice()), DuplicateKeep::Last).unwrap();
    assert_eq!(values(&last), vec![Some(10.0), Some(30.0), Some(25.0)]);

    let (none, removed) =
        remove_duplicate_rows(&t, Some(subset.as_slice()), DuplicateKeep::DropAll).unwrap();
    assert_eq!(removed, 4);
    assert_eq!(values(&none), vec![Some(30.0)]);
}

#[test]
fn test_empty_subset_compares_whole_rows() {
    let (deduplicated, removed) =
        remove_duplicate_rows(&orders(), Some(&[][..]), DuplicateKeep::First).unwrap();

    assert_eq!(removed, 1);
    assert_eq!(deduplicated.height(), 4);
}

#[test]
fn test_unknown_subset_column_is_an_error() {
    let subset = vec!["id".to_string(), "ghost".to_string()];

    let err = remove_duplicate_rows(&orders(), Some(subset.as_slice()), DuplicateKeep::First)
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<TableError>(),
        Some(TableError::ColumnNotFound(name)) if name == "ghost"
    ));
}

#[test]
fn test_nulls_match_each_other() {
    let t = table(df! {
        "a" => [Some(1.0f64), None, None],
        "b" => [Some("x"), None, None],
    }
    .unwrap());

    let (deduplicated, removed) = remove_duplicate_rows(&t, None, DuplicateKeep::First).unwrap();

    assert_eq!(removed, 1);
    assert_eq!(deduplicated.height(), 2);
}

#[test]
fn test_kinds_survive_deduplication() {
    let t = orders();
    let (deduplicated, _) = remove_duplicate_rows(&t, None, DuplicateKeep::First).unwrap();

    assert_eq!(deduplicated.kind("region"), Some(ColumnKind::Categorical));
    assert_eq!(deduplicated.kind("id"), Some(ColumnKind::Numeric));
}
