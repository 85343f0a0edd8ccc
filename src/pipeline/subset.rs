//! Feature subset selection: constant columns and continuous-only correlation pruning
//!
//! A stricter alternative to [`reduce_redundancy`](super::reduce_redundancy): no
//! duplicate-column step and no row deduplication, and binary 0/1 indicators are
//! exempt from correlation pruning.

use anyhow::Result;
use tracing::{debug, info};

use super::policy::SubsetPolicy;
use super::reasons::{removed_names, RemovalReason, RemovedColumn};
use super::redundancy::{known_columns, prune_correlated};
use super::table::Table;

/// Tolerance for floating point comparison when checking binary 0/1 values
const TOLERANCE: f64 = 1e-9;

/// Result of a feature subset selection pass
#[derive(Debug, Clone)]
pub struct SubsetOutcome {
    pub table: Table,
    pub reasons: Vec<RemovedColumn>,
}

/// Reduce a table to a non-constant, non-redundant continuous feature subset.
///
/// Step A drops every column with at most one distinct non-null value. Step B prunes
/// correlated pairs among continuous numeric columns with the same rule as
/// redundancy reduction, treating `keep_always` as the protected set.
pub fn select_feature_subset(table: &Table, policy: &SubsetPolicy) -> Result<SubsetOutcome> {
    policy.validate()?;
    let keep = known_columns(table, &policy.keep_always, "keep-always");

    let mut reasons = Vec::new();
    for name in table.column_names() {
        if !keep.contains(&name) && table.distinct_count(&name)? <= 1 {
            reasons.push(RemovedColumn::new(name, RemovalReason::Constant));
        }
    }
    if !reasons.is_empty() {
        info!(
            "Removed constant columns ({}): {:?}",
            reasons.len(),
            removed_names(&reasons)
        );
    }

    let work = table.drop_columns(&removed_names(&reasons));
    let continuous = continuous_columns(&work)?;
    debug!("Continuous numeric columns: {:?}", continuous);

    let correlation_drops =
        prune_correlated(&work, &continuous, policy.correlation_threshold, &keep)?;
    if !correlation_drops.is_empty() {
        info!(
            "Removed highly correlated columns ({}): {:?}",
            correlation_drops.len(),
            removed_names(&correlation_drops)
        );
    }

    let reduced = work.drop_columns(&removed_names(&correlation_drops));
    reasons.extend(correlation_drops);

    info!(
        "Feature subset selection complete: {} -> {} features",
        table.width(),
        reduced.width()
    );

    Ok(SubsetOutcome {
        table: reduced,
        reasons,
    })
}

/// Numeric columns that are not binary 0/1 indicators, in table order
pub fn continuous_columns(table: &Table) -> Result<Vec<String>> {
    let mut continuous = Vec::new();
    for name in table.numeric_columns() {
        if !is_binary(&table.numeric_values(&name)?) {
            continuous.push(name);
        }
    }
    Ok(continuous)
}

/// Whether every non-null value is 0 or 1. A column without values is not binary.
pub fn is_binary(values: &[Option<f64>]) -> bool {
    let mut present = values.iter().flatten().peekable();
    if present.peek().is_none() {
        return false;
    }
    present.all(|&v| v.abs() < TOLERANCE || (v - 1.0).abs() < TOLERANCE)
}
