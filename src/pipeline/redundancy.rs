//! Redundancy reduction: exact duplicate columns, correlation pruning, duplicate rows

use std::collections::HashSet;

use anyhow::Result;
use tracing::{debug, info, warn};

use super::correlation::{resolve_correlated_pairs, CorrelationMatrix};
use super::duplicates::{find_duplicate_column_groups, remove_duplicate_rows, select_duplicates_to_drop};
use super::policy::ReductionPolicy;
use super::reasons::{removed_names, RemovalReason, RemovedColumn};
use super::stats::column_variances;
use super::table::{DuplicateKeep, Table};

/// Result of a redundancy reduction pass
#[derive(Debug, Clone)]
pub struct RedundancyOutcome {
    pub table: Table,
    /// Every dropped column exactly once, in the order it was decided
    pub reasons: Vec<RemovedColumn>,
    pub duplicate_rows_removed: usize,
}

impl RedundancyOutcome {
    pub fn duplicate_drops(&self) -> Vec<String> {
        self.reasons
            .iter()
            .filter(|r| matches!(r.reason, RemovalReason::ExactDuplicate { .. }))
            .map(|r| r.column.clone())
            .collect()
    }

    pub fn correlation_drops(&self) -> Vec<String> {
        self.reasons
            .iter()
            .filter(|r| matches!(r.reason, RemovalReason::HighlyCorrelated { .. }))
            .map(|r| r.column.clone())
            .collect()
    }
}

/// Remove columns that carry no independent information.
///
/// 1. Exact duplicate columns: one keeper per group, protected members never dropped.
/// 2. Correlation pruning over the remaining numeric columns (see
///    [`resolve_correlated_pairs`]).
/// 3. All drops applied in one batch, then exact duplicate rows removed.
pub fn reduce_redundancy(table: &Table, policy: &ReductionPolicy) -> Result<RedundancyOutcome> {
    policy.validate()?;
    let protected = known_columns(table, &policy.protected_columns, "protected");

    let groups = find_duplicate_column_groups(table)?;
    let mut reasons = select_duplicates_to_drop(&groups, &protected);
    if policy.log_enabled && !reasons.is_empty() {
        info!(
            "Removed exact duplicate columns ({}): {:?}",
            reasons.len(),
            removed_names(&reasons)
        );
    }

    let deduplicated = table.drop_columns(&removed_names(&reasons));
    let correlation_drops = prune_correlated(
        &deduplicated,
        &deduplicated.numeric_columns(),
        policy.correlation_threshold,
        &protected,
    )?;
    if policy.log_enabled && !correlation_drops.is_empty() {
        info!(
            "Removed highly correlated columns ({}): {:?}",
            correlation_drops.len(),
            removed_names(&correlation_drops)
        );
    }
    reasons.extend(correlation_drops);

    let reduced = table.drop_columns(&removed_names(&reasons));
    let (reduced, duplicate_rows_removed) =
        remove_duplicate_rows(&reduced, None, DuplicateKeep::First)?;

    if policy.log_enabled {
        if duplicate_rows_removed > 0 {
            info!("Removed {} duplicate rows", duplicate_rows_removed);
        }
        info!(
            "Redundancy reduction complete: {} -> {} features",
            table.width(),
            reduced.width()
        );
        for removed in &reasons {
            info!(" - {}: {}", removed.column, removed.reason);
        }
    }

    Ok(RedundancyOutcome {
        table: reduced,
        reasons,
        duplicate_rows_removed,
    })
}

/// Correlation pruning over `columns`, shared by both reduction policies.
///
/// Fewer than two columns skips the step.
pub(crate) fn prune_correlated(
    table: &Table,
    columns: &[String],
    threshold: f64,
    protected: &HashSet<String>,
) -> Result<Vec<RemovedColumn>> {
    if columns.len() < 2 {
        debug!(
            "Skipping correlation pruning: {} eligible numeric column(s), need at least 2",
            columns.len()
        );
        return Ok(Vec::new());
    }

    let matrix = CorrelationMatrix::compute(table, columns)?;
    let pairs = matrix.correlated_pairs(threshold);
    debug!(
        "Analyzed {} columns, found {} pairs above {:.3}",
        columns.len(),
        pairs.len(),
        threshold
    );
    if pairs.is_empty() {
        return Ok(Vec::new());
    }

    let variances = column_variances(table, columns)?;
    let drops = resolve_correlated_pairs(&pairs, &variances, protected)
        .into_iter()
        .map(|drop| {
            RemovedColumn::new(
                drop.dropped,
                RemovalReason::HighlyCorrelated {
                    with: drop.kept,
                    correlation: drop.correlation,
                },
            )
        })
        .collect();

    Ok(drops)
}

/// Keep only names present in the table, warning about the rest
pub(crate) fn known_columns(table: &Table, names: &HashSet<String>, role: &str) -> HashSet<String> {
    let mut unknown: Vec<&String> = names.iter().filter(|n| !table.contains(n)).collect();
    if !unknown.is_empty() {
        unknown.sort();
        warn!("Ignoring {} column(s) not found in table: {:?}", role, unknown);
    }

    names
        .iter()
        .filter(|n| table.contains(n))
        .cloned()
        .collect()
}
