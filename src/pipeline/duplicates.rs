//! Exact duplicate detection for columns and rows

use std::collections::HashSet;

use anyhow::Result;
use tracing::debug;

use super::reasons::{RemovalReason, RemovedColumn};
use super::table::{DuplicateKeep, Table};

/// Group columns whose values are identical in every row.
///
/// Only groups with at least two members are returned. Members appear in column order,
/// and groups are ordered by their first member.
pub fn find_duplicate_column_groups(table: &Table) -> Result<Vec<Vec<String>>> {
    let columns = table.column_names();
    let mut assigned = vec![false; columns.len()];
    let mut groups = Vec::new();

    for i in 0..columns.len() {
        if assigned[i] {
            continue;
        }

        let mut group = vec![columns[i].clone()];
        for j in (i + 1)..columns.len() {
            if !assigned[j] && table.columns_equal(&columns[i], &columns[j])? {
                assigned[j] = true;
                group.push(columns[j].clone());
            }
        }

        if group.len() > 1 {
            groups.push(group);
        }
    }

    Ok(groups)
}

/// Pick the columns to drop from each duplicate group.
///
/// The keeper is the first protected member, or the first member when none is protected.
/// Every other unprotected member is dropped; protected members are never dropped.
pub fn select_duplicates_to_drop(
    groups: &[Vec<String>],
    protected: &HashSet<String>,
) -> Vec<RemovedColumn> {
    let mut removed = Vec::new();

    for group in groups {
        let keeper = group
            .iter()
            .find(|c| protected.contains(*c))
            .unwrap_or(&group[0]);

        for member in group {
            if member != keeper && !protected.contains(member) {
                removed.push(RemovedColumn::new(
                    member.clone(),
                    RemovalReason::ExactDuplicate { of: keeper.clone() },
                ));
            }
        }
    }

    removed
}

/// Remove duplicate rows, compared on `subset` or on every column.
///
/// `keep` decides which row of each duplicate set survives. Surviving rows keep their
/// original order. Returns the new table and the number of rows removed.
pub fn remove_duplicate_rows(
    table: &Table,
    subset: Option<&[String]>,
    keep: DuplicateKeep,
) -> Result<(Table, usize)> {
    let before = table.height();
    let unique = table.unique_rows(subset, keep)?;
    debug!("Removed {} duplicate rows ({:?})", before - unique.height(), keep);
    let removed = before - unique.height();
    Ok((unique, removed))
}
