//! Removal trace shared by the column-pruning steps

use std::fmt;

use serde::Serialize;

/// Why a column was removed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemovalReason {
    ExactDuplicate { of: String },
    HighlyCorrelated { with: String, correlation: f64 },
    Constant,
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalReason::ExactDuplicate { of } => {
                write!(f, "Exact duplicate of another column ('{}')", of)
            }
            RemovalReason::HighlyCorrelated { with, correlation } => {
                write!(f, "Highly correlated with '{}' (corr={:.3})", with, correlation)
            }
            RemovalReason::Constant => write!(f, "Constant column (at most one distinct value)"),
        }
    }
}

/// One entry of the removal trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemovedColumn {
    pub column: String,
    pub reason: RemovalReason,
}

impl RemovedColumn {
    pub fn new(column: impl Into<String>, reason: RemovalReason) -> Self {
        Self {
            column: column.into(),
            reason,
        }
    }
}

/// Names of the removed columns, in trace order
pub fn removed_names(trace: &[RemovedColumn]) -> Vec<String> {
    trace.iter().map(|r| r.column.clone()).collect()
}
