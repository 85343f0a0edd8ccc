//! Outlier detection and dataset partitioning
//!
//! Rows are scored with two independent criteria per numeric column: IQR fences and
//! Z-scores. A row is an outlier if either criterion flags it in any column.

use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::policy::{OutlierPolicy, OUTLIER_FLAG_COLUMN};
use super::stats::ColumnStatistics;
use super::table::{ColumnKind, Table};

/// Per-column diagnostics, for operator visibility only
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnOutlierDiagnostics {
    pub column: String,
    pub distinct: usize,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    /// Absent when IQR is zero and the column is excluded from the IQR method
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_fence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_fence: Option<f64>,
    pub mean: f64,
    /// Population standard deviation used for Z-scores
    pub std_dev: f64,
    pub iqr_outliers: usize,
    pub zscore_outliers: usize,
}

/// Flags and derived views of an outlier detection pass
#[derive(Debug, Clone)]
pub struct OutlierDetection {
    pub iqr_flags: Vec<bool>,
    pub zscore_flags: Vec<bool>,
    /// Union of the IQR and Z-score flags (and any flag already on the input)
    pub combined_flags: Vec<bool>,
    /// Input table with the `is_outlier` column
    pub flagged: Table,
    /// Rows of `flagged` that are not outliers
    pub clean: Table,
    /// Rows of `flagged` that are outliers
    pub removed: Table,
    pub diagnostics: Vec<ColumnOutlierDiagnostics>,
}

impl OutlierDetection {
    pub fn outlier_count(&self) -> usize {
        count(&self.combined_flags)
    }

    pub fn iqr_count(&self) -> usize {
        count(&self.iqr_flags)
    }

    pub fn zscore_count(&self) -> usize {
        count(&self.zscore_flags)
    }

    /// Share of rows flagged, in percent. Zero for an empty table.
    pub fn outlier_percentage(&self) -> f64 {
        if self.combined_flags.is_empty() {
            0.0
        } else {
            self.outlier_count() as f64 / self.combined_flags.len() as f64 * 100.0
        }
    }
}

/// Flags contributed by a single column
struct ColumnFlags {
    iqr: Vec<bool>,
    zscore: Vec<bool>,
    diagnostics: Option<ColumnOutlierDiagnostics>,
}

/// Detect outlier rows and partition the table into clean and removed views.
///
/// Columns are analysed independently (in parallel) and combined in column order.
/// A column with zero IQR contributes nothing to the IQR method; a column with zero
/// standard deviation contributes nothing to the Z-score method. Missing values are
/// never flagged.
pub fn detect_outliers(table: &Table, policy: &OutlierPolicy) -> Result<OutlierDetection> {
    policy.validate()?;
    let columns = eligible_columns(table, policy);
    let height = table.height();

    let per_column: Vec<ColumnFlags> = columns
        .par_iter()
        .map(|name| -> Result<ColumnFlags> {
            let values = table.numeric_values(name)?;
            Ok(score_column(name, &values, policy))
        })
        .collect::<Result<_>>()?;

    let mut iqr_flags = vec![false; height];
    let mut zscore_flags = vec![false; height];
    let mut diagnostics = Vec::with_capacity(per_column.len());

    for flags in per_column {
        for (acc, flag) in iqr_flags.iter_mut().zip(&flags.iqr) {
            *acc |= *flag;
        }
        for (acc, flag) in zscore_flags.iter_mut().zip(&flags.zscore) {
            *acc |= *flag;
        }
        if let Some(diag) = flags.diagnostics {
            debug!(
                "{}: unique values = {}, IQR = {}",
                diag.column, diag.distinct, diag.iqr
            );
            diagnostics.push(diag);
        }
    }

    let mut combined_flags: Vec<bool> = iqr_flags
        .iter()
        .zip(&zscore_flags)
        .map(|(iqr, z)| *iqr || *z)
        .collect();

    if table.kind(OUTLIER_FLAG_COLUMN) == Some(ColumnKind::Numeric) {
        let previous = table.numeric_values(OUTLIER_FLAG_COLUMN)?;
        for (acc, prev) in combined_flags.iter_mut().zip(previous) {
            *acc |= prev.is_some_and(|v| v != 0.0);
        }
    }

    let flagged = table.with_flag_column(OUTLIER_FLAG_COLUMN, &combined_flags)?;
    let keep: Vec<bool> = combined_flags.iter().map(|f| !f).collect();
    let clean = flagged.filter_rows(&keep)?;
    let removed = flagged.filter_rows(&combined_flags)?;

    info!(
        "Total outliers detected: {} of {} rows (IQR: {}, Z-score: {})",
        count(&combined_flags),
        height,
        count(&iqr_flags),
        count(&zscore_flags)
    );

    Ok(OutlierDetection {
        iqr_flags,
        zscore_flags,
        combined_flags,
        flagged,
        clean,
        removed,
        diagnostics,
    })
}

/// Columns to analyse: the policy's list, or every numeric column.
/// Absent and non-numeric names are skipped with a warning.
fn eligible_columns(table: &Table, policy: &OutlierPolicy) -> Vec<String> {
    let Some(requested) = &policy.columns else {
        return table
            .numeric_columns()
            .into_iter()
            .filter(|name| name != OUTLIER_FLAG_COLUMN && !table.is_boolean(name))
            .collect();
    };

    requested
        .iter()
        .filter(|name| match table.kind(name) {
            None => {
                warn!("Skipping outlier detection for '{}': column not found", name);
                false
            }
            Some(ColumnKind::Categorical) => {
                warn!("Skipping outlier detection for '{}': column is not numeric", name);
                false
            }
            Some(ColumnKind::Numeric) if name.as_str() == OUTLIER_FLAG_COLUMN => {
                warn!("Skipping outlier detection for '{}': reserved flag column", name);
                false
            }
            Some(ColumnKind::Numeric) if table.is_boolean(name) => {
                warn!("Skipping outlier detection for '{}': boolean column", name);
                false
            }
            Some(ColumnKind::Numeric) => true,
        })
        .cloned()
        .collect()
}

fn score_column(name: &str, values: &[Option<f64>], policy: &OutlierPolicy) -> ColumnFlags {
    let Some(stats) = ColumnStatistics::from_values(values) else {
        debug!("{}: no values, skipped", name);
        return ColumnFlags {
            iqr: vec![false; values.len()],
            zscore: vec![false; values.len()],
            diagnostics: None,
        };
    };

    let fences = (stats.iqr > 0.0).then(|| {
        (
            stats.q1 - policy.iqr_multiplier * stats.iqr,
            stats.q3 + policy.iqr_multiplier * stats.iqr,
        )
    });
    let iqr: Vec<bool> = match fences {
        Some((lower, upper)) => values
            .iter()
            .map(|v| v.is_some_and(|x| x < lower || x > upper))
            .collect(),
        None => vec![false; values.len()],
    };

    let sigma = stats.population_std_dev();
    let zscore: Vec<bool> = if sigma > 0.0 {
        values
            .iter()
            .map(|v| v.is_some_and(|x| ((x - stats.mean) / sigma).abs() > policy.z_threshold))
            .collect()
    } else {
        vec![false; values.len()]
    };

    let diagnostics = ColumnOutlierDiagnostics {
        column: name.to_string(),
        distinct: stats.distinct,
        q1: stats.q1,
        q3: stats.q3,
        iqr: stats.iqr,
        lower_fence: fences.map(|(lower, _)| lower),
        upper_fence: fences.map(|(_, upper)| upper),
        mean: stats.mean,
        std_dev: sigma,
        iqr_outliers: count(&iqr),
        zscore_outliers: count(&zscore),
    };

    ColumnFlags {
        iqr,
        zscore,
        diagnostics: Some(diagnostics),
    }
}

fn count(flags: &[bool]) -> usize {
    flags.iter().filter(|f| **f).count()
}
