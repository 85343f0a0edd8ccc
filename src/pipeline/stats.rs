//! Per-column descriptive statistics
//!
//! Statistics are computed on demand from the non-null values of a numeric column
//! and are never stored on the table.

use std::collections::HashMap;

use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;

use super::table::Table;

/// Descriptive statistics of a numeric column (nulls skipped)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub count: usize,
    pub distinct: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: f64,
    /// Sample variance (n - 1 denominator)
    pub variance: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
}

impl ColumnStatistics {
    /// Compute statistics from raw values. Returns `None` when there are no usable values.
    pub fn from_values(values: &[Option<f64>]) -> Option<Self> {
        let mut sorted: Vec<f64> = values
            .iter()
            .flatten()
            .copied()
            .filter(|x| !x.is_nan())
            .collect();

        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let n = count as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let sum_sq_dev: f64 = sorted.iter().map(|x| (x - mean).powi(2)).sum();
        let variance = if count > 1 { sum_sq_dev / (n - 1.0) } else { 0.0 };

        let q1 = quantile_sorted(&sorted, 0.25)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;

        let mut distinct = sorted.clone();
        distinct.dedup();

        Some(Self {
            count,
            distinct: distinct.len(),
            min: sorted[0],
            max: sorted[count - 1],
            mean,
            median: quantile_sorted(&sorted, 0.5)?,
            std_dev: variance.sqrt(),
            variance,
            q1,
            q3,
            iqr: q3 - q1,
        })
    }

    /// Population standard deviation (n denominator), as used for Z-scores
    pub fn population_std_dev(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        (self.variance * (n - 1.0) / n).sqrt()
    }
}

/// Statistics for one column of a table
pub fn column_statistics(table: &Table, column: &str) -> Result<Option<ColumnStatistics>> {
    let values = table.numeric_values(column)?;
    Ok(ColumnStatistics::from_values(&values))
}

/// Statistics for several columns, computed in parallel and returned in input order
pub fn describe_columns(
    table: &Table,
    columns: &[String],
) -> Result<Vec<(String, Option<ColumnStatistics>)>> {
    columns
        .par_iter()
        .map(|name| -> Result<(String, Option<ColumnStatistics>)> {
            Ok((name.clone(), column_statistics(table, name)?))
        })
        .collect()
}

/// Sample variance per column. Columns without values get a variance of zero.
pub fn column_variances(table: &Table, columns: &[String]) -> Result<HashMap<String, f64>> {
    Ok(describe_columns(table, columns)?
        .into_iter()
        .map(|(name, stats)| (name, stats.map(|s| s.variance).unwrap_or(0.0)))
        .collect())
}

/// `p`-th quantile of sorted data using linear interpolation between closest ranks.
///
/// With `h = (n - 1) * p`, `j = floor(h)` and `g = h - j` this returns
/// `(1 - g) * x[j] + g * x[j + 1]`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 || !(0.0..=1.0).contains(&p) {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }

    let h = (n - 1) as f64 * p;
    let j = h.floor() as usize;
    let g = h - h.floor();

    if j + 1 >= n {
        return Some(sorted[n - 1]);
    }
    Some((1.0 - g) * sorted[j] + g * sorted[j + 1])
}
