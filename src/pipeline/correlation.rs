//! Correlation analysis and correlation-based pruning

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use faer::Mat;
use rayon::prelude::*;
use serde::Serialize;

use super::table::Table;

/// Represents a correlated pair of features.
/// `feature1` always precedes `feature2` in table column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelatedPair {
    pub feature1: String,
    pub feature2: String,
    pub correlation: f64,
}

/// A column dropped by correlation pruning, with the column it was resolved against
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationDrop {
    pub dropped: String,
    pub kept: String,
    pub correlation: f64,
}

/// Symmetric matrix of Pearson coefficients over numeric columns.
///
/// Undefined coefficients (zero-variance column, fewer than two complete observations)
/// are stored as NaN. The diagonal is 1.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Mat<f64>,
}

/// Threshold for auto-selecting matrix vs pairwise correlation computation.
/// Matrix multiplication is more efficient when there are many columns.
const MATRIX_METHOD_COLUMN_THRESHOLD: usize = 15;

impl CorrelationMatrix {
    /// Compute correlations using the cheaper method for the data.
    ///
    /// The matrix method is used for 15 or more columns when no column has missing
    /// values; otherwise pairs are computed individually on complete observations.
    pub fn compute(table: &Table, columns: &[String]) -> Result<Self> {
        let data = extract_columns(table, columns)?;
        let complete = data.iter().all(|values| values.iter().all(Option::is_some));

        if columns.len() >= MATRIX_METHOD_COLUMN_THRESHOLD && complete {
            Ok(Self::from_matrix(columns, &data))
        } else {
            Ok(Self::from_pairs(columns, &data))
        }
    }

    /// Compute every pair individually, in parallel with Rayon
    pub fn pairwise(table: &Table, columns: &[String]) -> Result<Self> {
        let data = extract_columns(table, columns)?;
        Ok(Self::from_pairs(columns, &data))
    }

    /// Compute all coefficients at once as `Z^T * Z` over standardized columns.
    ///
    /// Missing values contribute zero after standardization, so results only match
    /// the pairwise method for complete columns.
    pub fn matrix(table: &Table, columns: &[String]) -> Result<Self> {
        let data = extract_columns(table, columns)?;
        Ok(Self::from_matrix(columns, &data))
    }

    fn from_pairs(columns: &[String], data: &[Vec<Option<f64>>]) -> Self {
        let n = columns.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();

        let coefficients: Vec<(usize, usize, f64)> = pairs
            .par_iter()
            .map(|&(i, j)| {
                let r = pearson_correlation(&data[i], &data[j]).unwrap_or(f64::NAN);
                (i, j, r)
            })
            .collect();

        let mut values = Mat::<f64>::zeros(n, n);
        for i in 0..n {
            values[(i, i)] = 1.0;
        }
        for (i, j, r) in coefficients {
            values[(i, j)] = r;
            values[(j, i)] = r;
        }

        Self {
            columns: columns.to_vec(),
            values,
        }
    }

    fn from_matrix(columns: &[String], data: &[Vec<Option<f64>>]) -> Self {
        let n = columns.len();
        let mut values = Mat::<f64>::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                values[(i, j)] = if i == j { 1.0 } else { f64::NAN };
            }
        }

        let standardized: Vec<Option<Vec<f64>>> = data.par_iter().map(|v| standardize(v)).collect();
        let valid: Vec<(usize, &Vec<f64>)> = standardized
            .iter()
            .enumerate()
            .filter_map(|(i, col)| col.as_ref().map(|v| (i, v)))
            .collect();

        let n_rows = data.first().map(Vec::len).unwrap_or(0);
        if valid.len() >= 2 && n_rows > 0 {
            // Build the standardized data matrix Z (n_rows x n_valid)
            let mut z = Mat::<f64>::zeros(n_rows, valid.len());
            for (col_idx, (_, col_data)) in valid.iter().enumerate() {
                for (row_idx, &val) in col_data.iter().enumerate() {
                    z[(row_idx, col_idx)] = val;
                }
            }

            let product = z.transpose() * &z;

            // Copy the upper triangle to both halves so the result is exactly symmetric
            for a in 0..valid.len() {
                for b in (a + 1)..valid.len() {
                    let r = product[(a, b)].clamp(-1.0, 1.0);
                    let (i, j) = (valid[a].0, valid[b].0);
                    values[(i, j)] = r;
                    values[(j, i)] = r;
                }
            }
        }

        Self {
            columns: columns.to_vec(),
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Coefficient between two named columns, `None` if either is absent
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[(i, j)])
    }

    /// Pairs whose absolute correlation strictly exceeds `threshold`.
    ///
    /// Pairs are listed column-major over the upper triangle: for each column, every
    /// earlier column in order. NaN coefficients never qualify.
    pub fn correlated_pairs(&self, threshold: f64) -> Vec<CorrelatedPair> {
        let n = self.columns.len();
        let mut pairs = Vec::new();

        for j in 0..n {
            for i in 0..j {
                let corr = self.values[(i, j)];
                if !corr.is_nan() && corr.abs() > threshold {
                    pairs.push(CorrelatedPair {
                        feature1: self.columns[i].clone(),
                        feature2: self.columns[j].clone(),
                        correlation: corr,
                    });
                }
            }
        }

        pairs
    }
}

fn extract_columns(table: &Table, columns: &[String]) -> Result<Vec<Vec<Option<f64>>>> {
    columns
        .par_iter()
        .map(|name| -> Result<Vec<Option<f64>>> { Ok(table.numeric_values(name)?) })
        .collect()
}

/// Scale a complete column to `(x - mean) / (std * sqrt(n))` so that `Z^T * Z`
/// yields Pearson coefficients. `None` for constant or empty columns.
fn standardize(values: &[Option<f64>]) -> Option<Vec<f64>> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }

    let mean = present.iter().sum::<f64>() / present.len() as f64;
    let sum_sq_dev: f64 = present.iter().map(|x| (x - mean).powi(2)).sum();

    let norm = sum_sq_dev.sqrt();
    if norm == 0.0 {
        return None;
    }

    Some(
        values
            .iter()
            .map(|v| v.map(|x| (x - mean) / norm).unwrap_or(0.0))
            .collect(),
    )
}

/// Pearson correlation over complete observations using Welford's algorithm
///
/// Single pass for numerical stability. Rows where either value is missing are skipped.
/// Returns `None` with fewer than two complete observations or a zero-variance input.
pub fn pearson_correlation(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    if x.len() != y.len() {
        return None;
    }

    let mut n = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (a, b) in x.iter().zip(y.iter()) {
        if let (Some(a), Some(b)) = (a, b) {
            n += 1.0;
            let dx = a - mean_x;
            let dy = b - mean_y;
            mean_x += dx / n;
            mean_y += dy / n;
            var_x += dx * (a - mean_x);
            var_y += dy * (b - mean_y);
            cov_xy += dx * (b - mean_y);
        }
    }

    if n < 2.0 || var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov_xy / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Decide which column of each correlated pair to drop.
///
/// Pairs are resolved in the order given:
/// - both members protected: the pair is skipped
/// - one member protected: the other is dropped
/// - otherwise the member with the smaller variance is dropped; on a tie the earlier
///   column (`feature1`) is dropped
///
/// A pair whose member has already been dropped is skipped.
pub fn resolve_correlated_pairs(
    pairs: &[CorrelatedPair],
    variances: &HashMap<String, f64>,
    protected: &HashSet<String>,
) -> Vec<CorrelationDrop> {
    let mut drops = Vec::new();
    let mut already_resolved: HashSet<&str> = HashSet::new();

    for pair in pairs {
        let (a, b) = (&pair.feature1, &pair.feature2);
        if already_resolved.contains(a.as_str()) || already_resolved.contains(b.as_str()) {
            continue;
        }

        let (dropped, kept) = match (protected.contains(a), protected.contains(b)) {
            (true, true) => continue,
            (true, false) => (b, a),
            (false, true) => (a, b),
            (false, false) => {
                let var_a = variances.get(a).copied().unwrap_or(0.0);
                let var_b = variances.get(b).copied().unwrap_or(0.0);
                if var_b < var_a {
                    (b, a)
                } else {
                    (a, b)
                }
            }
        };

        already_resolved.insert(dropped.as_str());
        drops.push(CorrelationDrop {
            dropped: dropped.clone(),
            kept: kept.clone(),
            correlation: pair.correlation,
        });
    }

    drops
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_skips_incomplete_rows() {
        let x = [Some(1.0), Some(2.0), None, Some(4.0)];
        let y = [Some(2.0), Some(4.0), Some(100.0), Some(8.0)];
        let r = pearson_correlation(&x, &y).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_constant_is_undefined() {
        let x = [Some(3.0), Some(3.0), Some(3.0)];
        let y = [Some(1.0), Some(2.0), Some(3.0)];
        assert!(pearson_correlation(&x, &y).is_none());
    }

    #[test]
    fn test_pearson_needs_two_observations() {
        assert!(pearson_correlation(&[Some(1.0)], &[Some(2.0)]).is_none());
    }

    #[test]
    fn test_standardize_constant_column() {
        assert!(standardize(&[Some(2.0), Some(2.0)]).is_none());
    }
}
