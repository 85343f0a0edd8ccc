//! JSON reports of removal traces and outlier diagnostics

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{
    ColumnOutlierDiagnostics, OutlierDetection, OutlierPolicy, RemovedColumn,
};
use crate::report::ReductionSummary;

/// Which column reduction produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionKind {
    Redundancy,
    Subset,
}

/// Report metadata shared by every report kind
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub sift_version: String,
    pub input_file: String,
    pub output_files: Vec<String>,
}

impl ReportMetadata {
    pub fn new(input: &Path, outputs: &[&Path]) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            sift_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input.display().to_string(),
            output_files: outputs.iter().map(|p| p.display().to_string()).collect(),
        }
    }
}

/// Timing information in milliseconds
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimingInfo {
    pub load_ms: u64,
    pub reduction_ms: u64,
    pub save_ms: u64,
    pub total_ms: u64,
}

/// Report of a redundancy reduction or subset selection run
#[derive(Debug, Clone, Serialize)]
pub struct RemovalReport {
    pub metadata: ReportMetadata,
    pub kind: ReductionKind,
    pub correlation_threshold: f64,
    /// Protected (redundancy) or keep-always (subset) columns
    pub protected_columns: Vec<String>,
    pub initial_features: usize,
    pub final_features: usize,
    pub duplicate_rows_removed: usize,
    pub removed: Vec<RemovedColumn>,
    pub timing: TimingInfo,
}

impl RemovalReport {
    pub fn new(
        metadata: ReportMetadata,
        kind: ReductionKind,
        correlation_threshold: f64,
        protected_columns: &[String],
        summary: &ReductionSummary,
    ) -> Self {
        let mut protected_columns = protected_columns.to_vec();
        protected_columns.sort();

        Self {
            metadata,
            kind,
            correlation_threshold,
            protected_columns,
            initial_features: summary.initial_features,
            final_features: summary.final_features,
            duplicate_rows_removed: summary.duplicate_rows_removed,
            removed: summary.removed.clone(),
            timing: TimingInfo {
                load_ms: summary.load_time.as_millis() as u64,
                reduction_ms: summary.reduction_time.as_millis() as u64,
                save_ms: summary.save_time.as_millis() as u64,
                total_ms: summary.total_time().as_millis() as u64,
            },
        }
    }
}

/// Report of an outlier detection run
#[derive(Debug, Clone, Serialize)]
pub struct OutlierReport {
    pub metadata: ReportMetadata,
    pub iqr_multiplier: f64,
    pub z_threshold: f64,
    pub total_rows: usize,
    pub iqr_outliers: usize,
    pub zscore_outliers: usize,
    pub flagged_rows: usize,
    pub flagged_percentage: f64,
    pub columns: Vec<ColumnOutlierDiagnostics>,
}

impl OutlierReport {
    pub fn new(metadata: ReportMetadata, policy: &OutlierPolicy, detection: &OutlierDetection) -> Self {
        Self {
            metadata,
            iqr_multiplier: policy.iqr_multiplier,
            z_threshold: policy.z_threshold,
            total_rows: detection.combined_flags.len(),
            iqr_outliers: detection.iqr_count(),
            zscore_outliers: detection.zscore_count(),
            flagged_rows: detection.outlier_count(),
            flagged_percentage: detection.outlier_percentage(),
            columns: detection.diagnostics.clone(),
        }
    }
}

/// Serialize a report as pretty-printed JSON
pub fn export_report<T: Serialize>(report: &T, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    Ok(())
}
