//! Command-line argument definitions using clap

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::pipeline::{
    DuplicateKeep, DEFAULT_IQR_MULTIPLIER, DEFAULT_REDUCTION_THRESHOLD, DEFAULT_SUBSET_THRESHOLD,
    DEFAULT_Z_THRESHOLD,
};

/// sift - Remove redundant features and flag outlier rows in tabular datasets
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Skip interactive confirmation prompts
    #[arg(long, global = true, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, global = true, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Log level for diagnostic events (error, warn, info, debug, trace).
    /// RUST_LOG takes precedence when set.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drop duplicate and highly correlated columns, then duplicate rows
    Reduce(ReduceArgs),

    /// Drop constant columns and correlated continuous features
    Select(SelectArgs),

    /// Flag outlier rows with IQR fences and Z-scores
    Outliers(OutlierArgs),

    /// Drop duplicate rows, optionally compared on a subset of columns
    Dedup(DedupArgs),
}

#[derive(Args, Debug)]
pub struct ReduceArgs {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file path (CSV or Parquet, determined by extension).
    /// Defaults to the input directory with a '_reduced' suffix.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Columns that are never dropped (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub protect: Vec<String>,

    /// Drop one feature from numeric pairs with |correlation| above this value
    #[arg(long, default_value_t = DEFAULT_REDUCTION_THRESHOLD, value_parser = validate_correlation_threshold)]
    pub correlation_threshold: f64,

    /// Do not log the removal trace
    #[arg(long, default_value = "false")]
    pub no_trace: bool,

    /// Write a JSON report of the removals to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl ReduceArgs {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| derive_path(&self.input, "reduced"))
    }
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file path. Defaults to the input directory with a '_selected' suffix.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Columns that are always kept (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub keep: Vec<String>,

    /// Drop one feature from continuous pairs with |correlation| above this value
    #[arg(long, default_value_t = DEFAULT_SUBSET_THRESHOLD, value_parser = validate_correlation_threshold)]
    pub correlation_threshold: f64,

    /// Write a JSON report of the removals to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl SelectArgs {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| derive_path(&self.input, "selected"))
    }
}

#[derive(Args, Debug)]
pub struct OutlierArgs {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Columns to analyse (comma-separated). Defaults to every numeric column.
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// IQR fence multiplier
    #[arg(long, default_value_t = DEFAULT_IQR_MULTIPLIER, value_parser = validate_positive)]
    pub iqr_multiplier: f64,

    /// Absolute Z-score above which a value is an outlier
    #[arg(long, default_value_t = DEFAULT_Z_THRESHOLD, value_parser = validate_positive)]
    pub z_threshold: f64,

    /// Write a JSON report with per-column diagnostics to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Output files of the outlier command, next to the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlierOutputs {
    pub flagged: PathBuf,
    pub cleaned: PathBuf,
    pub removed: PathBuf,
}

impl OutlierArgs {
    pub fn output_paths(&self) -> OutlierOutputs {
        OutlierOutputs {
            flagged: derive_path(&self.input, "with_outliers_flag"),
            cleaned: derive_path(&self.input, "cleaned"),
            removed: derive_path(&self.input, "removed_outliers"),
        }
    }

    /// Requested columns, or `None` to analyse every numeric column
    pub fn requested_columns(&self) -> Option<Vec<String>> {
        (!self.columns.is_empty()).then(|| self.columns.clone())
    }
}

#[derive(Args, Debug)]
pub struct DedupArgs {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file path. Defaults to the input directory with a '_deduplicated' suffix.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Columns that identify a duplicate (comma-separated). Defaults to every column.
    #[arg(long, value_delimiter = ',')]
    pub subset: Vec<String>,

    /// Which row of each duplicate set to keep: "first", "last", or "none" to drop them all
    #[arg(long, default_value = "first")]
    pub keep: DuplicateKeep,
}

impl DedupArgs {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| derive_path(&self.input, "deduplicated"))
    }

    /// Subset columns, or `None` to compare whole rows
    pub fn subset_columns(&self) -> Option<&[String]> {
        (!self.subset.is_empty()).then_some(self.subset.as_slice())
    }
}

/// `<dir>/<stem>_<suffix>.<ext>` for an input path, keeping its extension
pub fn derive_path(input: &Path, suffix: &str) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("parquet");
    parent.join(format!("{}_{}.{}", stem, suffix, extension))
}

/// Validator for correlation thresholds, which must lie in (0, 1]
fn validate_correlation_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "correlation threshold must be in (0, 1], got {}",
            value
        ))
    }
}

/// Validator for strictly positive multipliers and thresholds
fn validate_positive(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("value must be a positive number, got {}", value))
    }
}
