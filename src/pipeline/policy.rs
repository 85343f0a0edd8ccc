//! Named policies for the reduction and outlier steps
//!
//! Every threshold and exemption set is passed explicitly; nothing is read from
//! process-wide state.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

/// Default correlation threshold for [`ReductionPolicy`]
pub const DEFAULT_REDUCTION_THRESHOLD: f64 = 0.98;

/// Default correlation threshold for [`SubsetPolicy`]
pub const DEFAULT_SUBSET_THRESHOLD: f64 = 0.95;

/// Default IQR fence multiplier
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Default absolute Z-score above which a value is an outlier
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Name of the flag column appended by outlier detection
pub const OUTLIER_FLAG_COLUMN: &str = "is_outlier";

/// Errors that can occur during policy validation.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid threshold for '{field}': {value} (must be in (0, 1])")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid value for '{field}': {value} (must be a positive finite number)")]
    InvalidMultiplier { field: String, value: f64 },
}

/// Redundancy reduction: exact duplicate columns, correlation pruning, duplicate rows
#[derive(Debug, Clone, Serialize)]
pub struct ReductionPolicy {
    /// Columns that are never dropped
    pub protected_columns: HashSet<String>,
    /// Pairs with absolute correlation strictly above this value are pruned
    pub correlation_threshold: f64,
    /// Emit the removal trace as log events
    pub log_enabled: bool,
}

impl Default for ReductionPolicy {
    fn default() -> Self {
        Self {
            protected_columns: HashSet::new(),
            correlation_threshold: DEFAULT_REDUCTION_THRESHOLD,
            log_enabled: true,
        }
    }
}

impl ReductionPolicy {
    pub fn new<I, S>(protected: I, correlation_threshold: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected_columns: protected.into_iter().map(Into::into).collect(),
            correlation_threshold,
            ..Default::default()
        }
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_enabled = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold("correlation_threshold", self.correlation_threshold)
    }
}

/// Feature subset selection: constant columns, continuous-only correlation pruning
#[derive(Debug, Clone, Serialize)]
pub struct SubsetPolicy {
    /// Columns that are never dropped
    pub keep_always: HashSet<String>,
    /// Pairs with absolute correlation strictly above this value are pruned
    pub correlation_threshold: f64,
}

impl Default for SubsetPolicy {
    fn default() -> Self {
        Self {
            keep_always: HashSet::new(),
            correlation_threshold: DEFAULT_SUBSET_THRESHOLD,
        }
    }
}

impl SubsetPolicy {
    pub fn new<I, S>(keep_always: I, correlation_threshold: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keep_always: keep_always.into_iter().map(Into::into).collect(),
            correlation_threshold,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold("correlation_threshold", self.correlation_threshold)
    }
}

/// Outlier detection: IQR fences and Z-scores, combined by union
#[derive(Debug, Clone, Serialize)]
pub struct OutlierPolicy {
    /// Columns to analyse; `None` analyses every numeric column
    pub columns: Option<Vec<String>>,
    /// Fences are `Q1 - k * IQR` and `Q3 + k * IQR`
    pub iqr_multiplier: f64,
    /// Values with `|z|` strictly above this are outliers
    pub z_threshold: f64,
}

impl Default for OutlierPolicy {
    fn default() -> Self {
        Self {
            columns: None,
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
            z_threshold: DEFAULT_Z_THRESHOLD,
        }
    }
}

impl OutlierPolicy {
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_positive("iqr_multiplier", self.iqr_multiplier)?;
        validate_positive("z_threshold", self.z_threshold)
    }
}

fn validate_threshold(field: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold {
            field: field.to_string(),
            value,
        })
    }
}

fn validate_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidMultiplier {
            field: field.to_string(),
            value,
        })
    }
}
