//! Schema-checked table wrapper around a polars DataFrame
//!
//! Every column's kind is decided once, at construction, and never re-inferred by
//! the reduction or outlier steps. All transformations return a new `Table`.

use std::collections::HashSet;
use std::fmt;

use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

/// Declared kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Primitive numeric or boolean (booleans are treated as 0/1)
    Numeric,
    /// Text, categorical, temporal, or numeric codes declared as labels
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Errors raised while building or querying a `Table`
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    #[error("Column '{column}' was declared {declared} but has dtype {dtype}")]
    KindMismatch {
        column: String,
        declared: ColumnKind,
        dtype: String,
    },

    #[error("Column '{column}' has unsupported dtype {dtype}")]
    UnsupportedType { column: String, dtype: String },

    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),

    #[error("Row mask has {actual} entries but the table has {expected} rows")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// In-memory table with an explicit column schema
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
    kinds: Vec<(String, ColumnKind)>,
}

impl Table {
    /// Build a table, inferring each column's kind from its dtype.
    ///
    /// Primitive numeric and boolean dtypes become `Numeric`; nested dtypes are rejected;
    /// everything else becomes `Categorical`.
    pub fn new(df: DataFrame) -> Result<Self, TableError> {
        let kinds = df
            .get_columns()
            .iter()
            .map(|col| {
                let name = col.name().to_string();
                infer_kind(&name, col.dtype()).map(|kind| (name, kind))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { df, kinds })
    }

    /// Build a table with caller-declared kinds for some columns.
    ///
    /// Undeclared columns are inferred as in [`Table::new`]. Declaring `Numeric` over a
    /// non-numeric dtype is an error; declaring `Categorical` over a numeric dtype is allowed
    /// and removes the column from all numeric analysis.
    pub fn with_kinds(df: DataFrame, declared: &[(&str, ColumnKind)]) -> Result<Self, TableError> {
        let mut table = Self::new(df)?;

        for (name, kind) in declared {
            let dtype = table
                .df
                .column(name)
                .map_err(|_| TableError::ColumnNotFound(name.to_string()))?
                .dtype()
                .clone();

            if *kind == ColumnKind::Numeric && !is_numeric_dtype(&dtype) {
                return Err(TableError::KindMismatch {
                    column: name.to_string(),
                    declared: *kind,
                    dtype: dtype.to_string(),
                });
            }

            if let Some(entry) = table.kinds.iter_mut().find(|(n, _)| n == name) {
                entry.1 = *kind;
            }
        }

        Ok(table)
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_dataframe(self) -> DataFrame {
        self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.kinds.len()
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<String> {
        self.kinds.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.iter().any(|(n, _)| n == name)
    }

    pub fn kind(&self, name: &str) -> Option<ColumnKind> {
        self.kinds
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, kind)| *kind)
    }

    /// Names of numeric columns in table order
    pub fn numeric_columns(&self) -> Vec<String> {
        self.kinds
            .iter()
            .filter(|(_, kind)| *kind == ColumnKind::Numeric)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Values of a numeric column as `f64`, nulls preserved as `None`.
    ///
    /// NaN is treated as missing.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>, TableError> {
        match self.kind(name) {
            None => return Err(TableError::ColumnNotFound(name.to_string())),
            Some(ColumnKind::Categorical) => return Err(TableError::NotNumeric(name.to_string())),
            Some(ColumnKind::Numeric) => {}
        }

        let col = self.df.column(name)?.cast(&DataType::Float64)?;
        let values = col
            .f64()?
            .iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();

        Ok(values)
    }

    /// Whether two columns hold the same kind and identical values in every row.
    /// Nulls compare equal to nulls.
    pub fn columns_equal(&self, a: &str, b: &str) -> Result<bool, TableError> {
        let kind_a = self
            .kind(a)
            .ok_or_else(|| TableError::ColumnNotFound(a.to_string()))?;
        let kind_b = self
            .kind(b)
            .ok_or_else(|| TableError::ColumnNotFound(b.to_string()))?;

        if kind_a != kind_b {
            return Ok(false);
        }

        let col_a = self.df.column(a)?;
        let col_b = self.df.column(b)?;
        if col_a.null_count() != col_b.null_count() {
            return Ok(false);
        }

        match kind_a {
            ColumnKind::Numeric => {
                let (dtype_a, dtype_b) = (col_a.dtype(), col_b.dtype());
                if dtype_a == dtype_b && !dtype_a.is_float() {
                    return Ok(col_a
                        .as_materialized_series()
                        .equals_missing(col_b.as_materialized_series()));
                }

                // Mixed dtypes compare as f64, which is only exact below 2^53
                let values_a = self.numeric_values(a)?;
                let values_b = self.numeric_values(b)?;
                Ok(exact_as_f64(dtype_a, &values_a)
                    && exact_as_f64(dtype_b, &values_b)
                    && values_a == values_b)
            }
            ColumnKind::Categorical => {
                let s_a = col_a.cast(&DataType::String)?;
                let s_b = col_b.cast(&DataType::String)?;
                Ok(s_a.str()?.iter().eq(s_b.str()?.iter()))
            }
        }
    }

    /// Number of distinct non-null values in a column
    pub fn distinct_count(&self, name: &str) -> Result<usize, TableError> {
        match self.kind(name) {
            None => Err(TableError::ColumnNotFound(name.to_string())),
            Some(ColumnKind::Numeric) => {
                let mut values: Vec<f64> = self.numeric_values(name)?.into_iter().flatten().collect();
                values.sort_by(|a, b| a.total_cmp(b));
                values.dedup();
                Ok(values.len())
            }
            Some(ColumnKind::Categorical) => {
                let col = self.df.column(name)?.cast(&DataType::String)?;
                let distinct: HashSet<&str> = col.str()?.iter().flatten().collect();
                Ok(distinct.len())
            }
        }
    }

    /// New table without the named columns. Unknown names are ignored.
    pub fn drop_columns(&self, names: &[String]) -> Table {
        if names.is_empty() {
            return self.clone();
        }

        let df = self.df.drop_many(names);
        let kinds = self
            .kinds
            .iter()
            .filter(|(name, _)| !names.contains(name))
            .cloned()
            .collect();

        Table { df, kinds }
    }

    /// New table with only the rows where `mask` is true
    pub fn filter_rows(&self, mask: &[bool]) -> Result<Table, TableError> {
        if mask.len() != self.height() {
            return Err(TableError::LengthMismatch {
                expected: self.height(),
                actual: mask.len(),
            });
        }

        let mask = BooleanChunked::from_slice("mask".into(), mask);
        Ok(Table {
            df: self.df.filter(&mask)?,
            kinds: self.kinds.clone(),
        })
    }

    /// New table with a boolean column appended, or replaced if the name already exists
    pub fn with_flag_column(&self, name: &str, flags: &[bool]) -> Result<Table, TableError> {
        if flags.len() != self.height() {
            return Err(TableError::LengthMismatch {
                expected: self.height(),
                actual: flags.len(),
            });
        }

        let mut df = self.df.clone();
        df.with_column(Column::new(name.into(), flags.to_vec()))?;

        let mut kinds = self.kinds.clone();
        match kinds.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = ColumnKind::Numeric,
            None => kinds.push((name.to_string(), ColumnKind::Numeric)),
        }

        Ok(Table { df, kinds })
    }

    /// Whether a column holds a boolean dtype
    pub fn is_boolean(&self, name: &str) -> bool {
        self.df
            .column(name)
            .is_ok_and(|col| matches!(col.dtype(), DataType::Boolean))
    }

    /// New table with duplicate rows removed, surviving rows kept in their original order.
    ///
    /// Rows are compared on `subset` when given, otherwise on every column.
    pub fn unique_rows(
        &self,
        subset: Option<&[String]>,
        keep: DuplicateKeep,
    ) -> Result<Table, TableError> {
        let subset = match subset {
            Some(names) if !names.is_empty() => {
                if let Some(missing) = names.iter().find(|n| !self.contains(n)) {
                    return Err(TableError::ColumnNotFound(missing.clone()));
                }
                Some(names.iter().map(|n| n.as_str().into()).collect())
            }
            _ => None,
        };

        let df = self
            .df
            .clone()
            .lazy()
            .unique_stable(subset, keep.into())
            .collect()?;

        Ok(Table {
            df,
            kinds: self.kinds.clone(),
        })
    }
}

/// Which row of a duplicate set survives deduplication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeep {
    #[default]
    First,
    Last,
    /// Every row that has a duplicate is removed
    DropAll,
}

impl fmt::Display for DuplicateKeep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateKeep::First => write!(f, "first"),
            DuplicateKeep::Last => write!(f, "last"),
            DuplicateKeep::DropAll => write!(f, "none"),
        }
    }
}

impl std::str::FromStr for DuplicateKeep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(DuplicateKeep::First),
            "last" => Ok(DuplicateKeep::Last),
            "none" | "drop-all" => Ok(DuplicateKeep::DropAll),
            _ => Err(format!(
                "Unknown keep strategy: '{}'. Use 'first', 'last' or 'none'.",
                s
            )),
        }
    }
}

impl From<DuplicateKeep> for UniqueKeepStrategy {
    fn from(keep: DuplicateKeep) -> Self {
        match keep {
            DuplicateKeep::First => UniqueKeepStrategy::First,
            DuplicateKeep::Last => UniqueKeepStrategy::Last,
            DuplicateKeep::DropAll => UniqueKeepStrategy::None,
        }
    }
}

/// Largest magnitude below which every integer is exactly representable as f64
const MAX_EXACT_F64_INTEGER: f64 = 9_007_199_254_740_992.0;

fn exact_as_f64(dtype: &DataType, values: &[Option<f64>]) -> bool {
    dtype.is_float()
        || values
            .iter()
            .flatten()
            .all(|x| x.abs() < MAX_EXACT_F64_INTEGER)
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    dtype.is_primitive_numeric() || matches!(dtype, DataType::Boolean)
}

fn infer_kind(name: &str, dtype: &DataType) -> Result<ColumnKind, TableError> {
    if is_numeric_dtype(dtype) {
        Ok(ColumnKind::Numeric)
    } else if dtype.is_nested() {
        Err(TableError::UnsupportedType {
            column: name.to_string(),
            dtype: dtype.to_string(),
        })
    } else {
        Ok(ColumnKind::Categorical)
    }
}
