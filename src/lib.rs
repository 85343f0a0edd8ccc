//! sift: feature reduction and outlier detection for tabular data
//!
//! The [`pipeline`] module holds the core: a typed [`pipeline::Table`], redundancy
//! reduction, feature subset selection, and IQR/Z-score outlier detection. The
//! remaining modules make up the `sift` command-line front end.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
