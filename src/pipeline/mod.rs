//! Pipeline module - table model, reduction policies and outlier detection

pub mod correlation;
pub mod duplicates;
pub mod loader;
pub mod outliers;
pub mod policy;
pub mod reasons;
pub mod redundancy;
pub mod stats;
pub mod subset;
pub mod table;

pub use correlation::*;
pub use duplicates::*;
pub use loader::*;
pub use outliers::*;
pub use policy::*;
pub use reasons::*;
pub use redundancy::{reduce_redundancy, RedundancyOutcome};
pub use stats::*;
pub use subset::*;
pub use table::*;
