//! Report module - console summaries and JSON exports

pub mod export;
pub mod summary;

pub use export::*;
pub use summary::*;
