//! Reporting utilities: ranking tables, entity summaries and number formatting.

pub mod format;

pub use format::*;
