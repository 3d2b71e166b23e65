//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - metric and view selectors (`Metric`, `ViewKind`, `ChartKind`)
//! - the input snapshot (`DailyRecord`, `EntitySeries`, `Snapshot`)
//! - engine outputs (`DerivedSeries`, `RankedEntity`, `RankedRate`)
//! - the table of tracked countries (`Country`)

pub mod country;
pub mod types;

pub use country::*;
pub use types::*;
