//! Input/output helpers.
//!
//! - snapshot JSON parsing (`snapshot`)
//! - derived-series CSV exports (`export`)

pub mod export;
pub mod snapshot;

pub use export::*;
pub use snapshot::*;
