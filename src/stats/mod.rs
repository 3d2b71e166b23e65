//! Time-series aggregation engine.
//!
//! Responsibilities:
//!
//! - turn cumulative counters into non-negative daily deltas (`normalize`)
//! - trailing averages with a partial warm-up window (`rolling`)
//! - per-million rescaling and the display threshold (`per_capita`)
//! - top-N selection by latest value (`ranking`) and by mortality (`mortality`)
//! - orchestrate the named views requested by callers (`assemble`)
//!
//! Everything here is a pure function of an immutable `Snapshot`; no I/O.

pub mod assemble;
pub mod mortality;
pub mod normalize;
pub mod per_capita;
pub mod ranking;
pub mod rolling;

pub use assemble::*;
pub use mortality::*;
pub use normalize::*;
pub use per_capita::*;
pub use ranking::*;
pub use rolling::*;
