//! Collaborators around the engine: where snapshots and populations come from,
//! and what each user picked.

pub mod cache;
pub mod file;
pub mod population;
pub mod prefs;
pub mod timeseries;

pub use cache::*;
pub use file::*;
pub use population::*;
pub use prefs::*;
pub use timeseries::*;

use crate::domain::Snapshot;
use crate::error::AppError;

/// Anything that can hand out a complete snapshot.
pub trait SnapshotSource {
    fn fetch_snapshot(&mut self) -> Result<Snapshot, AppError>;
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for Box<S> {
    fn fetch_snapshot(&mut self) -> Result<Snapshot, AppError> {
        (**self).fetch_snapshot()
    }
}
