//! Snapshot read from a local JSON file.

use std::path::PathBuf;

use tracing::debug;

use crate::data::SnapshotSource;
use crate::domain::Snapshot;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotSource for FileSource {
    fn fetch_snapshot(&mut self) -> Result<Snapshot, AppError> {
        debug!(path = %self.path.display(), "reading snapshot file");
        crate::io::read_snapshot_file(&self.path)
    }
}
