//! File-backed snapshot cache with a TTL and a remote modification check.
//!
//! Refresh policy:
//! - no cached document: download
//! - cached document younger than the TTL: serve it
//! - otherwise ask the remote for its `Last-Modified` and download only when
//!   it is newer than the stamp saved with the cached copy (an unknown remote
//!   state counts as changed)
//!
//! A failed download falls back to the cached copy when there is one.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::data::SnapshotSource;
use crate::data::timeseries::{Download, RemoteSource};
use crate::domain::Snapshot;
use crate::error::AppError;
use crate::io::parse_snapshot;

pub const DATA_FILE: &str = "timeseries.json";
pub const META_FILE: &str = "meta.json";
pub const DEFAULT_TTL: Duration = Duration::from_secs(3 * 60 * 60);

/// Stamp stored next to the cached document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMeta {
    /// Remote modification time of the cached copy.
    pub last_modified: Option<DateTime<Utc>>,
    /// When the cached copy was last confirmed current.
    pub checked_at: Option<DateTime<Utc>>,
}

/// Where a cached document stands relative to the TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Missing,
    Fresh,
    Expired,
}

pub struct SnapshotCache<R> {
    remote: R,
    dir: PathBuf,
    ttl: Duration,
    offline: bool,
}

impl<R: RemoteSource> SnapshotCache<R> {
    pub fn new(remote: R, dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            remote,
            dir: dir.into(),
            ttl,
            offline: false,
        }
    }

    /// Never touch the network; serve whatever is cached.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn data_path(&self) -> PathBuf {
        self.dir.join(DATA_FILE)
    }

    fn meta_path(&self) -> PathBuf {
        self.dir.join(META_FILE)
    }

    pub fn read_meta(&self) -> CacheMeta {
        fs::read_to_string(self.meta_path())
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    fn write_meta(&self, meta: &CacheMeta) -> Result<(), AppError> {
        let text = serde_json::to_string_pretty(meta)
            .map_err(|e| AppError::new(2, format!("Failed to encode cache metadata: {e}")))?;
        fs::write(self.meta_path(), text)
            .map_err(|e| AppError::new(2, format!("Failed to write cache metadata: {e}")))
    }

    pub fn freshness(&self, now: DateTime<Utc>) -> Freshness {
        if !self.data_path().exists() {
            return Freshness::Missing;
        }
        let Some(checked_at) = self.read_meta().checked_at else {
            return Freshness::Expired;
        };
        match (now - checked_at).to_std() {
            Ok(age) if age < self.ttl => Freshness::Fresh,
            // A stamp from the future means the clock moved; treat as fresh.
            Err(_) => Freshness::Fresh,
            Ok(_) => Freshness::Expired,
        }
    }

    /// Whether the remote has something newer than the cached copy.
    fn remote_changed(&self) -> bool {
        let local = self.read_meta().last_modified;
        match (self.remote.last_modified(), local) {
            (Ok(Some(remote)), Some(local)) => {
                debug!(%remote, %local, "remote modification check");
                remote > local
            }
            (Ok(_), _) => true,
            (Err(e), _) => {
                warn!(error = %e, "remote check failed; refreshing");
                true
            }
        }
    }

    /// Load a snapshot using `now` as the current time.
    pub fn load_at(&mut self, now: DateTime<Utc>) -> Result<Snapshot, AppError> {
        let freshness = self.freshness(now);
        debug!(?freshness, dir = %self.dir.display(), "snapshot cache state");

        if self.offline {
            if freshness == Freshness::Missing {
                return Err(AppError::new(
                    2,
                    format!("No cached snapshot in '{}' and offline mode is on.", self.dir.display()),
                ));
            }
            return self.read_cached();
        }

        let download = match freshness {
            Freshness::Fresh => false,
            Freshness::Missing => true,
            Freshness::Expired => self.remote_changed(),
        };

        if !download {
            if freshness == Freshness::Expired {
                // Unchanged upstream: restart the TTL so the next load skips the check.
                let mut meta = self.read_meta();
                meta.checked_at = Some(now);
                if let Err(e) = self.write_meta(&meta) {
                    warn!(error = %e, "could not update cache metadata");
                }
            }
            info!("serving cached snapshot");
            return self.read_cached();
        }

        // An unparsable body (proxy error page, truncated transfer) is a failed download.
        let fetched = self.remote.download().and_then(|fetched| {
            let snapshot = parse_snapshot(&fetched.body)?;
            Ok((fetched, snapshot))
        });

        match fetched {
            Ok((fetched, snapshot)) => {
                self.store(&fetched, now)?;
                Ok(snapshot)
            }
            Err(e) if freshness != Freshness::Missing => {
                warn!(error = %e, "download failed; serving cached snapshot");
                self.read_cached()
            }
            Err(e) => Err(e),
        }
    }

    fn read_cached(&self) -> Result<Snapshot, AppError> {
        crate::io::read_snapshot_file(&self.data_path())
    }

    /// Write the document via a temp file, then stamp it.
    fn store(&self, fetched: &Download, now: DateTime<Utc>) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::new(2, format!("Failed to create cache dir '{}': {e}", self.dir.display()))
        })?;

        let dest = self.data_path();
        let tmp = dest.with_extension("json.tmp");
        let result = fs::write(&tmp, &fetched.body).and_then(|_| fs::rename(&tmp, &dest));
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(AppError::new(2, format!("Failed to write cache '{}': {e}", dest.display())));
        }

        self.write_meta(&CacheMeta {
            last_modified: fetched.last_modified,
            checked_at: Some(now),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl<R: RemoteSource> SnapshotSource for SnapshotCache<R> {
    fn fetch_snapshot(&mut self) -> Result<Snapshot, AppError> {
        self.load_at(Utc::now())
    }
}
