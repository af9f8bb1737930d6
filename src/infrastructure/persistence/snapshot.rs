//! On-disk snapshot of the whole mapping table.
//!
//! The store is written as a single JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "next_id": 4,
//!   "records": [
//!     { "id": 1, "code": "apple-zulu", "target": "https://example.com", "clicks": 2 }
//!   ]
//! }
//! ```
//!
//! Writes go to a sibling `*.tmp` file which is synced and then renamed over the
//! destination, so a crash mid-write leaves the previous snapshot intact.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::entities::Record;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Owned snapshot as read from disk.
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub next_id: u64,
    #[serde(default)]
    pub records: Vec<Record>,
}

/// Borrowed snapshot used when writing, so the store never clones its rows.
#[derive(Debug, Serialize)]
pub struct SnapshotView<'a> {
    pub version: u32,
    pub next_id: u64,
    pub records: Vec<&'a Record>,
}

impl<'a> SnapshotView<'a> {
    pub fn new(next_id: u64, records: impl IntoIterator<Item = &'a Record>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            next_id,
            records: records.into_iter().collect(),
        }
    }
}

/// Handle to the snapshot file on disk.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Reads and parses the snapshot.
    ///
    /// Returns `Ok(None)` when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// I/O errors are returned as-is; malformed JSON or an unknown format
    /// version is reported as [`io::ErrorKind::InvalidData`].
    pub async fn load(&self) -> io::Result<Option<Snapshot>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let snapshot: Snapshot = serde_json::from_slice(&bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "unsupported snapshot version {} (expected {})",
                    snapshot.version, SNAPSHOT_VERSION
                ),
            ));
        }

        Ok(Some(snapshot))
    }

    /// Creates the directory that will hold the snapshot.
    pub async fn ensure_parent_dir(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent).await,
            _ => Ok(()),
        }
    }

    /// Durably replaces the snapshot on disk.
    ///
    /// # Errors
    ///
    /// Fails only if the new contents did not reach the destination path.
    pub async fn write(&self, view: &SnapshotView<'_>) -> io::Result<()> {
        let bytes = serde_json::to_vec_pretty(view)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let temp_path = self.temp_path();

        if let Err(e) = self.write_temp(&temp_path, &bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        let dir_sync = self.sync_parent_dir().await;
        self.finish_write(dir_sync)
    }

    /// Settles a write whose rename already succeeded.
    ///
    /// The new snapshot is visible from this point on, so a failed directory
    /// sync must not make callers roll back a change that is already on disk.
    fn finish_write(&self, dir_sync: io::Result<()>) -> io::Result<()> {
        if let Err(e) = dir_sync {
            tracing::warn!(
                "Snapshot {} written but directory sync failed: {}",
                self.path.display(),
                e
            );
        }
        Ok(())
    }

    async fn write_temp(&self, temp_path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = fs::File::create(temp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await
    }

    #[cfg(unix)]
    async fn sync_parent_dir(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::File::open(parent).await?.sync_all().await
            }
            _ => Ok(()),
        }
    }

    #[cfg(not(unix))]
    async fn sync_parent_dir(&self) -> io::Result<()> {
        Ok(())
    }
}
