//! File-backed implementation of the mapping store.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::snapshot::{Snapshot, SnapshotFile, SnapshotView};
use crate::domain::entities::{LinkStats, Record};
use crate::domain::repositories::MappingStore;
use crate::error::AppError;

/// In-memory table mirrored to disk.
///
/// `records` holds every row, pending placeholders included, ordered by id.
/// `index` only contains finalized codes.
#[derive(Debug)]
struct StoreState {
    records: BTreeMap<u64, Record>,
    index: HashMap<String, u64>,
    next_id: u64,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            index: HashMap::new(),
            next_id: 1,
        }
    }
}

impl StoreState {
    /// Rebuilds the table from a snapshot.
    ///
    /// Placeholders left behind by an interrupted sequence allocation are
    /// dropped, but their ids stay burned.
    fn from_snapshot(snapshot: Snapshot) -> io::Result<Self> {
        let mut state = StoreState::default();
        let mut max_id = 0;
        let mut dropped = 0usize;

        for record in snapshot.records {
            max_id = max_id.max(record.id);

            if record.is_pending() {
                dropped += 1;
                continue;
            }

            if state.records.contains_key(&record.id) {
                return Err(invalid_data(format!("duplicate record id {}", record.id)));
            }
            if state.index.insert(record.code.clone(), record.id).is_some() {
                return Err(invalid_data(format!("duplicate short code '{}'", record.code)));
            }
            state.records.insert(record.id, record);
        }

        if dropped > 0 {
            warn!("Dropped {} unfinished placeholder record(s) from snapshot", dropped);
        }

        state.next_id = snapshot.next_id.max(max_id + 1).max(1);
        Ok(state)
    }

    fn view(&self) -> SnapshotView<'_> {
        SnapshotView::new(self.next_id, self.records.values())
    }

    fn insert(&mut self, record: Record) {
        if !record.is_pending() {
            self.index.insert(record.code.clone(), record.id);
        }
        self.records.insert(record.id, record);
    }

    fn remove(&mut self, id: u64) -> Option<Record> {
        let record = self.records.remove(&id)?;
        if !record.is_pending() {
            self.index.remove(&record.code);
        }
        Some(record)
    }

    fn find(&self, code: &str) -> Option<&Record> {
        self.index.get(code).and_then(|id| self.records.get(id))
    }
}

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

/// Mapping store that keeps the whole table in memory and rewrites a JSON
/// snapshot after every mutation.
///
/// All mutations are serialized by a single writer lock that is held until
/// the snapshot has been flushed. Reads share the lock with each other but
/// never observe a mutation whose flush is still in flight. If a flush fails,
/// the in-memory change is undone before the error is returned.
#[derive(Debug)]
pub struct FileMappingStore {
    file: SnapshotFile,
    state: RwLock<StoreState>,
}

impl FileMappingStore {
    /// Opens the store at `path`, loading the snapshot if one exists.
    ///
    /// A missing snapshot creates an empty store and persists it immediately,
    /// creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::PersistenceFailure`] if the snapshot cannot be read,
    /// is malformed, or the initial empty snapshot cannot be written.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let file = SnapshotFile::new(path);

        match file.load().await.map_err(AppError::PersistenceFailure)? {
            Some(snapshot) => {
                let state =
                    StoreState::from_snapshot(snapshot).map_err(AppError::PersistenceFailure)?;
                info!(
                    "Loaded {} record(s) from {} (next id {})",
                    state.index.len(),
                    file.path().display(),
                    state.next_id
                );
                Ok(Self {
                    file,
                    state: RwLock::new(state),
                })
            }
            None => {
                file.ensure_parent_dir()
                    .await
                    .map_err(AppError::PersistenceFailure)?;

                let store = Self {
                    file,
                    state: RwLock::new(StoreState::default()),
                };
                {
                    let state = store.state.read().await;
                    store.flush(&state).await?;
                }
                info!("Created empty store at {}", store.file.path().display());
                Ok(store)
            }
        }
    }

    /// Opens an existing snapshot without ever creating one.
    ///
    /// Used by read-only tooling, where a mistyped path must not leave an
    /// empty store behind.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::PersistenceFailure`] with [`io::ErrorKind::NotFound`]
    /// if the file does not exist, or if it cannot be read or parsed.
    pub async fn load_existing(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let file = SnapshotFile::new(path);

        let snapshot = file
            .load()
            .await
            .map_err(AppError::PersistenceFailure)?
            .ok_or_else(|| {
                AppError::PersistenceFailure(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no snapshot at {}", file.path().display()),
                ))
            })?;

        let state = StoreState::from_snapshot(snapshot).map_err(AppError::PersistenceFailure)?;

        Ok(Self {
            file,
            state: RwLock::new(state),
        })
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Next sequence id the store will hand out.
    pub async fn next_id(&self) -> u64 {
        self.state.read().await.next_id
    }

    async fn flush(&self, state: &StoreState) -> Result<(), AppError> {
        self.file.write(&state.view()).await.map_err(|e| {
            metrics::counter!("store_flush_failures_total").increment(1);
            error!("Failed to flush store to {}: {}", self.file.path().display(), e);
            AppError::PersistenceFailure(e)
        })
    }
}

fn require_code(code: &str) -> Result<(), AppError> {
    if code.is_empty() {
        return Err(AppError::invalid_input("Short code must not be empty"));
    }
    Ok(())
}

#[async_trait]
impl MappingStore for FileMappingStore {
    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.state.read().await.index.contains_key(code))
    }

    async fn create_if_absent(&self, target: &str, code: &str) -> Result<Record, AppError> {
        require_code(code)?;

        let mut state = self.state.write().await;

        if state.index.contains_key(code) {
            return Err(AppError::DuplicateCode {
                code: code.to_string(),
            });
        }

        let id = state.next_id;
        let record = Record::new(id, code, target);
        state.next_id += 1;
        state.insert(record.clone());

        if let Err(e) = self.flush(&state).await {
            state.remove(id);
            state.next_id = id;
            return Err(e);
        }

        debug!("Stored record {} with code {}", id, code);
        Ok(record)
    }

    async fn create_with_sequence(&self, target: &str) -> Result<(u64, Record), AppError> {
        let mut state = self.state.write().await;

        let id = state.next_id;
        let record = Record::pending(id, target);
        state.next_id += 1;
        state.insert(record.clone());

        if let Err(e) = self.flush(&state).await {
            state.remove(id);
            state.next_id = id;
            return Err(e);
        }

        debug!("Reserved sequence id {}", id);
        Ok((id, record))
    }

    async fn update_code(&self, id: u64, code: &str) -> Result<Record, AppError> {
        require_code(code)?;

        let mut state = self.state.write().await;

        match state.records.get(&id) {
            None => return Err(AppError::not_found(format!("#{id}"))),
            Some(record) if !record.is_pending() => {
                return Err(AppError::invalid_input(format!(
                    "Record {id} already has a short code"
                )));
            }
            Some(_) => {}
        }

        if state.index.contains_key(code) {
            return Err(AppError::DuplicateCode {
                code: code.to_string(),
            });
        }

        let record = match state.records.get_mut(&id) {
            Some(record) => {
                record.code = code.to_string();
                record.clone()
            }
            None => return Err(AppError::not_found(format!("#{id}"))),
        };
        state.index.insert(code.to_string(), id);

        if let Err(e) = self.flush(&state).await {
            state.index.remove(code);
            if let Some(record) = state.records.get_mut(&id) {
                record.code.clear();
            }
            return Err(e);
        }

        debug!("Finalized record {} with code {}", id, code);
        Ok(record)
    }

    async fn discard_pending(&self, id: u64) -> Result<(), AppError> {
        let mut state = self.state.write().await;

        match state.records.get(&id) {
            None => return Err(AppError::not_found(format!("#{id}"))),
            Some(record) if !record.is_pending() => {
                return Err(AppError::invalid_input(format!(
                    "Record {id} is finalized and cannot be removed"
                )));
            }
            Some(_) => {}
        }

        let removed = state.remove(id);

        if let Err(e) = self.flush(&state).await {
            if let Some(record) = removed {
                state.insert(record);
            }
            return Err(e);
        }

        debug!("Discarded placeholder {}", id);
        Ok(())
    }

    async fn lookup_and_touch(&self, code: &str) -> Result<Record, AppError> {
        let mut state = self.state.write().await;

        let id = *state
            .index
            .get(code)
            .ok_or_else(|| AppError::not_found(code))?;

        let record = match state.records.get_mut(&id) {
            Some(record) => {
                record.clicks += 1;
                record.clone()
            }
            None => {
                return Err(AppError::internal(format!(
                    "Index points at missing record {id}"
                )));
            }
        };

        if let Err(e) = self.flush(&state).await {
            if let Some(record) = state.records.get_mut(&id) {
                record.clicks -= 1;
            }
            return Err(e);
        }

        Ok(record)
    }

    async fn get_stats(&self, code: &str) -> Result<LinkStats, AppError> {
        self.state
            .read()
            .await
            .find(code)
            .map(Record::stats)
            .ok_or_else(|| AppError::not_found(code))
    }

    async fn count(&self) -> usize {
        self.state.read().await.index.len()
    }

    async fn list(&self) -> Vec<Record> {
        self.state
            .read()
            .await
            .records
            .values()
            .filter(|r| !r.is_pending())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::snapshot::SNAPSHOT_VERSION;

    fn snapshot(next_id: u64, records: Vec<Record>) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            next_id,
            records,
        }
    }

    #[test]
    fn test_from_snapshot_builds_index() {
        let state = StoreState::from_snapshot(snapshot(
            3,
            vec![
                Record::new(1, "a", "https://a.com"),
                Record::new(2, "b", "https://b.com"),
            ],
        ))
        .unwrap();

        assert_eq!(state.index.len(), 2);
        assert_eq!(state.find("b").unwrap().target, "https://b.com");
        assert_eq!(state.next_id, 3);
    }

    #[test]
    fn test_from_snapshot_drops_pending_but_keeps_id_burned() {
        let state = StoreState::from_snapshot(snapshot(
            1,
            vec![
                Record::new(1, "a", "https://a.com"),
                Record::pending(5, "https://pending.com"),
            ],
        ))
        .unwrap();

        assert_eq!(state.records.len(), 1);
        assert_eq!(state.next_id, 6);
    }

    #[test]
    fn test_from_snapshot_rejects_duplicate_codes() {
        let result = StoreState::from_snapshot(snapshot(
            3,
            vec![
                Record::new(1, "same", "https://a.com"),
                Record::new(2, "same", "https://b.com"),
            ],
        ));

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_from_snapshot_rejects_duplicate_ids() {
        let result = StoreState::from_snapshot(snapshot(
            3,
            vec![
                Record::new(1, "a", "https://a.com"),
                Record::new(1, "b", "https://b.com"),
            ],
        ));

        assert!(result.is_err());
    }

    #[test]
    fn test_empty_state_starts_at_one() {
        let state = StoreState::from_snapshot(snapshot(0, vec![])).unwrap();
        assert_eq!(state.next_id, 1);
    }
}
