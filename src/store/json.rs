//! File-backed record store with one JSON array per collection.
//!
//! Every mutation rewrites the whole collection: serialize, write to a
//! per-write `<collection>.json.<uuid>.tmp`, then rename over
//! `<collection>.json`. A failed write leaves the previous file in place, and
//! readers only ever see a complete file.
//!
//! There is no locking. Two interleaved read-modify-write calls on the same
//! collection race, and the later rename wins.

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;

/// A record that can live in a [`RecordStore`].
pub trait StoredRecord: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Stable external handle, unique within the collection.
    fn id(&self) -> Uuid;
}

/// Newest-first JSON collection of `T`.
#[derive(Debug, Clone)]
pub struct RecordStore<T> {
    collection: String,
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T: StoredRecord> RecordStore<T> {
    /// Store for `collection`, backed by `<data_dir>/<collection>.json`.
    pub fn new(data_dir: &Path, collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            path: data_dir.join(format!("{collection}.json")),
            _records: PhantomData,
        }
    }

    /// Current persisted records, newest first.
    ///
    /// Creates the backing file as `[]` on first access.
    pub async fn list(&self) -> Result<Vec<T>, StoreError> {
        self.ensure_file().await?;
        let raw = fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.io_err(e))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|e| self.serde_err(e))
    }

    /// Insert `record` at the front and persist the collection.
    pub async fn append(&self, record: T) -> Result<T, StoreError> {
        let mut records = self.list().await?;
        records.insert(0, record.clone());
        self.write_all(&records).await?;
        debug!(
            collection = %self.collection,
            id = %record.id(),
            total = records.len(),
            "Record appended"
        );
        Ok(record)
    }

    /// Apply `patch` to the record with `id` and persist.
    ///
    /// Nothing is written when the id is unknown.
    pub async fn find_and_update<F>(&self, id: Uuid, patch: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut T),
    {
        let mut records = self.list().await?;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: self.collection.clone(),
                id: id.to_string(),
            })?;
        patch(record);
        let updated = record.clone();
        self.write_all(&records).await?;
        debug!(collection = %self.collection, id = %id, "Record updated");
        Ok(updated)
    }

    /// Create the backing file as `[]` unless it exists.
    ///
    /// Never truncates an existing collection, even when two first accesses
    /// race. An empty file seen mid-creation reads as `[]`.
    async fn ensure_file(&self) -> Result<(), StoreError> {
        if fs::try_exists(&self.path)
            .await
            .map_err(|e| self.io_err(e))?
        {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_err(e))?;
        }

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await
        {
            Ok(mut file) => {
                debug!(collection = %self.collection, path = %self.path.display(), "Creating empty collection");
                file.write_all(b"[]").await.map_err(|e| self.io_err(e))?;
                file.flush().await.map_err(|e| self.io_err(e))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }

    async fn write_all(&self, records: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records).map_err(|e| self.serde_err(e))?;
        let tmp = self.tmp_path();

        if let Err(e) = fs::write(&tmp, json).await {
            fs::remove_file(&tmp).await.ok();
            return Err(self.io_err(e));
        }
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            fs::remove_file(&tmp).await.ok();
            return Err(self.io_err(e));
        }
        Ok(())
    }

    /// Unique per write; concurrent writers never share a temp file.
    fn tmp_path(&self) -> PathBuf {
        self.path
            .with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()))
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            collection: self.collection.clone(),
            source,
        }
    }

    fn serde_err(&self, source: serde_json::Error) -> StoreError {
        StoreError::Serialization {
            collection: self.collection.clone(),
            source,
        }
    }
}
