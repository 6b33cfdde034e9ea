//! File-backed event store.
//!
//! Layout inside the data directory:
//! - `events.json`: map of event id to event
//! - `metadata.json`: last [`SyncMetadata`]
//!
//! The whole map is kept in memory and written through on every upsert.
//! Each upsert rewrites all of `events.json`, so a sync of N events writes
//! O(N²) bytes. Upserts stay per record so a failure leaves earlier records
//! on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::{EventStore, Query, SyncMetadata};
use crate::error::{SchedError, SchedResult};
use crate::event::Event;

const EVENTS_FILE: &str = "events.json";
const METADATA_FILE: &str = "metadata.json";

#[derive(Debug)]
struct Inner {
    events: BTreeMap<String, Event>,
    metadata: Option<SyncMetadata>,
}

#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    inner: Mutex<Inner>,
}

impl FileStore {
    /// Open (or lazily create) a store rooted at `dir`.
    ///
    /// Missing files mean an empty store; unreadable or corrupt files are a
    /// storage error.
    pub async fn open(dir: impl Into<PathBuf>) -> SchedResult<Self> {
        let dir = dir.into();

        let events = read_json::<BTreeMap<String, Event>>(&dir.join(EVENTS_FILE))
            .await?
            .unwrap_or_default();
        let metadata = read_json::<SyncMetadata>(&dir.join(METADATA_FILE)).await?;

        tracing::debug!(path = %dir.display(), events = events.len(), "opened file store");

        Ok(FileStore {
            dir,
            inner: Mutex::new(Inner { events, metadata }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl EventStore for FileStore {
    async fn find_one(&self, query: &Query) -> SchedResult<Option<Event>> {
        let inner = self.inner.lock().await;
        let query = query.clone().limit(1);
        Ok(query.apply(inner.events.values()).into_iter().next())
    }

    async fn find_many(&self, query: &Query) -> SchedResult<Vec<Event>> {
        let inner = self.inner.lock().await;
        Ok(query.apply(inner.events.values()))
    }

    async fn upsert(&self, event: &Event) -> SchedResult<()> {
        let mut inner = self.inner.lock().await;

        let previous = inner.events.insert(event.id.clone(), event.clone());
        if let Err(e) = write_json(&self.dir, EVENTS_FILE, &inner.events).await {
            // Keep memory consistent with disk
            match previous {
                Some(old) => inner.events.insert(event.id.clone(), old),
                None => inner.events.remove(&event.id),
            };
            return Err(e);
        }

        Ok(())
    }

    async fn count(&self) -> SchedResult<usize> {
        Ok(self.inner.lock().await.events.len())
    }

    async fn metadata(&self) -> SchedResult<Option<SyncMetadata>> {
        Ok(self.inner.lock().await.metadata.clone())
    }

    async fn save_metadata(&self, metadata: &SyncMetadata) -> SchedResult<()> {
        let mut inner = self.inner.lock().await;
        write_json(&self.dir, METADATA_FILE, metadata).await?;
        inner.metadata = Some(metadata.clone());
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> SchedResult<Option<T>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(SchedError::Storage(format!(
                "Could not read {}: {e}",
                path.display()
            )));
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| SchedError::Storage(format!("Corrupt {}: {e}", path.display())))
}

/// Write `value` to `dir/name` via a temp file and rename.
async fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> SchedResult<()> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| SchedError::Serialization(e.to_string()))?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| SchedError::Storage(format!("Could not create {}: {e}", dir.display())))?;

    let path = dir.join(name);
    let tmp = dir.join(format!(".{name}.tmp"));

    tokio::fs::write(&tmp, content)
        .await
        .map_err(|e| SchedError::Storage(format!("Could not write {}: {e}", tmp.display())))?;
    tokio::fs::rename(&tmp, &path)
        .await
        .map_err(|e| SchedError::Storage(format!("Could not write {}: {e}", path.display())))?;

    Ok(())
}
