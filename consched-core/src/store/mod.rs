//! Local event storage.
//!
//! [`EventStore`] is the contract the sync workers consume: ordered,
//! offset/limit-bounded predicate reads and per-record keyed upserts.
//! Implementations are shared across tasks and serialize internally.

mod file;
mod memory;
mod query;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use query::{Collation, Direction, Field, Filter, Order, Query, SortKey};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchedResult;
use crate::event::Event;

/// Bookkeeping written after every successful upsert phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncMetadata {
    pub last_synced: DateTime<Utc>,
    /// Number of events stored after the sync
    pub event_count: usize,
}

/// Keyed store of [`Event`]s.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// First event matching the query after ordering and offset, if any.
    async fn find_one(&self, query: &Query) -> SchedResult<Option<Event>>;

    /// All events matching the query, ordered and paged.
    async fn find_many(&self, query: &Query) -> SchedResult<Vec<Event>>;

    /// Insert the event if its id is unknown, otherwise overwrite it entirely.
    async fn upsert(&self, event: &Event) -> SchedResult<()>;

    async fn count(&self) -> SchedResult<usize>;

    async fn metadata(&self) -> SchedResult<Option<SyncMetadata>>;

    async fn save_metadata(&self, metadata: &SyncMetadata) -> SchedResult<()>;
}
