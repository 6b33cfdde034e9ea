//! In-memory event store for tests and ephemeral usage.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{EventStore, Query, SyncMetadata};
use crate::error::SchedResult;
use crate::event::Event;

#[derive(Debug, Default)]
struct Inner {
    events: BTreeMap<String, Event>,
    metadata: Option<SyncMetadata>,
}

/// Events held in an `Arc<RwLock<..>>`; lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `events` (later duplicates win).
    pub fn with_events(events: impl IntoIterator<Item = Event>) -> Self {
        let events = events.into_iter().map(|e| (e.id.clone(), e)).collect();
        MemoryStore {
            inner: Arc::new(RwLock::new(Inner {
                events,
                metadata: None,
            })),
        }
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn find_one(&self, query: &Query) -> SchedResult<Option<Event>> {
        let inner = self.inner.read().await;
        let query = query.clone().limit(1);
        Ok(query.apply(inner.events.values()).into_iter().next())
    }

    async fn find_many(&self, query: &Query) -> SchedResult<Vec<Event>> {
        let inner = self.inner.read().await;
        Ok(query.apply(inner.events.values()))
    }

    async fn upsert(&self, event: &Event) -> SchedResult<()> {
        let mut inner = self.inner.write().await;
        inner.events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn count(&self) -> SchedResult<usize> {
        Ok(self.inner.read().await.events.len())
    }

    async fn metadata(&self) -> SchedResult<Option<SyncMetadata>> {
        Ok(self.inner.read().await.metadata.clone())
    }

    async fn save_metadata(&self, metadata: &SyncMetadata) -> SchedResult<()> {
        self.inner.write().await.metadata = Some(metadata.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::fixtures::{at, event};
    use crate::store::{Filter, Order, SortKey};

    #[tokio::test]
    async fn test_upsert_inserts_then_overwrites() {
        let store = MemoryStore::new();

        store.upsert(&event("1", "Old name", at(10))).await.unwrap();
        store.upsert(&event("1", "New name", at(11))).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let found = store.find_one(&Query::by_id("1")).await.unwrap().unwrap();
        assert_eq!(found.name, "New name");
        assert_eq!(found.start, at(11));
    }

    #[tokio::test]
    async fn test_find_one_honours_offset() {
        let store = MemoryStore::with_events([
            event("1", "A", at(9)),
            event("2", "B", at(10)),
            event("3", "C", at(11)),
        ]);

        let query = Query::new(Filter::StartsAfter(at(9)))
            .order_by(Order::asc(SortKey::Start))
            .offset(1);
        let found = store.find_one(&query).await.unwrap();

        assert_eq!(found.map(|e| e.id), Some("3".to_string()));
    }

    #[tokio::test]
    async fn test_find_one_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.find_one(&Query::by_id("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();

        other.upsert(&event("1", "A", at(9))).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }
}
