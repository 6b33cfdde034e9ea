//! Local snapshot strategies for the sync worker.

use async_trait::async_trait;

use crate::error::SchedResult;
use crate::store::EventStore;

/// Computes the value a worker emits before and after syncing.
#[async_trait]
pub trait LocalLookup: Send + Sync {
    type Output: Send;

    /// Reject invalid criteria before any I/O happens.
    fn validate(&self) -> SchedResult<()> {
        Ok(())
    }

    async fn lookup(&self, store: &dyn EventStore) -> SchedResult<Self::Output>;
}

/// Number of cached events.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventCount;

#[async_trait]
impl LocalLookup for EventCount {
    type Output = usize;

    async fn lookup(&self, store: &dyn EventStore) -> SchedResult<usize> {
        store.count().await
    }
}
