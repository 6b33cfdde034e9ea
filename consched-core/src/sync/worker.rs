//! The sync-and-query orchestrator.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use super::emission::{Emitter, Subscriber};
use super::lookup::LocalLookup;
use crate::error::{SchedError, SchedResult};
use crate::event::Event;
use crate::remote::ScheduleEndpoint;
use crate::store::{EventStore, SyncMetadata};
use crate::transform::Transformer;
use crate::wire::WireEvent;

/// How far a sync cycle got.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// `Next` values delivered (0, 1 or 2)
    pub emitted: usize,
    /// Wire records received, if the fetch succeeded
    pub fetched: Option<usize>,
    pub upserted: usize,
    pub completed: bool,
    /// Class of the terminal error, if any
    pub error_kind: Option<&'static str>,
}

/// Looks up local data, syncs the store with the remote schedule, then looks
/// up again.
///
/// Emits the cached result first and the refreshed result second, then
/// completes. Any failure ends the stream with a single error.
pub struct SyncWorker<L: LocalLookup> {
    store: Arc<dyn EventStore>,
    endpoint: Arc<dyn ScheduleEndpoint>,
    transformer: Arc<dyn Transformer<WireEvent, Event>>,
    lookup: L,
    cancel: Option<CancellationToken>,
    deadline: Option<Duration>,
}

impl<L: LocalLookup> SyncWorker<L> {
    pub fn new(
        store: Arc<dyn EventStore>,
        endpoint: Arc<dyn ScheduleEndpoint>,
        transformer: Arc<dyn Transformer<WireEvent, Event>>,
        lookup: L,
    ) -> Self {
        SyncWorker {
            store,
            endpoint,
            transformer,
            lookup,
            cancel: None,
            deadline: None,
        }
    }

    /// Abort between steps (or during the fetch) once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Bound the remote fetch.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Run one sync cycle, pushing results to `subscriber`.
    pub async fn run<S>(self, subscriber: &mut S) -> SyncReport
    where
        S: Subscriber<L::Output> + ?Sized,
    {
        let mut emitter = Emitter::new(subscriber);
        let mut report = SyncReport::default();

        let result = self.sync(&mut emitter, &mut report).await;
        report.emitted = emitter.emitted();

        match result {
            Ok(()) => {
                report.completed = true;
                emitter.complete();
            }
            Err(error) => {
                tracing::warn!(%error, "sync failed");
                report.error_kind = Some(error.kind());
                emitter.error(error);
            }
        }

        report
    }

    async fn sync<S>(
        &self,
        emitter: &mut Emitter<'_, L::Output, S>,
        report: &mut SyncReport,
    ) -> SchedResult<()>
    where
        S: Subscriber<L::Output> + ?Sized,
    {
        self.lookup.validate()?;

        self.check_cancelled()?;
        let stale = self.lookup.lookup(self.store.as_ref()).await?;
        tracing::debug!("emitting cached result");
        emitter.next(stale);

        self.check_cancelled()?;
        let records = self.fetch().await?;
        report.fetched = Some(records.len());

        self.check_cancelled()?;
        // All-or-nothing: a single bad record leaves the store untouched
        let events = self.transformer.bulk_transform(records)?;

        self.check_cancelled()?;
        self.save_local(&events, report).await?;

        let fresh = self.lookup.lookup(self.store.as_ref()).await?;
        tracing::debug!("emitting refreshed result");
        emitter.next(fresh);

        Ok(())
    }

    async fn fetch(&self) -> SchedResult<Vec<WireEvent>> {
        let request = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout(deadline, self.endpoint.get_schedule())
                    .await
                    .map_err(|_| {
                        SchedError::Transport(format!(
                            "Schedule request timed out after {}",
                            humantime::format_duration(deadline)
                        ))
                    })?,
                None => self.endpoint.get_schedule().await,
            }
        };

        match &self.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(SchedError::Cancelled),
                result = request => result,
            },
            None => request.await,
        }
    }

    /// Upsert every event in order. A failure stops the loop; earlier
    /// upserts stay.
    async fn save_local(&self, events: &[Event], report: &mut SyncReport) -> SchedResult<()> {
        for event in events {
            self.store.upsert(event).await?;
            report.upserted += 1;
        }

        let metadata = SyncMetadata {
            last_synced: Utc::now(),
            event_count: self.store.count().await?,
        };
        self.store.save_metadata(&metadata).await?;

        tracing::info!(
            upserted = events.len(),
            total = metadata.event_count,
            "schedule synced"
        );

        Ok(())
    }

    fn check_cancelled(&self) -> SchedResult<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(SchedError::Cancelled),
            _ => Ok(()),
        }
    }
}
