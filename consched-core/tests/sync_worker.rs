//! End-to-end behaviour of the sync workers against an in-memory store and a
//! scripted endpoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use consched_core::error::{SchedError, SchedResult};
use consched_core::event::Event;
use consched_core::remote::ScheduleEndpoint;
use consched_core::store::{EventStore, MemoryStore, Query, SyncMetadata};
use consched_core::sync::{
    AllEventsMatching, CollectingSubscriber, Emission, EventCount, SyncWorker, TagCriteria,
    UpcomingByTag, channel,
};
use consched_core::transform::EventTransformer;
use consched_core::wire::WireEvent;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Test doubles
// ============================================================================

enum Script {
    Records(Vec<WireEvent>),
    Fail,
    Hang,
}

struct ScriptedEndpoint {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedEndpoint {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(ScriptedEndpoint {
            script,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScheduleEndpoint for ScriptedEndpoint {
    async fn get_schedule(&self) -> SchedResult<Vec<WireEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Records(records) => Ok(records.clone()),
            Script::Fail => Err(SchedError::Transport("connection refused".into())),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Vec::new())
            }
        }
    }
}

/// Counts every call and can be told to fail reads or the Nth upsert.
#[derive(Default)]
struct InstrumentedStore {
    inner: MemoryStore,
    calls: AtomicUsize,
    upserts: AtomicUsize,
    fail_reads: bool,
    fail_upsert_at: Option<usize>,
}

impl InstrumentedStore {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn read(&self) -> SchedResult<()> {
        self.touch();
        if self.fail_reads {
            return Err(SchedError::Storage("disk unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl EventStore for InstrumentedStore {
    async fn find_one(&self, query: &Query) -> SchedResult<Option<Event>> {
        self.read()?;
        self.inner.find_one(query).await
    }

    async fn find_many(&self, query: &Query) -> SchedResult<Vec<Event>> {
        self.read()?;
        self.inner.find_many(query).await
    }

    async fn upsert(&self, event: &Event) -> SchedResult<()> {
        self.touch();
        let n = self.upserts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_upsert_at == Some(n) {
            return Err(SchedError::Storage("constraint violation".into()));
        }
        self.inner.upsert(event).await
    }

    async fn count(&self) -> SchedResult<usize> {
        self.read()?;
        self.inner.count().await
    }

    async fn metadata(&self) -> SchedResult<Option<SyncMetadata>> {
        self.read()?;
        self.inner.metadata().await
    }

    async fn save_metadata(&self, metadata: &SyncMetadata) -> SchedResult<()> {
        self.touch();
        self.inner.save_metadata(metadata).await
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn transformer() -> Arc<EventTransformer> {
    Arc::new(EventTransformer::new(chrono_tz::America::Chicago))
}

fn wire(id: &str, name: &str, start: &str, tags: &str) -> WireEvent {
    WireEvent {
        id: id.to_string(),
        name: name.to_string(),
        event_start: Some(start.to_string()),
        event_type: Some("Programming".to_string()),
        tags: Some(tags.to_string()),
        ..Default::default()
    }
}

fn three_records() -> Vec<WireEvent> {
    vec![
        wire("p1", "Opening Ceremonies", "2026-03-20 18:00", "Main Events"),
        wire("p2", "Maid Cafe", "2026-03-21 10:00", "Maid Cafe"),
        wire("p3", "Cosplay Contest", "2026-03-21 19:00", "Cosplay Contest"),
    ]
}

fn before_con() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
}

/// At most two `Next`, then exactly one terminal, nothing after it.
fn assert_protocol<T>(emissions: &[Emission<T>]) {
    let terminals: Vec<_> = emissions
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_terminal())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(terminals, vec![emissions.len() - 1], "exactly one terminal, last");
    assert!(emissions.len() <= 3, "at most two values before the terminal");
}

fn ids(events: &[Event]) -> Vec<&str> {
    events.iter().map(|e| e.id.as_str()).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_full_cycle_emits_stale_then_fresh() {
    let store = Arc::new(MemoryStore::new());
    let endpoint = ScriptedEndpoint::new(Script::Records(three_records()));

    let worker = SyncWorker::new(
        store.clone(),
        endpoint.clone(),
        transformer(),
        AllEventsMatching::new(""),
    );
    let mut subscriber = CollectingSubscriber::new();
    let report = worker.run(&mut subscriber).await;

    assert_protocol(&subscriber.emissions);
    assert!(subscriber.is_completed());
    let values = subscriber.values();
    assert_eq!(values.len(), 2);
    assert!(values[0].is_empty());
    assert_eq!(ids(values[1]), vec!["p1", "p2", "p3"]);

    assert_eq!(endpoint.calls(), 1);
    assert_eq!(report.fetched, Some(3));
    assert_eq!(report.upserted, 3);
    assert!(report.completed);

    let metadata = store.metadata().await.unwrap().unwrap();
    assert_eq!(metadata.event_count, 3);
}

#[tokio::test]
async fn test_upsert_overwrites_cached_event() {
    let store = Arc::new(MemoryStore::new());
    let first = ScriptedEndpoint::new(Script::Records(vec![wire(
        "p1",
        "Old Title",
        "2026-03-20 18:00",
        "",
    )]));
    let worker = SyncWorker::new(store.clone(), first, transformer(), AllEventsMatching::new(""));
    worker.run(&mut CollectingSubscriber::new()).await;

    let second = ScriptedEndpoint::new(Script::Records(vec![wire(
        "p1",
        "New Title",
        "2026-03-20 18:00",
        "",
    )]));
    let worker = SyncWorker::new(store.clone(), second, transformer(), AllEventsMatching::new(""));
    let mut subscriber = CollectingSubscriber::new();
    worker.run(&mut subscriber).await;

    let values = subscriber.values();
    assert_eq!(values[0][0].name, "Old Title");
    assert_eq!(values[1][0].name, "New Title");
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_transform_failure_upserts_nothing() {
    let store = Arc::new(InstrumentedStore::default());
    let mut records = three_records();
    records[1].event_start = Some("Saturday morning".to_string());
    let endpoint = ScriptedEndpoint::new(Script::Records(records));

    let worker = SyncWorker::new(store.clone(), endpoint, transformer(), AllEventsMatching::new(""));
    let mut subscriber = CollectingSubscriber::new();
    let report = worker.run(&mut subscriber).await;

    assert_protocol(&subscriber.emissions);
    assert_eq!(subscriber.values().len(), 1);
    assert!(matches!(subscriber.error(), Some(SchedError::Transform(_))));
    assert_eq!(report.upserted, 0);
    assert_eq!(store.inner.count().await.unwrap(), 0);
    assert!(store.inner.metadata().await.unwrap().is_none());
}

#[tokio::test]
async fn test_transport_failure_stops_after_stale() {
    let store = Arc::new(MemoryStore::new());
    let endpoint = ScriptedEndpoint::new(Script::Fail);

    let worker = SyncWorker::new(store.clone(), endpoint, transformer(), EventCount);
    let mut subscriber = CollectingSubscriber::new();
    let report = worker.run(&mut subscriber).await;

    assert_protocol(&subscriber.emissions);
    assert_eq!(subscriber.values(), vec![&0]);
    assert!(matches!(subscriber.error(), Some(SchedError::Transport(_))));
    assert_eq!(report.error_kind, Some("transport"));
    assert_eq!(report.fetched, None);
}

#[tokio::test]
async fn test_storage_read_failure_skips_remote() {
    let store = Arc::new(InstrumentedStore {
        fail_reads: true,
        ..Default::default()
    });
    let endpoint = ScriptedEndpoint::new(Script::Records(three_records()));

    let worker = SyncWorker::new(store, endpoint.clone(), transformer(), AllEventsMatching::new("x"));
    let mut subscriber = CollectingSubscriber::new();
    worker.run(&mut subscriber).await;

    assert_eq!(subscriber.emissions.len(), 1);
    assert!(matches!(subscriber.error(), Some(SchedError::Storage(_))));
    assert_eq!(endpoint.calls(), 0);
}

#[tokio::test]
async fn test_upsert_failure_keeps_earlier_upserts() {
    let store = Arc::new(InstrumentedStore {
        fail_upsert_at: Some(2),
        ..Default::default()
    });
    let endpoint = ScriptedEndpoint::new(Script::Records(three_records()));

    let worker = SyncWorker::new(store.clone(), endpoint, transformer(), AllEventsMatching::new(""));
    let mut subscriber = CollectingSubscriber::new();
    let report = worker.run(&mut subscriber).await;

    assert_protocol(&subscriber.emissions);
    assert_eq!(subscriber.values().len(), 1);
    assert!(matches!(subscriber.error(), Some(SchedError::Storage(_))));
    assert_eq!(report.upserted, 1);
    let remaining = store.inner.find_many(&Query::all()).await.unwrap();
    assert_eq!(ids(&remaining), vec!["p1"]);
}

#[tokio::test]
async fn test_zero_ordinal_fails_before_any_io() {
    let store = Arc::new(InstrumentedStore::default());
    let endpoint = ScriptedEndpoint::new(Script::Records(three_records()));
    let criteria = TagCriteria {
        search: "Maid Cafe".to_string(),
        ordinal: 0,
    };

    let worker = SyncWorker::new(
        store.clone(),
        endpoint.clone(),
        transformer(),
        UpcomingByTag::new(criteria),
    );
    let mut subscriber = CollectingSubscriber::new();
    worker.run(&mut subscriber).await;

    assert_eq!(subscriber.emissions.len(), 1);
    assert!(matches!(subscriber.error(), Some(SchedError::Validation(_))));
    assert_eq!(store.calls(), 0);
    assert_eq!(endpoint.calls(), 0);
}

#[tokio::test]
async fn test_upcoming_by_tag_over_channel() {
    let store = Arc::new(MemoryStore::new());
    let endpoint = ScriptedEndpoint::new(Script::Records(three_records()));
    let criteria = TagCriteria::new("maid cafe", 1).unwrap();

    let worker = SyncWorker::new(
        store,
        endpoint,
        transformer(),
        UpcomingByTag::new(criteria).at(before_con()),
    );
    let (mut tx, rx) = channel();
    let handle = tokio::spawn(async move { worker.run(&mut tx).await });

    let emissions = rx.collect().await;
    let report = handle.await.unwrap();

    assert_protocol(&emissions);
    assert!(matches!(emissions[0], Emission::Next(None)));
    match &emissions[1] {
        Emission::Next(Some(event)) => assert_eq!(event.id, "p2"),
        other => panic!("expected fresh event, got {:?}", other),
    }
    assert!(matches!(emissions[2], Emission::Completed));
    assert!(report.completed);
}

#[tokio::test]
async fn test_cancelled_before_start_touches_nothing() {
    let store = Arc::new(InstrumentedStore::default());
    let endpoint = ScriptedEndpoint::new(Script::Records(three_records()));
    let token = CancellationToken::new();
    token.cancel();

    let worker = SyncWorker::new(store.clone(), endpoint.clone(), transformer(), EventCount)
        .with_cancellation(token);
    let mut subscriber = CollectingSubscriber::new();
    worker.run(&mut subscriber).await;

    assert_eq!(subscriber.emissions.len(), 1);
    assert!(matches!(subscriber.error(), Some(SchedError::Cancelled)));
    assert_eq!(store.calls(), 0);
    assert_eq!(endpoint.calls(), 0);
}

#[tokio::test]
async fn test_cancel_during_fetch() {
    let store = Arc::new(MemoryStore::new());
    let endpoint = ScriptedEndpoint::new(Script::Hang);
    let token = CancellationToken::new();

    let worker = SyncWorker::new(store, endpoint, transformer(), EventCount)
        .with_cancellation(token.clone());
    let handle = tokio::spawn(async move {
        let mut subscriber = CollectingSubscriber::new();
        worker.run(&mut subscriber).await;
        subscriber
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();
    let subscriber = handle.await.unwrap();

    assert_protocol(&subscriber.emissions);
    assert_eq!(subscriber.values(), vec![&0]);
    assert!(matches!(subscriber.error(), Some(SchedError::Cancelled)));
}

#[tokio::test]
async fn test_deadline_bounds_fetch() {
    let store = Arc::new(MemoryStore::new());
    let endpoint = ScriptedEndpoint::new(Script::Hang);

    let worker = SyncWorker::new(store, endpoint, transformer(), EventCount)
        .with_deadline(Duration::from_millis(50));
    let mut subscriber = CollectingSubscriber::new();
    worker.run(&mut subscriber).await;

    assert_protocol(&subscriber.emissions);
    match subscriber.error() {
        Some(SchedError::Transport(msg)) => assert!(msg.ends_with("after 50ms"), "{msg}"),
        other => panic!("expected transport error, got {other:?}"),
    }
}
