//! Wiring of config, store, endpoint and transformer for a CLI invocation.

use std::sync::Arc;

use anyhow::Result;
use chrono_tz::Tz;
use consched_core::config::SchedConfig;
use consched_core::remote::HttpEndpoint;
use consched_core::store::{Collation, FileStore};
use consched_core::sync::{LocalLookup, SyncWorker};
use consched_core::transform::EventTransformer;
use tokio_util::sync::CancellationToken;

pub struct Context {
    pub config: SchedConfig,
    pub store: Arc<FileStore>,
    pub endpoint: Arc<HttpEndpoint>,
    pub transformer: Arc<EventTransformer>,
    pub cancel: CancellationToken,
}

impl Context {
    pub async fn load() -> Result<Self> {
        let config = SchedConfig::load()?;
        let tz = config.tz()?;

        let store = FileStore::open(config.data_path()).await?;
        let endpoint = HttpEndpoint::from_config(&config.endpoint)?;

        // Ctrl-C cancels a running sync between steps
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });

        Ok(Context {
            config,
            store: Arc::new(store),
            endpoint: Arc::new(endpoint),
            transformer: Arc::new(EventTransformer::new(tz)),
            cancel,
        })
    }

    pub fn tz(&self) -> Tz {
        self.transformer.timezone()
    }

    pub fn collation(&self) -> Collation {
        self.config.collation()
    }

    pub fn worker<L: LocalLookup>(&self, lookup: L) -> SyncWorker<L> {
        SyncWorker::new(
            self.store.clone(),
            self.endpoint.clone(),
            self.transformer.clone(),
            lookup,
        )
        .with_cancellation(self.cancel.clone())
    }
}
