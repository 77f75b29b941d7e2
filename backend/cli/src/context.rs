//! Wiring from a prepared config to the services the commands use.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use readerstats_analytics::{HttpBackend, LogViewSink, ViewDedupGuard, ViewRecorder};
use readerstats_config::ReaderStatsConfig;
use readerstats_core::{
    ContentId, CountSource, KeyValueStore, StatsError, StatsResult, ViewCounts, ViewSink,
};
use readerstats_store::{NamespacedStore, SqliteStore, StoreScope};

/// Count source used when no backend is configured. Always unavailable, so
/// callers fall back to neutral counts.
pub struct OfflineCounts;

#[async_trait]
impl CountSource for OfflineCounts {
    async fn fetch_counts(&self, _content_id: &ContentId) -> StatsResult<ViewCounts> {
        Err(StatsError::Unavailable("no backend configured".into()))
    }
}

pub struct AppContext {
    pub config: ReaderStatsConfig,
    pub session_store: Arc<dyn KeyValueStore>,
    pub counts: Arc<dyn CountSource>,
    pub sink: Arc<dyn ViewSink>,
    /// False when views only go to the log.
    pub has_backend: bool,
}

impl AppContext {
    /// Open storage and pick backend implementations for `config`.
    pub fn build(config: ReaderStatsConfig) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = match config.storage_path() {
            Some(path) => Arc::new(
                SqliteStore::open(Path::new(path))
                    .with_context(|| format!("Failed to open store at {path}"))?,
            ),
            None => Arc::new(SqliteStore::in_memory()?),
        };
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: ReaderStatsConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let session_store: Arc<dyn KeyValueStore> = Arc::new(NamespacedStore::new(
            store,
            config.key_prefix(),
            StoreScope::Session,
        ));

        let (counts, sink, has_backend): (Arc<dyn CountSource>, Arc<dyn ViewSink>, bool) =
            match config.backend_url() {
                Some(url) => {
                    let mut backend = HttpBackend::new(url);
                    if let Some(key) = config.backend_api_key() {
                        backend = backend.with_api_key(key);
                    }
                    let backend = Arc::new(backend);
                    info!(url, "Using hosted backend");
                    let counts: Arc<dyn CountSource> = backend.clone();
                    let sink: Arc<dyn ViewSink> = backend;
                    (counts, sink, true)
                }
                None => {
                    debug!("No backend configured; views are logged only");
                    let counts: Arc<dyn CountSource> = Arc::new(OfflineCounts);
                    let sink: Arc<dyn ViewSink> = Arc::new(LogViewSink);
                    (counts, sink, false)
                }
            };

        Self {
            config,
            session_store,
            counts,
            sink,
            has_backend,
        }
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_secs(self.config.dedup_window_minutes().saturating_mul(60))
    }

    pub fn dedup_guard(&self) -> ViewDedupGuard {
        ViewDedupGuard::with_window(self.session_store.clone(), self.dedup_window())
    }

    pub fn recorder(&self) -> ViewRecorder {
        ViewRecorder::new(
            self.dedup_guard(),
            self.session_store.clone(),
            self.sink.clone(),
        )
    }
}
