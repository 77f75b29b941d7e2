//! View recorder.
//!
//! Ties the dedup guard, the per-session id, and the view sink together.
//! Recording never fails outward: problems come back as `RecordOutcome::Failed`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use readerstats_core::{ContentId, KeyValueStore, StatsResult, ViewEvent, ViewSink};
use readerstats_logging::{StatsEvent, StatsEventLogger};

use crate::dedup::ViewDedupGuard;

/// Session-scoped key holding this browsing session's id.
pub const SESSION_ID_KEY: &str = "session_id";

/// What happened to one attempted view.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Recorded(ViewEvent),
    Suppressed,
    Failed(String),
}

impl RecordOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, RecordOutcome::Recorded(_))
    }
}

pub struct ViewRecorder {
    guard: ViewDedupGuard,
    session_store: Arc<dyn KeyValueStore>,
    sink: Arc<dyn ViewSink>,
}

impl ViewRecorder {
    pub fn new(
        guard: ViewDedupGuard,
        session_store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn ViewSink>,
    ) -> Self {
        Self {
            guard,
            session_store,
            sink,
        }
    }

    /// This session's id, created on first use.
    ///
    /// If session storage is unusable a fresh id is returned each call.
    pub fn session_id(&self) -> String {
        match self.session_store.get(SESSION_ID_KEY) {
            Ok(Some(id)) if !id.is_empty() => id,
            Ok(_) => {
                let id = Uuid::new_v4().to_string();
                if let Err(e) = self.session_store.set(SESSION_ID_KEY, &id) {
                    warn!(error = %e, "Could not persist session id");
                }
                debug!("Started new view session");
                id
            }
            Err(e) => {
                warn!(error = %e, "Session storage unreadable; using ephemeral session id");
                Uuid::new_v4().to_string()
            }
        }
    }

    /// Record a view of `content_id` unless one was recorded inside the window.
    pub async fn record_view(
        &self,
        content_id: &ContentId,
        user_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> RecordOutcome {
        if !self.guard.should_record_view(content_id, now) {
            StatsEventLogger::log_event(
                content_id.as_str(),
                StatsEvent::ViewSuppressed {
                    last_seen_ms: self.guard.last_seen(content_id),
                },
            );
            return RecordOutcome::Suppressed;
        }

        let event = ViewEvent::new(
            content_id.clone(),
            self.session_id(),
            user_id.map(str::to_string),
            now,
        );

        match self.sink.record(&event).await {
            Ok(()) => {
                self.guard.mark_recorded(content_id, now);
                StatsEventLogger::log_event(
                    content_id.as_str(),
                    StatsEvent::ViewRecorded {
                        session_id: event.session_id.clone(),
                        user_id: event.user_id.clone(),
                    },
                );
                RecordOutcome::Recorded(event)
            }
            Err(e) => {
                let reason = e.to_string();
                StatsEventLogger::log_event(
                    content_id.as_str(),
                    StatsEvent::ViewFailed {
                        reason: reason.clone(),
                    },
                );
                RecordOutcome::Failed(reason)
            }
        }
    }
}

/// Sink used when no backend is configured: the event only goes to the log.
pub struct LogViewSink;

#[async_trait]
impl ViewSink for LogViewSink {
    async fn record(&self, event: &ViewEvent) -> StatsResult<()> {
        info!(
            content_id = %event.content_id,
            timestamp = %event.timestamp,
            "View event (no backend configured)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readerstats_core::StatsError;
    use readerstats_store::{DEFAULT_PREFIX, MemoryStore, NamespacedStore, StoreScope};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingSink {
        events: Mutex<Vec<ViewEvent>>,
        fail: bool,
    }

    #[async_trait]
    impl ViewSink for CollectingSink {
        async fn record(&self, event: &ViewEvent) -> StatsResult<()> {
            if self.fail {
                return Err(StatsError::Unavailable("connection refused".into()));
            }
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn recorder(sink: Arc<CollectingSink>) -> ViewRecorder {
        let backing: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session: Arc<dyn KeyValueStore> = Arc::new(NamespacedStore::new(
            backing,
            DEFAULT_PREFIX,
            StoreScope::Session,
        ));
        ViewRecorder::new(ViewDedupGuard::new(session.clone()), session, sink)
    }

    #[tokio::test]
    async fn test_records_then_suppresses_then_records_again() {
        let sink = Arc::new(CollectingSink::default());
        let recorder = recorder(sink.clone());
        let id = ContentId::new("abc");

        assert!(recorder.record_view(&id, None, at(0)).await.is_recorded());
        assert_eq!(
            recorder.record_view(&id, None, at(600_000)).await,
            RecordOutcome::Suppressed
        );
        assert!(recorder.record_view(&id, None, at(1_800_001)).await.is_recorded());

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].session_id, events[1].session_id);
    }

    #[tokio::test]
    async fn test_event_carries_user() {
        let sink = Arc::new(CollectingSink::default());
        let recorder = recorder(sink);
        match recorder.record_view(&"abc".into(), Some("user-7"), at(42)).await {
            RecordOutcome::Recorded(event) => {
                assert_eq!(event.user_id.as_deref(), Some("user-7"));
                assert_eq!(event.timestamp, at(42));
                assert_eq!(event.content_id.as_str(), "abc");
            }
            other => panic!("expected Recorded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_sink_does_not_mark() {
        let sink = Arc::new(CollectingSink {
            fail: true,
            ..Default::default()
        });
        let recorder = recorder(sink);
        let id = ContentId::new("abc");

        let outcome = recorder.record_view(&id, None, at(0)).await;
        assert!(
            matches!(outcome, RecordOutcome::Failed(ref r) if r.contains("connection refused"))
        );
        // Nothing was marked, so the next attempt goes through to the sink again.
        assert!(matches!(
            recorder.record_view(&id, None, at(1)).await,
            RecordOutcome::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_session_id_is_stable() {
        let recorder = recorder(Arc::new(CollectingSink::default()));
        let first = recorder.session_id();
        assert_eq!(first, recorder.session_id());
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_accepts_everything() {
        let event = ViewEvent::new("abc".into(), "s", None, at(0));
        assert!(LogViewSink.record(&event).await.is_ok());
    }
}
