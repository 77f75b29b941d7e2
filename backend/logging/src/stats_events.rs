//! Typed events (view recorded/suppressed/failed, count fallbacks, presence
//! changes) written through `tracing` under the `stats_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::{mask_identifier, redact_sensitive_data};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatsEvent {
    ViewRecorded {
        session_id: String,
        user_id: Option<String>,
    },
    ViewSuppressed {
        last_seen_ms: Option<i64>,
    },
    ViewFailed {
        reason: String,
    },
    CountFallback {
        reason: String,
    },
    PresenceCount {
        channel: String,
        count: usize,
    },
    PresenceFailed {
        channel: String,
        reason: String,
    },
}

impl StatsEvent {
    fn is_failure(&self) -> bool {
        matches!(
            self,
            StatsEvent::ViewFailed { .. }
                | StatsEvent::CountFallback { .. }
                | StatsEvent::PresenceFailed { .. }
        )
    }

    fn redacted(self) -> Self {
        match self {
            StatsEvent::ViewRecorded { session_id, user_id } => StatsEvent::ViewRecorded {
                session_id: mask_identifier(&session_id),
                user_id: user_id.as_deref().map(mask_identifier),
            },
            StatsEvent::ViewFailed { reason } => StatsEvent::ViewFailed {
                reason: redact_sensitive_data(&reason),
            },
            StatsEvent::CountFallback { reason } => StatsEvent::CountFallback {
                reason: redact_sensitive_data(&reason),
            },
            StatsEvent::PresenceFailed { channel, reason } => StatsEvent::PresenceFailed {
                channel,
                reason: redact_sensitive_data(&reason),
            },
            other => other,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsLogEntry {
    pub content_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: StatsEvent,
}

pub struct StatsEventLogger;

impl StatsEventLogger {
    /// Build the redacted entry that [`log_event`](Self::log_event) emits.
    pub fn entry(content_id: &str, event: StatsEvent) -> StatsLogEntry {
        StatsLogEntry {
            content_id: content_id.into(),
            timestamp: Utc::now(),
            event: event.redacted(),
        }
    }

    /// Log a stats event for `content_id`, masking identifiers first.
    pub fn log_event(content_id: &str, event: StatsEvent) {
        let failure = event.is_failure();
        let entry = Self::entry(content_id, event);
        let json = serde_json::to_string(&entry).unwrap_or_else(|_| format!("{:?}", entry));

        if failure {
            warn!(target: "stats_events", entry = %json, "Stats event");
        } else {
            info!(target: "stats_events", entry = %json, "Stats event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_masks_identifiers() {
        let entry = StatsEventLogger::entry(
            "abc",
            StatsEvent::ViewRecorded {
                session_id: "0d9e8f7a-1111-4222-8333-444455556666".into(),
                user_id: Some("ona@site.lt".into()),
            },
        );
        assert_eq!(
            entry.event,
            StatsEvent::ViewRecorded {
                session_id: "0d9e****".into(),
                user_id: Some("[REDACTED_EMAIL]".into()),
            }
        );
    }

    #[test]
    fn test_entry_serializes_with_type_tag() {
        let entry = StatsEventLogger::entry(
            "abc",
            StatsEvent::PresenceCount {
                channel: "content:abc".into(),
                count: 3,
            },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "presence_count");
        assert_eq!(json["event"]["count"], 3);
        assert_eq!(json["content_id"], "abc");
    }

    #[test]
    fn test_log_event_without_subscriber_is_harmless() {
        StatsEventLogger::log_event("abc", StatsEvent::CountFallback { reason: "503".into() });
    }
}
