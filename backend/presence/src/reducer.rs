//! Pure presence state machine.
//!
//! `Disconnected -> Joining -> Tracking -> Synced`. The visible count is the
//! size of the member set and only moves once a full snapshot has been seen;
//! deltas edit the set, they never bump a running counter.

use std::collections::BTreeMap;

use readerstats_core::{PresenceEntry, PresenceEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresencePhase {
    #[default]
    Disconnected,
    /// Subscription requested, not yet confirmed.
    Joining,
    /// Confirmed; this client is announcing itself.
    Tracking,
    /// A full membership snapshot has been received.
    Synced,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresenceSnapshot {
    pub phase: PresencePhase,
    /// Current members keyed by connection key.
    pub members: BTreeMap<String, PresenceEntry>,
    /// Last published count. Stays put until the first sync and after failures.
    pub count: usize,
    pub last_error: Option<String>,
}

impl PresenceSnapshot {
    pub fn joining() -> Self {
        Self {
            phase: PresencePhase::Joining,
            ..Default::default()
        }
    }

    pub fn is_synced(&self) -> bool {
        self.phase == PresencePhase::Synced
    }
}

/// Apply one event to a snapshot.
pub fn reduce(mut snapshot: PresenceSnapshot, event: &PresenceEvent) -> PresenceSnapshot {
    match event {
        PresenceEvent::Subscribed => {
            if matches!(
                snapshot.phase,
                PresencePhase::Disconnected | PresencePhase::Joining
            ) {
                snapshot.phase = PresencePhase::Tracking;
                snapshot.last_error = None;
            }
        }
        PresenceEvent::Sync { members } => {
            snapshot.members = members
                .iter()
                .map(|m| (m.connection_key.clone(), m.clone()))
                .collect();
            snapshot.phase = PresencePhase::Synced;
            snapshot.last_error = None;
        }
        PresenceEvent::Join { joined } => {
            for m in joined {
                snapshot.members.insert(m.connection_key.clone(), m.clone());
            }
        }
        PresenceEvent::Leave { left } => {
            for m in left {
                snapshot.members.remove(&m.connection_key);
            }
        }
        PresenceEvent::ChannelError { message } => {
            snapshot.phase = PresencePhase::Disconnected;
            snapshot.last_error = Some(message.clone());
        }
        PresenceEvent::Closed => {
            snapshot.phase = PresencePhase::Disconnected;
        }
    }

    if snapshot.is_synced() {
        snapshot.count = snapshot.members.len();
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use readerstats_core::ContentId;

    fn member(key: &str) -> PresenceEntry {
        PresenceEntry {
            content_id: ContentId::new("abc"),
            connection_key: key.to_string(),
            joined_at: chrono_epoch(),
        }
    }

    fn chrono_epoch() -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(0).unwrap()
    }

    fn run(events: &[PresenceEvent]) -> PresenceSnapshot {
        events
            .iter()
            .fold(PresenceSnapshot::joining(), |s, e| reduce(s, e))
    }

    fn sync(keys: &[&str]) -> PresenceEvent {
        PresenceEvent::Sync {
            members: keys.iter().map(|k| member(k)).collect(),
        }
    }

    fn join(key: &str) -> PresenceEvent {
        PresenceEvent::Join {
            joined: vec![member(key)],
        }
    }

    fn leave(key: &str) -> PresenceEvent {
        PresenceEvent::Leave {
            left: vec![member(key)],
        }
    }

    #[test]
    fn test_phase_progression() {
        let s = PresenceSnapshot::joining();
        assert_eq!(s.phase, PresencePhase::Joining);
        let s = reduce(s, &PresenceEvent::Subscribed);
        assert_eq!(s.phase, PresencePhase::Tracking);
        let s = reduce(s, &sync(&["me"]));
        assert_eq!(s.phase, PresencePhase::Synced);
        assert_eq!(s.count, 1);
    }

    #[test]
    fn test_count_waits_for_first_sync() {
        let s = run(&[PresenceEvent::Subscribed, join("a"), join("b")]);
        assert_eq!(s.phase, PresencePhase::Tracking);
        assert_eq!(s.count, 0);
        assert_eq!(s.members.len(), 2);
    }

    #[test]
    fn test_deltas_recompute_from_set() {
        let s = run(&[
            PresenceEvent::Subscribed,
            sync(&["me"]),
            join("a"),
            join("a"),
            join("b"),
            leave("zzz"),
        ]);
        assert_eq!(s.count, 3);

        let s = reduce(s, &leave("a"));
        let s = reduce(s, &leave("a"));
        assert_eq!(s.count, 2);
    }

    #[test]
    fn test_sync_replaces_membership() {
        let s = run(&[
            PresenceEvent::Subscribed,
            sync(&["me"]),
            join("a"),
            join("b"),
            join("c"),
            leave("me"),
            sync(&["x", "y"]),
        ]);
        assert_eq!(s.count, 2);
        assert!(s.members.contains_key("x"));
        assert!(!s.members.contains_key("a"));
    }

    #[test]
    fn test_error_keeps_last_count() {
        let s = run(&[
            PresenceEvent::Subscribed,
            sync(&["me", "a", "b"]),
            PresenceEvent::ChannelError {
                message: "socket closed".into(),
            },
        ]);
        assert_eq!(s.phase, PresencePhase::Disconnected);
        assert_eq!(s.count, 3);
        assert_eq!(s.last_error.as_deref(), Some("socket closed"));

        // Deltas after a failure do not move the published count.
        let s = reduce(s, &join("c"));
        assert_eq!(s.count, 3);
    }

    #[test]
    fn test_closed_keeps_last_count() {
        let s = run(&[PresenceEvent::Subscribed, sync(&["me", "a"]), PresenceEvent::Closed]);
        assert_eq!(s.phase, PresencePhase::Disconnected);
        assert_eq!(s.count, 2);
    }

    #[test]
    fn test_late_subscribed_does_not_regress_phase() {
        let s = run(&[PresenceEvent::Subscribed, sync(&["me"]), PresenceEvent::Subscribed]);
        assert_eq!(s.phase, PresencePhase::Synced);
    }
}
