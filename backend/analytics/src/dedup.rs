//! View deduplication guard.
//!
//! Remembers when each content id was last recorded from this client and
//! suppresses repeat views inside a fixed window. Best effort: any storage
//! problem reads as "never seen" so the view is recorded.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use readerstats_core::{ContentId, KeyValueStore, StatsError, StatsResult};

/// Storage key holding the serialized cache.
pub const RECENT_VIEWS_KEY: &str = "recent_views";

/// Default suppression window.
pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(30 * 60);

/// `content_id -> last recorded (unix millis)`, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentViewCache {
    entries: BTreeMap<String, i64>,
}

impl RecentViewCache {
    pub fn last_seen(&self, content_id: &ContentId) -> Option<i64> {
        self.entries.get(content_id.as_str()).copied()
    }

    pub fn upsert(&mut self, content_id: &ContentId, at_ms: i64) {
        self.entries.insert(content_id.as_str().to_string(), at_ms);
    }

    /// Drop entries that no longer suppress anything. Returns how many went.
    pub fn prune(&mut self, now_ms: i64, window_ms: i64) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, seen| now_ms.saturating_sub(*seen) < window_ms);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Time-windowed idempotency check over an injected store.
#[derive(Clone)]
pub struct ViewDedupGuard {
    store: Arc<dyn KeyValueStore>,
    window: Duration,
}

impl ViewDedupGuard {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_window(store, DEFAULT_DEDUP_WINDOW)
    }

    pub fn with_window(store: Arc<dyn KeyValueStore>, window: Duration) -> Self {
        Self { store, window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn window_ms(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }

    /// Read the cache from storage. A missing key is an empty cache.
    pub fn load_cache(&self) -> StatsResult<RecentViewCache> {
        match self.store.get(RECENT_VIEWS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(RecentViewCache::default()),
        }
    }

    fn load_or_empty(&self) -> RecentViewCache {
        self.load_cache().unwrap_or_else(|e| {
            warn!(error = %e, "Recent views unreadable; treating as empty");
            RecentViewCache::default()
        })
    }

    /// Whether a view of `content_id` at `now` should be recorded.
    pub fn should_record_view(&self, content_id: &ContentId, now: DateTime<Utc>) -> bool {
        let cache = self.load_or_empty();
        match cache.last_seen(content_id) {
            Some(seen) => {
                let elapsed = now.timestamp_millis().saturating_sub(seen);
                let record = elapsed >= self.window_ms();
                debug!(%content_id, elapsed_ms = elapsed, record, "Dedup check");
                record
            }
            None => true,
        }
    }

    /// Last recorded time for `content_id`, if the cache is readable and has one.
    pub fn last_seen(&self, content_id: &ContentId) -> Option<i64> {
        self.load_or_empty().last_seen(content_id)
    }

    /// Remember that `content_id` was recorded at `now`, pruning expired entries.
    pub fn mark_recorded(&self, content_id: &ContentId, now: DateTime<Utc>) {
        let now_ms = now.timestamp_millis();
        let mut cache = self.load_or_empty();
        let pruned = cache.prune(now_ms, self.window_ms());
        cache.upsert(content_id, now_ms);

        let saved = serde_json::to_string(&cache)
            .map_err(StatsError::from)
            .and_then(|raw| self.store.set(RECENT_VIEWS_KEY, &raw));
        match saved {
            Ok(()) => debug!(%content_id, pruned, kept = cache.len(), "Marked view recorded"),
            Err(e) => warn!(%content_id, error = %e, "Failed to persist recent views"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use readerstats_store::MemoryStore;

    const MIN: i64 = 60_000;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn guard() -> (ViewDedupGuard, MemoryStore) {
        let store = MemoryStore::new();
        (ViewDedupGuard::new(Arc::new(store.clone())), store)
    }

    #[test]
    fn test_first_view_repeat_and_expiry() {
        let (guard, _) = guard();
        let id = ContentId::new("abc");

        assert!(guard.should_record_view(&id, at(0)));
        guard.mark_recorded(&id, at(0));

        assert!(!guard.should_record_view(&id, at(600_000)));
        assert!(guard.should_record_view(&id, at(1_800_001)));
    }

    #[test]
    fn test_window_boundaries() {
        let (guard, _) = guard();
        let id = ContentId::new("abc");
        let t0 = 5 * MIN;
        guard.mark_recorded(&id, at(t0));

        for t1 in [t0, t0 + 1, t0 + 29 * MIN, t0 + 30 * MIN - 1] {
            assert!(!guard.should_record_view(&id, at(t1)), "t1 = {t1}");
        }
        assert!(guard.should_record_view(&id, at(t0 + 30 * MIN)));
        assert!(guard.should_record_view(&id, at(t0 + 90 * MIN)));
    }

    #[test]
    fn test_check_is_idempotent() {
        let (guard, _) = guard();
        let id = ContentId::new("abc");
        let first = guard.should_record_view(&id, at(0));
        let second = guard.should_record_view(&id, at(0));
        assert_eq!(first, second);

        guard.mark_recorded(&id, at(0));
        assert_eq!(
            guard.should_record_view(&id, at(MIN)),
            guard.should_record_view(&id, at(MIN))
        );
    }

    #[test]
    fn test_ids_are_independent() {
        let (guard, _) = guard();
        guard.mark_recorded(&"abc".into(), at(0));
        assert!(guard.should_record_view(&"xyz".into(), at(MIN)));
    }

    #[test]
    fn test_mark_prunes_expired_entries() {
        let (guard, _) = guard();
        guard.mark_recorded(&"old".into(), at(0));
        guard.mark_recorded(&"mid".into(), at(20 * MIN));
        guard.mark_recorded(&"new".into(), at(31 * MIN));

        let cache = guard.load_cache().unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.last_seen(&"old".into()), None);
        assert_eq!(cache.last_seen(&"mid".into()), Some(20 * MIN));
    }

    #[test]
    fn test_corrupt_cache_fails_open() {
        let (guard, store) = guard();
        store.set(RECENT_VIEWS_KEY, "{not json").unwrap();
        let id = ContentId::new("abc");

        assert!(matches!(guard.load_cache(), Err(StatsError::Parse(_))));
        assert!(guard.should_record_view(&id, at(0)));

        // Marking overwrites the corrupt value with a clean cache.
        guard.mark_recorded(&id, at(0));
        assert!(!guard.should_record_view(&id, at(MIN)));
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> StatsResult<Option<String>> {
            Err(StatsError::Storage("quota exceeded".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> StatsResult<()> {
            Err(StatsError::Storage("quota exceeded".into()))
        }
        fn remove(&self, _key: &str) -> StatsResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_unavailable_storage_never_suppresses() {
        let guard = ViewDedupGuard::new(Arc::new(BrokenStore));
        let id = ContentId::new("abc");
        guard.mark_recorded(&id, at(0));
        assert!(guard.should_record_view(&id, at(1)));
    }

    #[test]
    fn test_custom_window() {
        let store = MemoryStore::new();
        let guard = ViewDedupGuard::with_window(Arc::new(store), Duration::from_secs(60));
        let id = ContentId::new("abc");
        guard.mark_recorded(&id, at(0));
        assert!(!guard.should_record_view(&id, at(59_999)));
        assert!(guard.should_record_view(&id, at(60_000)));
    }
}
