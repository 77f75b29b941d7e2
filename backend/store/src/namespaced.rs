//! Key namespacing.
//!
//! Every key the site writes carries an application prefix, and session-scoped
//! keys carry a second segment so they never collide with profile-scoped ones.

use std::sync::Arc;

use readerstats_core::{DEFAULT_KEY_PREFIX, KeyValueStore, StatsResult};

/// Default application prefix.
pub const DEFAULT_PREFIX: &str = DEFAULT_KEY_PREFIX;

/// Lifetime of stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreScope {
    /// Cleared when the browsing session ends.
    Session,
    /// Kept for the lifetime of the browser profile.
    Profile,
}

impl StoreScope {
    fn segment(self) -> &'static str {
        match self {
            StoreScope::Session => "session:",
            StoreScope::Profile => "",
        }
    }
}

/// A view over another store that prefixes every key.
#[derive(Clone)]
pub struct NamespacedStore {
    inner: Arc<dyn KeyValueStore>,
    prefix: String,
}

impl NamespacedStore {
    pub fn new(inner: Arc<dyn KeyValueStore>, app_prefix: &str, scope: StoreScope) -> Self {
        Self {
            inner,
            prefix: format!("{}{}", app_prefix, scope.segment()),
        }
    }

    /// The full key stored in the underlying store for `key`.
    pub fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl KeyValueStore for NamespacedStore {
    fn get(&self, key: &str) -> StatsResult<Option<String>> {
        self.inner.get(&self.full_key(key))
    }

    fn set(&self, key: &str, value: &str) -> StatsResult<()> {
        self.inner.set(&self.full_key(key), value)
    }

    fn remove(&self, key: &str) -> StatsResult<()> {
        self.inner.remove(&self.full_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[test]
    fn test_scopes_do_not_collide() {
        let backing = MemoryStore::new();
        let shared: Arc<dyn KeyValueStore> = Arc::new(backing.clone());
        let session = NamespacedStore::new(shared.clone(), DEFAULT_PREFIX, StoreScope::Session);
        let profile = NamespacedStore::new(shared, DEFAULT_PREFIX, StoreScope::Profile);

        session.set("recent_views", "s").unwrap();
        profile.set("recent_views", "p").unwrap();

        assert_eq!(session.get("recent_views").unwrap().as_deref(), Some("s"));
        assert_eq!(profile.get("recent_views").unwrap().as_deref(), Some("p"));
        assert_eq!(
            backing.get("readerstats:session:recent_views").unwrap().as_deref(),
            Some("s")
        );
        assert_eq!(
            backing.get("readerstats:recent_views").unwrap().as_deref(),
            Some("p")
        );
    }
}
