use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a piece of content (article, course, tool page).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ContentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single qualifying page visit. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewEvent {
    pub content_id: ContentId,
    pub session_id: String,
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ViewEvent {
    pub fn new(
        content_id: ContentId,
        session_id: impl Into<String>,
        user_id: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            content_id,
            session_id: session_id.into(),
            user_id,
            timestamp,
        }
    }
}

/// Grammatical forms of a Lithuanian noun, one per plural category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluralForms {
    pub one: String,
    pub few: String,
    pub many: String,
}

impl PluralForms {
    pub fn new(one: impl Into<String>, few: impl Into<String>, many: impl Into<String>) -> Self {
        Self {
            one: one.into(),
            few: few.into(),
            many: many.into(),
        }
    }
}

/// Authoritative counts for one content id as served by the backend.
///
/// `display_count` is precomputed server-side with an opaque factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCounts {
    pub actual_count: u64,
    pub display_count: u64,
}

/// One connected viewer on a content channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    pub content_id: ContentId,
    pub connection_key: String,
    pub joined_at: DateTime<Utc>,
}

impl PresenceEntry {
    /// Build an entry for this client with a fresh connection key.
    pub fn for_content(content_id: ContentId) -> Self {
        Self {
            content_id,
            connection_key: Uuid::new_v4().to_string(),
            joined_at: Utc::now(),
        }
    }
}

/// Channel name used for presence on a given content id.
pub fn presence_channel_name(prefix: &str, content_id: &ContentId) -> String {
    format!("{}{}", prefix, content_id)
}

/// Default presence channel prefix.
pub const DEFAULT_CHANNEL_PREFIX: &str = "content:";

/// Default prefix on every locally stored key.
pub const DEFAULT_KEY_PREFIX: &str = "readerstats:";
