use async_trait::async_trait;

use crate::error::StatsResult;
use crate::event::PresenceEvent;
use crate::types::{ContentId, PresenceEntry, ViewCounts, ViewEvent};

/// Local durable key-value storage holding string values.
///
/// Access is synchronous and local; implementations must not block on network.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> StatsResult<Option<String>>;

    /// Insert or replace the value under `key`.
    fn set(&self, key: &str, value: &str) -> StatsResult<()>;

    /// Delete the value under `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> StatsResult<()>;
}

/// Authoritative source of view counts.
#[async_trait]
pub trait CountSource: Send + Sync {
    /// Fetch actual and display counts for one content id.
    async fn fetch_counts(&self, content_id: &ContentId) -> StatsResult<ViewCounts>;
}

/// Destination that persists view events.
#[async_trait]
pub trait ViewSink: Send + Sync {
    async fn record(&self, event: &ViewEvent) -> StatsResult<()>;
}

/// Publish/subscribe presence primitive keyed by channel name.
#[async_trait]
pub trait PresenceTransport: Send + Sync {
    /// Open a channel. The first event delivered is `Subscribed` once
    /// the transport confirms the subscription.
    async fn open(&self, channel: &str) -> StatsResult<Box<dyn PresenceChannel>>;
}

/// One open presence channel, owned by a single subscriber.
#[async_trait]
pub trait PresenceChannel: Send {
    /// Next event, or `None` once the channel is gone.
    async fn next_event(&mut self) -> Option<PresenceEvent>;

    /// Announce this client's presence.
    async fn track(&mut self, entry: PresenceEntry) -> StatsResult<()>;

    /// Withdraw this client's presence.
    async fn untrack(&mut self) -> StatsResult<()>;

    /// Release the channel. No events are delivered afterwards.
    async fn release(self: Box<Self>);
}
