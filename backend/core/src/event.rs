use serde::{Deserialize, Serialize};

use crate::types::PresenceEntry;

/// Events a presence channel delivers to its subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PresenceEvent {
    /// The transport confirmed the subscription.
    Subscribed,
    /// Full membership snapshot.
    Sync { members: Vec<PresenceEntry> },
    /// One or more members joined.
    Join { joined: Vec<PresenceEntry> },
    /// One or more members left.
    Leave { left: Vec<PresenceEntry> },
    /// The channel failed; no further events follow.
    ChannelError { message: String },
    /// The channel was closed by the transport.
    Closed,
}

impl std::fmt::Display for PresenceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PresenceEvent::Subscribed => "subscribed",
            PresenceEvent::Sync { .. } => "sync",
            PresenceEvent::Join { .. } => "join",
            PresenceEvent::Leave { .. } => "leave",
            PresenceEvent::ChannelError { .. } => "channel_error",
            PresenceEvent::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}
