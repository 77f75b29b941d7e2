pub mod error;
pub mod event;
pub mod traits;
pub mod types;

pub use error::{StatsError, StatsResult};
pub use event::PresenceEvent;
pub use traits::{CountSource, KeyValueStore, PresenceChannel, PresenceTransport, ViewSink};
pub use types::{
    presence_channel_name, ContentId, PluralForms, PresenceEntry, ViewCounts, ViewEvent,
    DEFAULT_CHANNEL_PREFIX, DEFAULT_KEY_PREFIX,
};
