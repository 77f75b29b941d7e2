//! In-process presence hub.
//!
//! A `PresenceTransport` over `tokio::sync::broadcast`, one broadcast channel
//! per presence channel name. Tracking broadcasts a `Join` followed by a full
//! `Sync`; untracking (or dropping the handle) broadcasts `Leave` + `Sync`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use readerstats_core::{
    PresenceChannel, PresenceEntry, PresenceEvent, PresenceTransport, StatsError, StatsResult,
};

/// Default per-channel broadcast buffer.
const DEFAULT_CAPACITY: usize = 64;

struct HubChannel {
    members: BTreeMap<String, PresenceEntry>,
    tx: broadcast::Sender<PresenceEvent>,
}

impl HubChannel {
    fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            members: BTreeMap::new(),
            tx,
        }
    }

    fn snapshot(&self) -> Vec<PresenceEntry> {
        self.members.values().cloned().collect()
    }

    fn publish(&self, event: PresenceEvent) {
        // No receivers is fine.
        let _ = self.tx.send(event);
    }
}

#[derive(Clone)]
pub struct LocalPresenceHub {
    channels: Arc<Mutex<HashMap<String, HubChannel>>>,
    capacity: usize,
}

impl LocalPresenceHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Members currently tracked on `channel`.
    pub fn member_count(&self, channel: &str) -> usize {
        self.channels
            .lock()
            .ok()
            .and_then(|c| c.get(channel).map(|ch| ch.members.len()))
            .unwrap_or(0)
    }

    /// Channels that currently exist in the hub.
    pub fn channel_count(&self) -> usize {
        self.channels.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn with_channel<T>(&self, name: &str, f: impl FnOnce(&mut HubChannel) -> T) -> StatsResult<T> {
        let mut channels = self.channels.lock().map_err(|_| StatsError::Presence {
            channel: name.to_string(),
            message: "hub lock poisoned".into(),
        })?;
        let capacity = self.capacity;
        let channel = channels
            .entry(name.to_string())
            .or_insert_with(|| HubChannel::new(capacity));
        Ok(f(channel))
    }

    fn leave(&self, name: &str, key: &str) {
        let Ok(mut channels) = self.channels.lock() else {
            return;
        };
        if let Some(channel) = channels.get_mut(name) {
            if let Some(entry) = channel.members.remove(key) {
                channel.publish(PresenceEvent::Leave { left: vec![entry] });
                channel.publish(PresenceEvent::Sync {
                    members: channel.snapshot(),
                });
                debug!(channel = name, members = channel.members.len(), "Presence left");
            }
        }
    }

    fn drop_if_idle(&self, name: &str) {
        let Ok(mut channels) = self.channels.lock() else {
            return;
        };
        let idle = channels
            .get(name)
            .map(|c| c.members.is_empty() && c.tx.receiver_count() == 0)
            .unwrap_or(false);
        if idle {
            channels.remove(name);
            debug!(channel = name, "Presence channel removed");
        }
    }
}

impl Default for LocalPresenceHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PresenceTransport for LocalPresenceHub {
    async fn open(&self, channel: &str) -> StatsResult<Box<dyn PresenceChannel>> {
        let rx = self.with_channel(channel, |c| c.tx.subscribe())?;
        info!(channel, "Presence channel opened");
        Ok(Box::new(LocalChannel {
            hub: self.clone(),
            name: channel.to_string(),
            rx: Some(rx),
            confirmed: false,
            initial_sync: true,
            own_key: None,
        }))
    }
}

struct LocalChannel {
    hub: LocalPresenceHub,
    name: String,
    rx: Option<broadcast::Receiver<PresenceEvent>>,
    confirmed: bool,
    initial_sync: bool,
    own_key: Option<String>,
}

impl LocalChannel {
    fn current_sync(&self) -> Option<PresenceEvent> {
        self.hub
            .with_channel(&self.name, |c| PresenceEvent::Sync {
                members: c.snapshot(),
            })
            .ok()
    }

    fn leave(&mut self) {
        if let Some(key) = self.own_key.take() {
            self.hub.leave(&self.name, &key);
        }
    }

    /// Leave, stop receiving, and drop the hub channel if nobody else uses it.
    fn disconnect(&mut self) {
        self.leave();
        self.rx = None;
        self.hub.drop_if_idle(&self.name);
    }
}

#[async_trait]
impl PresenceChannel for LocalChannel {
    async fn next_event(&mut self) -> Option<PresenceEvent> {
        if !self.confirmed {
            self.confirmed = true;
            return Some(PresenceEvent::Subscribed);
        }
        if self.initial_sync {
            self.initial_sync = false;
            if let Some(sync) = self.current_sync() {
                return Some(sync);
            }
        }

        let rx = self.rx.as_mut()?;
        match rx.recv().await {
            Ok(event) => Some(event),
            Err(RecvError::Lagged(missed)) => {
                warn!(channel = %self.name, missed, "Presence receiver lagged; resyncing");
                self.current_sync()
            }
            Err(RecvError::Closed) => None,
        }
    }

    async fn track(&mut self, entry: PresenceEntry) -> StatsResult<()> {
        let key = entry.connection_key.clone();
        self.hub.with_channel(&self.name, |c| {
            c.members.insert(key.clone(), entry.clone());
            c.publish(PresenceEvent::Join {
                joined: vec![entry],
            });
            c.publish(PresenceEvent::Sync {
                members: c.snapshot(),
            });
        })?;
        debug!(channel = %self.name, "Presence tracked");
        self.own_key = Some(key);
        Ok(())
    }

    async fn untrack(&mut self) -> StatsResult<()> {
        self.leave();
        Ok(())
    }

    async fn release(mut self: Box<Self>) {
        self.disconnect();
        debug!(channel = %self.name, "Presence channel released");
    }
}

impl Drop for LocalChannel {
    fn drop(&mut self) {
        // Disconnect without release: the transport still cleans up.
        self.disconnect();
    }
}
