//! Live presence counter.
//!
//! Each subscription runs one task that owns its channel and its snapshot.
//! Events go through [`reduce`]; the result is published on a `watch`
//! channel that the [`LiveCount`] handle reads.

use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use readerstats_core::{
    ContentId, DEFAULT_CHANNEL_PREFIX, PresenceEntry, PresenceEvent, PresenceTransport,
    presence_channel_name,
};
use readerstats_logging::{StatsEvent, StatsEventLogger};

use crate::reducer::{PresencePhase, PresenceSnapshot, reduce};

/// Opens live-count subscriptions against a presence transport.
#[derive(Clone)]
pub struct PresenceCounter {
    transport: Arc<dyn PresenceTransport>,
    channel_prefix: String,
}

impl PresenceCounter {
    pub fn new(transport: Arc<dyn PresenceTransport>) -> Self {
        Self {
            transport,
            channel_prefix: DEFAULT_CHANNEL_PREFIX.to_string(),
        }
    }

    pub fn with_channel_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.channel_prefix = prefix.into();
        self
    }

    pub fn channel_name(&self, content_id: &ContentId) -> String {
        presence_channel_name(&self.channel_prefix, content_id)
    }

    /// Start tracking readers of `content_id`. Must be called inside a tokio runtime.
    pub fn subscribe(&self, content_id: ContentId) -> LiveCount {
        let channel = self.channel_name(&content_id);
        let (tx, rx) = watch::channel(PresenceSnapshot::joining());
        let (stop_tx, stop_rx) = oneshot::channel();

        let task = tokio::spawn(run_subscription(
            self.transport.clone(),
            channel.clone(),
            content_id,
            tx,
            stop_rx,
        ));

        LiveCount {
            channel,
            rx,
            stop: Some(stop_tx),
            task: Some(task),
        }
    }
}

/// Handle to one live subscription.
pub struct LiveCount {
    channel: String,
    rx: watch::Receiver<PresenceSnapshot>,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl LiveCount {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Current number of readers (last known value).
    pub fn count(&self) -> usize {
        self.rx.borrow().count
    }

    pub fn snapshot(&self) -> PresenceSnapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next published snapshot. False once the subscription ended.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait until a snapshot satisfies `pred`. `None` if the subscription
    /// ended first without one doing so.
    pub async fn wait_for(
        &mut self,
        mut pred: impl FnMut(&PresenceSnapshot) -> bool,
    ) -> Option<PresenceSnapshot> {
        loop {
            {
                let snapshot = self.rx.borrow_and_update();
                if pred(&snapshot) {
                    return Some(snapshot.clone());
                }
            }
            if self.rx.changed().await.is_err() {
                let snapshot = self.rx.borrow();
                return pred(&snapshot).then(|| snapshot.clone());
            }
        }
    }

    /// Stop tracking: untrack, release the channel, and return once no
    /// further updates can be published.
    pub async fn dispose(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(channel = %self.channel, error = %e, "Presence task ended abnormally");
            }
        }
        debug!(channel = %self.channel, "Presence subscription disposed");
    }
}

impl Drop for LiveCount {
    fn drop(&mut self) {
        // Dropping the stop sender wakes the task, which then cleans up.
        self.stop.take();
    }
}

async fn run_subscription(
    transport: Arc<dyn PresenceTransport>,
    channel_name: String,
    content_id: ContentId,
    tx: watch::Sender<PresenceSnapshot>,
    mut stop: oneshot::Receiver<()>,
) {
    let mut snapshot = PresenceSnapshot::joining();

    let opened = tokio::select! {
        biased;
        _ = &mut stop => return,
        opened = transport.open(&channel_name) => opened,
    };

    let mut channel = match opened {
        Ok(channel) => channel,
        Err(e) => {
            let message = e.to_string();
            StatsEventLogger::log_event(
                content_id.as_str(),
                StatsEvent::PresenceFailed {
                    channel: channel_name.clone(),
                    reason: message.clone(),
                },
            );
            snapshot = reduce(snapshot, &PresenceEvent::ChannelError { message });
            tx.send_replace(snapshot);
            return;
        }
    };

    let mut tracked = false;
    loop {
        let event = tokio::select! {
            biased;
            _ = &mut stop => break,
            event = channel.next_event() => event,
        };
        let event = event.unwrap_or(PresenceEvent::Closed);
        let previous = snapshot.count;
        snapshot = reduce(snapshot, &event);

        if snapshot.phase == PresencePhase::Tracking && !tracked {
            match channel.track(PresenceEntry::for_content(content_id.clone())).await {
                Ok(()) => tracked = true,
                Err(e) => {
                    warn!(channel = %channel_name, error = %e, "Failed to announce presence");
                }
            }
        }

        if let PresenceEvent::ChannelError { message } = &event {
            StatsEventLogger::log_event(
                content_id.as_str(),
                StatsEvent::PresenceFailed {
                    channel: channel_name.clone(),
                    reason: message.clone(),
                },
            );
        }
        if snapshot.count != previous {
            StatsEventLogger::log_event(
                content_id.as_str(),
                StatsEvent::PresenceCount {
                    channel: channel_name.clone(),
                    count: snapshot.count,
                },
            );
        }

        let finished = matches!(event, PresenceEvent::ChannelError { .. } | PresenceEvent::Closed);
        tx.send_replace(snapshot.clone());
        if finished {
            break;
        }
    }

    if tracked {
        if let Err(e) = channel.untrack().await {
            warn!(channel = %channel_name, error = %e, "Failed to withdraw presence");
        }
    }
    channel.release().await;
}
