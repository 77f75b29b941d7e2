//! `readerstats live`: drive an in-process presence hub and watch the count.
//!
//! Starts `peers` other readers plus this one on the content channel, then
//! lets the peers leave one at a time.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::time::timeout;
use tracing::info;

use readerstats_analytics::resolve_counts;
use readerstats_core::ContentId;
use readerstats_i18n::{format_count, forms};
use readerstats_presence::{LiveCount, LocalPresenceHub, PresenceCounter};

use crate::context::AppContext;
use crate::output::{dim, note_info};

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn run(ctx: &AppContext, content_id: ContentId, peers: usize) -> Result<()> {
    let resolved = resolve_counts(ctx.counts.as_ref(), &content_id).await;
    let readers = forms::readers();
    let hub = LocalPresenceHub::new();
    let counter = PresenceCounter::new(Arc::new(hub.clone()))
        .with_channel_prefix(ctx.config.channel_prefix());

    note_info(&format!(
        "Watching {} with {peers} other reader(s)",
        presence_label(&counter, &content_id)
    ));
    let observed = simulate(&counter, &content_id, peers, |count| {
        let shown = resolved.scale_live_count(count as u64);
        println!(
            "  {} {}",
            format_count(i64::try_from(shown).unwrap_or(i64::MAX), &readers),
            dim(&format!("(connected: {count})"))
        );
    })
    .await?;
    info!(%content_id, steps = observed.len(), "Live simulation finished");
    Ok(())
}

fn presence_label(counter: &PresenceCounter, content_id: &ContentId) -> String {
    format!("'{}'", counter.channel_name(content_id))
}

/// Join `peers` readers, then this one, then remove the peers one by one.
/// Reports every synced count seen by this reader and returns them.
pub async fn simulate(
    counter: &PresenceCounter,
    content_id: &ContentId,
    peers: usize,
    mut report: impl FnMut(usize),
) -> Result<Vec<usize>> {
    let mut others: Vec<LiveCount> = (0..peers)
        .map(|_| counter.subscribe(content_id.clone()))
        .collect();
    let mut me = counter.subscribe(content_id.clone());
    let mut observed = Vec::with_capacity(peers + 1);

    let mut expected = peers + 1;
    loop {
        let count = wait_synced(&mut me, expected).await?;
        report(count);
        observed.push(count);
        let Some(peer) = others.pop() else { break };
        peer.dispose().await;
        expected -= 1;
    }

    me.dispose().await;
    Ok(observed)
}

async fn wait_synced(live: &mut LiveCount, expected: usize) -> Result<usize> {
    let snapshot = timeout(
        STEP_TIMEOUT,
        live.wait_for(|s| s.is_synced() && s.count == expected),
    )
    .await
    .map_err(|_| anyhow!("timed out waiting for {expected} reader(s) on {}", live.channel()))?
    .ok_or_else(|| anyhow!("presence subscription on {} ended", live.channel()))?;
    Ok(snapshot.count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulate_counts_up_then_down() {
        let hub = LocalPresenceHub::new();
        let counter = PresenceCounter::new(Arc::new(hub.clone()));
        let id = ContentId::new("abc");
        let mut seen = Vec::new();
        let observed = simulate(&counter, &id, 2, |c| seen.push(c)).await.unwrap();
        assert_eq!(observed, vec![3, 2, 1]);
        assert_eq!(seen, observed);
        assert_eq!(hub.member_count("content:abc"), 0);
    }

    #[tokio::test]
    async fn test_simulate_alone() {
        let counter = PresenceCounter::new(Arc::new(LocalPresenceHub::new()));
        let observed = simulate(&counter, &"solo".into(), 0, |_| {}).await.unwrap();
        assert_eq!(observed, vec![1]);
    }
}
