//! `readerstats view` and `readerstats end-session`.

use anyhow::Result;
use chrono::{DateTime, Utc};

use readerstats_analytics::{RECENT_VIEWS_KEY, RecordOutcome, SESSION_ID_KEY};
use readerstats_core::ContentId;

use crate::context::AppContext;
use crate::output::{dim, note_info, note_success, note_warn};

pub async fn run(ctx: &AppContext, content_id: ContentId, user: Option<String>) -> Result<()> {
    let recorder = ctx.recorder();
    let now = Utc::now();
    let outcome = recorder.record_view(&content_id, user.as_deref(), now).await;
    print_outcome(ctx, &content_id, &outcome, now);
    Ok(())
}

fn print_outcome(
    ctx: &AppContext,
    content_id: &ContentId,
    outcome: &RecordOutcome,
    now: DateTime<Utc>,
) {
    match outcome {
        RecordOutcome::Recorded(event) => {
            let target = if ctx.has_backend { "backend" } else { "log only" };
            note_success(&format!("View of '{content_id}' recorded ({target})"));
            println!("  {}", dim(&format!("session {}", event.session_id)));
        }
        RecordOutcome::Suppressed => {
            let window = ctx.config.dedup_window_minutes();
            let ago = ctx
                .dedup_guard()
                .last_seen(content_id)
                .map(|ms| (now.timestamp_millis() - ms).max(0) / 60_000);
            let detail = match ago {
                Some(m) => format!("last recorded {m} min ago"),
                None => "recently recorded".to_string(),
            };
            note_info(&format!(
                "View of '{content_id}' not recorded: {detail}, window is {window} min"
            ));
        }
        RecordOutcome::Failed(reason) => {
            note_warn(&format!("View of '{content_id}' could not be recorded: {reason}"));
        }
    }
}

/// Forget this session: its id and the recently-viewed list.
pub fn end_session(ctx: &AppContext) -> Result<()> {
    ctx.session_store.remove(SESSION_ID_KEY)?;
    ctx.session_store.remove(RECENT_VIEWS_KEY)?;
    note_success("Session ended; the next view starts a new session");
    Ok(())
}
