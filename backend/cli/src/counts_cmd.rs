//! `readerstats counts`: fetch view counts and show the scaled values.

use anyhow::Result;

use readerstats_analytics::{ResolvedCounts, resolve_counts};
use readerstats_core::ContentId;
use readerstats_i18n::{format_count, forms};

use crate::context::AppContext;
use crate::output::{note_warn, render_rows};

pub async fn run(ctx: &AppContext, content_id: ContentId, live: Option<u64>) -> Result<()> {
    let resolved = resolve_counts(ctx.counts.as_ref(), &content_id).await;
    if resolved.degraded {
        note_warn("Counts unavailable; showing neutral values");
    }
    print!("{}", render(&resolved, live));
    Ok(())
}

pub fn render(resolved: &ResolvedCounts, live: Option<u64>) -> String {
    let views = forms::views();
    let readers = forms::readers();
    let mut rows = vec![
        ("Shown", format_count(to_i64(resolved.display_count()), &views)),
        ("Actual", format_count(to_i64(resolved.counts.actual_count), &views)),
        ("Multiplier", format!("{:.2}", resolved.multiplier.factor())),
    ];
    if let Some(live) = live {
        rows.push((
            "Reading now",
            format_count(to_i64(resolved.scale_live_count(live)), &readers),
        ));
    }
    render_rows(&rows)
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
