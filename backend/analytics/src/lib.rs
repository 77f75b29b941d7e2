//! View analytics for readerstats.
//!
//! - `dedup`: time-windowed suppression of repeat views
//! - `recorder`: session id, dedup check, and persistence of view events
//! - `multiplier`: display-count ratio applied to live counts
//! - `http`: REST client for the hosted backend

pub mod dedup;
pub mod http;
pub mod multiplier;
pub mod recorder;

pub use dedup::{DEFAULT_DEDUP_WINDOW, RECENT_VIEWS_KEY, RecentViewCache, ViewDedupGuard};
pub use http::HttpBackend;
pub use multiplier::{DisplayMultiplier, ResolvedCounts, resolve_counts};
pub use recorder::{LogViewSink, RecordOutcome, SESSION_ID_KEY, ViewRecorder};
