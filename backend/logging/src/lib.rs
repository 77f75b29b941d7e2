//! Telemetry and structured logging for readerstats.
//!
//! Handles subscriber setup (console + rolling NDJSON file), identifier
//! redaction, and typed stats event logging.

pub mod logger;
pub mod redact;
pub mod stats_events;

pub use logger::init_logger;
pub use redact::{mask_identifier, redact_sensitive_data};
pub use stats_events::{StatsEvent, StatsEventLogger, StatsLogEntry};
