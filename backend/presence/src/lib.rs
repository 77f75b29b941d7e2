//! Live reader presence for readerstats.
//!
//! `reducer` holds the pure state machine, `counter` the subscription shell
//! that drives it, and `hub` an in-process presence transport.

pub mod counter;
pub mod hub;
pub mod reducer;

pub use counter::{LiveCount, PresenceCounter};
pub use hub::LocalPresenceHub;
pub use reducer::{PresencePhase, PresenceSnapshot, reduce};
