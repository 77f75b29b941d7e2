//! Local key-value storage backends for readerstats.
//!
//! Provides an in-memory store, a SQLite-backed durable store, and a
//! namespacing wrapper that applies the application key prefix.

pub mod memory;
pub mod namespaced;
pub mod sqlite;

pub use memory::MemoryStore;
pub use namespaced::{DEFAULT_PREFIX, NamespacedStore, StoreScope};
pub use sqlite::SqliteStore;
