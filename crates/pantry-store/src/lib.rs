//! # pantry-store
//!
//! Durable local state for the grocery list: a SQLite-backed key-value
//! store, the mirrored last-known-good list and counts, the local
//! mutation applier, and the pending action queue.

pub mod applier;
pub mod kv;
pub mod mirror;
pub mod queue;

pub use kv::SqliteKv;
pub use mirror::MirrorStore;
pub use queue::PendingQueue;
