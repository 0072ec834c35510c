//! # pantry-sync
//!
//! The offline-capable synchronization layer: the externally visible
//! query cache, the per-action mutation coordinator, and the sync engine
//! that drains the pending queue when connectivity returns.

pub mod cache;
pub mod coordinator;
pub mod engine;

pub use cache::ListCache;
pub use coordinator::MutationCoordinator;
pub use engine::SyncEngine;
