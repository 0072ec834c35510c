//! Trait seams consumed across the workspace.

pub mod api;
pub mod kv;

pub use api::{GroceryApi, HealthProbe};
pub use kv::KeyValueStore;
