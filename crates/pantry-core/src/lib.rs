//! # pantry-core
//!
//! Foundation crate for the Pantry grocery sync engine.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod ids;
pub mod models;
pub mod telemetry;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::PantryConfig;
pub use errors::{PantryError, PantryResult};
pub use models::{
    GroceryAction, GroceryCounts, GroceryItem, NetworkStatus, NewItemInput, PendingAction,
    SyncReport,
};
