//! Error types: per-domain enums plus the umbrella `PantryError`.

mod api_error;
mod store_error;

pub use api_error::ApiError;
pub use store_error::StoreError;

/// Convenience alias used across the workspace.
pub type PantryResult<T> = Result<T, PantryError>;

/// Umbrella error for all subsystems.
#[derive(Debug, thiserror::Error)]
pub enum PantryError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("api error: {0}")]
    Api(#[from] ApiError),

    #[error("config error: {reason}")]
    Config { reason: String },
}

impl PantryError {
    /// Whether this error is a stale-target ("not found") server response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PantryError::Api(ApiError::NotFound { .. }))
    }
}
