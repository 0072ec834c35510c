/// Server and transport errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {reason}")]
    Network { reason: String },

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("http {status}: {message}")]
    Http { status: u16, message: String },

    #[error("decode error: {reason}")]
    Decode { reason: String },
}
