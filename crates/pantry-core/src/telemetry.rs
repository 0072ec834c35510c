//! Tracing subscriber setup shared by binaries and integration harnesses.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber. Filter comes from `PANTRY_LOG`
/// (falls back to `info`). Safe to call more than once; later calls are
/// no-ops.
pub fn init_telemetry() {
    let filter = EnvFilter::try_from_env("PANTRY_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
