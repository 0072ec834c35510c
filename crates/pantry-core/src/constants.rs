/// Pantry system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Storage key for the mirrored grocery item list.
pub const KEY_GROCERY_ITEMS: &str = "grocery_list_items";

/// Storage key for the mirrored aggregate counts.
pub const KEY_GROCERY_COUNTS: &str = "grocery_list_counts";

/// Storage key for the pending action queue.
pub const KEY_PENDING_ACTIONS: &str = "grocery_pending_actions";

/// Storage key for the informational "last synced at" marker.
pub const KEY_LAST_SYNCED_AT: &str = "grocery_last_synced_at";

/// Prefix that marks a client-generated provisional item id.
pub const TEMP_ID_PREFIX: &str = "temp_";

pub mod defaults {
    /// Seconds between reachability probes while device connectivity holds.
    pub const PROBE_INTERVAL_SECS: u64 = 30;

    /// Per-probe timeout. A hung probe must not block the next one.
    pub const PROBE_TIMEOUT_SECS: u64 = 5;

    /// Timeout for user-facing mutation calls on constrained mobile networks.
    pub const REQUEST_TIMEOUT_SECS: u64 = 15;

    /// Default backend base URL.
    pub const BASE_URL: &str = "http://localhost:8080";
}
