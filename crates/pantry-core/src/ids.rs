//! Provisional identifiers for items created while offline.
//!
//! A temp id exists only until the sync engine persists the item
//! server-side; every occurrence is then rewritten to the server id.
//! A temp id must never be sent to the server.

use crate::constants::TEMP_ID_PREFIX;

/// Generate a fresh client-side provisional item id.
pub fn temp_id() -> String {
    format!("{TEMP_ID_PREFIX}{}", uuid::Uuid::new_v4())
}

/// Whether `id` is a client-generated provisional id.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Generate a queue-entry id (unique within the pending queue).
pub fn pending_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
