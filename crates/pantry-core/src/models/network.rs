//! Derived connectivity state. Not persisted.

use serde::{Deserialize, Serialize};

/// Raw device signals plus the latest active probe result.
///
/// All three are nullable: `None` means "unknown" and must never be
/// treated as `false` by anything except the conservative `is_online`
/// derivation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatus {
    /// Device-level: a network interface is up.
    pub is_connected: Option<bool>,
    /// Device-level: the interface claims internet reachability.
    pub is_internet_reachable: Option<bool>,
    /// Result of the most recent reachability probe of the backend.
    pub is_api_reachable: Option<bool>,
}

impl NetworkStatus {
    /// True only when device connectivity and API reachability are both
    /// confirmed. `None` or `false` anywhere means "not online".
    pub fn is_online(&self) -> bool {
        self.is_connected == Some(true) && self.is_api_reachable == Some(true)
    }

    /// Whether the device reports a usable transport. Probing is pointless
    /// without one.
    pub fn device_connected(&self) -> bool {
        self.is_connected == Some(true)
    }
}
