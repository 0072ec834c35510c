//! MirrorStore: the persisted last-known-good grocery list and counts.
//!
//! Whole-document JSON replacement over the key-value contract. List
//! sizes are tens to low hundreds of items, so simplicity wins over
//! patch semantics. Malformed persisted JSON is treated as "no cache",
//! never as a crash.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use pantry_core::constants::{
    KEY_GROCERY_COUNTS, KEY_GROCERY_ITEMS, KEY_LAST_SYNCED_AT,
};
use pantry_core::errors::PantryResult;
use pantry_core::models::{GroceryCounts, GroceryItem};
use pantry_core::traits::KeyValueStore;

/// Durable mirror of the grocery list, shared with the pending queue
/// through the same underlying store.
pub struct MirrorStore<K> {
    kv: Arc<K>,
}

impl<K> Clone for MirrorStore<K> {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
        }
    }
}

impl<K: KeyValueStore> MirrorStore<K> {
    pub fn new(kv: Arc<K>) -> Self {
        Self { kv }
    }

    /// Replace the mirrored item list. Also stamps the informational
    /// "last synced at" marker.
    pub fn save_items(&self, items: &[GroceryItem]) -> PantryResult<()> {
        let json = serde_json::to_string(items).map_err(pantry_core::errors::StoreError::from)?;
        self.kv.set(KEY_GROCERY_ITEMS, &json)?;
        self.kv
            .set(KEY_LAST_SYNCED_AT, &Utc::now().to_rfc3339())?;
        Ok(())
    }

    /// Last persisted item list, or `None` on first run or corruption.
    pub fn load_items(&self) -> PantryResult<Option<Vec<GroceryItem>>> {
        let Some(raw) = self.kv.get(KEY_GROCERY_ITEMS)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(items) => Ok(Some(items)),
            Err(e) => {
                tracing::warn!("store: discarding corrupt item mirror: {e}");
                Ok(None)
            }
        }
    }

    /// Replace the mirrored aggregate counts.
    pub fn save_counts(&self, counts: &GroceryCounts) -> PantryResult<()> {
        let json = serde_json::to_string(counts).map_err(pantry_core::errors::StoreError::from)?;
        self.kv.set(KEY_GROCERY_COUNTS, &json)
    }

    /// Last persisted counts, or `None` on first run or corruption.
    pub fn load_counts(&self) -> PantryResult<Option<GroceryCounts>> {
        let Some(raw) = self.kv.get(KEY_GROCERY_COUNTS)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(counts) => Ok(Some(counts)),
            Err(e) => {
                tracing::warn!("store: discarding corrupt count mirror: {e}");
                Ok(None)
            }
        }
    }

    /// When the item mirror was last written. UI-informational only,
    /// never used for conflict logic.
    pub fn last_synced_at(&self) -> PantryResult<Option<DateTime<Utc>>> {
        let Some(raw) = self.kv.get(KEY_LAST_SYNCED_AT)? else {
            return Ok(None);
        };
        Ok(DateTime::parse_from_rfc3339(&raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)))
    }

    /// Drop every mirrored document.
    pub fn clear(&self) -> PantryResult<()> {
        self.kv.multi_remove(&[
            KEY_GROCERY_ITEMS,
            KEY_GROCERY_COUNTS,
            KEY_LAST_SYNCED_AT,
        ])
    }
}
