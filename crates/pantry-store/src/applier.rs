//! Local mutation applier: one user action applied to the mirrored list.
//!
//! The pure transformations operate on a plain `Vec<GroceryItem>`; the
//! `apply_*` wrappers on [`MirrorStore`] read the whole mirror, transform,
//! recompute counts via `GroceryCounts::of`, and persist. None of them
//! contact the network.

use pantry_core::errors::PantryResult;
use pantry_core::models::{GroceryCounts, GroceryItem};
use pantry_core::traits::KeyValueStore;

use crate::mirror::MirrorStore;

/// Flip `checked` on the matching item. Returns the new checked state,
/// or `None` when the id is absent (a no-op).
pub fn toggle_in(items: &mut [GroceryItem], id: &str) -> Option<bool> {
    let item = items.iter_mut().find(|i| i.id == id)?;
    item.checked = !item.checked;
    Some(item.checked)
}

/// Remove the matching item. Returns it when something was removed.
pub fn delete_in(items: &mut Vec<GroceryItem>, id: &str) -> Option<GroceryItem> {
    let idx = items.iter().position(|i| i.id == id)?;
    Some(items.remove(idx))
}

/// Prepend a new item (user-added items are newest first).
pub fn add_in(items: &mut Vec<GroceryItem>, item: GroceryItem) {
    items.insert(0, item);
}

/// Remove all checked items. Returns how many were removed.
pub fn clear_checked_in(items: &mut Vec<GroceryItem>) -> usize {
    let before = items.len();
    items.retain(|i| !i.checked);
    before - items.len()
}

/// Rewrite the id field on the matching item only. No other field changes.
pub fn replace_id_in(items: &mut [GroceryItem], temp_id: &str, real_id: &str) -> bool {
    match items.iter_mut().find(|i| i.id == temp_id) {
        Some(item) => {
            item.id = real_id.to_string();
            true
        }
        None => false,
    }
}

impl<K: KeyValueStore> MirrorStore<K> {
    fn read_modify_write<F>(&self, f: F) -> PantryResult<Vec<GroceryItem>>
    where
        F: FnOnce(&mut Vec<GroceryItem>),
    {
        let mut items = self.load_items()?.unwrap_or_default();
        f(&mut items);
        self.save_items(&items)?;
        self.save_counts(&GroceryCounts::of(&items))?;
        Ok(items)
    }

    /// Flip `checked` on one item; no-op if not found.
    pub fn apply_toggle(&self, id: &str) -> PantryResult<Vec<GroceryItem>> {
        self.read_modify_write(|items| {
            if toggle_in(items, id).is_none() {
                tracing::debug!("store: toggle target {id} not in mirror");
            }
        })
    }

    /// Remove one item.
    pub fn apply_delete(&self, id: &str) -> PantryResult<Vec<GroceryItem>> {
        self.read_modify_write(|items| {
            delete_in(items, id);
        })
    }

    /// Prepend a locally synthesized item.
    pub fn apply_add(&self, item: GroceryItem) -> PantryResult<Vec<GroceryItem>> {
        self.read_modify_write(|items| add_in(items, item))
    }

    /// Prepend several locally synthesized items (recipe add).
    pub fn apply_add_many(&self, new_items: Vec<GroceryItem>) -> PantryResult<Vec<GroceryItem>> {
        self.read_modify_write(|items| {
            for item in new_items.into_iter().rev() {
                add_in(items, item);
            }
        })
    }

    /// Remove all checked items.
    pub fn apply_clear_checked(&self) -> PantryResult<Vec<GroceryItem>> {
        self.read_modify_write(|items| {
            clear_checked_in(items);
        })
    }

    /// Empty the list and zero the counts.
    pub fn apply_clear_all(&self) -> PantryResult<Vec<GroceryItem>> {
        self.read_modify_write(|items| items.clear())
    }

    /// Rewrite a temp id to the server-assigned id.
    pub fn replace_temp_id(&self, temp_id: &str, real_id: &str) -> PantryResult<Vec<GroceryItem>> {
        self.read_modify_write(|items| {
            if !replace_id_in(items, temp_id, real_id) {
                tracing::debug!("store: temp id {temp_id} not in mirror");
            }
        })
    }
}
