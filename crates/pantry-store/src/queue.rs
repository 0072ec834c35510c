//! PendingQueue: the durable FIFO log of not-yet-synced mutations.
//!
//! Lives only while offline, or for the brief window after reconnecting
//! before the sync engine has drained it. Enqueueing an action that
//! targets a temp id is compacted against the queued add that created it,
//! so a delete of a never-synced item cancels out locally instead of ever
//! reaching the server.

use std::sync::Arc;

use pantry_core::constants::KEY_PENDING_ACTIONS;
use pantry_core::errors::PantryResult;
use pantry_core::ids::is_temp_id;
use pantry_core::models::{GroceryAction, PendingAction};
use pantry_core::traits::KeyValueStore;

/// Durable, ordered action log over the key-value contract.
pub struct PendingQueue<K> {
    kv: Arc<K>,
}

impl<K> Clone for PendingQueue<K> {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
        }
    }
}

impl<K: KeyValueStore> PendingQueue<K> {
    pub fn new(kv: Arc<K>) -> Self {
        Self { kv }
    }

    fn load(&self) -> PantryResult<Vec<PendingAction>> {
        let Some(raw) = self.kv.get(KEY_PENDING_ACTIONS)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!("queue: discarding corrupt pending queue: {e}");
                Ok(Vec::new())
            }
        }
    }

    fn persist(&self, entries: &[PendingAction]) -> PantryResult<()> {
        let json =
            serde_json::to_string(entries).map_err(pantry_core::errors::StoreError::from)?;
        self.kv.set(KEY_PENDING_ACTIONS, &json)
    }

    /// Append an action with a fresh queue id and timestamp.
    ///
    /// Actions targeting a temp id are first compacted against the queued
    /// add that created the item; when the compaction fully absorbs the
    /// action, nothing is appended and `None` is returned.
    pub fn enqueue(&self, action: GroceryAction) -> PantryResult<Option<PendingAction>> {
        let mut entries = self.load()?;

        if let Some(target) = action.target_id() {
            if is_temp_id(target) {
                let target = target.to_string();
                match &action {
                    GroceryAction::DeleteItem { .. } => {
                        if cancel_queued_add(&mut entries, &target) {
                            tracing::debug!("queue: delete of {target} cancelled its queued add");
                            self.persist(&entries)?;
                            return Ok(None);
                        }
                    }
                    GroceryAction::ToggleItem { .. } => {
                        if fold_toggle_into_add(&mut entries, &target) {
                            tracing::debug!("queue: toggle of {target} folded into queued add");
                            self.persist(&entries)?;
                            return Ok(None);
                        }
                    }
                    _ => {}
                }
            }
        }

        let entry = PendingAction::new(action);
        tracing::debug!("queue: enqueued {} ({})", entry.action.kind(), entry.id);
        entries.push(entry.clone());
        self.persist(&entries)?;
        Ok(Some(entry))
    }

    /// Read the full ordered queue without removing anything.
    pub fn dequeue_all(&self) -> PantryResult<Vec<PendingAction>> {
        self.load()
    }

    /// Remove one entry by its queue id (not the underlying business id).
    pub fn remove(&self, pending_id: &str) -> PantryResult<()> {
        let mut entries = self.load()?;
        entries.retain(|e| e.id != pending_id);
        self.persist(&entries)
    }

    /// Rewrite temp-id references in queued entries after a promotion.
    pub fn replace_temp_id(&self, temp_id: &str, real_id: &str) -> PantryResult<()> {
        let mut entries = self.load()?;
        let mut changed = false;
        for entry in &mut entries {
            match &mut entry.action {
                GroceryAction::ToggleItem { id } | GroceryAction::DeleteItem { id }
                    if id == temp_id =>
                {
                    *id = real_id.to_string();
                    changed = true;
                }
                _ => {}
            }
        }
        if changed {
            self.persist(&entries)?;
        }
        Ok(())
    }

    /// Empty the queue. Used only after a full successful drain, never as
    /// a general discard, so user intent is never silently lost.
    pub fn clear(&self) -> PantryResult<()> {
        self.kv.remove(KEY_PENDING_ACTIONS)
    }

    /// Cheap existence check for the "unsynced changes" indicator.
    pub fn has_pending(&self) -> PantryResult<bool> {
        Ok(!self.load()?.is_empty())
    }

    /// Number of queued entries.
    pub fn len(&self) -> PantryResult<usize> {
        Ok(self.load()?.len())
    }

    /// Whether the queue holds a not-yet-synced add for this temp id.
    pub fn has_queued_add(&self, temp_id: &str) -> PantryResult<bool> {
        Ok(self.load()?.iter().any(|e| add_creates(&e.action, temp_id)))
    }
}

fn add_creates(action: &GroceryAction, temp_id: &str) -> bool {
    match action {
        GroceryAction::AddItem { temp_id: t, .. } => t == temp_id,
        GroceryAction::AddFromRecipe { temp_ids, .. } => {
            temp_ids.iter().any(|t| t == temp_id)
        }
        _ => false,
    }
}

/// Remove the queued add that created `temp_id`. For a recipe add, only
/// the matching item is removed; the entry disappears when it empties.
fn cancel_queued_add(entries: &mut Vec<PendingAction>, temp_id: &str) -> bool {
    for idx in 0..entries.len() {
        match &mut entries[idx].action {
            GroceryAction::AddItem { temp_id: t, .. } if t == temp_id => {
                entries.remove(idx);
                return true;
            }
            GroceryAction::AddFromRecipe {
                items, temp_ids, ..
            } => {
                if let Some(pos) = temp_ids.iter().position(|t| t == temp_id) {
                    items.remove(pos);
                    temp_ids.remove(pos);
                    if items.is_empty() {
                        entries.remove(idx);
                    }
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

/// Flip `checked` inside the queued add so the replayed create carries the
/// final state and no toggle for a temp id is ever queued.
fn fold_toggle_into_add(entries: &mut [PendingAction], temp_id: &str) -> bool {
    for entry in entries.iter_mut() {
        match &mut entry.action {
            GroceryAction::AddItem { item, temp_id: t } if t == temp_id => {
                item.checked = !item.checked;
                return true;
            }
            GroceryAction::AddFromRecipe {
                items, temp_ids, ..
            } => {
                if let Some(pos) = temp_ids.iter().position(|t| t == temp_id) {
                    items[pos].checked = !items[pos].checked;
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}
