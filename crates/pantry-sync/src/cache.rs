//! ListCache: the externally visible grocery list and counts.
//!
//! Screens read this as "the grocery list"; it tracks what is confirmed
//! or optimistically assumed, while the mirror store tracks what the user
//! asked for. Every optimistic update is applied as a function of current
//! cache state under the lock, and stamps a per-item revision. Rollback
//! applies only while the revision is unchanged, so a slow failed request
//! cannot clobber a faster subsequent action on the same item.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pantry_core::models::{GroceryCounts, GroceryItem};

#[derive(Default)]
struct CacheState {
    items: Vec<GroceryItem>,
    counts: GroceryCounts,
    revisions: HashMap<String, u64>,
    next_revision: u64,
}

impl CacheState {
    fn bump(&mut self, id: &str) -> u64 {
        self.next_revision += 1;
        self.revisions.insert(id.to_string(), self.next_revision);
        self.next_revision
    }

    fn owns(&self, id: &str, revision: u64) -> bool {
        self.revisions.get(id) == Some(&revision)
    }
}

/// Proof of an applied optimistic toggle, needed to roll it back.
#[derive(Debug)]
pub struct ToggleTicket {
    id: String,
    new_checked: bool,
    revision: u64,
}

/// Proof of an applied optimistic delete.
#[derive(Debug)]
pub struct DeleteTicket {
    item: GroceryItem,
    index: usize,
    revision: u64,
}

impl DeleteTicket {
    /// The removed item, for delta bookkeeping at the call site.
    pub fn item(&self) -> &GroceryItem {
        &self.item
    }
}

/// Proof of an applied optimistic add.
#[derive(Debug)]
pub struct AddTicket {
    temp_id: String,
    revision: u64,
}

/// Shared, interior-mutable cache handle.
#[derive(Clone, Default)]
pub struct ListCache {
    state: Arc<Mutex<CacheState>>,
}

impl ListCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current list and counts, cloned for the caller.
    pub fn snapshot(&self) -> (Vec<GroceryItem>, GroceryCounts) {
        let state = self.lock();
        (state.items.clone(), state.counts)
    }

    pub fn items(&self) -> Vec<GroceryItem> {
        self.lock().items.clone()
    }

    pub fn counts(&self) -> GroceryCounts {
        self.lock().counts
    }

    /// Wholesale replacement from an authoritative source (server refresh
    /// or the mirror after an offline mutation). Counts are recomputed,
    /// and all outstanding revisions are invalidated: a rollback from
    /// before the refresh must not apply on top of it.
    pub fn set_all(&self, items: Vec<GroceryItem>) {
        let mut state = self.lock();
        state.counts = GroceryCounts::of(&items);
        state.items = items;
        state.revisions.clear();
    }

    /// Optimistically flip one item. Counts move by exactly one in
    /// lock-step with the item change.
    pub fn optimistic_toggle(&self, id: &str) -> Option<ToggleTicket> {
        let mut state = self.lock();
        let item = state.items.iter_mut().find(|i| i.id == id)?;
        item.checked = !item.checked;
        let new_checked = item.checked;
        state.counts.apply_toggle_delta(new_checked);
        let revision = state.bump(id);
        Some(ToggleTicket {
            id: id.to_string(),
            new_checked,
            revision,
        })
    }

    /// Revert a failed optimistic toggle, unless a newer action already
    /// superseded it.
    pub fn rollback_toggle(&self, ticket: ToggleTicket) {
        let mut state = self.lock();
        if !state.owns(&ticket.id, ticket.revision) {
            tracing::debug!("cache: toggle rollback for {} superseded", ticket.id);
            return;
        }
        if let Some(item) = state.items.iter_mut().find(|i| i.id == ticket.id) {
            item.checked = !ticket.new_checked;
            state.counts.apply_toggle_delta(!ticket.new_checked);
            state.bump(&ticket.id);
        }
    }

    /// Optimistically remove one item.
    pub fn optimistic_delete(&self, id: &str) -> Option<DeleteTicket> {
        let mut state = self.lock();
        let index = state.items.iter().position(|i| i.id == id)?;
        let item = state.items.remove(index);
        state.counts.apply_delete_delta(item.checked);
        let revision = state.bump(id);
        Some(DeleteTicket {
            item,
            index,
            revision,
        })
    }

    /// Restore a failed optimistic delete, unless superseded.
    pub fn rollback_delete(&self, ticket: DeleteTicket) {
        let mut state = self.lock();
        if !state.owns(&ticket.item.id, ticket.revision) {
            tracing::debug!("cache: delete rollback for {} superseded", ticket.item.id);
            return;
        }
        let index = ticket.index.min(state.items.len());
        state.counts.apply_insert_delta(ticket.item.checked);
        state.bump(&ticket.item.id);
        state.items.insert(index, ticket.item);
    }

    /// Optimistically prepend a locally synthesized temp-id item.
    pub fn optimistic_add(&self, item: GroceryItem) -> AddTicket {
        let mut state = self.lock();
        let temp_id = item.id.clone();
        state.items.insert(0, item);
        state.counts.apply_add_delta();
        let revision = state.bump(&temp_id);
        AddTicket { temp_id, revision }
    }

    /// Remove a failed optimistic add, unless superseded.
    pub fn rollback_add(&self, ticket: AddTicket) {
        let mut state = self.lock();
        if !state.owns(&ticket.temp_id, ticket.revision) {
            tracing::debug!("cache: add rollback for {} superseded", ticket.temp_id);
            return;
        }
        if let Some(index) = state.items.iter().position(|i| i.id == ticket.temp_id) {
            let item = state.items.remove(index);
            state.counts.apply_delete_delta(item.checked);
            state.bump(&ticket.temp_id);
        }
    }

    /// Rewrite a temp id to its server-assigned id. The revision entry
    /// follows the item so in-flight rollbacks against the temp id lapse.
    pub fn replace_temp_id(&self, temp_id: &str, real_id: &str) {
        let mut state = self.lock();
        if let Some(item) = state.items.iter_mut().find(|i| i.id == temp_id) {
            item.id = real_id.to_string();
            state.revisions.remove(temp_id);
            state.bump(real_id);
        }
    }

    /// Whether an id is currently present.
    pub fn contains(&self, id: &str) -> bool {
        self.lock().items.iter().any(|i| i.id == id)
    }
}
