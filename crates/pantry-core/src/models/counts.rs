//! Aggregate counts, cached separately from the list for fast display.
//!
//! Three paths maintain these independently (server fetch, optimistic
//! cache update, offline local mutation). `GroceryCounts::of` is the
//! single derivation; the optimistic path applies deltas instead of
//! recomputing, so it never needs the full list to update a summary.

use serde::{Deserialize, Serialize};

use crate::models::GroceryItem;

/// `{ total, checked, unchecked }` for the grocery list.
///
/// Invariant: `checked + unchecked == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroceryCounts {
    pub total: usize,
    pub checked: usize,
    pub unchecked: usize,
}

impl GroceryCounts {
    /// Derive counts from a list. The only full recomputation path.
    pub fn of(items: &[GroceryItem]) -> Self {
        let total = items.len();
        let checked = items.iter().filter(|i| i.checked).count();
        Self {
            total,
            checked,
            unchecked: total - checked,
        }
    }

    /// Delta for a toggle that left the item in state `now_checked`.
    pub fn apply_toggle_delta(&mut self, now_checked: bool) {
        if now_checked {
            self.checked += 1;
            self.unchecked = self.unchecked.saturating_sub(1);
        } else {
            self.unchecked += 1;
            self.checked = self.checked.saturating_sub(1);
        }
    }

    /// Delta for one added item (new items start unchecked).
    pub fn apply_add_delta(&mut self) {
        self.apply_insert_delta(false);
    }

    /// Delta for one inserted item in a known checked state (used when a
    /// rolled-back delete restores an item).
    pub fn apply_insert_delta(&mut self, checked: bool) {
        self.total += 1;
        if checked {
            self.checked += 1;
        } else {
            self.unchecked += 1;
        }
    }

    /// Delta for one removed item that was in state `was_checked`.
    pub fn apply_delete_delta(&mut self, was_checked: bool) {
        self.total = self.total.saturating_sub(1);
        if was_checked {
            self.checked = self.checked.saturating_sub(1);
        } else {
            self.unchecked = self.unchecked.saturating_sub(1);
        }
    }

    /// Whether the invariant holds.
    pub fn is_consistent(&self) -> bool {
        self.checked + self.unchecked == self.total
    }
}
