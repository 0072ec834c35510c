//! Durable records of not-yet-synced mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{GroceryItem, NewItemInput};

/// One queued mutation. A closed sum type so the sync engine matches
/// exhaustively; adding a variant is a compile error everywhere it is
/// not handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroceryAction {
    /// Carries the full locally synthesized item so a later offline
    /// toggle of the temp item can fold into the queued create.
    AddItem { item: GroceryItem, temp_id: String },
    ToggleItem { id: String },
    DeleteItem { id: String },
    ClearChecked,
    ClearAll,
    AddFromRecipe {
        recipe_id: String,
        recipe_title: String,
        items: Vec<NewItemInput>,
        /// Temp ids of the locally synthesized items, paired positionally
        /// with `items`.
        temp_ids: Vec<String>,
    },
}

impl GroceryAction {
    /// Short kind label for logs and sync reports.
    pub fn kind(&self) -> &'static str {
        match self {
            GroceryAction::AddItem { .. } => "add_item",
            GroceryAction::ToggleItem { .. } => "toggle_item",
            GroceryAction::DeleteItem { .. } => "delete_item",
            GroceryAction::ClearChecked => "clear_checked",
            GroceryAction::ClearAll => "clear_all",
            GroceryAction::AddFromRecipe { .. } => "add_from_recipe",
        }
    }

    /// The business id this action targets, if it targets one item.
    pub fn target_id(&self) -> Option<&str> {
        match self {
            GroceryAction::ToggleItem { id } | GroceryAction::DeleteItem { id } => Some(id),
            _ => None,
        }
    }
}

/// A durable queue entry: a locally generated id, the action, and a
/// creation timestamp used only for FIFO ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    pub id: String,
    pub action: GroceryAction,
    pub timestamp: DateTime<Utc>,
}

impl PendingAction {
    pub fn new(action: GroceryAction) -> Self {
        Self {
            id: crate::ids::pending_id(),
            action,
            timestamp: Utc::now(),
        }
    }
}
