//! One line on the grocery list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single grocery list entry.
///
/// `id` is either server-assigned or a client-generated temp id for items
/// created while offline (see [`crate::ids`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryItem {
    pub id: String,
    pub name: String,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub notes: Option<String>,
    pub checked: bool,
    /// Back-reference to the recipe that contributed this item.
    /// `None` for manually added items.
    pub recipe_id: Option<String>,
    pub recipe_title: Option<String>,
    /// Used only for display ordering, never for conflict resolution.
    pub created_at: DateTime<Utc>,
}

/// The upstream data uses both the empty string and the literal string
/// `"null"` to mean "absent". The stored value is kept as-is; only
/// formatting normalizes it.
fn presentable(field: &Option<String>) -> Option<&str> {
    match field.as_deref() {
        None | Some("") | Some("null") => None,
        Some(s) => Some(s),
    }
}

impl GroceryItem {
    /// Quantity for display, with the absent-value quirk normalized.
    pub fn display_quantity(&self) -> Option<&str> {
        presentable(&self.quantity)
    }

    /// Unit for display.
    pub fn display_unit(&self) -> Option<&str> {
        presentable(&self.unit)
    }

    /// Notes for display.
    pub fn display_notes(&self) -> Option<&str> {
        presentable(&self.notes)
    }

    /// Recipe title for display.
    pub fn display_recipe_title(&self) -> Option<&str> {
        presentable(&self.recipe_title)
    }

    /// "2 kg", "3", "kg", or `None` when both parts are absent.
    pub fn quantity_label(&self) -> Option<String> {
        match (self.display_quantity(), self.display_unit()) {
            (Some(q), Some(u)) => Some(format!("{q} {u}")),
            (Some(q), None) => Some(q.to_string()),
            (None, Some(u)) => Some(u.to_string()),
            (None, None) => None,
        }
    }
}

/// Payload for creating a new item, either against the server or as a
/// locally synthesized temp-id item while offline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewItemInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_title: Option<String>,
    /// Carried so a replayed offline create preserves a later local toggle.
    #[serde(default)]
    pub checked: bool,
}

impl NewItemInput {
    /// A bare named item.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build the locally synthesized item shown to the user while the
    /// create has not reached the server.
    pub fn into_local_item(self, temp_id: String) -> GroceryItem {
        GroceryItem {
            id: temp_id,
            name: self.name,
            quantity: self.quantity,
            unit: self.unit,
            notes: self.notes,
            checked: self.checked,
            recipe_id: self.recipe_id,
            recipe_title: self.recipe_title,
            created_at: Utc::now(),
        }
    }

    /// Recover the create payload from a locally synthesized item, for
    /// replaying a queued offline add.
    pub fn from_item(item: &GroceryItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity.clone(),
            unit: item.unit.clone(),
            notes: item.notes.clone(),
            recipe_id: item.recipe_id.clone(),
            recipe_title: item.recipe_title.clone(),
            checked: item.checked,
        }
    }
}
