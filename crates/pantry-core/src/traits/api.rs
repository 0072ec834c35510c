use async_trait::async_trait;

use crate::errors::PantryResult;
use crate::models::{GroceryItem, NewItemInput};

/// The server contract for the grocery list. Endpoints are idempotent-safe
/// enough to retry; errors distinguish at minimum "not found"
/// (`ApiError::NotFound`) from everything else.
#[async_trait]
pub trait GroceryApi: Send + Sync {
    /// Full authoritative list, newest first.
    async fn list_items(&self) -> PantryResult<Vec<GroceryItem>>;

    /// Create one item; the response carries the server-assigned id.
    async fn create_item(&self, input: &NewItemInput) -> PantryResult<GroceryItem>;

    /// Flip the checked state of an item.
    async fn toggle_item(&self, id: &str) -> PantryResult<GroceryItem>;

    /// Delete one item.
    async fn delete_item(&self, id: &str) -> PantryResult<()>;

    /// Remove all checked items. Returns how many were removed.
    async fn clear_checked(&self) -> PantryResult<usize>;

    /// Empty the list.
    async fn clear_all(&self) -> PantryResult<()>;

    /// Add a recipe's ingredients to the list in one call.
    async fn add_from_recipe(
        &self,
        recipe_id: &str,
        recipe_title: &str,
        items: &[NewItemInput],
    ) -> PantryResult<Vec<GroceryItem>>;
}

/// Active reachability check against the backend health endpoint,
/// distinct from passive device-connectivity signals.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Any error return is treated as "unreachable" by the monitor and
    /// never propagated further.
    async fn health(&self) -> PantryResult<()>;
}

#[async_trait]
impl<T: HealthProbe + ?Sized> HealthProbe for std::sync::Arc<T> {
    async fn health(&self) -> PantryResult<()> {
        (**self).health().await
    }
}
