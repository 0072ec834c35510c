//! MutationCoordinator: the decision point behind every grocery action.
//!
//! Every action lands in the mirror store first, so the durable local
//! copy never drifts from what the user is shown. Online, toggle/delete/
//! add update the cache optimistically and roll back on failure; the
//! bulk operations wait for the round trip. Offline, the action is
//! queued and the cache follows the mirror. No action is silently
//! dropped: it is applied, rolled back, or queued.

use std::sync::Arc;

use pantry_core::errors::PantryResult;
use pantry_core::ids::{is_temp_id, temp_id};
use pantry_core::models::{GroceryAction, GroceryItem, NewItemInput};
use pantry_core::traits::{GroceryApi, KeyValueStore};
use pantry_net::ConnectivityHandle;
use pantry_store::{MirrorStore, PendingQueue};

use crate::cache::ListCache;

/// Routes user actions between the server, the mirror, and the queue.
pub struct MutationCoordinator<A, K> {
    api: Arc<A>,
    connectivity: ConnectivityHandle,
    mirror: MirrorStore<K>,
    queue: PendingQueue<K>,
    cache: ListCache,
}

impl<A, K> MutationCoordinator<A, K>
where
    A: GroceryApi,
    K: KeyValueStore,
{
    pub fn new(
        api: Arc<A>,
        connectivity: ConnectivityHandle,
        mirror: MirrorStore<K>,
        queue: PendingQueue<K>,
        cache: ListCache,
    ) -> Self {
        Self {
            api,
            connectivity,
            mirror,
            queue,
            cache,
        }
    }

    /// The cache screens read from.
    pub fn cache(&self) -> &ListCache {
        &self.cache
    }

    /// Whether unsynced changes are waiting, for the UI indicator.
    pub fn has_pending_sync(&self) -> bool {
        self.queue.has_pending().unwrap_or(false)
    }

    /// Seed the cache from the mirror, for process start while offline.
    pub fn hydrate_from_mirror(&self) {
        match self.mirror.load_items() {
            Ok(Some(items)) => self.cache.set_all(items),
            Ok(None) => {}
            Err(e) => tracing::warn!("sync: hydrate failed: {e}"),
        }
    }

    /// Mirror/queue failures degrade the UI instead of crashing it.
    fn swallow<T>(result: PantryResult<T>, what: &str) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("sync: {what} failed: {e}");
                None
            }
        }
    }

    fn enqueue(&self, action: GroceryAction) {
        Self::swallow(self.queue.enqueue(action), "enqueue");
    }

    /// Set the cache from the mirrored list after an offline mutation.
    fn cache_from(&self, mirror_items: Option<Vec<GroceryItem>>) {
        if let Some(items) = mirror_items {
            self.cache.set_all(items);
        }
    }

    /// Flip one item's checked state.
    ///
    /// A failed online call surfaces as a rollback only; the returned
    /// snapshot then shows the reverted state.
    pub async fn toggle_item(&self, id: &str) -> PantryResult<Vec<GroceryItem>> {
        let mirrored = Self::swallow(self.mirror.apply_toggle(id), "mirror toggle");

        // A temp id has never been seen by the server; route it through
        // the queue regardless of connectivity.
        if !self.connectivity.is_online() || is_temp_id(id) {
            self.enqueue(GroceryAction::ToggleItem { id: id.to_string() });
            self.cache_from(mirrored);
            return Ok(self.cache.items());
        }

        let ticket = self.cache.optimistic_toggle(id);
        match self.api.toggle_item(id).await {
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("sync: toggle {id} failed, rolling back: {e}");
                if let Some(ticket) = ticket {
                    self.cache.rollback_toggle(ticket);
                }
                self.connectivity.recheck_now();
            }
        }
        Ok(self.cache.items())
    }

    /// Remove one item.
    pub async fn delete_item(&self, id: &str) -> PantryResult<Vec<GroceryItem>> {
        let mirrored = Self::swallow(self.mirror.apply_delete(id), "mirror delete");

        if !self.connectivity.is_online() || is_temp_id(id) {
            self.enqueue(GroceryAction::DeleteItem { id: id.to_string() });
            self.cache_from(mirrored);
            return Ok(self.cache.items());
        }

        let ticket = self.cache.optimistic_delete(id);
        match self.api.delete_item(id).await {
            Ok(()) => {}
            // Already gone server-side: the desired end state holds.
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                tracing::warn!("sync: delete {id} failed, rolling back: {e}");
                if let Some(ticket) = ticket {
                    self.cache.rollback_delete(ticket);
                }
                self.connectivity.recheck_now();
            }
        }
        Ok(self.cache.items())
    }

    /// Add one item. Offline, the returned item carries a temp id that is
    /// reconciled on the next successful sync.
    pub async fn add_item(&self, input: NewItemInput) -> PantryResult<GroceryItem> {
        let temp = temp_id();
        let local_item = input.clone().into_local_item(temp.clone());
        let mirrored = Self::swallow(self.mirror.apply_add(local_item.clone()), "mirror add");

        if !self.connectivity.is_online() {
            self.enqueue(GroceryAction::AddItem {
                item: local_item.clone(),
                temp_id: temp,
            });
            self.cache_from(mirrored);
            return Ok(local_item);
        }

        let ticket = self.cache.optimistic_add(local_item.clone());
        match self.api.create_item(&input).await {
            Ok(server_item) => {
                self.cache.replace_temp_id(&temp, &server_item.id);
                Self::swallow(
                    self.mirror.replace_temp_id(&temp, &server_item.id),
                    "mirror id rewrite",
                );
                Ok(server_item)
            }
            Err(e) => {
                // The cache reverts; the mirror keeps what the user asked
                // for, same as the other optimistic paths.
                tracing::warn!("sync: add failed, rolling back: {e}");
                self.cache.rollback_add(ticket);
                self.connectivity.recheck_now();
                Err(e)
            }
        }
    }

    /// Add a recipe's ingredients. Bulk: no optimistic step online.
    pub async fn add_from_recipe(
        &self,
        recipe_id: &str,
        recipe_title: &str,
        inputs: Vec<NewItemInput>,
    ) -> PantryResult<Vec<GroceryItem>> {
        let temp_ids: Vec<String> = inputs.iter().map(|_| temp_id()).collect();
        let local_items: Vec<GroceryItem> = inputs
            .iter()
            .zip(&temp_ids)
            .map(|(input, temp)| {
                let mut input = input.clone();
                input.recipe_id = Some(recipe_id.to_string());
                input.recipe_title = Some(recipe_title.to_string());
                input.into_local_item(temp.clone())
            })
            .collect();
        let mirrored = Self::swallow(
            self.mirror.apply_add_many(local_items.clone()),
            "mirror recipe add",
        );

        if !self.connectivity.is_online() {
            self.enqueue(GroceryAction::AddFromRecipe {
                recipe_id: recipe_id.to_string(),
                recipe_title: recipe_title.to_string(),
                items: inputs,
                temp_ids,
            });
            self.cache_from(mirrored);
            return Ok(local_items);
        }

        match self
            .api
            .add_from_recipe(recipe_id, recipe_title, &inputs)
            .await
        {
            Ok(server_items) => {
                for (temp, server_item) in temp_ids.iter().zip(&server_items) {
                    Self::swallow(
                        self.mirror.replace_temp_id(temp, &server_item.id),
                        "mirror id rewrite",
                    );
                }
                if let Some(items) = Self::swallow(self.mirror.load_items(), "mirror read") {
                    self.cache.set_all(items.unwrap_or_default());
                }
                Ok(server_items)
            }
            Err(e) => {
                // Nothing was shown optimistically; revert the mirror so
                // it stays aligned with what the user sees.
                for temp in &temp_ids {
                    Self::swallow(self.mirror.apply_delete(temp), "mirror recipe revert");
                }
                self.connectivity.recheck_now();
                Err(e)
            }
        }
    }

    /// Remove all checked items. Bulk: waits for the round trip online.
    pub async fn clear_checked(&self) -> PantryResult<Vec<GroceryItem>> {
        let before = Self::swallow(self.mirror.load_items(), "mirror read")
            .flatten()
            .unwrap_or_default();
        let mirrored = Self::swallow(self.mirror.apply_clear_checked(), "mirror clear checked");

        if !self.connectivity.is_online() {
            self.enqueue(GroceryAction::ClearChecked);
            self.cache_from(mirrored);
            return Ok(self.cache.items());
        }

        match self.api.clear_checked().await {
            Ok(removed) => {
                tracing::debug!("sync: cleared {removed} checked items");
                self.cache_from(mirrored);
                Ok(self.cache.items())
            }
            Err(e) => {
                self.restore_mirror(&before);
                self.connectivity.recheck_now();
                Err(e)
            }
        }
    }

    /// Empty the list. Bulk: waits for the round trip online.
    pub async fn clear_all(&self) -> PantryResult<Vec<GroceryItem>> {
        let before = Self::swallow(self.mirror.load_items(), "mirror read")
            .flatten()
            .unwrap_or_default();
        let mirrored = Self::swallow(self.mirror.apply_clear_all(), "mirror clear all");

        if !self.connectivity.is_online() {
            self.enqueue(GroceryAction::ClearAll);
            self.cache_from(mirrored);
            return Ok(self.cache.items());
        }

        match self.api.clear_all().await {
            Ok(()) => {
                self.cache_from(mirrored);
                Ok(self.cache.items())
            }
            Err(e) => {
                self.restore_mirror(&before);
                self.connectivity.recheck_now();
                Err(e)
            }
        }
    }

    /// Put the mirror back to a pre-bulk-op snapshot. The user was never
    /// shown the change, so keeping it would drift from the screen.
    fn restore_mirror(&self, items: &[GroceryItem]) {
        Self::swallow(self.mirror.save_items(items), "mirror restore");
        Self::swallow(
            self.mirror
                .save_counts(&pantry_core::models::GroceryCounts::of(items)),
            "mirror restore counts",
        );
    }
}
