//! SyncEngine: drains the pending action queue against the server.
//!
//! Replay is strictly FIFO, one action fully awaited before the next;
//! ordering correctness matters more than throughput for a queue of at
//! most a few dozen entries. Per entry the outcome is synced, dropped
//! as stale, or kept for the next drain. After one pass the cache and
//! mirror are refreshed wholesale from the server.

use std::collections::HashMap;
use std::sync::Arc;

use pantry_core::errors::PantryResult;
use pantry_core::ids::is_temp_id;
use pantry_core::models::{GroceryAction, NewItemInput, PendingAction, SyncReport};
use pantry_core::traits::{GroceryApi, KeyValueStore};
use pantry_net::ConnectivityHandle;
use pantry_store::{MirrorStore, PendingQueue};

use crate::cache::ListCache;

enum Outcome {
    Synced,
    DroppedStale,
    Failed,
    /// No server call made; the entry waits for a dependency to retry.
    Skipped,
}

/// Replays queued offline mutations in order.
pub struct SyncEngine<A, K> {
    api: Arc<A>,
    mirror: MirrorStore<K>,
    queue: PendingQueue<K>,
    cache: ListCache,
}

impl<A, K> SyncEngine<A, K>
where
    A: GroceryApi + 'static,
    K: KeyValueStore + 'static,
{
    pub fn new(
        api: Arc<A>,
        mirror: MirrorStore<K>,
        queue: PendingQueue<K>,
        cache: ListCache,
    ) -> Self {
        Self {
            api,
            mirror,
            queue,
            cache,
        }
    }

    /// Drain once at process start if anything survived the last run.
    pub async fn sync_on_start(&self) -> Option<SyncReport> {
        match self.queue.has_pending() {
            Ok(true) => Some(self.drain().await),
            Ok(false) => None,
            Err(e) => {
                tracing::warn!("sync: startup queue check failed: {e}");
                None
            }
        }
    }

    /// Re-drain on every offline-to-online transition.
    pub fn spawn_reconnect_task(
        self: Arc<Self>,
        connectivity: ConnectivityHandle,
    ) -> tokio::task::JoinHandle<()> {
        let mut online = connectivity.subscribe_online();
        tokio::spawn(async move {
            loop {
                if online.changed().await.is_err() {
                    break;
                }
                if *online.borrow_and_update() {
                    tracing::info!("sync: connectivity regained, draining queue");
                    self.drain().await;
                }
            }
        })
    }

    /// One pass over every queued entry, then a wholesale refresh.
    pub async fn drain(&self) -> SyncReport {
        let entries = match self.queue.dequeue_all() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("sync: could not read pending queue: {e}");
                return SyncReport::default();
            }
        };
        if entries.is_empty() {
            return SyncReport::default();
        }

        tracing::info!("sync: draining {} pending actions", entries.len());
        let mut report = SyncReport::default();
        // Temp ids promoted earlier in this pass, so later entries that
        // still reference them are rewritten before hitting the server.
        let mut promoted: HashMap<String, String> = HashMap::new();

        for entry in entries {
            let kind = entry.action.kind();
            match self.replay(&entry, &mut promoted).await {
                Outcome::Synced => {
                    self.remove_entry(&entry.id);
                    report.synced += 1;
                }
                Outcome::DroppedStale => {
                    tracing::debug!("sync: dropping stale {kind} ({})", entry.id);
                    self.remove_entry(&entry.id);
                    report.dropped += 1;
                }
                Outcome::Failed => {
                    report.failed += 1;
                    report.failed_kinds.push(kind.to_string());
                }
                Outcome::Skipped => {}
            }
        }

        self.refresh_from_server().await;
        tracing::info!(
            "sync: drain finished (synced {}, failed {}, dropped {})",
            report.synced,
            report.failed,
            report.dropped
        );
        report
    }

    async fn replay(
        &self,
        entry: &PendingAction,
        promoted: &mut HashMap<String, String>,
    ) -> Outcome {
        match &entry.action {
            GroceryAction::AddItem { item, temp_id } => {
                let input = NewItemInput::from_item(item);
                match self.api.create_item(&input).await {
                    Ok(server_item) => {
                        self.promote(temp_id, &server_item.id, promoted);
                        Outcome::Synced
                    }
                    Err(e) => self.classify(e, "add"),
                }
            }
            GroceryAction::ToggleItem { id } => {
                let Some(target) = self.resolve_target(id, promoted) else {
                    return Outcome::Skipped;
                };
                if target.stale {
                    return Outcome::DroppedStale;
                }
                match self.api.toggle_item(&target.id).await {
                    Ok(_) => Outcome::Synced,
                    Err(e) => self.classify(e, "toggle"),
                }
            }
            GroceryAction::DeleteItem { id } => {
                let Some(target) = self.resolve_target(id, promoted) else {
                    return Outcome::Skipped;
                };
                if target.stale {
                    return Outcome::DroppedStale;
                }
                match self.api.delete_item(&target.id).await {
                    Ok(()) => Outcome::Synced,
                    Err(e) => self.classify(e, "delete"),
                }
            }
            GroceryAction::ClearChecked => match self.api.clear_checked().await {
                Ok(_) => Outcome::Synced,
                Err(e) => self.classify(e, "clear checked"),
            },
            GroceryAction::ClearAll => match self.api.clear_all().await {
                Ok(()) => Outcome::Synced,
                Err(e) => self.classify(e, "clear all"),
            },
            GroceryAction::AddFromRecipe {
                recipe_id,
                recipe_title,
                items,
                temp_ids,
            } => {
                match self
                    .api
                    .add_from_recipe(recipe_id, recipe_title, items)
                    .await
                {
                    Ok(server_items) => {
                        for (temp, server_item) in temp_ids.iter().zip(&server_items) {
                            self.promote(temp, &server_item.id, promoted);
                        }
                        Outcome::Synced
                    }
                    Err(e) => self.classify(e, "recipe add"),
                }
            }
        }
    }

    /// "Not found" means the target no longer exists server-side; the
    /// action is moot and dropping it is not a failure.
    fn classify(&self, error: pantry_core::PantryError, what: &str) -> Outcome {
        if error.is_not_found() {
            Outcome::DroppedStale
        } else {
            tracing::warn!("sync: {what} replay failed, keeping for retry: {error}");
            Outcome::Failed
        }
    }

    /// Rewrite a temp-id target through this pass's promotions. An
    /// unpromoted temp id whose add is still queued waits for that add to
    /// retry; an orphaned temp id is stale. A temp id never reaches the
    /// server either way.
    fn resolve_target(&self, id: &str, promoted: &HashMap<String, String>) -> Option<Target> {
        if !is_temp_id(id) {
            return Some(Target {
                id: id.to_string(),
                stale: false,
            });
        }
        if let Some(real) = promoted.get(id) {
            return Some(Target {
                id: real.clone(),
                stale: false,
            });
        }
        match self.queue.has_queued_add(id) {
            Ok(true) => None,
            Ok(false) => Some(Target {
                id: id.to_string(),
                stale: true,
            }),
            Err(e) => {
                tracing::warn!("sync: queue lookup failed: {e}");
                None
            }
        }
    }

    /// Rewrite a promoted temp id everywhere it can still appear: the
    /// mirror, the cache, and later queue entries.
    fn promote(&self, temp_id: &str, real_id: &str, promoted: &mut HashMap<String, String>) {
        promoted.insert(temp_id.to_string(), real_id.to_string());
        self.cache.replace_temp_id(temp_id, real_id);
        if let Err(e) = self.mirror.replace_temp_id(temp_id, real_id) {
            tracing::warn!("sync: mirror id rewrite failed: {e}");
        }
        if let Err(e) = self.queue.replace_temp_id(temp_id, real_id) {
            tracing::warn!("sync: queue id rewrite failed: {e}");
        }
    }

    fn remove_entry(&self, pending_id: &str) {
        if let Err(e) = self.queue.remove(pending_id) {
            tracing::warn!("sync: could not remove queue entry {pending_id}: {e}");
        }
    }

    /// Pull the authoritative list so the UI reflects server state after
    /// a drain. Best effort; a failure here leaves the last snapshot.
    async fn refresh_from_server(&self) {
        match self.api.list_items().await {
            Ok(items) => {
                if let Err(e) = self.save_refreshed(&items) {
                    tracing::warn!("sync: persisting refreshed list failed: {e}");
                }
                self.cache.set_all(items);
            }
            Err(e) => {
                tracing::warn!("sync: post-drain refresh failed: {e}");
            }
        }
    }

    fn save_refreshed(&self, items: &[pantry_core::models::GroceryItem]) -> PantryResult<()> {
        self.mirror.save_items(items)?;
        self.mirror
            .save_counts(&pantry_core::models::GroceryCounts::of(items))
    }
}

struct Target {
    id: String,
    stale: bool,
}
