//! Shared test support: an in-memory grocery server with programmable
//! failures and a call log, plus environment wiring.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use pantry_core::config::MonitorConfig;
use pantry_core::errors::{ApiError, PantryResult};
use pantry_core::models::{GroceryItem, NewItemInput};
use pantry_core::traits::{GroceryApi, HealthProbe};
use pantry_net::{ConnectivityHandle, ConnectivityMonitor};
use pantry_store::{MirrorStore, PendingQueue, SqliteKv};
use pantry_sync::{ListCache, MutationCoordinator, SyncEngine};

/// In-memory stand-in for the grocery backend.
#[derive(Default)]
pub struct MockApi {
    items: Mutex<Vec<GroceryItem>>,
    next_id: AtomicUsize,
    /// Ordered log of server calls, for FIFO assertions.
    pub calls: Mutex<Vec<String>>,
    /// Call kinds that fail with a transient network error.
    pub fail_kinds: Mutex<HashSet<&'static str>>,
    /// Ids the server reports as not found.
    pub missing_ids: Mutex<HashSet<String>>,
    /// Health probe switch.
    pub reachable: AtomicBool,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed(&self, items: Vec<GroceryItem>) {
        *self.items.lock().unwrap() = items;
    }

    pub fn server_items(&self) -> Vec<GroceryItem> {
        self.items.lock().unwrap().clone()
    }

    pub fn fail(&self, kind: &'static str) {
        self.fail_kinds.lock().unwrap().insert(kind);
    }

    pub fn heal(&self, kind: &'static str) {
        self.fail_kinds.lock().unwrap().remove(kind);
    }

    pub fn mark_missing(&self, id: &str) {
        self.missing_ids.lock().unwrap().insert(id.to_string());
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_fail(&self, kind: &'static str) -> PantryResult<()> {
        if self.fail_kinds.lock().unwrap().contains(kind) {
            return Err(ApiError::Network {
                reason: format!("{kind} unavailable"),
            }
            .into());
        }
        Ok(())
    }

    fn check_exists(&self, id: &str) -> PantryResult<()> {
        if self.missing_ids.lock().unwrap().contains(id) {
            return Err(ApiError::NotFound {
                resource: format!("item {id}"),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl GroceryApi for MockApi {
    async fn list_items(&self) -> PantryResult<Vec<GroceryItem>> {
        self.record("list".to_string());
        self.check_fail("list")?;
        Ok(self.server_items())
    }

    async fn create_item(&self, input: &NewItemInput) -> PantryResult<GroceryItem> {
        self.record(format!("create {}", input.name));
        self.check_fail("create")?;
        let id = format!("srv_{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let item = GroceryItem {
            id,
            name: input.name.clone(),
            quantity: input.quantity.clone(),
            unit: input.unit.clone(),
            notes: input.notes.clone(),
            checked: input.checked,
            recipe_id: input.recipe_id.clone(),
            recipe_title: input.recipe_title.clone(),
            created_at: Utc::now(),
        };
        self.items.lock().unwrap().insert(0, item.clone());
        Ok(item)
    }

    async fn toggle_item(&self, id: &str) -> PantryResult<GroceryItem> {
        self.record(format!("toggle {id}"));
        self.check_fail("toggle")?;
        self.check_exists(id)?;
        let mut items = self.items.lock().unwrap();
        let item = items.iter_mut().find(|i| i.id == id).ok_or_else(|| {
            pantry_core::PantryError::from(ApiError::NotFound {
                resource: format!("item {id}"),
            })
        })?;
        item.checked = !item.checked;
        Ok(item.clone())
    }

    async fn delete_item(&self, id: &str) -> PantryResult<()> {
        self.record(format!("delete {id}"));
        self.check_fail("delete")?;
        self.check_exists(id)?;
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| i.id != id);
        if items.len() == before {
            return Err(ApiError::NotFound {
                resource: format!("item {id}"),
            }
            .into());
        }
        Ok(())
    }

    async fn clear_checked(&self) -> PantryResult<usize> {
        self.record("clear_checked".to_string());
        self.check_fail("clear_checked")?;
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| !i.checked);
        Ok(before - items.len())
    }

    async fn clear_all(&self) -> PantryResult<()> {
        self.record("clear_all".to_string());
        self.check_fail("clear_all")?;
        self.items.lock().unwrap().clear();
        Ok(())
    }

    async fn add_from_recipe(
        &self,
        recipe_id: &str,
        recipe_title: &str,
        items: &[NewItemInput],
    ) -> PantryResult<Vec<GroceryItem>> {
        self.record(format!("recipe {recipe_id}"));
        self.check_fail("recipe")?;
        self.check_exists(recipe_id)?;
        let mut created = Vec::new();
        for input in items {
            let id = format!("srv_{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            let item = GroceryItem {
                id,
                name: input.name.clone(),
                quantity: input.quantity.clone(),
                unit: input.unit.clone(),
                notes: input.notes.clone(),
                checked: input.checked,
                recipe_id: Some(recipe_id.to_string()),
                recipe_title: Some(recipe_title.to_string()),
                created_at: Utc::now(),
            };
            self.items.lock().unwrap().insert(0, item.clone());
            created.push(item);
        }
        Ok(created)
    }
}

#[async_trait]
impl HealthProbe for MockApi {
    async fn health(&self) -> PantryResult<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ApiError::Network {
                reason: "unreachable".into(),
            }
            .into())
        }
    }
}

/// Everything a test needs, wired over one in-memory SQLite store.
pub struct TestEnv {
    pub api: Arc<MockApi>,
    pub connectivity: ConnectivityHandle,
    pub mirror: MirrorStore<SqliteKv>,
    pub queue: PendingQueue<SqliteKv>,
    pub cache: ListCache,
    pub coordinator: MutationCoordinator<MockApi, SqliteKv>,
    pub engine: Arc<SyncEngine<MockApi, SqliteKv>>,
}

impl TestEnv {
    pub fn new() -> Self {
        let api = MockApi::new();
        let kv = Arc::new(SqliteKv::open_in_memory().unwrap());
        let mirror = MirrorStore::new(Arc::clone(&kv));
        let queue = PendingQueue::new(Arc::clone(&kv));
        let cache = ListCache::new();

        let monitor = ConnectivityMonitor::new(
            Arc::clone(&api),
            MonitorConfig {
                probe_interval_secs: 30,
                probe_timeout_secs: 5,
            },
        );
        let connectivity = monitor.handle();
        tokio::spawn(monitor.run());

        let coordinator = MutationCoordinator::new(
            Arc::clone(&api),
            connectivity.clone(),
            mirror.clone(),
            queue.clone(),
            cache.clone(),
        );
        let engine = Arc::new(SyncEngine::new(
            Arc::clone(&api),
            mirror.clone(),
            queue.clone(),
            cache.clone(),
        ));

        Self {
            api,
            connectivity,
            mirror,
            queue,
            cache,
            coordinator,
            engine,
        }
    }

    /// Bring the probe loop to a confirmed-online state.
    pub async fn go_online(&self) {
        self.api.reachable.store(true, Ordering::SeqCst);
        self.connectivity.report_device_status(Some(true), Some(true));
        settle().await;
        assert!(self.connectivity.is_online());
    }

    /// Drop to offline via a device-level disconnect.
    pub async fn go_offline(&self) {
        self.api.reachable.store(false, Ordering::SeqCst);
        self.connectivity
            .report_device_status(Some(false), Some(false));
        settle().await;
        assert!(!self.connectivity.is_online());
    }
}

/// Let spawned tasks run under the paused test clock.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

pub fn make_item(id: &str, checked: bool) -> GroceryItem {
    GroceryItem {
        id: id.to_string(),
        name: format!("Item {id}"),
        quantity: None,
        unit: None,
        notes: None,
        checked,
        recipe_id: None,
        recipe_title: None,
        created_at: Utc::now(),
    }
}
