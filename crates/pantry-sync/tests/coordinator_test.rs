//! Mutation coordinator: routing between server, mirror, and queue;
//! optimistic updates and rollbacks; offline synthesis.

mod support;

use pantry_core::ids::is_temp_id;
use pantry_core::models::{GroceryAction, GroceryCounts, NewItemInput};
use support::{make_item, TestEnv};

// ── Offline paths ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn offline_toggle_queues_and_updates_everything_local() {
    let env = TestEnv::new();
    env.mirror.save_items(&[make_item("a", false)]).unwrap();
    env.coordinator.hydrate_from_mirror();

    let items = env.coordinator.toggle_item("a").await.unwrap();
    assert!(items[0].checked, "cache reflects the local toggle");

    let mirrored = env.mirror.load_items().unwrap().unwrap();
    assert!(mirrored[0].checked, "mirror applied first");

    let queued = env.queue.dequeue_all().unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].action.kind(), "toggle_item");
    assert!(env.api.call_log().is_empty(), "no server call while offline");
}

#[tokio::test(start_paused = true)]
async fn offline_add_returns_a_temp_item() {
    let env = TestEnv::new();

    let item = env
        .coordinator
        .add_item(NewItemInput::named("Milk"))
        .await
        .unwrap();
    assert!(is_temp_id(&item.id));
    assert!(!item.checked);

    let queued = env.queue.dequeue_all().unwrap();
    assert_eq!(queued.len(), 1);
    match &queued[0].action {
        GroceryAction::AddItem { temp_id, .. } => assert_eq!(temp_id, &item.id),
        other => panic!("expected queued add, got {}", other.kind()),
    }
    assert!(env.cache.contains(&item.id));
}

#[tokio::test(start_paused = true)]
async fn offline_add_then_delete_cancels_out() {
    let env = TestEnv::new();

    let item = env
        .coordinator
        .add_item(NewItemInput::named("Milk"))
        .await
        .unwrap();
    env.coordinator.delete_item(&item.id).await.unwrap();

    assert!(!env.coordinator.has_pending_sync(), "pair cancels locally");
    assert!(!env.cache.contains(&item.id));
    assert!(env
        .mirror
        .load_items()
        .unwrap()
        .unwrap()
        .is_empty());
}

#[tokio::test(start_paused = true)]
async fn offline_clear_checked_queues_a_bulk_action() {
    let env = TestEnv::new();
    env.mirror
        .save_items(&[make_item("a", true), make_item("b", false)])
        .unwrap();

    let items = env.coordinator.clear_checked().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "b");

    let queued = env.queue.dequeue_all().unwrap();
    assert_eq!(queued[0].action.kind(), "clear_checked");
}

#[tokio::test(start_paused = true)]
async fn offline_counts_stay_consistent() {
    let env = TestEnv::new();
    env.mirror
        .save_items(&[make_item("a", false), make_item("b", true)])
        .unwrap();
    env.coordinator.hydrate_from_mirror();

    env.coordinator.toggle_item("a").await.unwrap();
    env.coordinator
        .add_item(NewItemInput::named("Eggs"))
        .await
        .unwrap();
    env.coordinator.delete_item("b").await.unwrap();

    let (items, counts) = env.cache.snapshot();
    assert_eq!(counts, GroceryCounts::of(&items));
    assert!(counts.is_consistent());

    let mirror_counts = env.mirror.load_counts().unwrap().unwrap();
    assert_eq!(mirror_counts, counts);
}

// ── Online happy paths ────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn online_toggle_calls_server_and_skips_the_queue() {
    let env = TestEnv::new();
    env.api.seed(vec![make_item("srv_1", false)]);
    env.mirror.save_items(&[make_item("srv_1", false)]).unwrap();
    env.coordinator.hydrate_from_mirror();
    env.go_online().await;

    let items = env.coordinator.toggle_item("srv_1").await.unwrap();
    assert!(items[0].checked);
    assert!(env.api.call_log().contains(&"toggle srv_1".to_string()));
    assert!(!env.coordinator.has_pending_sync());
    assert!(env.api.server_items()[0].checked);
}

#[tokio::test(start_paused = true)]
async fn online_add_reconciles_temp_id_everywhere() {
    let env = TestEnv::new();
    env.go_online().await;

    let item = env
        .coordinator
        .add_item(NewItemInput::named("Milk"))
        .await
        .unwrap();
    assert!(!is_temp_id(&item.id), "server id comes back");

    let (cached, _) = env.cache.snapshot();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].id, item.id);

    let mirrored = env.mirror.load_items().unwrap().unwrap();
    assert_eq!(mirrored[0].id, item.id);
    assert!(
        !mirrored.iter().any(|i| is_temp_id(&i.id)),
        "no temp id survives a successful online add"
    );
}

#[tokio::test(start_paused = true)]
async fn online_delete_of_already_missing_item_is_not_an_error() {
    let env = TestEnv::new();
    env.api.mark_missing("srv_1");
    env.mirror.save_items(&[make_item("srv_1", false)]).unwrap();
    env.coordinator.hydrate_from_mirror();
    env.go_online().await;

    let items = env.coordinator.delete_item("srv_1").await.unwrap();
    assert!(items.is_empty(), "desired end state holds either way");
}

// ── Online failure paths ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn failed_online_toggle_rolls_back_the_cache_only() {
    let env = TestEnv::new();
    env.api.seed(vec![make_item("srv_1", false)]);
    env.mirror.save_items(&[make_item("srv_1", false)]).unwrap();
    env.coordinator.hydrate_from_mirror();
    env.go_online().await;
    env.api.fail("toggle");

    let items = env.coordinator.toggle_item("srv_1").await.unwrap();
    assert!(!items[0].checked, "cache reverted to confirmed state");

    // The mirror keeps what the user asked for.
    let mirrored = env.mirror.load_items().unwrap().unwrap();
    assert!(mirrored[0].checked);
    assert!(!env.coordinator.has_pending_sync(), "failure is not queued");
}

#[tokio::test(start_paused = true)]
async fn failed_online_add_rolls_back_and_errors() {
    let env = TestEnv::new();
    env.go_online().await;
    env.api.fail("create");

    let result = env.coordinator.add_item(NewItemInput::named("Milk")).await;
    assert!(result.is_err());
    let (items, counts) = env.cache.snapshot();
    assert!(items.is_empty(), "optimistic add rolled back");
    assert_eq!(counts, GroceryCounts::default());
}

#[tokio::test(start_paused = true)]
async fn failed_online_clear_all_restores_the_mirror() {
    let env = TestEnv::new();
    env.api.seed(vec![make_item("srv_1", true)]);
    env.mirror.save_items(&[make_item("srv_1", true)]).unwrap();
    env.coordinator.hydrate_from_mirror();
    env.go_online().await;
    env.api.fail("clear_all");

    let result = env.coordinator.clear_all().await;
    assert!(result.is_err());

    let mirrored = env.mirror.load_items().unwrap().unwrap();
    assert_eq!(mirrored.len(), 1, "mirror restored to pre-op snapshot");
    let (cached, _) = env.cache.snapshot();
    assert_eq!(cached.len(), 1, "cache never showed the clear");
}

// ── Temp-id guard ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn toggle_of_unsynced_temp_item_never_reaches_the_server() {
    let env = TestEnv::new();

    // Add offline, then reconnect before any drain has run.
    let item = env
        .coordinator
        .add_item(NewItemInput::named("Milk"))
        .await
        .unwrap();
    env.go_online().await;

    env.coordinator.toggle_item(&item.id).await.unwrap();
    assert!(
        !env
            .api
            .call_log()
            .iter()
            .any(|c| c.contains(&item.id)),
        "temp id must never appear in a server call"
    );

    // The toggle folded into the queued add instead.
    let queued = env.queue.dequeue_all().unwrap();
    assert_eq!(queued.len(), 1);
    match &queued[0].action {
        GroceryAction::AddItem { item: queued_item, .. } => assert!(queued_item.checked),
        other => panic!("expected queued add, got {}", other.kind()),
    }
}

// ── Recipe adds ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn online_recipe_add_lands_server_items_in_cache_and_mirror() {
    let env = TestEnv::new();
    env.go_online().await;

    let items = env
        .coordinator
        .add_from_recipe(
            "r1",
            "Pancakes",
            vec![NewItemInput::named("Eggs"), NewItemInput::named("Flour")],
        )
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| !is_temp_id(&i.id)));
    assert!(items
        .iter()
        .all(|i| i.recipe_title.as_deref() == Some("Pancakes")));

    let mirrored = env.mirror.load_items().unwrap().unwrap();
    assert!(mirrored.iter().all(|i| !is_temp_id(&i.id)));
    let (cached, counts) = env.cache.snapshot();
    assert_eq!(cached.len(), 2);
    assert_eq!(counts, GroceryCounts::of(&cached));
}

#[tokio::test(start_paused = true)]
async fn offline_recipe_add_synthesizes_temp_items() {
    let env = TestEnv::new();

    let items = env
        .coordinator
        .add_from_recipe("r1", "Pancakes", vec![NewItemInput::named("Eggs")])
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert!(is_temp_id(&items[0].id));

    let queued = env.queue.dequeue_all().unwrap();
    assert_eq!(queued[0].action.kind(), "add_from_recipe");
}
