#![forbid(unsafe_code)]

use inv_core::ids::{CategoryId, ItemId, LocationId};
use inv_storage::{
    AuditAction, AuditListRequest, ItemReference, ItemsUpdateRequest, NewCategory, NewItem,
    NewLocation, SqliteStore, StoreError,
};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("inv_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn location(store: &mut SqliteStore, locator: &str, parent: Option<LocationId>) -> LocationId {
    store
        .create_location(
            "tester",
            NewLocation {
                name: format!("Place {locator}"),
                locator: locator.to_string(),
                description: String::new(),
                parent_id: parent,
            },
        )
        .expect("create location")
        .id
}

fn category(store: &mut SqliteStore, name: &str) -> CategoryId {
    store
        .create_category(
            "tester",
            NewCategory {
                name: name.to_string(),
                parent_id: None,
            },
        )
        .expect("create category")
        .id
}

fn item(store: &mut SqliteStore, request: NewItem) -> ItemId {
    store.create_item("tester", request).expect("create item").id
}

fn item_changes(store: &SqliteStore) -> Vec<(i64, String, String)> {
    let mut rows = store
        .list_audit(AuditListRequest {
            model: Some("item".to_string()),
            object_id: None,
            limit: 100,
        })
        .expect("list audit")
        .into_iter()
        .filter(|row| row.action == AuditAction::Change)
        .map(|row| (row.object_id, row.object_repr, row.actor))
        .collect::<Vec<_>>();
    rows.sort();
    rows
}

#[test]
fn moving_items_updates_every_selected_item() {
    let storage_dir = temp_dir("moving_items_updates_every_selected_item");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    let garage = location(&mut store, "G", None);
    let kitchen = location(&mut store, "K", None);
    let hammer = item(
        &mut store,
        NewItem {
            location_id: Some(garage),
            ..NewItem::named("Hammer")
        },
    );
    let saw = item(
        &mut store,
        NewItem {
            location_id: Some(garage),
            ..NewItem::named("Saw")
        },
    );
    let rope = item(&mut store, NewItem::named("Rope"));
    let untouched = item(&mut store, NewItem::named("Kettle"));

    let updated = store
        .update_items(ItemsUpdateRequest {
            actor: "mover".to_string(),
            ids: vec![hammer, saw, rope],
            set: ItemReference::Location(Some(kitchen)),
        })
        .expect("move items");
    assert_eq!(updated, 3);

    for id in [hammer, saw, rope] {
        assert_eq!(
            store.get_item(id).expect("get item").location_id,
            Some(kitchen)
        );
    }
    assert_eq!(store.get_item(untouched).expect("get item").location_id, None);

    let changes = item_changes(&store);
    assert_eq!(changes.len(), 3);
    assert!(changes.iter().all(|(_, _, actor)| actor == "mover"));
}

#[test]
fn recategorizing_to_nothing_clears_category_and_logs_previous_display() {
    let storage_dir = temp_dir("recategorizing_to_nothing_clears_category");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    let tools = category(&mut store, "Tools");
    let hammer = item(
        &mut store,
        NewItem {
            category_id: Some(tools),
            ..NewItem::named("Hammer")
        },
    );
    let nails = item(
        &mut store,
        NewItem {
            category_id: Some(tools),
            amount: 40,
            ..NewItem::named("Nails")
        },
    );

    let updated = store
        .update_items(ItemsUpdateRequest {
            actor: "tester".to_string(),
            ids: vec![hammer, nails],
            set: ItemReference::Category(None),
        })
        .expect("clear category");
    assert_eq!(updated, 2);

    for id in [hammer, nails] {
        assert_eq!(store.get_item(id).expect("get item").category_id, None);
    }

    let reprs = item_changes(&store)
        .into_iter()
        .map(|(_, repr, _)| repr)
        .collect::<Vec<_>>();
    assert_eq!(
        reprs,
        vec!["Tools: Hammer".to_string(), "Tools: Nails (x40)".to_string()]
    );
}

#[test]
fn unknown_target_fails_before_any_write() {
    let storage_dir = temp_dir("unknown_target_fails_before_any_write");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    let hammer = item(&mut store, NewItem::named("Hammer"));
    let err = store
        .update_items(ItemsUpdateRequest {
            actor: "tester".to_string(),
            ids: vec![hammer],
            set: ItemReference::Location(Some(LocationId::new(404))),
        })
        .expect_err("unknown location must fail");
    assert!(matches!(
        err,
        StoreError::UnknownId {
            entity: "location",
            id: 404
        }
    ));
    assert!(item_changes(&store).is_empty());
}

#[test]
fn empty_selection_is_a_no_op() {
    let storage_dir = temp_dir("empty_selection_is_a_no_op");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let garage = location(&mut store, "G", None);

    let updated = store
        .update_items(ItemsUpdateRequest {
            actor: "tester".to_string(),
            ids: vec![ItemId::new(77)],
            set: ItemReference::Location(Some(garage)),
        })
        .expect("empty move");
    assert_eq!(updated, 0);
    assert!(item_changes(&store).is_empty());
}
