#![forbid(unsafe_code)]

mod support;

use pretty_assertions::assert_eq;
use serde_json::json;
use support::*;

#[test]
fn site_describes_registered_models_and_actions() {
    let mut server = Server::start("site_describes_registered_models");
    let site = server.call_ok("site", json!({}));

    assert_eq!(site["site_title"], "House inventory");
    assert_eq!(site["index_title"], "Inventory management");
    let models = site["models"]
        .as_array()
        .expect("models")
        .iter()
        .map(|model| model["model"].as_str().expect("model").to_string())
        .collect::<Vec<_>>();
    assert_eq!(models, vec!["category", "item", "location"]);

    let item = &site["models"][1];
    assert_eq!(item["title"], "Items");
    assert_eq!(item["actions"][0]["name"], "move_to_other_location");
    assert_eq!(item["actions"][1]["name"], "change_category");
    assert_eq!(site["models"][2]["actions"][0]["name"], "create_sections");
    assert_eq!(site["models"][2]["display_mode"], "indentation");
    assert_eq!(site["models"][0]["display_mode"], "breadcrumbs");
    assert!(
        site["methods"]
            .as_array()
            .expect("methods")
            .contains(&json!("changelist"))
    );
}

#[test]
fn site_title_and_display_modes_come_from_flags() {
    let mut server = Server::start_with_args(
        "site_title_from_flags",
        &[
            "--site-title",
            "Garage",
            "--locations-display-mode",
            "breadcrumbs",
        ],
    );
    let site = server.call_ok("site", json!({}));
    assert_eq!(site["site_title"], "Garage");
    assert_eq!(site["site_header"], "House inventory");
    assert_eq!(site["models"][2]["display_mode"], "breadcrumbs");
}

#[test]
fn protocol_errors_follow_json_rpc() {
    let mut server = Server::start("protocol_errors_follow_json_rpc");

    server.send_raw("{\"jsonrpc\":\"2.0\",");
    assert_json_rpc_error(&server.recv(), -32700);

    server.send_raw("[]");
    assert_json_rpc_error(&server.recv(), -32600);

    let resp = server.request(json!({ "jsonrpc": "2.0", "id": 5 }));
    assert_json_rpc_error(&resp, -32600);
    assert_eq!(resp["id"], 5);

    let resp = server.request(json!({ "jsonrpc": "2.0", "id": 6, "method": "initialize" }));
    assert_json_rpc_error(&resp, -32601);

    // Notifications are never answered; the ping proves nothing was queued before it.
    server.send(json!({ "jsonrpc": "2.0", "method": "site" }));
    let resp = server.request(json!({ "jsonrpc": "2.0", "id": 7, "method": "ping" }));
    assert_eq!(resp["id"], 7);
    assert_eq!(resp["result"], json!({}));
}

#[test]
fn records_round_trip_through_add_get_change_delete() {
    let mut server = Server::start("records_round_trip");

    let garage = server.add("location", json!({ "name": "Garage", "locator": "G" }));
    let cabinet = server.add(
        "location",
        json!({ "name": "Cabinet", "locator": "C", "parent": garage }),
    );
    let got = server.call_ok("get", json!({ "model": "location", "id": cabinet }));
    assert_eq!(got["object"]["display"], "G/C");
    assert_eq!(got["object"]["parent_id"], garage);

    let food = server.add("category", json!({ "name": "Food" }));
    let added = server.call_ok(
        "add",
        json!({
            "model": "item",
            "fields": {
                "name": "Milk",
                "amount": 2,
                "unit": "L",
                "location": cabinet,
                "category": food,
                "expiration": "2026-10-25"
            }
        }),
    );
    assert_eq!(
        added["message"],
        "The item \"Food: Milk (2 L)\" was added successfully."
    );
    let milk = added["object"]["id"].as_i64().expect("id");
    assert_eq!(added["object"]["expiration"], "2026-10-25");

    let changed = server.call_ok(
        "change",
        json!({ "model": "item", "id": milk, "fields": { "category": null, "expiration": null } }),
    );
    assert_eq!(changed["object"]["display"], "Milk (2 L)");
    assert_eq!(changed["object"]["category_id"], json!(null));
    assert_eq!(changed["object"]["location_id"], cabinet);

    let moved = server.call_ok(
        "change",
        json!({ "model": "location", "id": cabinet, "fields": { "parent": null } }),
    );
    assert_eq!(moved["object"]["display"], "C");

    let deleted = server.call_ok("delete", json!({ "model": "location", "id": cabinet }));
    assert_eq!(
        deleted["message"],
        "The location \"C\" was deleted successfully."
    );
    let orphan = server.call_ok("get", json!({ "model": "item", "id": milk }));
    assert_eq!(orphan["object"]["location_id"], json!(null));
    assert_eq!(
        server.call_err("get", json!({ "model": "location", "id": cabinet })),
        "UNKNOWN_ID"
    );
}

#[test]
fn get_lists_direct_children_and_items_inline() {
    let mut server = Server::start("get_lists_inlines");

    let garage = server.add("location", json!({ "name": "Garage", "locator": "G" }));
    let shelf = server.add(
        "location",
        json!({ "name": "Shelf", "locator": "S", "parent": garage }),
    );
    server.add(
        "location",
        json!({ "name": "Bin", "locator": "B", "parent": shelf }),
    );
    let cabinet = server.add(
        "location",
        json!({ "name": "Cabinet", "locator": "C", "parent": garage }),
    );
    let tools = server.add("category", json!({ "name": "Tools" }));
    let hand = server.add("category", json!({ "name": "Hand tools", "parent": tools }));
    let saw = server.add(
        "item",
        json!({ "name": "Saw", "location": garage, "category": hand }),
    );
    let rope = server.add(
        "item",
        json!({ "name": "Rope", "amount": 12, "unit": "m", "location": garage }),
    );
    server.add(
        "item",
        json!({ "name": "Hammer", "location": shelf, "category": hand }),
    );

    let got = server.call_ok("get", json!({ "model": "location", "id": garage }));
    assert_eq!(
        got["children"],
        json!([
            { "id": cabinet, "name": "Cabinet", "locator": "C" },
            { "id": shelf, "name": "Shelf", "locator": "S" },
        ])
    );
    assert_eq!(
        got["items"],
        json!([
            { "id": rope, "name": "Rope", "amount": 12, "unit": "m", "category": null, "expiration": null },
            { "id": saw, "name": "Saw", "amount": 1, "unit": "pieces", "category": "Tools/Hand tools", "expiration": null },
        ])
    );

    let got = server.call_ok("get", json!({ "model": "category", "id": hand }));
    let names = got["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|item| item["name"].as_str().expect("name").to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Hammer", "Saw"]);
    assert_eq!(got["items"][0]["location"], "G/S");
    assert!(got.get("children").is_none());

    let got = server.call_ok("get", json!({ "model": "category", "id": tools }));
    assert_eq!(got["items"], json!([]));
}

#[test]
fn invalid_records_are_rejected_with_stable_codes() {
    let mut server = Server::start("invalid_records_are_rejected");

    assert_eq!(
        server.call_err("get", json!({ "model": "user", "id": 1 })),
        "UNKNOWN_MODEL"
    );
    assert_eq!(
        server.call_err("add", json!({ "model": "item", "fields": { "name": "Rope", "unit": "ft" } })),
        "INVALID_INPUT"
    );
    assert_eq!(
        server.call_err("add", json!({ "model": "location", "fields": { "name": " ", "locator": "X" } })),
        "INVALID_INPUT"
    );
    assert_eq!(
        server.call_err("add", json!({ "model": "item", "fields": { "name": "Rope", "location": 42 } })),
        "UNKNOWN_ID"
    );
    assert_eq!(
        server.call_err("add", json!({ "model": "item", "fields": { "name": "Rope", "expiration": "soon" } })),
        "INVALID_INPUT"
    );

    let tools = server.add("category", json!({ "name": "Tools" }));
    let hand = server.add("category", json!({ "name": "Hand tools", "parent": tools }));
    assert_eq!(
        server.call_err(
            "change",
            json!({ "model": "category", "id": tools, "fields": { "parent": hand } })
        ),
        "TREE_CYCLE"
    );
    assert_eq!(
        server.call_err(
            "change",
            json!({ "model": "category", "id": tools, "fields": { "parent": tools } })
        ),
        "TREE_CYCLE"
    );
}

#[test]
fn history_lists_audit_entries_newest_first() {
    let mut server = Server::start("history_lists_audit_entries");

    let garage = server.add("location", json!({ "name": "Garage", "locator": "G" }));
    server.add("item", json!({ "name": "Hammer", "location": garage }));
    server.call_ok(
        "change",
        json!({ "model": "location", "id": garage, "fields": { "locator": "GR" } }),
    );

    let history = server.call_ok("history", json!({ "model": "location" }));
    assert_eq!(history["count"], 2);
    assert_eq!(history["entries"][0]["action"], "change");
    assert_eq!(history["entries"][0]["object_repr"], "GR");
    assert_eq!(history["entries"][0]["actor"], "tester");
    assert_eq!(history["entries"][1]["action"], "addition");
    assert_eq!(history["entries"][1]["object_repr"], "G");

    let all = server.call_ok("history", json!({}));
    assert_eq!(all["count"], 3);
    assert_eq!(all["entries"][1]["model"], "item");

    let limited = server.call_ok("history", json!({ "limit": 1 }));
    assert_eq!(limited["count"], 1);
}
