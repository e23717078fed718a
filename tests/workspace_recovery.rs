mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, temp_dir};

#[test]
fn corrupt_data_file_is_reported_then_quarantined_on_request() {
    let workspace = temp_dir("dayplan-corrupt");
    let data = workspace.join("dayplan_data.json");
    std::fs::write(&data, "{ this is not json").expect("write corrupt file");

    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let e = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(e["code"], "storage_failed");
    assert!(e["details"]["path"]
        .as_str()
        .expect("path")
        .ends_with("dayplan_data.json"));
    // The failed select leaves no workspace behind.
    let e = request_err(&mut stdin, &mut reader, "2", "days.list", json!({}));
    assert_eq!(e["code"], "no_workspace");

    let reset = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy(), "resetOnCorrupt": true }),
    );
    assert_eq!(reset["dayCount"], 0);
    let moved = reset["quarantinedPath"].as_str().expect("quarantined path");
    assert_eq!(
        std::fs::read_to_string(moved).expect("read quarantined"),
        "{ this is not json"
    );
    assert!(!data.exists());

    request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "days.create",
        json!({ "date": "2024-08-01" }),
    );
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&data).expect("read data")).expect("json");
    assert_eq!(saved["days"].as_array().expect("days").len(), 1);
    assert!(saved["last_updated"].is_string());

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn legacy_field_names_load() {
    let workspace = temp_dir("dayplan-legacy-fields");
    let doc = json!({
        "days": [{
            "id": "6f1c2d9e-3a4b-4c5d-8e7f-0123456789ab",
            "date": "2024-09-01",
            "expanded": false,
            "tasks": [{
                "id": "7a2b3c4d-5e6f-4a1b-9c2d-3e4f5a6b7c8d",
                "title": "Legacy",
                "completed": true,
                "created_at": "2024-09-01T08:00:00",
                "completed_at": "2024-09-01T09:30:00"
            }]
        }],
        "collections": []
    });
    std::fs::write(
        workspace.join("dayplan_data.json"),
        serde_json::to_string_pretty(&doc).expect("doc"),
    )
    .expect("write doc");

    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let got = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "days.get",
        json!({ "dayId": "6f1c2d9e-3a4b-4c5d-8e7f-0123456789ab" }),
    );
    let day = &got["day"];
    assert_eq!(day["is_expanded"], false);
    assert_eq!(day["completion_status"], "complete");
    assert_eq!(day["tasks"][0]["is_expanded"], true);
    assert_eq!(day["tasks"][0]["is_default"], false);

    let _ = std::fs::remove_dir_all(workspace);
}
