mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, str_field, temp_dir};

fn task_id_by_title(day: &serde_json::Value, title: &str) -> String {
    day["tasks"]
        .as_array()
        .expect("tasks")
        .iter()
        .find(|t| t["title"] == title)
        .and_then(|t| t["id"].as_str())
        .unwrap_or_else(|| panic!("no task {title}"))
        .to_string()
}

#[test]
fn create_toggle_delete_updates_all_time_stats() {
    let workspace = temp_dir("dayplan-day-lifecycle");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "days.create",
        json!({ "date": "2024-01-15" }),
    );
    let day = &created["day"];
    let day_id = str_field(&created, "dayId");
    let titles: Vec<&str> = day["tasks"]
        .as_array()
        .expect("tasks")
        .iter()
        .map(|t| t["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["Clean-up", "Classwork", "Work-out"]);
    assert!(day["tasks"]
        .as_array()
        .expect("tasks")
        .iter()
        .all(|t| t["completed"] == false && t["is_default"] == true));
    assert_eq!(day["completion_status"], "none");

    let before = request_ok(&mut stdin, &mut reader, "3", "stats.allTime", json!({}));
    assert_eq!(before["statistics"]["total_tasks"], 3);
    assert_eq!(before["statistics"]["completed_tasks"], 0);

    let cleanup = task_id_by_title(day, "Clean-up");
    let toggled = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "tasks.toggle",
        json!({ "dayId": day_id, "taskId": cleanup }),
    );
    assert_eq!(toggled["completed"], true);
    assert!(toggled["task"]["completed_at"].is_string());
    assert_eq!(toggled["day"]["completion_status"], "partial");
    assert_eq!(toggled["day"]["completion_percentage"], 33);

    let after = request_ok(&mut stdin, &mut reader, "5", "stats.allTime", json!({}));
    assert_eq!(after["statistics"]["completed_tasks"], 1);

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "days.delete",
        json!({ "dayId": day_id }),
    );
    assert_eq!(deleted["removedTasks"], 3);

    let gone = request_ok(&mut stdin, &mut reader, "7", "stats.allTime", json!({}));
    assert_eq!(gone["statistics"]["total_tasks"], 0);
    assert_eq!(gone["statistics"]["total_days"], 0);

    let missing = request_err(
        &mut stdin,
        &mut reader,
        "8",
        "days.get",
        json!({ "dayId": day_id }),
    );
    assert_eq!(missing["code"], "not_found");
    assert_eq!(missing["details"]["entity"], "day");

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn duplicate_date_is_rejected_and_graph_is_unchanged() {
    let workspace = temp_dir("dayplan-day-duplicate");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "days.create",
        json!({ "date": "2024-02-01" }),
    );
    let dup = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "days.create",
        json!({ "date": "2024-02-01" }),
    );
    assert_eq!(dup["code"], "duplicate");
    assert_eq!(dup["details"]["date"], "2024-02-01");

    let listed = request_ok(&mut stdin, &mut reader, "4", "days.list", json!({}));
    assert_eq!(listed["days"].as_array().expect("days").len(), 1);

    // days.open is the get-or-create path and never duplicates.
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "days.open",
        json!({ "date": "2024-02-01" }),
    );
    assert_eq!(opened["created"], false);

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn toggling_twice_restores_state_and_survives_restart() {
    let workspace = temp_dir("dayplan-day-restart");
    let day_id;
    let task_id;
    {
        let (mut child, mut stdin, mut reader) = spawn_sidecar();
        request_ok(
            &mut stdin,
            &mut reader,
            "1",
            "workspace.select",
            json!({ "path": workspace.to_string_lossy() }),
        );
        let created = request_ok(
            &mut stdin,
            &mut reader,
            "2",
            "days.create",
            json!({ "date": "2024-05-10" }),
        );
        day_id = str_field(&created, "dayId");
        task_id = task_id_by_title(&created["day"], "Work-out");

        for (i, expected) in [true, false].into_iter().enumerate() {
            let r = request_ok(
                &mut stdin,
                &mut reader,
                &format!("t{i}"),
                "tasks.toggle",
                json!({ "dayId": day_id, "taskId": task_id }),
            );
            assert_eq!(r["completed"], expected);
        }
        request_ok(
            &mut stdin,
            &mut reader,
            "3",
            "tasks.add",
            json!({ "dayId": day_id, "title": "Call home" }),
        );
        request_ok(
            &mut stdin,
            &mut reader,
            "4",
            "days.toggleExpand",
            json!({ "dayId": day_id }),
        );
        drop(stdin);
        let _ = child.wait();
    }

    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let selected = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(selected["dayCount"], 1);
    let got = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "days.get",
        json!({ "dayId": day_id }),
    );
    let day = &got["day"];
    assert_eq!(day["is_expanded"], false);
    assert_eq!(day["total_count"], 4);
    assert_eq!(day["completed_count"], 0);
    let workout = day["tasks"]
        .as_array()
        .expect("tasks")
        .iter()
        .find(|t| t["id"] == task_id.as_str())
        .expect("task");
    assert_eq!(workout["completed"], false);
    assert!(workout["completed_at"].is_null());

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn configured_default_tasks_seed_new_days() {
    let workspace = temp_dir("dayplan-day-defaults");
    let ws = workspace.to_string_lossy().to_string();
    let (_child, mut stdin, mut reader) = test_support::spawn_sidecar_with_env(&[
        ("DAYPLAN_WORKSPACE", ws.as_str()),
        ("DAYPLAN_DEFAULT_TASKS", "Stretch|Read"),
    ]);

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health["workspacePath"].is_string());

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "days.open",
        json!({ "date": "2024-06-01" }),
    );
    assert_eq!(opened["created"], true);
    let titles: Vec<&str> = opened["day"]["tasks"]
        .as_array()
        .expect("tasks")
        .iter()
        .map(|t| t["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["Stretch", "Read"]);

    let _ = std::fs::remove_dir_all(workspace);
}
