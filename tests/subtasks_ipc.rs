mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar_with_env, str_field, temp_dir};

#[test]
fn subtasks_track_progress_without_completing_the_parent() {
    let workspace = temp_dir("dayplan-subtasks");
    let (_child, mut stdin, mut reader) = spawn_sidecar_with_env(&[("DAYPLAN_DEFAULT_TASKS", "")]);

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
        json!({ "date": "2024-04-02" }),
    );
    let day_id = str_field(&created, "dayId");
    assert_eq!(created["day"]["completion_status"], "empty");

    let added = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "tasks.add",
        json!({ "dayId": day_id, "title": "  Pack for trip  " }),
    );
    let task_id = str_field(&added["task"], "id");
    assert_eq!(added["task"]["title"], "Pack for trip");
    assert_eq!(added["task"]["is_default"], false);
    assert_eq!(added["task"]["is_expanded"], true);

    let mut subtask_ids = Vec::new();
    for (i, title) in ["Socks", "Charger"].into_iter().enumerate() {
        let r = request_ok(
            &mut stdin,
            &mut reader,
            &format!("s{i}"),
            "subtasks.add",
            json!({ "dayId": day_id, "taskId": task_id, "title": title }),
        );
        subtask_ids.push(str_field(&r["subtask"], "id"));
    }

    let toggled = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "subtasks.toggle",
        json!({ "dayId": day_id, "taskId": task_id, "subtaskId": subtask_ids[0] }),
    );
    assert_eq!(toggled["completed"], true);
    assert_eq!(toggled["task"]["subtask_progress"]["completed"], 1);
    assert_eq!(toggled["task"]["subtask_progress"]["total"], 2);
    assert_eq!(toggled["task"]["status"], "partial");

    let both = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "subtasks.toggle",
        json!({ "dayId": day_id, "taskId": task_id, "subtaskId": subtask_ids[1] }),
    );
    assert_eq!(both["task"]["status"], "complete");
    // Subtasks never flip the parent.
    assert_eq!(both["task"]["completed"], false);
    assert_eq!(both["day"]["completed_count"], 0);

    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "subtasks.delete",
        json!({ "dayId": day_id, "taskId": task_id, "subtaskId": subtask_ids[0] }),
    );
    assert_eq!(removed["task"]["subtask_progress"]["total"], 1);

    let again = request_err(
        &mut stdin,
        &mut reader,
        "7",
        "subtasks.delete",
        json!({ "dayId": day_id, "taskId": task_id, "subtaskId": subtask_ids[0] }),
    );
    assert_eq!(again["code"], "not_found");
    assert_eq!(again["details"]["entity"], "subtask");

    let collapsed = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "tasks.toggleExpand",
        json!({ "dayId": day_id, "taskId": task_id }),
    );
    assert_eq!(collapsed["is_expanded"], false);

    let renamed = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "tasks.update",
        json!({ "dayId": day_id, "taskId": task_id, "title": "Pack bags" }),
    );
    assert_eq!(renamed["task"]["title"], "Pack bags");
    assert_eq!(renamed["task"]["subtasks"].as_array().expect("subtasks").len(), 1);

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "tasks.delete",
        json!({ "dayId": day_id, "taskId": task_id }),
    );
    assert_eq!(deleted["removedSubtasks"], 1);
    assert_eq!(deleted["day"]["total_count"], 0);

    let _ = std::fs::remove_dir_all(workspace);
}
