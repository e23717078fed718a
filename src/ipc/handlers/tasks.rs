use crate::ipc::error::ok;
use crate::ipc::helpers::{check, mutate, required_id, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::{Day, Task, TaskContainer};
use crate::stats::day_metrics;
use crate::validation;
use serde_json::json;

fn task_json(task: &Task) -> serde_json::Value {
    let (done, total) = task.subtask_progress();
    let mut v = json!(task);
    v["status"] = json!(task.status());
    v["subtask_progress"] = json!({ "completed": done, "total": total });
    v
}

/// Task plus the owning day's refreshed completion summary.
fn task_reply(day: &Day, task_id: &str) -> crate::error::PlanResult<serde_json::Value> {
    let task = day.task(task_id)?;
    Ok(json!({ "task": task_json(task), "day": day_metrics(day) }))
}

fn day_and_task(req: &Request) -> Result<(String, String), serde_json::Value> {
    Ok((required_id(req, "dayId")?, required_id(req, "taskId")?))
}

fn title_param(req: &Request) -> Result<String, serde_json::Value> {
    let raw = required_str(req, "title")?;
    check(req, validation::title(raw, "title"))
}

fn handle_tasks_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let day_id = match required_id(req, "dayId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let title = match title_param(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match mutate(state, req, |p| {
        let day = p.day_mut(&day_id)?;
        let task_id = day.add_task(&title).id.clone();
        task_reply(day, &task_id)
    }) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

fn handle_tasks_toggle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (day_id, task_id) = match day_and_task(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match mutate(state, req, |p| {
        let day = p.day_mut(&day_id)?;
        let completed = day.toggle_task(&task_id)?;
        let mut reply = task_reply(day, &task_id)?;
        reply["completed"] = json!(completed);
        Ok(reply)
    }) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

fn handle_tasks_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (day_id, task_id) = match day_and_task(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let title = match title_param(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match mutate(state, req, |p| {
        let day = p.day_mut(&day_id)?;
        day.edit_task(&task_id, &title)?;
        task_reply(day, &task_id)
    }) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

fn handle_tasks_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (day_id, task_id) = match day_and_task(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match mutate(state, req, |p| {
        let day = p.day_mut(&day_id)?;
        let removed = day.remove_task(&task_id)?;
        Ok(json!({
            "ok": true,
            "removedSubtasks": removed.subtasks.len(),
            "day": day_metrics(day),
        }))
    }) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

fn handle_tasks_toggle_expand(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (day_id, task_id) = match day_and_task(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match mutate(state, req, |p| {
        Ok(p.day_mut(&day_id)?.task_mut(&task_id)?.toggle_expand())
    }) {
        Ok(expanded) => ok(&req.id, json!({ "is_expanded": expanded })),
        Err(e) => e,
    }
}

fn handle_subtasks_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (day_id, task_id) = match day_and_task(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let title = match title_param(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match mutate(state, req, |p| {
        let day = p.day_mut(&day_id)?;
        let subtask = day.task_mut(&task_id)?.add_subtask(&title).clone();
        let mut reply = task_reply(day, &task_id)?;
        reply["subtask"] = json!(subtask);
        Ok(reply)
    }) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

fn handle_subtasks_toggle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (day_id, task_id) = match day_and_task(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subtask_id = match required_id(req, "subtaskId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match mutate(state, req, |p| {
        let day = p.day_mut(&day_id)?;
        let completed = day.task_mut(&task_id)?.toggle_subtask(&subtask_id)?;
        let mut reply = task_reply(day, &task_id)?;
        reply["completed"] = json!(completed);
        Ok(reply)
    }) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

fn handle_subtasks_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (day_id, task_id) = match day_and_task(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subtask_id = match required_id(req, "subtaskId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match mutate(state, req, |p| {
        let day = p.day_mut(&day_id)?;
        day.task_mut(&task_id)?.remove_subtask(&subtask_id)?;
        task_reply(day, &task_id)
    }) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "tasks.add" => Some(handle_tasks_add(state, req)),
        "tasks.toggle" => Some(handle_tasks_toggle(state, req)),
        "tasks.update" => Some(handle_tasks_update(state, req)),
        "tasks.delete" => Some(handle_tasks_delete(state, req)),
        "tasks.toggleExpand" => Some(handle_tasks_toggle_expand(state, req)),
        "subtasks.add" => Some(handle_subtasks_add(state, req)),
        "subtasks.toggle" => Some(handle_subtasks_toggle(state, req)),
        "subtasks.delete" => Some(handle_subtasks_delete(state, req)),
        _ => None,
    }
}
