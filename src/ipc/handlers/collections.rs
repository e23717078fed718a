use crate::error::PlanResult;
use crate::ipc::error::ok;
use crate::ipc::helpers::{check, mutate, opt_str, planner, required_id, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::{
    Collection, CollectionPatch, CollectionTask, CollectionTaskPatch, Color, Priority,
    TaskContainer,
};
use crate::validation::{self, NAME_MAX, TEXT_MAX};
use serde_json::json;

fn collection_json(c: &Collection) -> serde_json::Value {
    let mut v = json!(c);
    v["task_count"] = json!(c.total_count());
    v["completed_count"] = json!(c.completed_count());
    v["completion_percentage"] = json!(c.completion_percentage());
    v
}

fn name_param(req: &Request, required: bool) -> Result<Option<String>, serde_json::Value> {
    let raw = if required {
        Some(required_str(req, "name")?)
    } else {
        opt_str(req, "name")?
    };
    raw.map(|s| check(req, validation::string(s, "name", 1, NAME_MAX)))
        .transpose()
}

fn text_param(req: &Request, key: &str) -> Result<Option<String>, serde_json::Value> {
    opt_str(req, key)?
        .map(|s| check(req, validation::string(s, key, 0, TEXT_MAX)))
        .transpose()
}

fn color_param(req: &Request) -> Result<Option<Color>, serde_json::Value> {
    opt_str(req, "color")?
        .map(|s| check(req, validation::color(s)))
        .transpose()
}

fn priority_param(req: &Request) -> Result<Option<Priority>, serde_json::Value> {
    opt_str(req, "priority")?
        .map(|s| check(req, validation::priority(s)))
        .transpose()
}

fn tags_param(req: &Request) -> Result<Option<Vec<String>>, serde_json::Value> {
    match req.params.get("tags") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => check(req, validation::string_list(v, "tags")).map(Some),
    }
}

fn title_param(req: &Request, required: bool) -> Result<Option<String>, serde_json::Value> {
    let raw = if required {
        Some(required_str(req, "title")?)
    } else {
        opt_str(req, "title")?
    };
    raw.map(|s| check(req, validation::title(s, "title")))
        .transpose()
}

fn collection_patch(req: &Request) -> Result<CollectionPatch, serde_json::Value> {
    Ok(CollectionPatch {
        name: name_param(req, false)?,
        description: text_param(req, "description")?,
        color: color_param(req)?,
    })
}

fn task_patch(req: &Request) -> Result<CollectionTaskPatch, serde_json::Value> {
    Ok(CollectionTaskPatch {
        title: title_param(req, false)?,
        priority: priority_param(req)?,
        tags: tags_param(req)?,
        notes: text_param(req, "notes")?,
    })
}

fn collection_task_reply(c: &Collection, task_id: &str) -> PlanResult<serde_json::Value> {
    let task = c.task(task_id)?;
    Ok(json!({
        "task": task,
        "collection": {
            "id": c.id,
            "task_count": c.total_count(),
            "completed_count": c.completed_count(),
            "completion_percentage": c.completion_percentage(),
        },
    }))
}

fn handle_collections_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let planner = match planner(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let collections: Vec<serde_json::Value> = planner
        .collections_by_recency()
        .into_iter()
        .map(collection_json)
        .collect();
    ok(&req.id, json!({ "collections": collections }))
}

fn handle_collections_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let planner = match planner(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let collection_id = match required_id(req, "collectionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match check(req, planner.collection(&collection_id)) {
        Ok(c) => ok(&req.id, json!({ "collection": collection_json(c) })),
        Err(e) => e,
    }
}

fn handle_collections_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match name_param(req, true) {
        Ok(v) => v.unwrap_or_default(),
        Err(e) => return e,
    };
    let description = match text_param(req, "description") {
        Ok(v) => v.unwrap_or_default(),
        Err(e) => return e,
    };
    let color = match color_param(req) {
        Ok(v) => v.unwrap_or_default(),
        Err(e) => return e,
    };
    match mutate(state, req, |p| {
        Ok(collection_json(p.create_collection(&name, &description, color)))
    }) {
        Ok(c) => {
            tracing::info!(name = %name, "collection created");
            ok(&req.id, json!({ "collectionId": c["id"], "collection": c }))
        }
        Err(e) => e,
    }
}

fn handle_collections_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let collection_id = match required_id(req, "collectionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch = match collection_patch(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match mutate(state, req, |p| {
        Ok(collection_json(p.update_collection(&collection_id, patch)?))
    }) {
        Ok(c) => ok(&req.id, json!({ "collection": c })),
        Err(e) => e,
    }
}

fn handle_collections_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let collection_id = match required_id(req, "collectionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match mutate(state, req, |p| p.delete_collection(&collection_id)) {
        Ok(c) => {
            tracing::info!(name = %c.name, tasks = c.tasks.len(), "collection deleted");
            ok(
                &req.id,
                json!({ "ok": true, "removedTasks": c.tasks.len() }),
            )
        }
        Err(e) => e,
    }
}

fn handle_collection_tasks_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let collection_id = match required_id(req, "collectionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let title = match title_param(req, true) {
        Ok(v) => v.unwrap_or_default(),
        Err(e) => return e,
    };
    let priority = match priority_param(req) {
        Ok(v) => v.unwrap_or_default(),
        Err(e) => return e,
    };
    let tags = match tags_param(req) {
        Ok(v) => v.unwrap_or_default(),
        Err(e) => return e,
    };
    let notes = match text_param(req, "notes") {
        Ok(v) => v.unwrap_or_default(),
        Err(e) => return e,
    };
    match mutate(state, req, |p| {
        let task = CollectionTask::new(&title, priority, tags, &notes);
        let task_id = p.add_collection_task(&collection_id, task)?.id.clone();
        collection_task_reply(p.collection(&collection_id)?, &task_id)
    }) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

fn handle_collection_tasks_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let collection_id = match required_id(req, "collectionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let task_id = match required_id(req, "taskId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch = match task_patch(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match mutate(state, req, |p| {
        p.update_collection_task(&collection_id, &task_id, patch)?;
        collection_task_reply(p.collection(&collection_id)?, &task_id)
    }) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

fn handle_collection_tasks_toggle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let collection_id = match required_id(req, "collectionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let task_id = match required_id(req, "taskId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match mutate(state, req, |p| {
        let c = p.collection_mut(&collection_id)?;
        let completed = c.toggle_task(&task_id)?;
        let mut reply = collection_task_reply(c, &task_id)?;
        reply["completed"] = json!(completed);
        Ok(reply)
    }) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

fn handle_collection_tasks_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let collection_id = match required_id(req, "collectionId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let task_id = match required_id(req, "taskId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match mutate(state, req, |p| {
        let c = p.collection_mut(&collection_id)?;
        c.remove_task(&task_id)?;
        Ok(json!({
            "ok": true,
            "task_count": c.total_count(),
            "completed_count": c.completed_count(),
        }))
    }) {
        Ok(v) => ok(&req.id, v),
        Err(e) => e,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "collections.list" => Some(handle_collections_list(state, req)),
        "collections.get" => Some(handle_collections_get(state, req)),
        "collections.create" => Some(handle_collections_create(state, req)),
        "collections.update" => Some(handle_collections_update(state, req)),
        "collections.delete" => Some(handle_collections_delete(state, req)),
        "collections.tasks.add" => Some(handle_collection_tasks_add(state, req)),
        "collections.tasks.update" => Some(handle_collection_tasks_update(state, req)),
        "collections.tasks.toggle" => Some(handle_collection_tasks_toggle(state, req)),
        "collections.tasks.delete" => Some(handle_collection_tasks_delete(state, req)),
        _ => None,
    }
}
