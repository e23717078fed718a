use crate::ipc::error::{ok, plan_err};
use crate::ipc::helpers::{parse_bool, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "dataFile": state.store.as_ref().map(|s| s.path().to_string_lossy().to_string()),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match required_str(req, "path") {
        Ok(v) => PathBuf::from(v.trim()),
        Err(e) => return e,
    };
    let reset_on_corrupt = match parse_bool(req, "resetOnCorrupt", false) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match state.open_workspace(path.clone(), reset_on_corrupt) {
        Ok(quarantined) => ok(
            &req.id,
            json!({
                "workspacePath": path.to_string_lossy(),
                "dayCount": state.planner.days.len(),
                "collectionCount": state.planner.collections.len(),
                "quarantinedPath": quarantined.map(|p| p.to_string_lossy().to_string()),
            }),
        ),
        Err(e) => plan_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
