use crate::backup;
use crate::error::PlanError;
use crate::export;
use crate::ipc::error::{err, ok, plan_err};
use crate::ipc::helpers::{check, no_workspace, opt_str, planner, required_str, store};
use crate::ipc::types::{AppState, Request};
use crate::model::now;
use anyhow::Context;
use serde_json::json;
use std::path::{Path, PathBuf};

fn out_path(req: &Request) -> Result<Option<PathBuf>, serde_json::Value> {
    Ok(opt_str(req, "outPath")?
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from))
}

fn write_export(path: &Path, content: &str) -> Result<(), PlanError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))
            .map_err(|e| PlanError::storage(path, e))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("failed to write {}", path.display()))
        .map_err(|e| PlanError::storage(path, e))
}

/// Returns the export inline, or writes it to `outPath` when given.
fn deliver(req: &Request, format: &str, content: String) -> serde_json::Value {
    let target = match out_path(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match target {
        None => ok(&req.id, json!({ "format": format, "content": content })),
        Some(path) => match write_export(&path, &content) {
            Ok(()) => {
                tracing::info!(format, path = %path.display(), bytes = content.len(), "export written");
                ok(
                    &req.id,
                    json!({
                        "ok": true,
                        "format": format,
                        "path": path.to_string_lossy(),
                        "bytes": content.len(),
                    }),
                )
            }
            Err(e) => plan_err(&req.id, &e),
        },
    }
}

fn handle_export_json(state: &mut AppState, req: &Request) -> serde_json::Value {
    let planner = match planner(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let content = match export::export_json(planner, now()) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "storage_failed", e.to_string(), None),
    };
    deliver(req, "json", content)
}

fn handle_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let planner = match planner(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let content = export::export_csv(planner);
    deliver(req, "csv", content)
}

fn handle_backup_export_workspace_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match required_str(req, "outPath") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        Ok(_) => return err(&req.id, "bad_params", "missing outPath", None),
        Err(e) => return e,
    };
    let store = match store(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };

    // A fresh workspace has nothing on disk yet.
    if !store.path().is_file() {
        if let Err(e) = check(req, store.save(&state.planner)) {
            return e;
        }
    }

    let export = match backup::export_workspace_bundle(store.path(), &out_path) {
        Ok(v) => v,
        Err(e) => return plan_err(&req.id, &PlanError::storage(&out_path, e)),
    };
    tracing::info!(path = %out_path.display(), sha256 = %export.sha256, "workspace bundle exported");

    ok(
        &req.id,
        json!({
            "ok": true,
            "path": out_path.to_string_lossy(),
            "bundleFormat": export.bundle_format,
            "entryCount": export.entry_count,
            "sha256": export.sha256,
        }),
    )
}

fn handle_backup_import_workspace_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let in_path = match required_str(req, "inPath") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        Ok(_) => return err(&req.id, "bad_params", "missing inPath", None),
        Err(e) => return e,
    };
    let Some(workspace_path) = state.workspace.clone() else {
        return no_workspace(req);
    };
    let data_path = match store(state, req) {
        Ok(s) => s.path().to_path_buf(),
        Err(e) => return e,
    };

    if !in_path.is_file() {
        return err(
            &req.id,
            "not_found",
            "bundle file not found",
            Some(json!({ "entity": "bundle", "id": in_path.to_string_lossy() })),
        );
    }

    let import = match backup::import_workspace_bundle(&in_path, &data_path, |bytes| {
        crate::store::parse_document(bytes).map(|_| ())
    }) {
        Ok(v) => v,
        Err(e) => return plan_err(&req.id, &PlanError::storage(&in_path, e)),
    };

    match state.open_workspace(workspace_path.clone(), false) {
        Ok(_) => {
            tracing::info!(
                path = %in_path.display(),
                format = %import.bundle_format_detected,
                "workspace bundle imported"
            );
            ok(
                &req.id,
                json!({
                    "ok": true,
                    "workspacePath": workspace_path.to_string_lossy(),
                    "bundleFormatDetected": import.bundle_format_detected,
                    "dayCount": state.planner.days.len(),
                    "collectionCount": state.planner.collections.len(),
                }),
            )
        }
        Err(e) => plan_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "export.json" => Some(handle_export_json(state, req)),
        "export.csv" => Some(handle_export_csv(state, req)),
        "backup.exportWorkspaceBundle" => Some(handle_backup_export_workspace_bundle(state, req)),
        "backup.importWorkspaceBundle" => Some(handle_backup_import_workspace_bundle(state, req)),
        _ => None,
    }
}
