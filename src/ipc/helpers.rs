use crate::error::{PlanError, PlanResult};
use crate::ipc::error::{err, plan_err};
use crate::ipc::types::{AppState, Request};
use crate::model::Planner;
use crate::store::Store;
use crate::validation;
use serde_json::Value as JsonValue;

pub fn no_workspace(req: &Request) -> JsonValue {
    err(&req.id, "no_workspace", "select a workspace first", None)
}

pub fn store<'a>(state: &'a AppState, req: &Request) -> Result<&'a Store, JsonValue> {
    state.store.as_ref().ok_or_else(|| no_workspace(req))
}

/// Lifts a domain result into a handler result.
pub fn check<T>(req: &Request, r: PlanResult<T>) -> Result<T, JsonValue> {
    r.map_err(|e| plan_err(&req.id, &e))
}

pub fn required_str<'a>(req: &'a Request, key: &str) -> Result<&'a str, JsonValue> {
    match req.params.get(key) {
        Some(JsonValue::String(s)) => Ok(s.as_str()),
        Some(v) if !v.is_null() => check(
            req,
            Err(PlanError::validation(key, format!("{key} must be a string"))),
        ),
        _ => check(req, Err(PlanError::validation(key, format!("missing {key}")))),
    }
}

pub fn opt_str<'a>(req: &'a Request, key: &str) -> Result<Option<&'a str>, JsonValue> {
    match req.params.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.as_str())),
        Some(_) => check(
            req,
            Err(PlanError::validation(key, format!("{key} must be a string"))),
        ),
    }
}

/// A required id parameter, validated and normalized.
pub fn required_id(req: &Request, key: &str) -> Result<String, JsonValue> {
    let raw = required_str(req, key)?;
    check(req, validation::uuid(raw, key))
}

pub fn opt_i64(req: &Request, key: &str) -> Result<Option<i64>, JsonValue> {
    match req.params.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => match v.as_i64() {
            Some(n) => Ok(Some(n)),
            None => check(
                req,
                Err(PlanError::validation(key, format!("{key} must be an integer"))),
            ),
        },
    }
}

pub fn required_i64(req: &Request, key: &str) -> Result<i64, JsonValue> {
    match opt_i64(req, key)? {
        Some(n) => Ok(n),
        None => check(req, Err(PlanError::validation(key, format!("missing {key}")))),
    }
}

pub fn parse_bool(req: &Request, key: &str, default: bool) -> Result<bool, JsonValue> {
    match req.params.get(key) {
        None | Some(JsonValue::Null) => Ok(default),
        Some(JsonValue::Bool(b)) => Ok(*b),
        Some(_) => check(
            req,
            Err(PlanError::validation(key, format!("{key} must be a boolean"))),
        ),
    }
}

/// Applies `f` to a copy of the graph and saves it; the live graph is
/// replaced only when both succeed.
pub fn mutate<T, F>(state: &mut AppState, req: &Request, f: F) -> Result<T, JsonValue>
where
    F: FnOnce(&mut Planner) -> PlanResult<T>,
{
    let store = store(state, req)?;
    let mut next = state.planner.clone();
    let out = check(req, f(&mut next))?;
    check(req, store.save(&next))?;
    state.planner = next;
    tracing::debug!(request = %req.id, method = %req.method, "mutation committed");
    Ok(out)
}

/// The live graph, provided a workspace is selected.
pub fn planner<'a>(state: &'a AppState, req: &Request) -> Result<&'a Planner, JsonValue> {
    store(state, req)?;
    Ok(&state.planner)
}
