use crate::calendar;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{check, mutate, opt_i64, planner, required_id, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Day;
use crate::stats::day_metrics;
use crate::validation;
use chrono::{Local, NaiveDate};
use serde_json::json;

pub(super) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A day with its completion summary and display labels.
pub(super) fn day_json(day: &Day, today: NaiveDate) -> serde_json::Value {
    let mut v = json!(day);
    if let (Some(obj), Some(metrics)) = (v.as_object_mut(), day_metrics(day).as_object()) {
        for (k, m) in metrics {
            obj.insert(k.clone(), m.clone());
        }
        obj.insert(
            "display_date".into(),
            json!(calendar::display_label(day.date, today)),
        );
        obj.insert("short_date".into(), json!(calendar::short_label(day.date)));
    }
    v
}

fn handle_days_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let planner = match planner(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let year = match opt_i64(req, "year") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let month = match opt_i64(req, "month") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let filter = match (year, month) {
        (Some(y), Some(m)) => {
            let y = match check(req, validation::year(y)) {
                Ok(v) => v,
                Err(e) => return e,
            };
            let m = match check(req, validation::month(m)) {
                Ok(v) => v,
                Err(e) => return e,
            };
            Some((y, m))
        }
        (None, None) => None,
        _ => {
            return err(
                &req.id,
                "bad_params",
                "year and month must be given together",
                None,
            )
        }
    };

    let today = today();
    let days: Vec<serde_json::Value> = planner
        .days
        .iter()
        .rev()
        .filter(|d| filter.map(|(y, m)| d.in_month(y, m)).unwrap_or(true))
        .map(|d| day_json(d, today))
        .collect();
    ok(&req.id, json!({ "days": days }))
}

fn handle_days_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let planner = match planner(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let day_id = match required_id(req, "dayId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match check(req, planner.day(&day_id)) {
        Ok(day) => ok(&req.id, json!({ "day": day_json(day, today()) })),
        Err(e) => e,
    }
}

fn parse_date(req: &Request) -> Result<NaiveDate, serde_json::Value> {
    let raw = required_str(req, "date")?;
    check(req, validation::date(raw, "date"))
}

fn handle_days_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let date = match parse_date(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let defaults = state.config.default_tasks.clone();
    let today = today();
    match mutate(state, req, |p| {
        let (day, created) = p.ensure_day(date, &defaults);
        day.expanded = true;
        Ok((day_json(day, today), created))
    }) {
        Ok((day, created)) => ok(&req.id, json!({ "day": day, "created": created })),
        Err(e) => e,
    }
}

fn handle_days_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let date = match parse_date(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let defaults = state.config.default_tasks.clone();
    let today = today();
    match mutate(state, req, |p| {
        let day = p.create_day(date, &defaults)?;
        Ok(day_json(day, today))
    }) {
        Ok(day) => {
            tracing::info!(%date, "day created");
            ok(&req.id, json!({ "dayId": day["id"], "day": day }))
        }
        Err(e) => e,
    }
}

fn handle_days_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let day_id = match required_id(req, "dayId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match mutate(state, req, |p| p.delete_day(&day_id)) {
        Ok(day) => {
            tracing::info!(date = %day.date, tasks = day.tasks.len(), "day deleted");
            ok(
                &req.id,
                json!({ "ok": true, "date": day.date, "removedTasks": day.tasks.len() }),
            )
        }
        Err(e) => e,
    }
}

fn handle_days_toggle_expand(state: &mut AppState, req: &Request) -> serde_json::Value {
    let day_id = match required_id(req, "dayId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match mutate(state, req, |p| p.toggle_day_expand(&day_id)) {
        Ok(expanded) => ok(&req.id, json!({ "is_expanded": expanded })),
        Err(e) => e,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "days.list" => Some(handle_days_list(state, req)),
        "days.get" => Some(handle_days_get(state, req)),
        "days.open" => Some(handle_days_open(state, req)),
        "days.create" => Some(handle_days_create(state, req)),
        "days.delete" => Some(handle_days_delete(state, req)),
        "days.toggleExpand" => Some(handle_days_toggle_expand(state, req)),
        _ => None,
    }
}
