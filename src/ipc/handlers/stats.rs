use crate::calendar;
use crate::error::PlanError;
use crate::ipc::error::ok;
use crate::ipc::handlers::days::today;
use crate::ipc::helpers::{check, mutate, parse_bool, planner, required_i64};
use crate::ipc::types::{AppState, Request};
use crate::model::Planner;
use crate::stats::{compute_all_time_stats, compute_monthly_stats, day_metrics};
use crate::validation;
use chrono::{Datelike, NaiveDate};
use serde_json::json;

fn handle_stats_all_time(state: &mut AppState, req: &Request) -> serde_json::Value {
    match planner(state, req) {
        Ok(p) => ok(&req.id, json!({ "statistics": compute_all_time_stats(p) })),
        Err(e) => e,
    }
}

fn year_month(req: &Request) -> Result<(i32, u32), serde_json::Value> {
    let year = check(req, validation::year(required_i64(req, "year")?))?;
    let month = check(req, validation::month(required_i64(req, "month")?))?;
    Ok((year, month))
}

fn handle_stats_monthly(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (year, month) = match year_month(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match planner(state, req) {
        Ok(p) => ok(
            &req.id,
            json!({ "statistics": compute_monthly_stats(p, year, month) }),
        ),
        Err(e) => e,
    }
}

/// Month to display; 0 and 13 step into the neighbouring year.
fn calendar_month(req: &Request) -> Result<(i32, u32), serde_json::Value> {
    let year = check(req, validation::year(required_i64(req, "year")?))?;
    let month = required_i64(req, "month")?;
    if !(0..=13).contains(&month) {
        return check(
            req,
            Err(PlanError::validation("month", "month must be between 0 and 13")),
        );
    }
    let (year, month) = calendar::normalize_month(year, month as i32);
    let year = check(req, validation::year(i64::from(year)))?;
    Ok((year, month))
}

fn cell(planner: &Planner, date: NaiveDate, today: NaiveDate) -> serde_json::Value {
    let mut v = json!({
        "date": date,
        "dayNumber": date.day(),
        "isToday": date == today,
        "dayId": null,
    });
    if let Some(day) = planner.day_by_date(date) {
        v["dayId"] = json!(day.id);
        v["metrics"] = day_metrics(day);
    }
    v
}

fn handle_calendar_month(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (year, month) = match calendar_month(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let materialize = match parse_bool(req, "materialize", true) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let weeks = calendar::month_weeks(year, month);

    if materialize {
        let defaults = state.config.default_tasks.clone();
        let created = match mutate(state, req, |p| {
            let mut created = 0usize;
            for date in weeks.iter().flatten().flatten() {
                if p.ensure_day(*date, &defaults).1 {
                    created += 1;
                }
            }
            Ok(created)
        }) {
            Ok(n) => n,
            Err(e) => return e,
        };
        if created > 0 {
            tracing::info!(year, month, created, "calendar month materialized");
        }
    }

    let planner = match planner(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let today = today();
    let grid: Vec<Vec<serde_json::Value>> = weeks
        .iter()
        .map(|week| {
            week.iter()
                .map(|slot| match slot {
                    Some(date) => cell(planner, *date, today),
                    None => serde_json::Value::Null,
                })
                .collect()
        })
        .collect();

    ok(
        &req.id,
        json!({
            "year": year,
            "month": month,
            "weekdays": ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
            "weeks": grid,
            "statistics": compute_monthly_stats(planner, year, month),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "stats.allTime" => Some(handle_stats_all_time(state, req)),
        "stats.monthly" => Some(handle_stats_monthly(state, req)),
        "calendar.month" => Some(handle_calendar_month(state, req)),
        _ => None,
    }
}
