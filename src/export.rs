use crate::model::{Planner, TaskContainer};
use crate::stats::compute_all_time_stats;
use chrono::NaiveDateTime;
use serde_json::json;

const CSV_HEADER: &str = "Date,Task,Completed,Is Default,Created At,Completed At\n";

fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "Yes"
    } else {
        "No"
    }
}

/// Full dump of days (date order), collections and all-time statistics.
pub fn export_json(planner: &Planner, exported_at: NaiveDateTime) -> serde_json::Result<String> {
    let doc = json!({
        "days": planner.days,
        "collections": planner.collections,
        "statistics": compute_all_time_stats(planner),
        "exported_at": exported_at,
    });
    serde_json::to_string_pretty(&doc)
}

/// One row per day task, days in date order.
pub fn export_csv(planner: &Planner) -> String {
    let mut csv = String::from(CSV_HEADER);
    for day in &planner.days {
        let date = day.date.to_string();
        for task in day.tasks() {
            csv.push_str(&format!(
                "{},{},{},{},{},{}\n",
                date,
                csv_quote(&task.title),
                yes_no(task.completed),
                yes_no(task.is_default),
                task.created_at.format("%Y-%m-%dT%H:%M:%S"),
                task.completed_at
                    .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
                    .unwrap_or_default(),
            ));
        }
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_TASKS;
    use chrono::NaiveDate;

    #[test]
    fn csv_rows_follow_date_order_and_quote_titles() {
        let mut p = Planner::default();
        let late = NaiveDate::from_ymd_opt(2024, 1, 20).expect("date");
        let early = NaiveDate::from_ymd_opt(2024, 1, 10).expect("date");
        p.create_day(late, &DEFAULT_TASKS).expect("create");
        let (day, _) = p.ensure_day(early, &[] as &[&str]);
        day.add_task("Buy milk, eggs");
        let id = day.tasks[0].id.clone();
        day.toggle_task(&id).expect("toggle");

        let csv = export_csv(&p);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER.trim_end());
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("2024-01-10,\"Buy milk, eggs\",Yes,No,"));
        assert!(!lines[1].ends_with(','));
        assert!(lines[2].starts_with("2024-01-20,Clean-up,No,Yes,"));
        assert!(lines[2].ends_with(','));
    }

    #[test]
    fn json_export_carries_statistics() {
        let mut p = Planner::default();
        p.create_day(NaiveDate::from_ymd_opt(2024, 1, 15).expect("date"), &DEFAULT_TASKS)
            .expect("create");
        let at = NaiveDate::from_ymd_opt(2024, 1, 16)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("ts");
        let text = export_json(&p, at).expect("export");
        let v: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(v["statistics"]["total_tasks"], 3);
        assert_eq!(v["days"][0]["date"], "2024-01-15");
        assert_eq!(v["exported_at"], "2024-01-16T09:00:00");
        assert!(v["collections"].as_array().expect("arr").is_empty());
    }
}
