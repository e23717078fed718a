use crate::calendar::{weekday_name, WEEKDAY_NAMES};
use crate::model::{ratio, CompletionStatus, Day, Planner, TaskContainer};
use chrono::Datelike;
use serde::Serialize;

/// All-time aggregates over every day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub total_days: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// completed_tasks / total_tasks, in [0, 1].
    pub completion_rate: f64,
    /// Mean of per-day percentages over days that have tasks, one decimal.
    pub average_completion: f64,
    pub perfect_days: usize,
    pub current_streak: usize,
    pub best_streak: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStatistics {
    pub year: i32,
    pub month: u32,
    pub total_days: usize,
    pub days_with_tasks: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: f64,
    pub average_completion: f64,
    pub perfect_days: usize,
    pub best_day: Option<String>,
    pub most_productive_weekday: Option<String>,
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[derive(Default)]
struct Tally {
    total_days: usize,
    days_with_tasks: usize,
    total_tasks: usize,
    completed_tasks: usize,
    percent_sum: u64,
    perfect_days: usize,
}

impl Tally {
    fn add(&mut self, day: &Day) {
        self.total_days += 1;
        if day.tasks.is_empty() {
            return;
        }
        self.days_with_tasks += 1;
        self.total_tasks += day.total_count();
        self.completed_tasks += day.completed_count();
        self.percent_sum += u64::from(day.completion_percentage());
        if day.completion_status() == CompletionStatus::Complete {
            self.perfect_days += 1;
        }
    }

    fn completion_rate(&self) -> f64 {
        ratio(self.completed_tasks, self.total_tasks)
    }

    fn average_completion(&self) -> f64 {
        if self.days_with_tasks == 0 {
            return 0.0;
        }
        round1(self.percent_sum as f64 / self.days_with_tasks as f64)
    }
}

/// (current, best) runs of consecutive perfect day entries, walking newest first.
/// The current streak is the most recent run.
fn streaks(days: &[Day]) -> (usize, usize) {
    let mut current = 0;
    let mut best = 0;
    let mut run = 0;
    for day in days.iter().rev() {
        if day.completion_status() == CompletionStatus::Complete {
            run += 1;
            best = best.max(run);
        } else {
            if run > 0 && current == 0 {
                current = run;
            }
            run = 0;
        }
    }
    if current == 0 {
        current = run;
    }
    (current, best)
}

pub fn compute_all_time_stats(planner: &Planner) -> Statistics {
    let mut t = Tally::default();
    for day in &planner.days {
        t.add(day);
    }
    let (current_streak, best_streak) = streaks(&planner.days);
    Statistics {
        total_days: t.total_days,
        total_tasks: t.total_tasks,
        completed_tasks: t.completed_tasks,
        completion_rate: t.completion_rate(),
        average_completion: t.average_completion(),
        perfect_days: t.perfect_days,
        current_streak,
        best_streak,
    }
}

pub fn compute_monthly_stats(planner: &Planner, year: i32, month: u32) -> MonthlyStatistics {
    let mut t = Tally::default();
    let mut best: Option<(&Day, u32)> = None;
    let mut by_weekday: [(u64, u64); 7] = [(0, 0); 7];

    for day in planner.days_in_month(year, month) {
        t.add(day);
        if day.tasks.is_empty() {
            continue;
        }
        let pct = day.completion_percentage();
        if pct > best.map(|(_, p)| p).unwrap_or(0) {
            best = Some((day, pct));
        }
        let slot = &mut by_weekday[day.date.weekday().num_days_from_monday() as usize];
        slot.0 += u64::from(pct);
        slot.1 += 1;
    }

    let mut best_weekday: Option<(usize, f64)> = None;
    for (i, (sum, n)) in by_weekday.iter().enumerate() {
        if *n == 0 {
            continue;
        }
        let avg = *sum as f64 / *n as f64;
        if avg > best_weekday.map(|(_, a)| a).unwrap_or(0.0) {
            best_weekday = Some((i, avg));
        }
    }

    MonthlyStatistics {
        year,
        month,
        total_days: t.total_days,
        days_with_tasks: t.days_with_tasks,
        total_tasks: t.total_tasks,
        completed_tasks: t.completed_tasks,
        completion_rate: t.completion_rate(),
        average_completion: t.average_completion(),
        perfect_days: t.perfect_days,
        best_day: best.map(|(d, _)| d.date.to_string()),
        most_productive_weekday: best_weekday.map(|(i, _)| WEEKDAY_NAMES[i].to_string()),
    }
}

/// Per-day summary used by listings and calendar cells.
pub fn day_metrics(day: &Day) -> serde_json::Value {
    serde_json::json!({
        "completion_status": day.completion_status(),
        "completion_percentage": day.completion_percentage(),
        "completed_count": day.completed_count(),
        "total_count": day.total_count(),
        "weekday": weekday_name(day.date),
    })
}
