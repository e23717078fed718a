use chrono::{Datelike, Duration, NaiveDate};

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Folds month 0 into the previous December and month 13 into the next January.
pub fn normalize_month(year: i32, month: i32) -> (i32, u32) {
    if month < 1 {
        (year - 1, 12)
    } else if month > 12 {
        (year + 1, 1)
    } else {
        (year, month as u32)
    }
}

/// First and last date of a month. `None` for an invalid year/month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next - Duration::days(1)))
}

/// Weeks of a month, Sunday first, padded with `None` outside the month.
pub fn month_weeks(year: i32, month: u32) -> Vec<[Option<NaiveDate>; 7]> {
    let Some((first, last)) = month_bounds(year, month) else {
        return Vec::new();
    };

    let mut weeks = Vec::new();
    let mut week: [Option<NaiveDate>; 7] = [None; 7];
    let mut slot = first.weekday().num_days_from_sunday() as usize;
    let mut d = first;
    while d <= last {
        week[slot] = Some(d);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
        d += Duration::days(1);
    }
    if slot > 0 {
        weeks.push(week);
    }
    weeks
}

/// "Today" / "Yesterday" / "Tomorrow", else e.g. "Monday, January 15".
pub fn display_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        -1 => "Yesterday".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%A, %B %d").to_string(),
    }
}

pub fn short_label(date: NaiveDate) -> String {
    date.format("%b %d").to_string()
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAY_NAMES[date.weekday().num_days_from_monday() as usize]
}
