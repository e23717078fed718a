//! Input validation applied to request parameters before they reach the model.

use crate::error::{PlanError, PlanResult};
use crate::model::{Color, Priority};
use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

pub const TITLE_MAX: usize = 500;
pub const NAME_MAX: usize = 100;
pub const TEXT_MAX: usize = 1000;
pub const TAGS_MAX: usize = 10;
pub const TAG_MAX: usize = 50;

static DANGEROUS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)<script",
        r"(?i)javascript:",
        r"(?i)on\w+\s*=",
        r"(?i)eval\(",
        r"(?i)expression\(",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("static pattern")
});

/// Trims and bounds a string, rejecting markup/script injection patterns.
pub fn string(value: &str, field: &str, min_len: usize, max_len: usize) -> PlanResult<String> {
    let v = value.trim();
    let len = v.chars().count();
    if len < min_len {
        return Err(PlanError::validation(
            field,
            if min_len == 1 {
                format!("{field} must not be empty")
            } else {
                format!("{field} must be at least {min_len} characters")
            },
        ));
    }
    if len > max_len {
        return Err(PlanError::validation(
            field,
            format!("{field} must be at most {max_len} characters"),
        ));
    }
    if DANGEROUS.iter().any(|re| re.is_match(v)) {
        tracing::warn!(field, sample = %v.chars().take(50).collect::<String>(), "rejected suspicious input");
        return Err(PlanError::validation(
            field,
            format!("{field} contains invalid content"),
        ));
    }
    Ok(v.to_string())
}

pub fn title(value: &str, field: &str) -> PlanResult<String> {
    string(value, field, 1, TITLE_MAX)
}

/// Lowercase-normalized UUID.
pub fn uuid(value: &str, field: &str) -> PlanResult<String> {
    let v = value.trim().to_ascii_lowercase();
    if !UUID_RE.is_match(&v) {
        return Err(PlanError::validation(
            field,
            format!("{field} is not a valid UUID"),
        ));
    }
    Ok(v)
}

pub fn date(value: &str, field: &str) -> PlanResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        PlanError::validation(field, format!("{field} must be a date in YYYY-MM-DD form"))
    })
}

pub fn year(value: i64) -> PlanResult<i32> {
    int_in(value, "year", 1, 9999).map(|v| v as i32)
}

pub fn month(value: i64) -> PlanResult<u32> {
    int_in(value, "month", 1, 12).map(|v| v as u32)
}

fn int_in(value: i64, field: &str, min: i64, max: i64) -> PlanResult<i64> {
    if value < min {
        return Err(PlanError::validation(
            field,
            format!("{field} must be at least {min}"),
        ));
    }
    if value > max {
        return Err(PlanError::validation(
            field,
            format!("{field} must be at most {max}"),
        ));
    }
    Ok(value)
}

pub fn priority(value: &str) -> PlanResult<Priority> {
    value.parse().map_err(|_| {
        PlanError::validation("priority", "priority must be one of: none, low, medium, high")
    })
}

pub fn color(value: &str) -> PlanResult<Color> {
    value.parse().map_err(|_| {
        PlanError::validation(
            "color",
            "color must be one of: blue, red, green, yellow, purple, pink",
        )
    })
}

/// A JSON array of short strings, e.g. tags.
pub fn string_list(value: &Value, field: &str) -> PlanResult<Vec<String>> {
    let arr = value
        .as_array()
        .ok_or_else(|| PlanError::validation(field, format!("{field} must be a list")))?;
    if arr.len() > TAGS_MAX {
        return Err(PlanError::validation(
            field,
            format!("{field} cannot have more than {TAGS_MAX} items"),
        ));
    }
    arr.iter()
        .enumerate()
        .map(|(i, item)| {
            let s = item.as_str().ok_or_else(|| {
                PlanError::validation(field, format!("all {field} items must be strings"))
            })?;
            string(s, &format!("{field}[{i}]"), 1, TAG_MAX)
        })
        .collect()
}
