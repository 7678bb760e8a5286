//! Date-of-birth parsing for free-text form entry.
//!
//! Accepted shapes: ISO `YYYY-MM-DD`, day-first `DD/MM/YYYY`, and any other
//! three-part numeric entry using `/`, `-`, `.` or spaces where the 4-digit
//! year position decides the order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DobFormat {
    /// `YYYY-MM-DD`
    #[default]
    Iso,
    /// `MM/DD/YYYY`
    MonthDayYear,
}

impl DobFormat {
    pub fn render(&self, date: NaiveDate) -> String {
        match self {
            DobFormat::Iso => date.format("%Y-%m-%d").to_string(),
            DobFormat::MonthDayYear => date.format("%m/%d/%Y").to_string(),
        }
    }
}

pub fn parse_date_of_birth(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    let parts: Vec<&str> = raw
        .split(|c: char| matches!(c, '/' | '-' | '.' | ' '))
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 || parts.iter().any(|p| !p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }
    let nums: Vec<u32> = parts.iter().filter_map(|p| p.parse().ok()).collect();
    if nums.len() != 3 {
        return None;
    }

    let (year, month, day) = if parts[0].len() == 4 {
        (nums[0], nums[1], nums[2])
    } else if parts[2].len() == 4 {
        // Day first unless that is impossible and month first is not.
        if nums[1] > 12 && nums[0] <= 12 {
            (nums[2], nums[0], nums[1])
        } else {
            (nums[2], nums[1], nums[0])
        }
    } else {
        return None;
    };

    NaiveDate::from_ymd_opt(year as i32, month, day)
}

/// Parses free-text input and renders it in the requested format.
pub fn reformat_date_of_birth(raw: &str, format: DobFormat) -> Option<String> {
    parse_date_of_birth(raw).map(|d| format.render(d))
}
