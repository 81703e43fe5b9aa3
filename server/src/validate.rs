// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Declarative constraint for a text field: values are trimmed, must be
/// non-empty, and may not exceed `max_len` characters.
pub struct FieldRule {
    pub label: &'static str,
    pub max_len: usize,
}

pub const TITLE: FieldRule = FieldRule {
    label: "Title",
    max_len: 100,
};

pub const DESCRIPTION: FieldRule = FieldRule {
    label: "Description",
    max_len: 500,
};

impl FieldRule {
    /// Checks `value` against the rule. Returns the violation message, or
    /// `None` when the value passes.
    pub fn check(&self, value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Some(format!("{} is required", self.label));
        }
        if trimmed.chars().count() > self.max_len {
            return Some(format!(
                "{} cannot exceed {} characters",
                self.label, self.max_len
            ));
        }
        None
    }
}

pub const DEADLINE_VIOLATION: &str = "Deadline must be a valid date";

/// Parses a caller-supplied deadline. Accepts RFC 3339, a bare date
/// (midnight UTC), and the datetime-local format browsers submit.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt));
    }
    None
}
