//! Previously generated results and their display timestamps.

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone};
use serde_json::Value;
use tracing::warn;

/// Hours subtracted from every server timestamp before display.
///
/// The listing service stamps entries seven hours ahead of the zone it
/// claims, so the shift is applied unconditionally.
pub const TIMESTAMP_SHIFT_HOURS: i64 = 7;

/// Shown when an entry has no timestamp.
pub const UNKNOWN_DATE: &str = "Unknown date";
/// Shown when a timestamp cannot be parsed.
pub const INVALID_DATE: &str = "Invalid date";
/// Shown when a parsed timestamp cannot be shifted.
pub const DATE_ERROR: &str = "Date error";

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// One previously generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Raw creation timestamp as sent by the server.
    pub created_at: String,
    /// Result image URL; `None` when generation produced nothing.
    pub result_url: Option<String>,
}

impl HistoryEntry {
    /// Creates a new entry.
    #[must_use]
    pub fn new(created_at: impl Into<String>, result_url: Option<String>) -> Self {
        Self {
            created_at: created_at.into(),
            result_url,
        }
    }

    /// Validates one payload item.
    ///
    /// Accepts objects with a string `CreatedAt` and a `ResultUrl` that is
    /// either null or a string. Both keys must be present.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let created_at = object.get("CreatedAt")?.as_str()?;
        let result_url = match object.get("ResultUrl")? {
            Value::Null => None,
            Value::String(url) => Some(url.clone()),
            _ => return None,
        };
        Some(Self::new(created_at, result_url))
    }

    /// Returns true if there is something to open or download.
    #[must_use]
    pub fn has_result(&self) -> bool {
        self.result_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// Returns the date part of the raw timestamp, used in download names.
    #[must_use]
    pub fn date_part(&self) -> Option<&str> {
        self.created_at
            .split('T')
            .next()
            .filter(|d| !d.is_empty())
    }

    /// Returns the download file name for the entry at `index`.
    #[must_use]
    pub fn download_file_name(&self, index: usize) -> String {
        format!("faceswap-{}-{index}.jpg", self.date_part().unwrap_or("image"))
    }

    /// Returns the shifted timestamp formatted in `tz`.
    #[must_use]
    pub fn display_time<Tz>(&self, tz: &Tz, format: &str) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        display_timestamp(&self.created_at, tz, format)
    }
}

/// Validates a whole listing payload.
///
/// Anything that is not an array yields no entries; invalid items are dropped.
#[must_use]
pub fn entries_from_payload(payload: &Value) -> Vec<HistoryEntry> {
    match payload {
        Value::Null => {
            warn!("History API returned null data");
            Vec::new()
        }
        Value::Array(items) => items.iter().filter_map(HistoryEntry::from_value).collect(),
        other => {
            warn!(kind = json_kind(other), "History API did not return an array");
            Vec::new()
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parses a server timestamp and applies the fixed display shift.
///
/// Timestamps without an offset are read as wall time in `tz`.
///
/// # Errors
/// Returns the placeholder text to show instead.
pub fn shifted_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Result<DateTime<Tz>, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UNKNOWN_DATE);
    }

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(tz))
        .ok()
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        })
        .ok_or(INVALID_DATE)?;

    parsed
        .checked_sub_signed(TimeDelta::hours(TIMESTAMP_SHIFT_HOURS))
        .ok_or(DATE_ERROR)
}

/// Formats a server timestamp for display, never failing.
#[must_use]
pub fn display_timestamp<Tz>(raw: &str, tz: &Tz, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match shifted_timestamp(raw, tz) {
        Ok(dt) => dt.format(format).to_string(),
        Err(placeholder) => placeholder.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    #[test_case(json!(null) ; "null")]
    #[test_case(json!({"CreatedAt": "2024-01-01T10:00:00Z"}) ; "object")]
    #[test_case(json!("not a list") ; "string")]
    #[test_case(json!(42) ; "number")]
    fn test_non_array_payload_is_empty(payload: Value) {
        assert!(entries_from_payload(&payload).is_empty());
    }

    #[test]
    fn test_invalid_entries_are_dropped() {
        let payload = json!([
            {"CreatedAt": "2024-01-01T10:00:00Z", "ResultUrl": "https://x/a.jpg"},
            {"CreatedAt": "2024-01-02T10:00:00Z", "ResultUrl": null},
            {"ResultUrl": "https://x/missing-created.jpg"},
            {"CreatedAt": "2024-01-03T10:00:00Z"},
            {"CreatedAt": 17, "ResultUrl": "https://x/b.jpg"},
            {"CreatedAt": "2024-01-04T10:00:00Z", "ResultUrl": 5},
            {"CreatedAt": "2024-01-05T10:00:00Z", "ResultUrl": ["x"]},
            null,
            "stray"
        ]);

        let entries = entries_from_payload(&payload);

        assert_eq!(
            entries,
            vec![
                HistoryEntry::new("2024-01-01T10:00:00Z", Some("https://x/a.jpg".to_string())),
                HistoryEntry::new("2024-01-02T10:00:00Z", None),
            ]
        );
    }

    #[test]
    fn test_timestamp_shifted_back_seven_hours() {
        let shifted = shifted_timestamp("2024-01-01T10:00:00Z", &Utc).unwrap();
        assert_eq!(shifted.to_rfc3339(), "2024-01-01T03:00:00+00:00");
    }

    #[test]
    fn test_shift_crosses_midnight() {
        let text = display_timestamp("2024-01-01T05:30:00Z", &Utc, "%Y-%m-%d %H:%M");
        assert_eq!(text, "2023-12-31 22:30");
    }

    #[test]
    fn test_naive_timestamp_uses_display_zone() {
        let text = display_timestamp("2024-06-01 12:00:00", &Utc, "%H:%M");
        assert_eq!(text, "05:00");
    }

    #[test_case("", UNKNOWN_DATE ; "empty")]
    #[test_case("yesterday", INVALID_DATE ; "garbage")]
    #[test_case("2024-13-45T99:00:00Z", INVALID_DATE ; "out_of_range")]
    fn test_placeholders(raw: &str, expected: &str) {
        assert_eq!(display_timestamp(raw, &Utc, "%H:%M"), expected);
    }

    #[test]
    fn test_download_file_name() {
        let entry = HistoryEntry::new("2024-01-01T10:00:00Z", Some("u".to_string()));
        assert_eq!(entry.download_file_name(3), "faceswap-2024-01-01-3.jpg");

        let undated = HistoryEntry::new("", Some("u".to_string()));
        assert_eq!(undated.download_file_name(0), "faceswap-image-0.jpg");
    }

    #[test]
    fn test_has_result() {
        assert!(HistoryEntry::new("t", Some("u".to_string())).has_result());
        assert!(!HistoryEntry::new("t", None).has_result());
        assert!(!HistoryEntry::new("t", Some(String::new())).has_result());
    }
}
