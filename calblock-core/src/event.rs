//! Provider-neutral event types.
//!
//! Providers convert their API responses into these types, and the
//! reconciler works exclusively with them. Events are matched by time range
//! only: remote calendars live in unrelated systems with no shared id space,
//! so `id` is just a handle for addressing the event on its own calendar.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event read from either the local or a remote calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Provider-assigned handle, used to remove reminders and delete.
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

/// A reminder/alarm for an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    /// Minutes before the event to trigger
    pub minutes: i64,
}

/// The `(start, end)` pair that identifies an event for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        TimeRange { start, end }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

impl CalendarEvent {
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }

    /// Whether this event carries the reserved placeholder title.
    pub fn is_placeholder(&self, sentinel: &str) -> bool {
        self.title == sentinel
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deserialize_defaults_all_day_and_reminders() {
        let json = r#"{
            "id": "abc",
            "title": "Dentist",
            "start": "2024-01-10T09:00:00Z",
            "end": "2024-01-10T10:00:00Z"
        }"#;

        let event: CalendarEvent = serde_json::from_str(json).unwrap();

        assert!(!event.all_day);
        assert!(event.reminders.is_empty());
        assert_eq!(
            event.time_range(),
            TimeRange::new(
                Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 10, 10, 0, 0).unwrap(),
            )
        );
    }

    #[test]
    fn test_is_placeholder_compares_exact_title() {
        let start = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let mut event = CalendarEvent {
            id: "1".into(),
            title: "blocked".into(),
            start,
            end: start,
            all_day: false,
            reminders: vec![],
        };

        assert!(event.is_placeholder("blocked"));

        event.title = "Blocked".into();
        assert!(!event.is_placeholder("blocked"));
    }
}
