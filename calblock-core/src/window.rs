//! The lookahead window a reconciliation run operates on.

use chrono::{DateTime, Duration, Utc};

use crate::error::{CalBlockError, CalBlockResult};
use crate::event::TimeRange;

pub const MILLISECS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Half-open `[start, end)` range of instants.
///
/// Computed once per run and shared by the creator and the reaper, so both
/// passes see the same slice of every calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// `[now, now + lookahead_days)`
    ///
    /// Fails when the end falls outside the representable date range.
    pub fn lookahead(now: DateTime<Utc>, lookahead_days: u32) -> CalBlockResult<Self> {
        let end = now
            .checked_add_signed(Duration::milliseconds(
                i64::from(lookahead_days) * MILLISECS_PER_DAY,
            ))
            .ok_or_else(|| {
                CalBlockError::Config(format!(
                    "lookahead_days = {} reaches past the last representable date",
                    lookahead_days
                ))
            })?;

        Ok(Window { start: now, end })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Whether an event with this range would be returned by a query over the window.
    ///
    /// Events that start inside, end inside, or span the whole window all
    /// count. A zero-length event counts when its instant is inside.
    pub fn overlaps(&self, range: &TimeRange) -> bool {
        if range.start == range.end {
            return self.contains(range.start);
        }
        range.start < self.end && range.end > self.start
    }

    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339()
    }

    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_lookahead_adds_whole_days() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 15).unwrap();
        let window = Window::lookahead(now, 30).unwrap();

        assert_eq!(window.start, now);
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 1, 31, 8, 30, 15).unwrap());
        assert_eq!(
            (window.end - window.start).num_milliseconds(),
            30 * MILLISECS_PER_DAY
        );
    }

    #[test]
    fn test_contains_is_half_open() {
        let window = Window::lookahead(at(1, 0), 1).unwrap();

        assert!(window.contains(at(1, 0)));
        assert!(window.contains(at(1, 23)));
        assert!(!window.contains(at(2, 0)));
    }

    #[test]
    fn test_overlaps_includes_events_crossing_either_edge() {
        let window = Window::lookahead(at(10, 0), 1).unwrap();

        // Started yesterday, still running
        assert!(window.overlaps(&TimeRange::new(at(9, 22), at(10, 1))));
        // Runs past the end
        assert!(window.overlaps(&TimeRange::new(at(10, 23), at(11, 2))));
        // Spans the whole window
        assert!(window.overlaps(&TimeRange::new(at(9, 0), at(12, 0))));
        // Ends exactly at the start
        assert!(!window.overlaps(&TimeRange::new(at(9, 23), at(10, 0))));
        // Starts exactly at the end
        assert!(!window.overlaps(&TimeRange::new(at(11, 0), at(11, 1))));
    }

    #[test]
    fn test_lookahead_past_the_last_date_is_an_error() {
        let result = Window::lookahead(at(1, 0), u32::MAX);

        assert!(matches!(result, Err(CalBlockError::Config(_))));
    }
}
