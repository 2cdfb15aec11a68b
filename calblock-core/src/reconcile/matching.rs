//! Time-range matching between local placeholders and remote events.
//!
//! Exact `(start, end)` equality is the only identity there is. Titles are
//! only consulted to tell placeholders apart from real events.

use crate::event::{CalendarEvent, TimeRange};

/// Exact equality of both instants, no tolerance.
pub fn matches(a: &TimeRange, b: &TimeRange) -> bool {
    a.start == b.start && a.end == b.end
}

/// A remote event the creator may mirror: not a stray placeholder, not all-day.
pub fn is_mirrorable(remote: &CalendarEvent, sentinel: &str) -> bool {
    !remote.is_placeholder(sentinel) && !remote.all_day
}

/// Whether `local_events` already holds a placeholder covering `remote`.
pub fn placeholder_exists_for(
    remote: &CalendarEvent,
    local_events: &[CalendarEvent],
    sentinel: &str,
) -> bool {
    let range = remote.time_range();
    local_events
        .iter()
        .any(|local| local.is_placeholder(sentinel) && matches(&local.time_range(), &range))
}

/// A placeholder is obsolete when no remote event has its exact range.
///
/// `remote_events` should already exclude sentinel-titled events. All-day
/// events are deliberately kept, so one can keep a placeholder alive even
/// though it would never have created it.
pub fn is_obsolete(placeholder: &CalendarEvent, remote_events: &[CalendarEvent]) -> bool {
    let range = placeholder.time_range();
    !remote_events
        .iter()
        .any(|remote| matches(&remote.time_range(), &range))
}
