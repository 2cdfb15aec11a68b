//! In-memory calendar backend.
//!
//! A map from calendar id to a mutable event list, with one calendar marked
//! as the default. Operations can be made to fail per calendar, and every
//! mutating call is logged, which makes this the test double for the
//! reconciler.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::calendar::{Calendar, CalendarAccess};
use crate::error::{CalBlockError, CalBlockResult};
use crate::event::{CalendarEvent, Reminder, TimeRange};
use crate::window::Window;

/// Reminder attached to newly created events, like most providers do.
const DEFAULT_REMINDER_MINUTES: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListEvents,
    CreateEvent,
    RemoveAllReminders,
    DeleteEvent,
}

/// A recorded mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    pub calendar_id: String,
    pub event_id: String,
}

#[derive(Debug, Default)]
struct State {
    default_id: String,
    calendars: BTreeMap<String, Vec<CalendarEvent>>,
    failures: HashSet<(String, Operation)>,
    calls: Vec<Call>,
}

#[derive(Debug)]
pub struct MemoryCalendars {
    state: Mutex<State>,
}

fn new_event(title: &str, start: DateTime<Utc>, end: DateTime<Utc>, all_day: bool) -> CalendarEvent {
    CalendarEvent {
        id: uuid::Uuid::new_v4().to_string(),
        title: title.to_string(),
        start,
        end,
        all_day,
        reminders: Vec::new(),
    }
}

impl MemoryCalendars {
    /// Create a backend whose default calendar is `default_id`.
    pub fn new(default_id: &str) -> Self {
        let mut calendars = BTreeMap::new();
        calendars.insert(default_id.to_string(), Vec::new());

        MemoryCalendars {
            state: Mutex::new(State {
                default_id: default_id.to_string(),
                calendars,
                ..State::default()
            }),
        }
    }

    pub fn with_calendar(mut self, id: &str) -> Self {
        self.state
            .get_mut()
            .calendars
            .entry(id.to_string())
            .or_default();
        self
    }

    pub fn with_event(
        mut self,
        calendar_id: &str,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        self.state
            .get_mut()
            .calendars
            .entry(calendar_id.to_string())
            .or_default()
            .push(new_event(title, start, end, false));
        self
    }

    pub fn with_all_day_event(
        mut self,
        calendar_id: &str,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        self.state
            .get_mut()
            .calendars
            .entry(calendar_id.to_string())
            .or_default()
            .push(new_event(title, start, end, true));
        self
    }

    /// Add an event directly, bypassing failure injection and the call log.
    pub async fn insert_event(
        &self,
        calendar_id: &str,
        title: &str,
        range: TimeRange,
    ) -> CalendarEvent {
        let event = new_event(title, range.start, range.end, false);
        self.state
            .lock()
            .await
            .calendars
            .entry(calendar_id.to_string())
            .or_default()
            .push(event.clone());
        event
    }

    /// Remove every event on the calendar with exactly this range.
    pub async fn remove_events_at(&self, calendar_id: &str, range: TimeRange) -> usize {
        let mut state = self.state.lock().await;
        let Some(events) = state.calendars.get_mut(calendar_id) else {
            return 0;
        };
        let before = events.len();
        events.retain(|e| e.time_range() != range);
        before - events.len()
    }

    /// Every event on the calendar, regardless of time.
    pub async fn events_in(&self, calendar_id: &str) -> Vec<CalendarEvent> {
        self.state
            .lock()
            .await
            .calendars
            .get(calendar_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Make `operation` fail on this calendar until cleared.
    pub async fn fail(&self, calendar_id: &str, operation: Operation) {
        self.state
            .lock()
            .await
            .failures
            .insert((calendar_id.to_string(), operation));
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failures.clear();
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.state.lock().await.calls.clone()
    }

    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }
}

impl State {
    fn check(&self, calendar_id: &str, operation: Operation) -> CalBlockResult<()> {
        if self
            .failures
            .contains(&(calendar_id.to_string(), operation))
        {
            return Err(CalBlockError::CalendarAccess(format!(
                "{:?} failed on {}",
                operation, calendar_id
            )));
        }
        Ok(())
    }

    fn events_mut(&mut self, calendar_id: &str) -> CalBlockResult<&mut Vec<CalendarEvent>> {
        self.calendars.get_mut(calendar_id).ok_or_else(|| {
            CalBlockError::CalendarAccess(format!("No such calendar: {}", calendar_id))
        })
    }

    fn record(&mut self, operation: Operation, calendar_id: &str, event_id: &str) {
        self.calls.push(Call {
            operation,
            calendar_id: calendar_id.to_string(),
            event_id: event_id.to_string(),
        });
    }
}

#[async_trait]
impl CalendarAccess for MemoryCalendars {
    async fn calendar_by_id(&self, id: &str) -> CalBlockResult<Calendar> {
        let state = self.state.lock().await;
        if state.calendars.contains_key(id) {
            Ok(Calendar::new(id))
        } else {
            Err(CalBlockError::CalendarNotFound(id.to_string()))
        }
    }

    async fn default_calendar(&self) -> CalBlockResult<Calendar> {
        let state = self.state.lock().await;
        Ok(Calendar::new(&state.default_id))
    }

    async fn events(
        &self,
        calendar: &Calendar,
        window: &Window,
    ) -> CalBlockResult<Vec<CalendarEvent>> {
        let mut state = self.state.lock().await;
        state.check(&calendar.id, Operation::ListEvents)?;

        let events = state
            .events_mut(&calendar.id)?
            .iter()
            .filter(|e| window.overlaps(&e.time_range()))
            .cloned()
            .collect();

        Ok(events)
    }

    async fn create_event(
        &self,
        calendar: &Calendar,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CalBlockResult<CalendarEvent> {
        let mut state = self.state.lock().await;
        state.check(&calendar.id, Operation::CreateEvent)?;

        let mut event = new_event(title, start, end, false);
        event.reminders.push(Reminder {
            minutes: DEFAULT_REMINDER_MINUTES,
        });

        state.events_mut(&calendar.id)?.push(event.clone());
        state.record(Operation::CreateEvent, &calendar.id, &event.id);

        Ok(event)
    }

    async fn remove_all_reminders(
        &self,
        calendar: &Calendar,
        event: &CalendarEvent,
    ) -> CalBlockResult<()> {
        let mut state = self.state.lock().await;
        state.check(&calendar.id, Operation::RemoveAllReminders)?;

        let stored = state
            .events_mut(&calendar.id)?
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| {
                CalBlockError::CalendarAccess(format!("No such event: {}", event.id))
            })?;
        stored.reminders.clear();

        state.record(Operation::RemoveAllReminders, &calendar.id, &event.id);
        Ok(())
    }

    async fn delete_event(
        &self,
        calendar: &Calendar,
        event: &CalendarEvent,
    ) -> CalBlockResult<()> {
        let mut state = self.state.lock().await;
        state.check(&calendar.id, Operation::DeleteEvent)?;

        let events = state.events_mut(&calendar.id)?;
        let index = events.iter().position(|e| e.id == event.id).ok_or_else(|| {
            CalBlockError::CalendarAccess(format!("No such event: {}", event.id))
        })?;
        events.remove(index);

        state.record(Operation::DeleteEvent, &calendar.id, &event.id);
        Ok(())
    }
}
