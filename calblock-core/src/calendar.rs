//! Calendar access capability.
//!
//! The reconciler never talks to a calendar service directly. Everything it
//! needs goes through [`CalendarAccess`], which is implemented by the
//! provider subprocess adapter and by the in-memory backend.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CalBlockResult;
use crate::event::CalendarEvent;
use crate::window::Window;

/// How a calendar is designated before it is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CalendarRef {
    /// The account's own calendar, where placeholders live.
    Default,
    /// A remote calendar shared with the account.
    Id(String),
}

/// A resolved calendar handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Calendar {
    pub fn new(id: &str) -> Self {
        Calendar {
            id: id.to_string(),
            name: None,
        }
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})", name, self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

#[async_trait]
pub trait CalendarAccess: Send + Sync {
    /// Resolve a calendar id. Fails with `CalendarNotFound` if it is unknown.
    async fn calendar_by_id(&self, id: &str) -> CalBlockResult<Calendar>;

    async fn default_calendar(&self) -> CalBlockResult<Calendar>;

    /// Events overlapping the window, as discrete instances.
    async fn events(
        &self,
        calendar: &Calendar,
        window: &Window,
    ) -> CalBlockResult<Vec<CalendarEvent>>;

    async fn create_event(
        &self,
        calendar: &Calendar,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CalBlockResult<CalendarEvent>;

    async fn remove_all_reminders(
        &self,
        calendar: &Calendar,
        event: &CalendarEvent,
    ) -> CalBlockResult<()>;

    async fn delete_event(
        &self,
        calendar: &Calendar,
        event: &CalendarEvent,
    ) -> CalBlockResult<()>;

    async fn resolve(&self, calendar: &CalendarRef) -> CalBlockResult<Calendar> {
        match calendar {
            CalendarRef::Default => self.default_calendar().await,
            CalendarRef::Id(id) => self.calendar_by_id(id).await,
        }
    }
}
