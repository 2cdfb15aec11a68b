//! Defines the JSON protocol used for communication between calblock
//! and provider binaries over stdin/stdout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::calendar::Calendar;
use crate::event::CalendarEvent;

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    GetCalendar,
    GetDefaultCalendar,
    ListEvents,
    CreateEvent,
    RemoveAllReminders,
    DeleteEvent,
}

/// Request sent from calblock to provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from provider to calblock.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

/// Look up a calendar by id.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetCalendar {
    pub calendar_id: String,
}

impl ProviderCommand for GetCalendar {
    /// `None` when the account cannot see a calendar with that id.
    type Response = Option<Calendar>;
    fn command() -> Command {
        Command::GetCalendar
    }
}

/// Look up the account's own calendar.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetDefaultCalendar {}

impl ProviderCommand for GetDefaultCalendar {
    type Response = Calendar;
    fn command() -> Command {
        Command::GetDefaultCalendar
    }
}

/// List events within a time range.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    pub calendar_id: String,
    pub from: String,
    pub to: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<CalendarEvent>;
    fn command() -> Command {
        Command::ListEvents
    }
}

/// Create a new event.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    pub calendar_id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ProviderCommand for CreateEvent {
    type Response = CalendarEvent;
    fn command() -> Command {
        Command::CreateEvent
    }
}

/// Strip every reminder from an event.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveAllReminders {
    pub calendar_id: String,
    pub event_id: String,
}

impl ProviderCommand for RemoveAllReminders {
    type Response = ();
    fn command() -> Command {
        Command::RemoveAllReminders
    }
}

/// Delete an event.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    pub calendar_id: String,
    pub event_id: String,
}

impl ProviderCommand for DeleteEvent {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEvent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_snake_case_command_names() {
        let request = Request {
            command: RemoveAllReminders::command(),
            params: serde_json::to_value(RemoveAllReminders {
                calendar_id: "primary".into(),
                event_id: "evt-1".into(),
            })
            .unwrap(),
        };

        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["command"], "remove_all_reminders");
        assert_eq!(json["params"]["calendar_id"], "primary");
        assert_eq!(json["params"]["event_id"], "evt-1");
    }

    #[test]
    fn test_parse_error_response() {
        let response: Response<Vec<CalendarEvent>> =
            serde_json::from_str(r#"{"status":"error","error":"rate limit exceeded"}"#).unwrap();

        match response {
            Response::Error { error } => assert_eq!(error, "rate limit exceeded"),
            Response::Success { .. } => panic!("expected error response"),
        }
    }

    #[test]
    fn test_parse_unknown_calendar_response() {
        let response: Response<Option<Calendar>> =
            serde_json::from_str(r#"{"status":"success","data":null}"#).unwrap();

        assert!(matches!(response, Response::Success { data: None }));
    }
}
