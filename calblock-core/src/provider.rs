//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `calblock-provider-google`) using JSON over stdin/stdout.
//!
//! Any executable that speaks the JSON protocol can be a provider.
//! Providers manage their own credentials and tokens; calblock only passes
//! calendar ids and time ranges.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::calendar::{Calendar, CalendarAccess};
use crate::error::{CalBlockError, CalBlockResult};
use crate::event::CalendarEvent;
use crate::protocol::{
    Command, CreateEvent, DeleteEvent, GetCalendar, GetDefaultCalendar, ListEvents,
    ProviderCommand, RemoveAllReminders, Request, Response,
};
use crate::window::Window;

#[derive(Clone, Debug)]
pub struct Provider {
    name: String,
    /// Explicit executable, bypassing the PATH lookup.
    path: Option<PathBuf>,
    timeout: Duration,
}

impl Provider {
    pub fn new(name: &str, timeout: Duration) -> Self {
        Provider {
            name: name.to_string(),
            path: None,
            timeout,
        }
    }

    /// A provider run from a specific executable instead of `calblock-provider-<name>`.
    pub fn from_path(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        let path = path.into();
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match stem.strip_prefix("calblock-provider-") {
            Some(name) => name.to_string(),
            None => stem,
        };

        Provider {
            name,
            path: Some(path),
            timeout,
        }
    }

    pub fn binary_name(&self) -> String {
        format!("calblock-provider-{}", self.name)
    }

    /// Whether the provider binary can be found.
    pub fn is_installed(&self) -> bool {
        self.binary_path().is_ok()
    }

    fn binary_path(&self) -> CalBlockResult<PathBuf> {
        if let Some(path) = &self.path {
            return if path.is_file() {
                Ok(path.clone())
            } else {
                Err(CalBlockError::ProviderNotInstalled(path.display().to_string()))
            };
        }

        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| CalBlockError::ProviderNotInstalled(binary_name))
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> CalBlockResult<C::Response> {
        timeout(self.timeout, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| CalBlockError::ProviderTimeout(self.timeout))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> CalBlockResult<R> {
        let params = serde_json::to_value(params)
            .map_err(|e| CalBlockError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| CalBlockError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        tracing::trace!(provider = %self.name, ?command, "calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CalBlockError::CalendarAccess(format!(
                    "Failed to spawn {}: {}",
                    binary_path.display(),
                    e
                ))
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            CalBlockError::CalendarAccess("Provider stdin was not captured".into())
        })?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(CalBlockError::CalendarAccess(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.trim().is_empty() {
            return Err(CalBlockError::CalendarAccess(
                "Provider returned no response".into(),
            ));
        }

        parse_response(&response_str)
    }
}

fn parse_response<R: serde::de::DeserializeOwned>(response_str: &str) -> CalBlockResult<R> {
    let response: Response<R> = serde_json::from_str(response_str.trim()).map_err(|e| {
        CalBlockError::CalendarAccess(format!("Failed to parse response: {}", e))
    })?;

    match response {
        Response::Success { data } => Ok(data),
        Response::Error { error } => Err(CalBlockError::CalendarAccess(error)),
    }
}

#[async_trait]
impl CalendarAccess for Provider {
    async fn calendar_by_id(&self, id: &str) -> CalBlockResult<Calendar> {
        self.call(GetCalendar {
            calendar_id: id.to_string(),
        })
        .await?
        .ok_or_else(|| CalBlockError::CalendarNotFound(id.to_string()))
    }

    async fn default_calendar(&self) -> CalBlockResult<Calendar> {
        self.call(GetDefaultCalendar {}).await
    }

    async fn events(
        &self,
        calendar: &Calendar,
        window: &Window,
    ) -> CalBlockResult<Vec<CalendarEvent>> {
        self.call(ListEvents {
            calendar_id: calendar.id.clone(),
            from: window.start_rfc3339(),
            to: window.end_rfc3339(),
        })
        .await
    }

    async fn create_event(
        &self,
        calendar: &Calendar,
        title: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CalBlockResult<CalendarEvent> {
        self.call(CreateEvent {
            calendar_id: calendar.id.clone(),
            title: title.to_string(),
            start,
            end,
        })
        .await
    }

    async fn remove_all_reminders(
        &self,
        calendar: &Calendar,
        event: &CalendarEvent,
    ) -> CalBlockResult<()> {
        self.call(RemoveAllReminders {
            calendar_id: calendar.id.clone(),
            event_id: event.id.clone(),
        })
        .await
    }

    async fn delete_event(
        &self,
        calendar: &Calendar,
        event: &CalendarEvent,
    ) -> CalBlockResult<()> {
        self.call(DeleteEvent {
            calendar_id: calendar.id.clone(),
            event_id: event.id.clone(),
        })
        .await
    }
}
