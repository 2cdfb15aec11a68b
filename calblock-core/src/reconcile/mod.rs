//! Reconciliation of local placeholders against remote calendars.
//!
//! A run computes one [`Window`], creates missing placeholders from every
//! remote calendar in configured order, then deletes placeholders that no
//! remote event matches. Nothing is persisted between runs; a failed or
//! partial run is repaired by the next one.

mod creator;
pub mod matching;
mod plan;
mod reaper;

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::calendar::{Calendar, CalendarAccess, CalendarRef};
use crate::config::{BlockConfig, ErrorPolicy};
use crate::error::{CalBlockError, CalBlockResult};
use crate::event::CalendarEvent;
use crate::window::Window;

pub use plan::{BlockPlan, PlannedBlock};

/// Shared inputs of the creator and reaper passes within one run.
pub(crate) struct Pass<'a, A: ?Sized> {
    access: &'a A,
    local: &'a Calendar,
    window: Window,
    sentinel: &'a str,
}

/// Which part of a run failed.
#[derive(Debug)]
pub enum FailedStep {
    /// Mirroring from this remote calendar stopped early.
    CreateFrom(String),
    /// Obsolete blocks could not be determined, so none were removed.
    Reap,
    /// This block could not be deleted.
    Delete(CalendarEvent),
}

#[derive(Debug)]
pub struct RunFailure {
    pub step: FailedStep,
    pub error: CalBlockError,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.step {
            FailedStep::CreateFrom(calendar) => {
                write!(f, "creating blocks from {}: {}", calendar, self.error)
            }
            FailedStep::Reap => write!(f, "finding obsolete blocks: {}", self.error),
            FailedStep::Delete(block) => {
                write!(f, "deleting block {}: {}", block.time_range(), self.error)
            }
        }
    }
}

/// Outcome of one `update_blocks` run.
#[derive(Debug)]
pub struct RunReport {
    pub window: Window,
    pub created: Vec<CalendarEvent>,
    pub deleted: Vec<CalendarEvent>,
    /// Only populated under `ErrorPolicy::Continue`.
    pub failures: Vec<RunFailure>,
}

impl RunReport {
    pub fn new(window: Window) -> Self {
        RunReport {
            window,
            created: Vec::new(),
            deleted: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Reconciler<'a, A: CalendarAccess + ?Sized> {
    access: &'a A,
    config: BlockConfig,
}

impl<'a, A: CalendarAccess + ?Sized> Reconciler<'a, A> {
    pub fn new(access: &'a A, config: BlockConfig) -> Self {
        Reconciler { access, config }
    }

    pub fn window(&self, now: DateTime<Utc>) -> CalBlockResult<Window> {
        Window::lookahead(now, self.config.lookahead_days)
    }

    /// Resolve every configured remote calendar id, in order.
    ///
    /// Unresolvable ids always abort: without every remote calendar the
    /// reaper cannot tell which blocks are stale.
    async fn remote_calendars(&self) -> CalBlockResult<Vec<Calendar>> {
        let mut calendars = Vec::with_capacity(self.config.remote_calendar_ids.len());
        for id in &self.config.remote_calendar_ids {
            calendars.push(self.access.resolve(&CalendarRef::Id(id.clone())).await?);
        }
        Ok(calendars)
    }

    /// Run the creator over every remote calendar, then the reaper once.
    pub async fn update_blocks(&self, now: DateTime<Utc>) -> CalBlockResult<RunReport> {
        let window = self.window(now)?;
        let local = self.access.resolve(&CalendarRef::Default).await?;
        let remotes = self.remote_calendars().await?;
        let policy = self.config.on_error;

        info!(
            local = %local,
            remotes = remotes.len(),
            from = %window.start,
            to = %window.end,
            "updating blocks"
        );

        let pass = Pass {
            access: self.access,
            local: &local,
            window,
            sentinel: &self.config.blocked_event_title,
        };
        let mut report = RunReport::new(window);

        for remote in &remotes {
            if let Err(error) = pass.create_blocks_from(remote, &mut report.created).await {
                if policy == ErrorPolicy::FailFast {
                    return Err(error);
                }
                warn!(calendar = %remote, %error, "failed to create blocks");
                report.failures.push(RunFailure {
                    step: FailedStep::CreateFrom(remote.id.clone()),
                    error,
                });
            }
        }

        pass.remove_obsolete_blocks(&remotes, policy, &mut report)
            .await?;

        info!(
            created = report.created.len(),
            deleted = report.deleted.len(),
            failures = report.failures.len(),
            "blocks updated"
        );

        Ok(report)
    }

    /// What `update_blocks` would do at `now`, without changing anything.
    pub async fn plan(&self, now: DateTime<Utc>) -> CalBlockResult<BlockPlan> {
        let window = self.window(now)?;
        let local = self.access.resolve(&CalendarRef::Default).await?;
        let remotes = self.remote_calendars().await?;

        let pass = Pass {
            access: self.access,
            local: &local,
            window,
            sentinel: &self.config.blocked_event_title,
        };

        pass.plan(&remotes).await
    }
}
