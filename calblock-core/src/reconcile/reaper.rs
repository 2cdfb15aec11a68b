//! Reaper pass: delete placeholders with no remote counterpart.

use tracing::{debug, warn};

use crate::calendar::{Calendar, CalendarAccess};
use crate::config::ErrorPolicy;
use crate::error::CalBlockResult;
use crate::event::CalendarEvent;
use crate::reconcile::matching::is_obsolete;
use crate::reconcile::{FailedStep, Pass, RunFailure, RunReport};

impl<A: CalendarAccess + ?Sized> Pass<'_, A> {
    /// Every event on the remote calendars in the window, placeholders excluded.
    ///
    /// All-day events stay in, unlike in the creator.
    pub async fn remote_events(&self, remotes: &[Calendar]) -> CalBlockResult<Vec<CalendarEvent>> {
        let mut events = Vec::new();
        for remote in remotes {
            let fetched = self.access.events(remote, &self.window).await?;
            events.extend(
                fetched
                    .into_iter()
                    .filter(|event| !event.is_placeholder(self.sentinel)),
            );
        }
        Ok(events)
    }

    /// Local placeholders that no remote event matches.
    pub async fn obsolete_blocks(&self, remotes: &[Calendar]) -> CalBlockResult<Vec<CalendarEvent>> {
        let local_blocks: Vec<CalendarEvent> = self
            .access
            .events(self.local, &self.window)
            .await?
            .into_iter()
            .filter(|event| event.is_placeholder(self.sentinel))
            .collect();

        let remote_events = self.remote_events(remotes).await?;

        debug!(
            blocks = local_blocks.len(),
            remote = remote_events.len(),
            "checking for obsolete blocks"
        );

        Ok(local_blocks
            .into_iter()
            .filter(|block| is_obsolete(block, &remote_events))
            .collect())
    }

    /// Delete every obsolete placeholder, recording results in `report`.
    ///
    /// Reaping needs a complete view of every remote calendar, so a failed
    /// fetch skips all deletions. Under `Continue` that is recorded as a
    /// failure instead of being returned.
    pub async fn remove_obsolete_blocks(
        &self,
        remotes: &[Calendar],
        policy: ErrorPolicy,
        report: &mut RunReport,
    ) -> CalBlockResult<()> {
        let obsolete = match self.obsolete_blocks(remotes).await {
            Ok(obsolete) => obsolete,
            Err(error) if policy == ErrorPolicy::Continue => {
                warn!(%error, "skipping block removal");
                report.failures.push(RunFailure {
                    step: FailedStep::Reap,
                    error,
                });
                return Ok(());
            }
            Err(error) => return Err(error),
        };

        for block in obsolete {
            match self.access.delete_event(self.local, &block).await {
                Ok(()) => {
                    debug!(range = %block.time_range(), "deleted block");
                    report.deleted.push(block);
                }
                Err(error) if policy == ErrorPolicy::Continue => {
                    warn!(range = %block.time_range(), %error, "failed to delete block");
                    report.failures.push(RunFailure {
                        step: FailedStep::Delete(block),
                        error,
                    });
                }
                Err(error) => return Err(error),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::memory::{MemoryCalendars, Operation};
    use crate::window::Window;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
    }

    async fn reap(calendars: &MemoryCalendars, policy: ErrorPolicy) -> CalBlockResult<RunReport> {
        let window = Window::lookahead(at(1, 0), 30).unwrap();
        let local = calendars.default_calendar().await?;
        let remotes = vec![
            calendars.calendar_by_id("work").await?,
            calendars.calendar_by_id("home").await?,
        ];
        let pass = Pass {
            access: calendars,
            local: &local,
            window,
            sentinel: "blocked",
        };
        let mut report = RunReport::new(window);
        pass.remove_obsolete_blocks(&remotes, policy, &mut report).await?;
        Ok(report)
    }

    fn calendars() -> MemoryCalendars {
        MemoryCalendars::new("me").with_calendar("work").with_calendar("home")
    }

    #[tokio::test]
    async fn test_block_without_remote_is_deleted() {
        let calendars = calendars().with_event("me", "blocked", at(10, 9), at(10, 10));

        let report = reap(&calendars, ErrorPolicy::FailFast).await.unwrap();

        assert_eq!(report.deleted.len(), 1);
        assert!(calendars.events_in("me").await.is_empty());
    }

    #[tokio::test]
    async fn test_block_matched_by_any_remote_calendar_is_kept() {
        let calendars = calendars()
            .with_event("me", "blocked", at(10, 9), at(10, 10))
            .with_event("home", "Piano", at(10, 9), at(10, 10));

        let report = reap(&calendars, ErrorPolicy::FailFast).await.unwrap();

        assert!(report.deleted.is_empty());
        assert_eq!(calendars.events_in("me").await.len(), 1);
    }

    #[tokio::test]
    async fn test_real_local_events_are_never_deleted() {
        let calendars = calendars().with_event("me", "Lunch", at(10, 12), at(10, 13));

        let report = reap(&calendars, ErrorPolicy::FailFast).await.unwrap();

        assert!(report.deleted.is_empty());
        assert_eq!(calendars.events_in("me").await.len(), 1);
    }

    #[tokio::test]
    async fn test_remote_placeholder_does_not_keep_block_alive() {
        let calendars = calendars()
            .with_event("me", "blocked", at(10, 9), at(10, 10))
            .with_event("work", "blocked", at(10, 9), at(10, 10));

        let report = reap(&calendars, ErrorPolicy::FailFast).await.unwrap();

        assert_eq!(report.deleted.len(), 1);
    }

    #[tokio::test]
    async fn test_all_day_remote_keeps_block_with_identical_range() {
        let calendars = calendars()
            .with_event("me", "blocked", at(12, 0), at(13, 0))
            .with_all_day_event("work", "Offsite", at(12, 0), at(13, 0));

        let report = reap(&calendars, ErrorPolicy::FailFast).await.unwrap();

        assert!(report.deleted.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_blocks_with_a_remote_match_are_both_kept() {
        let calendars = calendars()
            .with_event("me", "blocked", at(10, 9), at(10, 10))
            .with_event("me", "blocked", at(10, 9), at(10, 10))
            .with_event("work", "Review", at(10, 9), at(10, 10));

        let report = reap(&calendars, ErrorPolicy::FailFast).await.unwrap();

        assert!(report.deleted.is_empty());
        assert_eq!(calendars.events_in("me").await.len(), 2);
    }

    #[tokio::test]
    async fn test_remote_fetch_failure_deletes_nothing() {
        let calendars = calendars().with_event("me", "blocked", at(10, 9), at(10, 10));
        calendars.fail("home", Operation::ListEvents).await;

        assert!(reap(&calendars, ErrorPolicy::FailFast).await.is_err());
        assert_eq!(calendars.events_in("me").await.len(), 1);

        let report = reap(&calendars, ErrorPolicy::Continue).await.unwrap();
        assert!(report.deleted.is_empty());
        assert!(matches!(report.failures[0].step, FailedStep::Reap));
        assert_eq!(calendars.events_in("me").await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_failure_is_recorded_under_continue() {
        let calendars = calendars()
            .with_event("me", "blocked", at(10, 9), at(10, 10))
            .with_event("me", "blocked", at(11, 9), at(11, 10));
        calendars.fail("me", Operation::DeleteEvent).await;

        let report = reap(&calendars, ErrorPolicy::Continue).await.unwrap();

        assert!(report.deleted.is_empty());
        assert_eq!(report.failures.len(), 2);
        assert!(
            report
                .failures
                .iter()
                .all(|f| matches!(f.step, FailedStep::Delete(_)))
        );
    }
}
