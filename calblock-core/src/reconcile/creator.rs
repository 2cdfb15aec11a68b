//! Creator pass: mirror remote events into local placeholders.

use tracing::debug;

use crate::calendar::{Calendar, CalendarAccess};
use crate::error::CalBlockResult;
use crate::event::CalendarEvent;
use crate::reconcile::Pass;
use crate::reconcile::matching::{is_mirrorable, placeholder_exists_for};

impl<A: CalendarAccess + ?Sized> Pass<'_, A> {
    /// Create a placeholder for every qualifying event on `remote` that has none.
    ///
    /// Local events are fetched once, and each new placeholder is added to
    /// that snapshot, so two remote events with the same range produce one
    /// placeholder. Placeholders are pushed to `created` as they are made,
    /// which keeps the record accurate when a later call fails.
    pub async fn create_blocks_from(
        &self,
        remote: &Calendar,
        created: &mut Vec<CalendarEvent>,
    ) -> CalBlockResult<()> {
        let remote_events: Vec<CalendarEvent> = self
            .access
            .events(remote, &self.window)
            .await?
            .into_iter()
            .filter(|event| is_mirrorable(event, self.sentinel))
            .collect();

        let mut local_events = self.access.events(self.local, &self.window).await?;

        debug!(
            calendar = %remote,
            remote = remote_events.len(),
            local = local_events.len(),
            "checking for missing blocks"
        );

        for remote_event in &remote_events {
            if placeholder_exists_for(remote_event, &local_events, self.sentinel) {
                continue;
            }

            let block = self
                .access
                .create_event(self.local, self.sentinel, remote_event.start, remote_event.end)
                .await?;
            debug!(calendar = %remote, range = %block.time_range(), "created block");

            local_events.push(block.clone());
            created.push(block.clone());

            self.access.remove_all_reminders(self.local, &block).await?;
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

    fn window() -> Window {
        Window::lookahead(at(1, 0), 30).unwrap()
    }

    async fn run(calendars: &MemoryCalendars, remote_id: &str) -> CalBlockResult<Vec<CalendarEvent>> {
        let local = calendars.default_calendar().await?;
        let remote = calendars.calendar_by_id(remote_id).await?;
        let pass = Pass {
            access: calendars,
            local: &local,
            window: window(),
            sentinel: "blocked",
        };
        let mut created = Vec::new();
        pass.create_blocks_from(&remote, &mut created).await?;
        Ok(created)
    }

    #[tokio::test]
    async fn test_creates_block_with_same_times_and_no_reminders() {
        let calendars = MemoryCalendars::new("me").with_event("work", "Dentist", at(10, 9), at(10, 10));

        let created = run(&calendars, "work").await.unwrap();

        assert_eq!(created.len(), 1);
        let local = calendars.events_in("me").await;
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].title, "blocked");
        assert_eq!((local[0].start, local[0].end), (at(10, 9), at(10, 10)));
        assert!(local[0].reminders.is_empty());
    }

    #[tokio::test]
    async fn test_existing_block_prevents_duplicate() {
        let calendars = MemoryCalendars::new("me")
            .with_event("work", "Dentist", at(10, 9), at(10, 10))
            .with_event("me", "blocked", at(10, 9), at(10, 10));

        let created = run(&calendars, "work").await.unwrap();

        assert!(created.is_empty());
        assert_eq!(calendars.events_in("me").await.len(), 1);
    }

    #[tokio::test]
    async fn test_real_local_event_at_same_time_does_not_count() {
        let calendars = MemoryCalendars::new("me")
            .with_event("work", "Dentist", at(10, 9), at(10, 10))
            .with_event("me", "Lunch", at(10, 9), at(10, 10));

        let created = run(&calendars, "work").await.unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(calendars.events_in("me").await.len(), 2);
    }

    #[tokio::test]
    async fn test_same_range_twice_in_one_pass_creates_one_block() {
        let calendars = MemoryCalendars::new("me")
            .with_event("work", "Review", at(10, 9), at(10, 10))
            .with_event("work", "Review (copy)", at(10, 9), at(10, 10));

        let created = run(&calendars, "work").await.unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(calendars.events_in("me").await.len(), 1);
    }

    #[tokio::test]
    async fn test_all_day_and_sentinel_remotes_are_skipped() {
        let calendars = MemoryCalendars::new("me")
            .with_all_day_event("work", "Offsite", at(12, 0), at(13, 0))
            .with_event("work", "blocked", at(14, 9), at(14, 10));

        let created = run(&calendars, "work").await.unwrap();

        assert!(created.is_empty());
        assert!(calendars.events_in("me").await.is_empty());
    }

    #[tokio::test]
    async fn test_events_outside_window_are_ignored() {
        let calendars = MemoryCalendars::new("me").with_event(
            "work",
            "Far future",
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        );

        let created = run(&calendars, "work").await.unwrap();

        assert!(created.is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_propagates_and_keeps_earlier_record() {
        let calendars = MemoryCalendars::new("me")
            .with_event("work", "A", at(10, 9), at(10, 10))
            .with_event("work", "B", at(11, 9), at(11, 10));
        calendars.fail("me", Operation::RemoveAllReminders).await;

        let local = calendars.default_calendar().await.unwrap();
        let remote = calendars.calendar_by_id("work").await.unwrap();
        let pass = Pass {
            access: &calendars,
            local: &local,
            window: window(),
            sentinel: "blocked",
        };
        let mut created = Vec::new();

        let result = pass.create_blocks_from(&remote, &mut created).await;

        assert!(result.is_err());
        assert_eq!(created.len(), 1);
        assert_eq!(calendars.events_in("me").await.len(), 1);
    }
}
