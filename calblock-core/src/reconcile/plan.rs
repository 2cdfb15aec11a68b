//! Dry-run of a reconciliation.

use crate::calendar::{Calendar, CalendarAccess};
use crate::error::CalBlockResult;
use crate::event::{CalendarEvent, TimeRange};
use crate::reconcile::Pass;
use crate::reconcile::matching::{is_mirrorable, is_obsolete, matches};
use crate::window::Window;

/// A block that a run would create.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedBlock {
    pub range: TimeRange,
    /// Remote calendar whose event triggers the block (the first one, in
    /// configured order, when several share the range).
    pub calendar_id: String,
    pub source_title: String,
}

#[derive(Debug, Clone)]
pub struct BlockPlan {
    pub window: Window,
    pub to_create: Vec<PlannedBlock>,
    pub to_delete: Vec<CalendarEvent>,
}

impl BlockPlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }
}

impl<A: CalendarAccess + ?Sized> Pass<'_, A> {
    pub async fn plan(&self, remotes: &[Calendar]) -> CalBlockResult<BlockPlan> {
        let local_events = self.access.events(self.local, &self.window).await?;
        let mut covered: Vec<TimeRange> = local_events
            .iter()
            .filter(|e| e.is_placeholder(self.sentinel))
            .map(|e| e.time_range())
            .collect();

        let mut to_create = Vec::new();
        let mut remote_events = Vec::new();

        for remote in remotes {
            let events = self.access.events(remote, &self.window).await?;

            for event in events.iter().filter(|e| is_mirrorable(e, self.sentinel)) {
                let range = event.time_range();
                if covered.iter().any(|c| matches(c, &range)) {
                    continue;
                }
                covered.push(range);
                to_create.push(PlannedBlock {
                    range,
                    calendar_id: remote.id.clone(),
                    source_title: event.title.clone(),
                });
            }

            remote_events.extend(
                events
                    .into_iter()
                    .filter(|e| !e.is_placeholder(self.sentinel)),
            );
        }

        let to_delete = local_events
            .into_iter()
            .filter(|e| e.is_placeholder(self.sentinel) && is_obsolete(e, &remote_events))
            .collect();

        Ok(BlockPlan {
            window: self.window,
            to_create,
            to_delete,
        })
    }
}
