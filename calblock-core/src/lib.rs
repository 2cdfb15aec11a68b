//! Core of calblock.
//!
//! calblock mirrors busy time from remote calendars into the account's own
//! calendar as placeholder events, and removes placeholders whose remote
//! event is gone:
//! - `reconcile` holds the create-then-reap algorithm
//! - `calendar` is the access capability it runs against, implemented by
//!   `provider` (external provider binaries) and `memory` (in-process)

pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod memory;
pub mod protocol;
pub mod provider;
pub mod reconcile;
pub mod window;

pub use calendar::{Calendar, CalendarAccess, CalendarRef};
pub use config::{BlockConfig, ErrorPolicy};
pub use error::{CalBlockError, CalBlockResult};
pub use event::{CalendarEvent, TimeRange};
pub use reconcile::{BlockPlan, Reconciler, RunReport};
pub use window::Window;
