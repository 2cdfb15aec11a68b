//! Error types for calblock.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while reconciling calendars.
#[derive(Error, Debug)]
pub enum CalBlockError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Calendar access error: {0}")]
    CalendarAccess(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {}", human(.0))]
    ProviderTimeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CalBlockError {
    /// True for errors caused by the configuration rather than by a calendar call.
    ///
    /// A configured remote calendar id that cannot be resolved counts as a
    /// configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CalBlockError::Config(_)
                | CalBlockError::CalendarNotFound(_)
                | CalBlockError::ProviderNotInstalled(_)
        )
    }
}

fn human(duration: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*duration)
}

/// Result type alias for calblock operations.
pub type CalBlockResult<T> = Result<T, CalBlockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolvable_calendar_is_a_configuration_error() {
        assert!(CalBlockError::CalendarNotFound("work@example.com".into()).is_configuration());
        assert!(CalBlockError::Config("lookahead_days must be positive".into()).is_configuration());
        assert!(!CalBlockError::CalendarAccess("rate limited".into()).is_configuration());
        assert!(!CalBlockError::ProviderTimeout(Duration::from_secs(10)).is_configuration());
    }

    #[test]
    fn test_sub_second_timeout_is_reported_precisely() {
        let error = CalBlockError::ProviderTimeout(Duration::from_millis(500));

        assert_eq!(error.to_string(), "Provider request timed out after 500ms");
    }
}
