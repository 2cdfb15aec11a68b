//! calblock configuration.
//!
//! Read once per run from `~/.config/calblock/config.toml`, with
//! `CALBLOCK_*` environment variables layered on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{CalBlockError, CalBlockResult};

pub const DEFAULT_BLOCKED_EVENT_TITLE: &str = "blocked";
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 30;
/// Upper bound on `lookahead_days`, roughly a century.
pub const MAX_LOOKAHEAD_DAYS: u32 = 36_500;
const DEFAULT_PROVIDER: &str = "google";
const DEFAULT_PROVIDER_TIMEOUT: &str = "10s";
const ENV_PREFIX: &str = "CALBLOCK";

fn default_blocked_event_title() -> String {
    DEFAULT_BLOCKED_EVENT_TITLE.to_string()
}

fn default_lookahead_days() -> u32 {
    DEFAULT_LOOKAHEAD_DAYS
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_provider_timeout() -> String {
    DEFAULT_PROVIDER_TIMEOUT.to_string()
}

/// What a run does when a calendar call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Abort the run on the first failure.
    #[default]
    FailFast,
    /// Record the failure, keep going, and report everything at the end.
    Continue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Calendars whose events are mirrored, in the order they are processed.
    #[serde(default)]
    pub remote_calendar_ids: Vec<String>,

    /// Title given to placeholders. Local events with this title are owned
    /// by calblock and may be deleted.
    #[serde(default = "default_blocked_event_title")]
    pub blocked_event_title: String,

    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,

    /// Provider binary suffix: `calblock-provider-<provider>`.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Per-call timeout, e.g. "10s" or "1m 30s".
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout: String,

    #[serde(default)]
    pub on_error: ErrorPolicy,
}

impl Default for BlockConfig {
    fn default() -> Self {
        BlockConfig {
            remote_calendar_ids: Vec::new(),
            blocked_event_title: default_blocked_event_title(),
            lookahead_days: default_lookahead_days(),
            provider: default_provider(),
            provider_timeout: default_provider_timeout(),
            on_error: ErrorPolicy::default(),
        }
    }
}

impl BlockConfig {
    pub fn config_path() -> CalBlockResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalBlockError::Config("Could not determine config directory".into()))?
            .join("calblock");

        Ok(config_dir.join("config.toml"))
    }

    /// Resolve an explicit path (expanding `~`) or fall back to the default location.
    pub fn resolve_path(path: Option<&str>) -> CalBlockResult<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(shellexpand::tilde(p).into_owned())),
            None => Self::config_path(),
        }
    }

    /// Load and validate the configuration.
    ///
    /// A missing file at the default location is created with every option
    /// commented out. A missing explicit path is an error.
    pub fn load(path: Option<&str>) -> CalBlockResult<Self> {
        let config_path = Self::resolve_path(path)?;

        if !config_path.exists() {
            if path.is_some() {
                return Err(CalBlockError::Config(format!(
                    "Config file not found: {}",
                    config_path.display()
                )));
            }
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path, None)
    }

    /// Load from a file with an environment overlay.
    ///
    /// `env` replaces the process environment when given.
    pub fn load_from(path: &Path, env: Option<HashMap<String, String>>) -> CalBlockResult<Self> {
        let environment = Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("remote_calendar_ids")
            .source(env);

        let config: BlockConfig = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(environment)
            .build()
            .map_err(|e| CalBlockError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalBlockError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CalBlockResult<()> {
        if self.lookahead_days == 0 {
            return Err(CalBlockError::Config(
                "lookahead_days must be a positive number of days".into(),
            ));
        }

        if self.lookahead_days > MAX_LOOKAHEAD_DAYS {
            return Err(CalBlockError::Config(format!(
                "lookahead_days must be at most {} days, got {}",
                MAX_LOOKAHEAD_DAYS, self.lookahead_days
            )));
        }

        if self.blocked_event_title.trim().is_empty() {
            return Err(CalBlockError::Config(
                "blocked_event_title must not be empty".into(),
            ));
        }

        if self.remote_calendar_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(CalBlockError::Config(
                "remote_calendar_ids must not contain blank ids".into(),
            ));
        }

        self.provider_timeout()?;

        if self.remote_calendar_ids.is_empty() {
            tracing::warn!("No remote calendars configured; every placeholder will be removed");
        }

        Ok(())
    }

    pub fn provider_timeout(&self) -> CalBlockResult<Duration> {
        humantime::parse_duration(&self.provider_timeout).map_err(|e| {
            CalBlockError::Config(format!(
                "Invalid provider_timeout '{}': {}",
                self.provider_timeout, e
            ))
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalBlockResult<()> {
        let contents = format!(
            "\
# calblock configuration

# Calendars to mirror busy time from (must be shared with this account):
# remote_calendar_ids = [\"you@work.example.com\", \"you@gmail.com\"]

# Title of placeholder events. calblock creates *and deletes* local events
# with this title, so never use it for real events:
# blocked_event_title = \"{}\"

# How many days ahead to look:
# lookahead_days = {}

# Provider binary to use (calblock-provider-<name>):
# provider = \"{}\"
# provider_timeout = \"{}\"

# What to do when a calendar call fails: \"fail_fast\" or \"continue\"
# on_error = \"fail_fast\"
",
            DEFAULT_BLOCKED_EVENT_TITLE, DEFAULT_LOOKAHEAD_DAYS, DEFAULT_PROVIDER, DEFAULT_PROVIDER_TIMEOUT
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalBlockError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalBlockError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
