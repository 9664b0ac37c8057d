//! Watcher configuration
//!
//! Loaded from TOML. Every field has a default, so an empty or missing file
//! yields [`WatcherConfig::default`].

use crate::error::ConfigError;
use crate::platform::BackendKind;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use vigil_core::{EventMask, WatchOptions, DEFAULT_BUFFER_SIZE};

const BUFFER_RANGE: (u32, u32) = (1024, 1024 * 1024);
const MAX_DEBOUNCE_MS: u64 = 60_000;
const POLL_INTERVAL_RANGE: (u64, u64) = (10, 3_600_000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatcherConfig {
    /// Backend override. Unset picks the platform default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendKind>,

    /// Event classes to report
    pub events: EventMask,

    /// Watch the whole subtree instead of direct children only
    pub recursive: bool,

    /// Native buffer hint in bytes (1024..=1048576)
    pub buffer_size: u32,

    /// Coalescing window for repeated modifications, 0 disables (0..=60000)
    pub debounce_ms: u64,

    /// Detection cycle period for polling (10..=3600000)
    pub poll_interval_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            backend: None,
            events: EventMask::default(),
            recursive: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
            debounce_ms: 0,
            poll_interval_ms: 500,
        }
    }
}

impl WatcherConfig {
    /// Read and validate a config file; a missing file means defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = BUFFER_RANGE;
        if !(min..=max).contains(&self.buffer_size) {
            return Err(ConfigError::Invalid {
                key: "buffer_size",
                reason: format!("{} not in {min}..={max}", self.buffer_size),
            });
        }

        if self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Invalid {
                key: "debounce_ms",
                reason: format!("{} exceeds {MAX_DEBOUNCE_MS}", self.debounce_ms),
            });
        }

        let (min, max) = POLL_INTERVAL_RANGE;
        if !(min..=max).contains(&self.poll_interval_ms) {
            return Err(ConfigError::Invalid {
                key: "poll_interval_ms",
                reason: format!("{} not in {min}..={max}", self.poll_interval_ms),
            });
        }

        if self.events.is_empty() {
            return Err(ConfigError::Invalid {
                key: "events",
                reason: "at least one event class is required".to_string(),
            });
        }

        Ok(())
    }

    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            recursive: self.recursive,
            buffer_size: self.buffer_size,
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Commented sample config, printed by `vigil config --example`
pub fn example_config() -> &'static str {
    r#"# Vigil watcher configuration

# Backend: "unix", "windows" or "stub". Omit to use the platform default.
# backend = "unix"

# Event classes to report, in bitflags text form.
# FILE_NAME | DIR_NAME | ATTRIBUTES | SIZE | LAST_WRITE | LAST_ACCESS | CREATION | SECURITY
events = "FILE_NAME | DIR_NAME | SIZE | LAST_WRITE"

# Watch the whole subtree instead of direct children only
recursive = false

# Native buffer hint in bytes (1024..=1048576)
buffer_size = 16384

# Coalesce repeated modifications of one path within this window (0 disables)
debounce_ms = 0

# Detection cycle period when polling (10..=3600000)
poll_interval_ms = 500
"#
}
