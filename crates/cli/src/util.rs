//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use vigil_core::{ChangeKind, ChangeNotification, EventMask};
use vigil_watcher::WatcherConfig;

/// `<config dir>/vigil/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vigil").join("config.toml"))
}

/// Load the config at `path`, or defaults when there is none
pub fn load_config(path: Option<&Path>) -> Result<WatcherConfig> {
    match path {
        Some(path) => WatcherConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(WatcherConfig::default()),
    }
}

/// Event mask from a `--events` argument, falling back to `default`
pub fn resolve_events(arg: Option<&str>, default: EventMask) -> Result<EventMask> {
    let Some(list) = arg else {
        return Ok(default);
    };

    let events = EventMask::parse_list(list)
        .map_err(|name| anyhow::anyhow!("Unknown event class: {name}"))?;
    if events.is_empty() {
        anyhow::bail!("--events needs at least one event class");
    }
    Ok(events)
}

/// One line of human-readable output
pub fn format_notification(notification: &ChangeNotification, color: bool) -> String {
    let label = format!("{:<12}", notification.kind.as_str());
    let path = notification.path.display();

    if !color {
        return format!("{label} {path}");
    }

    let label = match notification.kind {
        ChangeKind::Added => label.green().to_string(),
        ChangeKind::Removed => label.red().to_string(),
        ChangeKind::Modified => label.yellow().to_string(),
        ChangeKind::RenamedFrom | ChangeKind::RenamedTo => label.cyan().to_string(),
    };
    format!("{label} {path}")
}

/// One line of NDJSON output
pub fn format_json(notification: &ChangeNotification) -> Result<String> {
    serde_json::to_string(notification).context("Failed to serialize notification")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_events() {
        assert_eq!(resolve_events(None, EventMask::SIZE).unwrap(), EventMask::SIZE);
        assert_eq!(
            resolve_events(Some("file_name, last-write"), EventMask::SIZE).unwrap(),
            EventMask::FILE_NAME | EventMask::LAST_WRITE
        );
        assert!(resolve_events(Some("bogus"), EventMask::SIZE).is_err());
        assert!(resolve_events(Some(" , "), EventMask::SIZE).is_err());
    }

    #[test]
    fn test_format_notification_plain() {
        let n = ChangeNotification::new(ChangeKind::Added, "/tmp/a.txt");
        assert_eq!(format_notification(&n, false), "added        /tmp/a.txt");
    }

    #[test]
    fn test_format_json() {
        let n = ChangeNotification::new(ChangeKind::Removed, "/tmp/a.txt");
        assert_eq!(format_json(&n).unwrap(), r#"{"kind":"removed","path":"/tmp/a.txt"}"#);
    }

    #[test]
    fn test_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        assert_eq!(load_config(Some(&path)).unwrap(), WatcherConfig::default());

        std::fs::write(&path, "recursive = true\n").unwrap();
        assert!(load_config(Some(&path)).unwrap().recursive);

        std::fs::write(&path, "buffer_size = 1\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
