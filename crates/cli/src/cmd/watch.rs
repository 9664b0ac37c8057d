//! Watch a path and stream its changes

use crate::util;
use crate::WatchArgs;
use anyhow::Result;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use vigil_core::{ChangeKind, ChangeNotification, EventMask};
use vigil_watcher::{services, FileWatcher, PollingDetector, WatcherConfig};

pub async fn run(args: WatchArgs, config: WatcherConfig) -> Result<()> {
    let events = util::resolve_events(args.events.as_deref(), config.events)?;

    let mut options = config.watch_options();
    options.recursive |= args.recursive;
    if let Some(ms) = args.debounce_ms {
        options.debounce = Duration::from_millis(ms);
    }

    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.poll_interval());
    let output = Output {
        json: args.json,
        color: std::io::stdout().is_terminal(),
    };

    let mut watcher = match config.backend {
        Some(_) => FileWatcher::from_config(&config),
        None => services::instance().create_file_watcher(),
    };

    if watcher.watch(&args.path, events, options) {
        info!(
            path = %args.path.display(),
            backend = %watcher.backend_kind(),
            honored = ?watcher.honored_events(),
            "watching"
        );
        if !output.json {
            eprintln!(
                "{} {} {}",
                "Watching".bold(),
                args.path.display(),
                format!("({} backend)", watcher.backend_kind()).dimmed()
            );
        }

        let result = drain_until_interrupted(&mut watcher, interval, &output).await;
        watcher.stop();
        return result;
    }

    if !options.recursive && args.path.is_file() {
        warn!(path = %args.path.display(), "native watch unavailable, polling instead");
        return poll_file(&args.path, events, interval, &output).await;
    }

    anyhow::bail!("Failed to watch {}", args.path.display())
}

struct Output {
    json: bool,
    color: bool,
}

impl Output {
    fn emit(&self, notification: &ChangeNotification) -> Result<()> {
        if self.json {
            println!("{}", util::format_json(notification)?);
        } else {
            println!("{}", util::format_notification(notification, self.color));
        }
        Ok(())
    }
}

async fn drain_until_interrupted(
    watcher: &mut FileWatcher,
    interval: Duration,
    output: &Output,
) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut timer = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = timer.tick() => {}
        }

        for notification in watcher.drain() {
            output.emit(&notification)?;
        }
    }

    Ok(())
}

/// Fallback for a single file when no native watch could be established
async fn poll_file(path: &Path, events: EventMask, interval: Duration, output: &Output) -> Result<()> {
    let mut detector = PollingDetector::new(path, events);
    detector.detect_changes();
    let mut existed = detector.signature().exists;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut timer = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = timer.tick() => {}
        }

        if !detector.detect_changes() {
            continue;
        }

        let exists = detector.signature().exists;
        let kind = fallback_kind(existed, exists);
        existed = exists;
        output.emit(&ChangeNotification::new(kind, path))?;
    }

    Ok(())
}

fn fallback_kind(existed: bool, exists: bool) -> ChangeKind {
    match (existed, exists) {
        (false, true) => ChangeKind::Added,
        (true, false) => ChangeKind::Removed,
        _ => ChangeKind::Modified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_kind() {
        assert_eq!(fallback_kind(false, true), ChangeKind::Added);
        assert_eq!(fallback_kind(true, false), ChangeKind::Removed);
        assert_eq!(fallback_kind(true, true), ChangeKind::Modified);
    }
}
