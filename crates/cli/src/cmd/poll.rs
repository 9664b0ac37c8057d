//! Poll a set of files on an interval

use crate::util;
use crate::PollArgs;
use anyhow::Result;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Duration;
use tokio::sync::mpsc;
use vigil_watcher::{PeriodicPoller, WatcherConfig};

pub async fn run(args: PollArgs, config: WatcherConfig) -> Result<()> {
    let events = util::resolve_events(args.events.as_deref(), config.events)?;
    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.poll_interval());

    let (tx, mut rx) = mpsc::channel(64);
    let mut poller = PeriodicPoller::new(interval, tx);
    for path in &args.paths {
        poller.track(path, events);
    }
    let task = tokio::spawn(poller.run());

    let color = std::io::stdout().is_terminal();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            batch = rx.recv() => {
                let Some(batch) = batch else { break };
                for path in batch {
                    if color {
                        println!("{} {}", "changed".yellow(), path.display());
                    } else {
                        println!("changed {}", path.display());
                    }
                }
            }
        }
    }

    drop(rx);
    task.await?;
    Ok(())
}
