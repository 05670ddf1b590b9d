use std::path::PathBuf;
use std::time::Duration;

use log::{error, info, warn};
use notify::{EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::Settings;
use crate::git::{find_repo_root, GitCli};
use crate::sync::{is_qualifying_save, SyncCoordinator, SyncOptions, SyncOutcome};
use crate::ui::TerminalPrompter;
use crate::{NotesSyncError, Result};

/// Fixed wall-clock interval between timer ticks
const TIMER_TICK: Duration = Duration::from_secs(60);

pub async fn execute() -> Result<()> {
    let settings = Settings::load()?;
    let notes_dir = settings.require_notes_dir()?;
    let root = find_repo_root(&notes_dir)
        .ok_or_else(|| NotesSyncError::NotARepo(notes_dir.clone()))?;

    if !settings.auto_sync {
        println!("Auto-sync is disabled; save and timer events will be ignored.");
        println!("Enable it with 'notes-sync config set auto-sync true'.");
    }

    let mut coordinator =
        SyncCoordinator::new(GitCli, TerminalPrompter, SyncOptions::from(&settings));
    coordinator.configure(root.clone());

    // The notify callback runs on the watcher's own thread; events cross
    // into the async loop over an unbounded channel
    let (tx, mut rx) = mpsc::unbounded_channel::<PathBuf>();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                    for path in event.paths {
                        let _ = tx.send(path);
                    }
                }
            }
            Err(e) => error!("watcher error: {}", e),
        }
    })?;
    watcher.watch(&root, RecursiveMode::Recursive)?;

    println!("Watching {} (Ctrl-C to stop)...", root.display());

    let mut ticker = tokio::time::interval(TIMER_TICK);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("stopping watcher");
                break;
            }
            Some(path) = rx.recv() => {
                if is_qualifying_save(&root, &path) {
                    report("save", coordinator.on_qualifying_save());
                }
            }
            _ = ticker.tick() => {
                report("timer", coordinator.on_timer_tick());
            }
        }
    }

    Ok(())
}

fn report(source: &str, outcome: Result<SyncOutcome>) {
    match outcome {
        Ok(SyncOutcome::Committed { pushed: true }) => {
            info!("{} sync: committed and pushed", source)
        }
        Ok(SyncOutcome::Committed { pushed: false }) => {
            warn!("{} sync: committed, push pending", source)
        }
        Ok(SyncOutcome::NoChanges) => info!("{} sync: nothing to do", source),
        Ok(SyncOutcome::Skipped(_)) => {}
        Err(e) => error!("{} sync failed: {}", source, e),
    }
}
