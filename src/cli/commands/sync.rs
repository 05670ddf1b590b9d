use crate::config::Settings;
use crate::git::{find_repo_root, GitCli};
use crate::sync::{SkipCause, SyncCoordinator, SyncOptions, SyncOutcome};
use crate::ui::TerminalPrompter;
use crate::{NotesSyncError, Result};

pub fn execute() -> Result<()> {
    let settings = Settings::load()?;
    let notes_dir = settings.require_notes_dir()?;
    let root = find_repo_root(&notes_dir).ok_or(NotesSyncError::NotARepo(notes_dir))?;

    let mut coordinator =
        SyncCoordinator::new(GitCli, TerminalPrompter, SyncOptions::from(&settings));
    coordinator.configure(root);

    match coordinator.sync_now()? {
        SyncOutcome::NoChanges => println!("Nothing to sync."),
        SyncOutcome::Committed { pushed: true } => println!("Committed and pushed."),
        SyncOutcome::Committed { pushed: false } => {
            println!("Committed; push failed and will be retried on the next sync.")
        }
        SyncOutcome::Skipped(SkipCause::DeclinedPull) => {
            println!("Sync skipped; local changes are kept for the next attempt.")
        }
        SyncOutcome::Skipped(cause) => println!("Sync skipped ({:?}).", cause),
    }

    Ok(())
}
