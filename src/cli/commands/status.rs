use crate::config::Settings;
use crate::git::{find_repo_root, GitCli, Vcs};
use crate::{NotesSyncError, Result};

pub fn execute() -> Result<()> {
    let settings = Settings::load()?;
    let notes_dir = settings.require_notes_dir()?;
    let root = find_repo_root(&notes_dir).ok_or(NotesSyncError::NotARepo(notes_dir))?;
    let vcs = GitCli;

    println!("Notes repository: {}", root.display());

    if let Some(branch) = vcs.current_branch(&root)? {
        println!("  Branch: {}", branch);
    }

    let status = vcs.status_short(&root)?;
    let changed = status.lines().filter(|l| !l.trim().is_empty()).count();
    if changed == 0 {
        println!("  Working copy: clean");
    } else {
        println!("  Working copy: {} changed file(s)", changed);
    }

    let divergence = vcs.divergence(&root)?;
    if divergence.has_upstream {
        println!(
            "  Upstream: ahead {}, behind {}",
            divergence.ahead, divergence.behind
        );
    } else {
        println!("  Upstream: not configured (run 'notes-sync init')");
    }

    println!(
        "  Auto-sync: {}",
        if settings.auto_sync { "enabled" } else { "disabled" }
    );
    println!(
        "  Thresholds: {} saves / {} minutes",
        settings.save_count_threshold, settings.minutes_threshold
    );

    Ok(())
}
