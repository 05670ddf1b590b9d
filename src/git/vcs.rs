use std::path::Path;

use crate::{NotesSyncError, Result};

use super::divergence::{self, Divergence};
use super::runner::run_git;

/// Result of a commit attempt. Committing when the index turned out to be
/// empty is a benign race against the preceding status check, so it is a
/// value here rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Created,
    NothingToCommit,
}

/// Trait for the version control operations the sync engine needs.
/// Components receive the repository root as a parameter and hold no state
/// of their own.
pub trait Vcs {
    /// Initialize a new repository at the given directory
    fn init(&self, root: &Path) -> Result<()>;

    /// Porcelain status output; empty means a clean working copy
    fn status_short(&self, root: &Path) -> Result<String>;

    /// Stage all changes in the working copy
    fn stage_all(&self, root: &Path) -> Result<()>;

    /// Commit staged changes with the given message
    fn commit(&self, root: &Path, message: &str) -> Result<CommitOutcome>;

    /// Fast-forward-only pull; anything requiring a merge is a `PullConflict`
    fn pull_fast_forward(&self, root: &Path) -> Result<()>;

    /// Push the current branch to its configured remote
    fn push(&self, root: &Path) -> Result<()>;

    /// First publish: push with upstream tracking configured
    fn push_set_upstream(&self, root: &Path, remote: &str, branch: &str) -> Result<()>;

    /// Ahead/behind counts against the configured upstream
    fn divergence(&self, root: &Path) -> Result<Divergence>;

    /// Get the current branch name (None when HEAD is detached or unborn)
    fn current_branch(&self, root: &Path) -> Result<Option<String>>;

    /// Rename the current branch
    fn rename_branch(&self, root: &Path, name: &str) -> Result<()>;

    /// URL of a configured remote, or None if it does not exist
    fn remote_url(&self, root: &Path, name: &str) -> Result<Option<String>>;

    /// Add a new remote
    fn add_remote(&self, root: &Path, name: &str, url: &str) -> Result<()>;

    /// Update the URL of an existing remote
    fn set_remote_url(&self, root: &Path, name: &str, url: &str) -> Result<()>;
}

// =============================================================================
// Git CLI Implementation
// =============================================================================

/// Git implementation backed by the subprocess runner. One process per
/// call, no state retained between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

impl Vcs for GitCli {
    fn init(&self, root: &Path) -> Result<()> {
        run_git(root, &["init"]).map(|_| ())
    }

    fn status_short(&self, root: &Path) -> Result<String> {
        run_git(root, &["status", "--porcelain"]).map(|out| out.stdout)
    }

    fn stage_all(&self, root: &Path) -> Result<()> {
        run_git(root, &["add", "--all"]).map(|_| ())
    }

    fn commit(&self, root: &Path, message: &str) -> Result<CommitOutcome> {
        match run_git(root, &["commit", "-m", message]) {
            Ok(_) => Ok(CommitOutcome::Created),
            Err(NotesSyncError::CommandFailed { stdout, stderr, .. })
                if stdout.contains("nothing to commit")
                    || stderr.contains("nothing to commit")
                    || stdout.contains("nothing added to commit") =>
            {
                Ok(CommitOutcome::NothingToCommit)
            }
            Err(e) => Err(e),
        }
    }

    fn pull_fast_forward(&self, root: &Path) -> Result<()> {
        // --ff-only makes git refuse anything that would create a merge
        // commit; that refusal aborts the whole sync attempt
        match run_git(root, &["pull", "--ff-only"]) {
            Ok(_) => Ok(()),
            Err(NotesSyncError::CommandFailed { stderr, .. }) => {
                Err(NotesSyncError::PullConflict(stderr.trim().to_string()))
            }
            Err(e) => Err(e),
        }
    }

    fn push(&self, root: &Path) -> Result<()> {
        run_git(root, &["push"]).map(|_| ())
    }

    fn push_set_upstream(&self, root: &Path, remote: &str, branch: &str) -> Result<()> {
        run_git(root, &["push", "-u", remote, branch]).map(|_| ())
    }

    fn divergence(&self, root: &Path) -> Result<Divergence> {
        divergence::divergence(root)
    }

    fn current_branch(&self, root: &Path) -> Result<Option<String>> {
        // Fails on an unborn branch (fresh repository without commits);
        // that is a None, not an error
        let out = match run_git(root, &["rev-parse", "--abbrev-ref", "HEAD"]) {
            Ok(out) => out,
            Err(NotesSyncError::CommandFailed { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let branch = out.stdout.trim().to_string();
        if branch.is_empty() || branch == "HEAD" {
            Ok(None)
        } else {
            Ok(Some(branch))
        }
    }

    fn rename_branch(&self, root: &Path, name: &str) -> Result<()> {
        run_git(root, &["branch", "-M", name]).map(|_| ())
    }

    fn remote_url(&self, root: &Path, name: &str) -> Result<Option<String>> {
        match run_git(root, &["remote", "get-url", name]) {
            Ok(out) => Ok(Some(out.stdout.trim().to_string())),
            Err(NotesSyncError::CommandFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn add_remote(&self, root: &Path, name: &str, url: &str) -> Result<()> {
        run_git(root, &["remote", "add", name, url]).map(|_| ())
    }

    fn set_remote_url(&self, root: &Path, name: &str, url: &str) -> Result<()> {
        run_git(root, &["remote", "set-url", name, url]).map(|_| ())
    }
}
