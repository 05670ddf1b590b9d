use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::Settings;
use crate::git::{CommitOutcome, Vcs};
use crate::ui::prompt::{Prompter, PullChoice};
use crate::{NotesSyncError, Result};

use super::{render_message, SyncReason};

/// Trigger policy knobs, taken from `Settings` at construction.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub auto_sync: bool,
    pub save_count_threshold: u32,
    pub minutes_threshold: u64,
    pub commit_message: String,
}

impl From<&Settings> for SyncOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            auto_sync: settings.auto_sync,
            save_count_threshold: settings.save_count_threshold,
            minutes_threshold: settings.minutes_threshold,
            commit_message: settings.commit_message.clone(),
        }
    }
}

/// Why a trigger did not run the protocol this time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipCause {
    /// Another protocol run holds the critical section
    InProgress,
    /// Automatic syncing is disabled in settings
    AutoSyncDisabled,
    /// Save count has not reached the threshold yet
    BelowThreshold,
    /// Nothing saved since the last completed sync
    NotDirty,
    /// The minutes threshold since the last sync has not elapsed
    NotElapsed,
    /// The operator declined to pull a diverged upstream
    DeclinedPull,
}

/// What a sync attempt produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Clean working copy; counted as a completed sync
    NoChanges,
    /// A commit was created; `pushed` records whether publishing succeeded
    Committed { pushed: bool },
    Skipped(SkipCause),
}

/// Owns the sync state and the commit-reconcile-push protocol. One
/// instance per application session, bound to a single repository root;
/// save and timer callbacks hold a handle to it rather than any globals.
pub struct SyncCoordinator<V: Vcs, P: Prompter> {
    vcs: V,
    prompter: P,
    opts: SyncOptions,
    repo_root: Option<PathBuf>,
    dirty: bool,
    save_count: u32,
    last_sync: Instant,
    in_progress: bool,
}

impl<V: Vcs, P: Prompter> SyncCoordinator<V, P> {
    pub fn new(vcs: V, prompter: P, opts: SyncOptions) -> Self {
        Self {
            vcs,
            prompter,
            opts,
            repo_root: None,
            dirty: false,
            save_count: 0,
            last_sync: Instant::now(),
            in_progress: false,
        }
    }

    /// Bind the engine to one repository root. Re-binding replaces the
    /// prior root and starts from fresh state.
    pub fn configure(&mut self, repo_root: PathBuf) {
        info!("sync coordinator bound to {}", repo_root.display());
        self.repo_root = Some(repo_root);
        self.dirty = false;
        self.save_count = 0;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record one qualifying file save. Reaching the save-count threshold
    /// immediately attempts a sync.
    pub fn on_qualifying_save(&mut self) -> Result<SyncOutcome> {
        if !self.opts.auto_sync {
            return Ok(SyncOutcome::Skipped(SkipCause::AutoSyncDisabled));
        }

        self.dirty = true;
        self.save_count += 1;
        debug!(
            "qualifying save ({}/{})",
            self.save_count, self.opts.save_count_threshold
        );

        if self.save_count >= self.opts.save_count_threshold {
            self.attempt_sync(SyncReason::SaveThreshold)
        } else {
            Ok(SyncOutcome::Skipped(SkipCause::BelowThreshold))
        }
    }

    /// Periodic timer tick. Attempts a sync only when there are recorded
    /// changes and the configured minutes threshold has elapsed.
    pub fn on_timer_tick(&mut self) -> Result<SyncOutcome> {
        if !self.opts.auto_sync {
            return Ok(SyncOutcome::Skipped(SkipCause::AutoSyncDisabled));
        }
        if !self.dirty {
            return Ok(SyncOutcome::Skipped(SkipCause::NotDirty));
        }

        let threshold = Duration::from_secs(self.opts.minutes_threshold * 60);
        if self.last_sync.elapsed() < threshold {
            return Ok(SyncOutcome::Skipped(SkipCause::NotElapsed));
        }

        self.attempt_sync(SyncReason::Timer)
    }

    /// Explicit operator request; always attempts a sync regardless of
    /// dirty state or elapsed time.
    pub fn sync_now(&mut self) -> Result<SyncOutcome> {
        self.attempt_sync(SyncReason::Manual)
    }

    /// Single critical section around the protocol. A trigger firing while
    /// a run is in flight is rejected as a no-op; its save was already
    /// recorded, so nothing is lost.
    fn attempt_sync(&mut self, reason: SyncReason) -> Result<SyncOutcome> {
        if self.in_progress {
            debug!("sync already in progress, ignoring {} trigger", reason);
            return Ok(SyncOutcome::Skipped(SkipCause::InProgress));
        }

        let root = self.repo_root.clone().ok_or_else(|| {
            NotesSyncError::Config("sync attempted before a repository was configured".to_string())
        })?;

        self.in_progress = true;
        let outcome = self.run_protocol(&root, reason);
        self.in_progress = false;

        if let Err(ref e) = outcome {
            warn!("sync ({}) failed for {}: {}", reason, root.display(), e);
        }
        outcome
    }

    fn run_protocol(&mut self, root: &Path, reason: SyncReason) -> Result<SyncOutcome> {
        info!("sync attempt ({}) for {}", reason, root.display());

        // Step 1: a clean working copy is a successful no-op
        if self.vcs.status_short(root)?.trim().is_empty() {
            debug!("working copy clean, nothing to sync");
            self.finish_cycle();
            return Ok(SyncOutcome::NoChanges);
        }

        // Step 2: reconcile with upstream before committing on top of it
        let divergence = self.vcs.divergence(root)?;
        if divergence.has_upstream && divergence.behind > 0 {
            warn!(
                "{} is {} commit(s) behind upstream",
                root.display(),
                divergence.behind
            );
            match self.prompter.pull_or_skip(divergence.behind)? {
                PullChoice::Pull => {
                    // Fast-forward only: a conflicting pull aborts the whole
                    // attempt and leaves the dirty flag set for a retry
                    self.vcs.pull_fast_forward(root)?;
                    info!("fast-forwarded {} commit(s)", divergence.behind);
                }
                PullChoice::Skip => {
                    info!("operator skipped sync while behind upstream");
                    return Ok(SyncOutcome::Skipped(SkipCause::DeclinedPull));
                }
            }
        }

        // Steps 3-4: stage and commit
        self.vcs.stage_all(root)?;
        let message = render_message(&self.opts.commit_message, reason);
        match self.vcs.commit(root, &message)? {
            CommitOutcome::Created => {}
            CommitOutcome::NothingToCommit => {
                // Benign race with step 1, same as the no-op path
                debug!("nothing to commit after staging");
                self.finish_cycle();
                return Ok(SyncOutcome::NoChanges);
            }
        }

        // Step 5: push is best-effort. The local commit is authoritative;
        // a rejected push waits for the next trigger or a manual sync.
        let pushed = match self.vcs.push(root) {
            Ok(()) => true,
            Err(e) => {
                warn!("push failed, local commit kept: {}", e);
                false
            }
        };

        self.finish_cycle();
        info!("sync ({}) committed, pushed: {}", reason, pushed);
        Ok(SyncOutcome::Committed { pushed })
    }

    /// Step 6: terminal success or benign no-op.
    fn finish_cycle(&mut self) {
        self.dirty = false;
        self.save_count = 0;
        self.last_sync = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Divergence;
    use crate::ui::prompt::RemoteChoice;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeVcs {
        dirty: RefCell<bool>,
        divergence: Divergence,
        pull_fails: bool,
        push_fails: bool,
        commit_races: bool,
        commits: RefCell<Vec<String>>,
        pulls: RefCell<u32>,
        pushes: RefCell<u32>,
    }

    impl Vcs for FakeVcs {
        fn init(&self, _root: &Path) -> Result<()> {
            Ok(())
        }

        fn status_short(&self, _root: &Path) -> Result<String> {
            if *self.dirty.borrow() {
                Ok(" M daily/2026-08-07.md\n".to_string())
            } else {
                Ok(String::new())
            }
        }

        fn stage_all(&self, _root: &Path) -> Result<()> {
            Ok(())
        }

        fn commit(&self, _root: &Path, message: &str) -> Result<CommitOutcome> {
            if self.commit_races || !*self.dirty.borrow() {
                return Ok(CommitOutcome::NothingToCommit);
            }
            *self.dirty.borrow_mut() = false;
            self.commits.borrow_mut().push(message.to_string());
            Ok(CommitOutcome::Created)
        }

        fn pull_fast_forward(&self, _root: &Path) -> Result<()> {
            *self.pulls.borrow_mut() += 1;
            if self.pull_fails {
                Err(NotesSyncError::PullConflict("not a fast-forward".to_string()))
            } else {
                Ok(())
            }
        }

        fn push(&self, _root: &Path) -> Result<()> {
            if self.push_fails {
                return Err(NotesSyncError::CommandFailed {
                    args: "push".to_string(),
                    code: Some(1),
                    stdout: String::new(),
                    stderr: "could not read from remote".to_string(),
                });
            }
            *self.pushes.borrow_mut() += 1;
            Ok(())
        }

        fn push_set_upstream(&self, root: &Path, _remote: &str, _branch: &str) -> Result<()> {
            self.push(root)
        }

        fn divergence(&self, _root: &Path) -> Result<Divergence> {
            Ok(self.divergence)
        }

        fn current_branch(&self, _root: &Path) -> Result<Option<String>> {
            Ok(Some("main".to_string()))
        }

        fn rename_branch(&self, _root: &Path, _name: &str) -> Result<()> {
            Ok(())
        }

        fn remote_url(&self, _root: &Path, _name: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn add_remote(&self, _root: &Path, _name: &str, _url: &str) -> Result<()> {
            Ok(())
        }

        fn set_remote_url(&self, _root: &Path, _name: &str, _url: &str) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakePrompter {
        skip_pull: bool,
        asked: RefCell<u32>,
    }

    impl Prompter for FakePrompter {
        fn pull_or_skip(&self, _behind: u32) -> Result<PullChoice> {
            *self.asked.borrow_mut() += 1;
            if self.skip_pull {
                Ok(PullChoice::Skip)
            } else {
                Ok(PullChoice::Pull)
            }
        }

        fn reuse_or_create(&self, _existing: &str, _candidate: &str) -> Result<RemoteChoice> {
            unreachable!("provisioning prompt inside sync protocol")
        }
    }

    fn options(auto_sync: bool, save_threshold: u32, minutes: u64) -> SyncOptions {
        SyncOptions {
            auto_sync,
            save_count_threshold: save_threshold,
            minutes_threshold: minutes,
            commit_message: "notes: auto-sync ({reason})".to_string(),
        }
    }

    fn coordinator(
        vcs: FakeVcs,
        prompter: FakePrompter,
        opts: SyncOptions,
    ) -> SyncCoordinator<FakeVcs, FakePrompter> {
        let mut coord = SyncCoordinator::new(vcs, prompter, opts);
        coord.configure(PathBuf::from("/notes"));
        coord
    }

    #[test]
    fn test_sync_before_configure_is_an_error() {
        let mut coord = SyncCoordinator::new(
            FakeVcs::default(),
            FakePrompter::default(),
            options(true, 3, 0),
        );
        assert!(matches!(coord.sync_now(), Err(NotesSyncError::Config(_))));
    }

    #[test]
    fn test_clean_working_copy_is_successful_noop() {
        let mut coord = coordinator(FakeVcs::default(), FakePrompter::default(), options(true, 3, 0));
        assert_eq!(coord.sync_now().unwrap(), SyncOutcome::NoChanges);
        assert!(!coord.dirty);
        assert_eq!(coord.save_count, 0);
    }

    #[test]
    fn test_save_threshold_triggers_exactly_one_sync() {
        let vcs = FakeVcs {
            dirty: RefCell::new(true),
            divergence: Divergence {
                ahead: 0,
                behind: 0,
                has_upstream: true,
            },
            ..Default::default()
        };
        let mut coord = coordinator(vcs, FakePrompter::default(), options(true, 3, 0));

        assert_eq!(
            coord.on_qualifying_save().unwrap(),
            SyncOutcome::Skipped(SkipCause::BelowThreshold)
        );
        assert_eq!(
            coord.on_qualifying_save().unwrap(),
            SyncOutcome::Skipped(SkipCause::BelowThreshold)
        );
        assert_eq!(coord.save_count, 2);

        assert_eq!(
            coord.on_qualifying_save().unwrap(),
            SyncOutcome::Committed { pushed: true }
        );

        let commits = coord.vcs.commits.borrow();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0], "notes: auto-sync (save-threshold)");
        assert_eq!(*coord.vcs.pushes.borrow(), 1);
        assert!(!coord.dirty);
        assert_eq!(coord.save_count, 0);
    }

    #[test]
    fn test_second_sync_is_noop_without_new_changes() {
        let vcs = FakeVcs {
            dirty: RefCell::new(true),
            ..Default::default()
        };
        let mut coord = coordinator(vcs, FakePrompter::default(), options(true, 10, 0));

        assert_eq!(
            coord.sync_now().unwrap(),
            SyncOutcome::Committed { pushed: true }
        );
        assert_eq!(coord.sync_now().unwrap(), SyncOutcome::NoChanges);
        assert_eq!(coord.vcs.commits.borrow().len(), 1);
    }

    #[test]
    fn test_behind_and_skip_aborts_without_commit_or_push() {
        let vcs = FakeVcs {
            dirty: RefCell::new(true),
            divergence: Divergence {
                ahead: 1,
                behind: 2,
                has_upstream: true,
            },
            ..Default::default()
        };
        let prompter = FakePrompter {
            skip_pull: true,
            ..Default::default()
        };
        let mut coord = coordinator(vcs, prompter, options(true, 100, 0));

        coord.on_qualifying_save().unwrap();
        assert!(coord.dirty);

        assert_eq!(
            coord.sync_now().unwrap(),
            SyncOutcome::Skipped(SkipCause::DeclinedPull)
        );
        assert!(coord.vcs.commits.borrow().is_empty());
        assert_eq!(*coord.vcs.pushes.borrow(), 0);
        assert!(coord.dirty);
    }

    #[test]
    fn test_fast_forward_pull_then_commit_and_push() {
        let vcs = FakeVcs {
            dirty: RefCell::new(true),
            divergence: Divergence {
                ahead: 0,
                behind: 3,
                has_upstream: true,
            },
            ..Default::default()
        };
        let mut coord = coordinator(vcs, FakePrompter::default(), options(true, 100, 0));

        assert_eq!(
            coord.sync_now().unwrap(),
            SyncOutcome::Committed { pushed: true }
        );
        assert_eq!(*coord.vcs.pulls.borrow(), 1);
        assert_eq!(coord.vcs.commits.borrow().len(), 1);
    }

    #[test]
    fn test_pull_conflict_aborts_and_keeps_dirty() {
        let vcs = FakeVcs {
            dirty: RefCell::new(true),
            divergence: Divergence {
                ahead: 1,
                behind: 1,
                has_upstream: true,
            },
            pull_fails: true,
            ..Default::default()
        };
        let mut coord = coordinator(vcs, FakePrompter::default(), options(true, 100, 0));

        coord.on_qualifying_save().unwrap();
        assert!(matches!(
            coord.sync_now(),
            Err(NotesSyncError::PullConflict(_))
        ));
        assert!(coord.vcs.commits.borrow().is_empty());
        assert_eq!(*coord.vcs.pushes.borrow(), 0);
        assert!(coord.dirty);
        assert!(!coord.in_progress);
    }

    #[test]
    fn test_no_prompt_without_upstream() {
        // behind is irrelevant when no upstream is configured
        let vcs = FakeVcs {
            dirty: RefCell::new(true),
            divergence: Divergence::default(),
            ..Default::default()
        };
        let mut coord = coordinator(vcs, FakePrompter::default(), options(true, 100, 0));

        assert_eq!(
            coord.sync_now().unwrap(),
            SyncOutcome::Committed { pushed: true }
        );
        assert_eq!(*coord.prompter.asked.borrow(), 0);
    }

    #[test]
    fn test_push_failure_is_nonfatal_and_clears_state() {
        let vcs = FakeVcs {
            dirty: RefCell::new(true),
            push_fails: true,
            ..Default::default()
        };
        let mut coord = coordinator(vcs, FakePrompter::default(), options(true, 100, 0));

        coord.on_qualifying_save().unwrap();
        assert_eq!(
            coord.sync_now().unwrap(),
            SyncOutcome::Committed { pushed: false }
        );
        assert_eq!(coord.vcs.commits.borrow().len(), 1);
        assert!(!coord.dirty);
        assert_eq!(coord.save_count, 0);
    }

    #[test]
    fn test_commit_race_treated_as_noop() {
        let vcs = FakeVcs {
            dirty: RefCell::new(true),
            commit_races: true,
            ..Default::default()
        };
        let mut coord = coordinator(vcs, FakePrompter::default(), options(true, 100, 0));

        assert_eq!(coord.sync_now().unwrap(), SyncOutcome::NoChanges);
        assert!(!coord.dirty);
    }

    #[test]
    fn test_auto_sync_disabled_never_runs_protocol() {
        let vcs = FakeVcs {
            dirty: RefCell::new(true),
            ..Default::default()
        };
        let mut coord = coordinator(vcs, FakePrompter::default(), options(false, 1, 0));

        assert_eq!(
            coord.on_qualifying_save().unwrap(),
            SyncOutcome::Skipped(SkipCause::AutoSyncDisabled)
        );
        assert_eq!(
            coord.on_timer_tick().unwrap(),
            SyncOutcome::Skipped(SkipCause::AutoSyncDisabled)
        );
        assert!(coord.vcs.commits.borrow().is_empty());
        assert_eq!(coord.save_count, 0);
    }

    #[test]
    fn test_timer_requires_dirty() {
        let mut coord = coordinator(FakeVcs::default(), FakePrompter::default(), options(true, 100, 0));
        assert_eq!(
            coord.on_timer_tick().unwrap(),
            SyncOutcome::Skipped(SkipCause::NotDirty)
        );
    }

    #[test]
    fn test_timer_respects_minutes_threshold() {
        let vcs = FakeVcs {
            dirty: RefCell::new(true),
            ..Default::default()
        };
        let mut coord = coordinator(vcs, FakePrompter::default(), options(true, 100, 10));

        coord.on_qualifying_save().unwrap();
        assert_eq!(
            coord.on_timer_tick().unwrap(),
            SyncOutcome::Skipped(SkipCause::NotElapsed)
        );
        assert!(coord.vcs.commits.borrow().is_empty());
    }

    #[test]
    fn test_timer_syncs_once_elapsed() {
        let vcs = FakeVcs {
            dirty: RefCell::new(true),
            ..Default::default()
        };
        let mut coord = coordinator(vcs, FakePrompter::default(), options(true, 100, 0));

        coord.on_qualifying_save().unwrap();
        assert_eq!(
            coord.on_timer_tick().unwrap(),
            SyncOutcome::Committed { pushed: true }
        );
        assert_eq!(
            coord.vcs.commits.borrow()[0],
            "notes: auto-sync (timer)"
        );
    }

    #[test]
    fn test_reentrant_trigger_is_rejected_but_save_recorded() {
        let vcs = FakeVcs {
            dirty: RefCell::new(true),
            ..Default::default()
        };
        let mut coord = coordinator(vcs, FakePrompter::default(), options(true, 1, 0));

        // Simulate a save event arriving while a protocol run is in flight
        coord.in_progress = true;
        assert_eq!(
            coord.on_qualifying_save().unwrap(),
            SyncOutcome::Skipped(SkipCause::InProgress)
        );
        assert!(coord.dirty);
        assert_eq!(coord.save_count, 1);
        assert!(coord.vcs.commits.borrow().is_empty());

        assert_eq!(
            coord.sync_now().unwrap(),
            SyncOutcome::Skipped(SkipCause::InProgress)
        );
    }

    #[test]
    fn test_configure_resets_state() {
        let vcs = FakeVcs {
            dirty: RefCell::new(true),
            ..Default::default()
        };
        let mut coord = coordinator(vcs, FakePrompter::default(), options(true, 100, 0));

        coord.on_qualifying_save().unwrap();
        assert!(coord.dirty);
        assert_eq!(coord.save_count, 1);

        coord.configure(PathBuf::from("/other-notes"));
        assert!(!coord.dirty);
        assert_eq!(coord.save_count, 0);
    }
}
