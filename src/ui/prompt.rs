use dialoguer::Select;

use crate::{NotesSyncError, Result};

/// Operator decision when the local branch is behind its upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullChoice {
    Pull,
    Skip,
}

/// Operator decision when a repository with the desired name already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteChoice {
    UseExisting,
    CreateNew,
}

/// Interactive decisions the sync protocol and the provisioner need from
/// the operator. Injected as a capability so the protocol logic stays
/// testable without a terminal.
pub trait Prompter {
    /// The local branch is `behind` commits behind upstream: pull now or
    /// skip this sync attempt?
    fn pull_or_skip(&self, behind: u32) -> Result<PullChoice>;

    /// A repository named `existing` already exists under the account:
    /// reuse it, or create a new one named `candidate`?
    fn reuse_or_create(&self, existing: &str, candidate: &str) -> Result<RemoteChoice>;
}

/// Terminal prompter backed by dialoguer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn pull_or_skip(&self, behind: u32) -> Result<PullChoice> {
        let selection = Select::new()
            .with_prompt(format!(
                "Notes repository is {} commit(s) behind its upstream",
                behind
            ))
            .items(&["Pull now (fast-forward only)", "Skip this sync"])
            .default(0)
            .interact()
            .map_err(|_| NotesSyncError::Cancelled)?;

        match selection {
            0 => Ok(PullChoice::Pull),
            _ => Ok(PullChoice::Skip),
        }
    }

    fn reuse_or_create(&self, existing: &str, candidate: &str) -> Result<RemoteChoice> {
        let selection = Select::new()
            .with_prompt(format!(
                "A repository named '{}' already exists on GitHub",
                existing
            ))
            .items(&[
                format!("Use existing repository '{}'", existing),
                format!("Create new repository '{}'", candidate),
            ])
            .default(0)
            .interact()
            .map_err(|_| NotesSyncError::Cancelled)?;

        match selection {
            0 => Ok(RemoteChoice::UseExisting),
            _ => Ok(RemoteChoice::CreateNew),
        }
    }
}
