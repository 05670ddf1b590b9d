use std::path::Path;
use std::process::Command;

use log::debug;

use crate::{NotesSyncError, Result};

/// Captured output of a completed git command.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run a git command against a working directory and capture its output.
/// Non-zero exit becomes a `CommandFailed` error carrying the raw output;
/// callers decide whether and when to retry.
pub fn run_git(root: &Path, args: &[&str]) -> Result<CommandOutput> {
    debug!("git {} (in {})", args.join(" "), root.display());

    let output = Command::new("git")
        .args(args)
        .current_dir(root)
        .output()
        .map_err(|e| NotesSyncError::Other(format!("failed to spawn git: {}", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !output.status.success() {
        return Err(NotesSyncError::CommandFailed {
            args: args.join(" "),
            code: output.status.code(),
            stdout,
            stderr,
        });
    }

    Ok(CommandOutput { stdout, stderr })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_git_version_in_any_directory() {
        // `git --version` ignores the working directory, so this exercises
        // the spawn/capture path without needing a repository
        let out = run_git(Path::new("."), &["--version"]).unwrap();
        assert!(out.stdout.contains("git version"));
    }

    #[test]
    fn test_run_git_failure_carries_output() {
        let err = run_git(Path::new("."), &["no-such-subcommand"]).unwrap_err();
        match err {
            NotesSyncError::CommandFailed { args, code, stderr, .. } => {
                assert_eq!(args, "no-such-subcommand");
                assert!(code.is_some());
                assert!(!stderr.is_empty());
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }
}
