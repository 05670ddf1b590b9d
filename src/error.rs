use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotesSyncError {
    // Git Errors
    #[error("git {args} exited with status {code:?}: {stderr}")]
    CommandFailed {
        args: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("not a git repository: {}", .0.display())]
    NotARepo(PathBuf),

    #[error("cannot fast-forward the notes repository, resolve manually: {0}")]
    PullConflict(String),

    // GitHub Errors
    #[error("GitHub authentication failed: {0}")]
    AuthFailure(String),

    #[error("GitHub API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Watcher Errors
    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),

    // Config Errors
    #[error("Configuration error: {0}")]
    Config(String),

    // File/IO Errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // User cancelled
    #[error("Operation cancelled by user")]
    Cancelled,

    // Generic
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, NotesSyncError>;
