pub mod coordinator;

pub use coordinator::{SkipCause, SyncCoordinator, SyncOptions, SyncOutcome};

use std::fmt;
use std::path::Path;

/// What caused a sync attempt. Carried into the commit message template
/// and logs; it never alters protocol branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncReason {
    SaveThreshold,
    Timer,
    Manual,
}

impl fmt::Display for SyncReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncReason::SaveThreshold => write!(f, "save-threshold"),
            SyncReason::Timer => write!(f, "timer"),
            SyncReason::Manual => write!(f, "manual"),
        }
    }
}

/// Render the configured commit message template.
/// Placeholders: {reason}, {hostname}, {timestamp}.
pub fn render_message(template: &str, reason: SyncReason) -> String {
    let mut message = template.replace("{reason}", &reason.to_string());

    if message.contains("{hostname}") {
        let host = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown-host".to_string());
        message = message.replace("{hostname}", &host);
    }

    if message.contains("{timestamp}") {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
        message = message.replace("{timestamp}", &now);
    }

    message
}

/// Whether a saved file should count toward the sync triggers: it must lie
/// under the notes root, outside `.git`, and not be an editor's scratch
/// file (vim swap/backup, emacs lock).
pub fn is_qualifying_save(root: &Path, path: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };

    if relative.components().any(|c| c.as_os_str() == ".git") {
        return false;
    }

    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    if name.ends_with('~') || name.starts_with(".#") || name == "4913" {
        return false;
    }

    !matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("swp") | Some("swx")
    )
}
