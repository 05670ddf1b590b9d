use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use crate::{NotesSyncError, Result};

/// Environment variables consulted for the GitHub token, in order, before
/// falling back to the config file.
const TOKEN_ENV_VARS: &[&str] = &["NOTES_SYNC_TOKEN", "GITHUB_TOKEN"];

/// Global settings for notes-sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether save/timer events trigger automatic syncs
    #[serde(default)]
    pub auto_sync: bool,

    /// Number of qualifying saves that triggers a sync
    #[serde(default = "default_save_count_threshold")]
    pub save_count_threshold: u32,

    /// Minimum minutes between timer-triggered syncs
    #[serde(default = "default_minutes_threshold")]
    pub minutes_threshold: u64,

    /// Commit message template. Placeholders: {reason}, {hostname}, {timestamp}
    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    /// The notes directory bound by `notes-sync init`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_dir: Option<PathBuf>,

    /// GitHub token; environment variables take precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
}

fn default_save_count_threshold() -> u32 {
    10
}

fn default_minutes_threshold() -> u64 {
    10
}

fn default_commit_message() -> String {
    "notes: auto-sync ({reason})".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_sync: false,
            save_count_threshold: default_save_count_threshold(),
            minutes_threshold: default_minutes_threshold(),
            commit_message: default_commit_message(),
            notes_dir: None,
            github_token: None,
        }
    }
}

impl Settings {
    /// Get the path to the config file
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "notes-sync").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load settings from the config file
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok_or_else(|| {
            NotesSyncError::Config("Cannot determine config directory".to_string())
        })?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            NotesSyncError::Config(format!("Failed to parse config file: {}", e))
        })?;

        Ok(settings)
    }

    /// Save settings to the config file with restricted permissions (0600);
    /// the file may hold the GitHub token
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            NotesSyncError::Config("Cannot determine config directory".to_string())
        })?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;

        #[cfg(unix)]
        {
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&path)?;
            file.write_all(content.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            std::fs::write(&path, content)?;
        }

        Ok(())
    }

    /// Resolve the GitHub token from the environment or the config file.
    pub fn resolve_token(&self) -> Result<String> {
        for var in TOKEN_ENV_VARS {
            if let Ok(token) = std::env::var(var) {
                if !token.trim().is_empty() {
                    return Ok(token);
                }
            }
        }

        self.github_token.clone().ok_or_else(|| {
            NotesSyncError::AuthFailure(
                "no GitHub token configured; set GITHUB_TOKEN or run \
                 'notes-sync config set token <value>'"
                    .to_string(),
            )
        })
    }

    /// The notes directory, or a config error telling the operator to run init
    pub fn require_notes_dir(&self) -> Result<PathBuf> {
        self.notes_dir.clone().ok_or_else(|| {
            NotesSyncError::Config(
                "no notes directory configured; run 'notes-sync init' first".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.auto_sync);
        assert_eq!(settings.save_count_threshold, 10);
        assert_eq!(settings.minutes_threshold, 10);
        assert!(settings.commit_message.contains("{reason}"));
        assert!(settings.notes_dir.is_none());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"auto_sync": true}"#).unwrap();
        assert!(settings.auto_sync);
        assert_eq!(settings.save_count_threshold, 10);
        assert_eq!(settings.commit_message, "notes: auto-sync ({reason})");
    }

    #[test]
    fn test_require_notes_dir_unconfigured() {
        let settings = Settings::default();
        assert!(settings.require_notes_dir().is_err());
    }

    #[test]
    fn test_token_falls_back_to_config_value() {
        // Only meaningful when the env vars are unset in the test
        // environment; the config fallback is the branch under test
        let settings = Settings {
            github_token: Some("tok_config".to_string()),
            ..Default::default()
        };
        if TOKEN_ENV_VARS.iter().all(|v| std::env::var(v).is_err()) {
            assert_eq!(settings.resolve_token().unwrap(), "tok_config");
        }
    }

    #[test]
    fn test_missing_token_is_auth_failure() {
        let settings = Settings::default();
        if TOKEN_ENV_VARS.iter().all(|v| std::env::var(v).is_err()) {
            assert!(matches!(
                settings.resolve_token(),
                Err(NotesSyncError::AuthFailure(_))
            ));
        }
    }
}
