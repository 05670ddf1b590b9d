use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::Settings;
use crate::{NotesSyncError, Result};

/// Settings addressable through `notes-sync config set`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SettingKey {
    AutoSync,
    SaveThreshold,
    MinutesThreshold,
    CommitMessage,
    NotesDir,
    Token,
}

pub fn show() -> Result<()> {
    let settings = Settings::load()?;

    println!("Configuration:");
    if let Some(path) = Settings::config_path() {
        println!("  File: {}", path.display());
    }
    println!();
    println!("  auto-sync: {}", settings.auto_sync);
    println!("  save-threshold: {}", settings.save_count_threshold);
    println!("  minutes-threshold: {}", settings.minutes_threshold);
    println!("  commit-message: {}", settings.commit_message);
    match settings.notes_dir {
        Some(ref dir) => println!("  notes-dir: {}", dir.display()),
        None => println!("  notes-dir: (not set; run 'notes-sync init')"),
    }
    println!(
        "  token: {}",
        if settings.github_token.is_some() {
            "configured"
        } else {
            "not set (NOTES_SYNC_TOKEN / GITHUB_TOKEN are checked first)"
        }
    );

    Ok(())
}

pub fn set(key: SettingKey, value: &str) -> Result<()> {
    let mut settings = Settings::load()?;

    match key {
        SettingKey::AutoSync => settings.auto_sync = parse_bool(value)?,
        SettingKey::SaveThreshold => {
            settings.save_count_threshold = parse_threshold(value, "save-threshold")?
        }
        SettingKey::MinutesThreshold => {
            settings.minutes_threshold = parse_threshold(value, "minutes-threshold")?.into()
        }
        SettingKey::CommitMessage => settings.commit_message = value.to_string(),
        SettingKey::NotesDir => settings.notes_dir = Some(PathBuf::from(value).canonicalize()?),
        SettingKey::Token => settings.github_token = Some(value.to_string()),
    }

    settings.save()?;
    println!("Updated.");
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(NotesSyncError::Config(format!(
            "expected true/false, got '{}'",
            value
        ))),
    }
}

fn parse_threshold(value: &str, name: &str) -> Result<u32> {
    let parsed: u32 = value.parse().map_err(|_| {
        NotesSyncError::Config(format!("{} must be a positive integer, got '{}'", name, value))
    })?;
    if parsed == 0 {
        return Err(NotesSyncError::Config(format!(
            "{} must be at least 1",
            name
        )));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool("on").unwrap());
        assert!(!parse_bool("false").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("5", "save-threshold").unwrap(), 5);
        assert!(parse_threshold("0", "save-threshold").is_err());
        assert!(parse_threshold("-3", "save-threshold").is_err());
        assert!(parse_threshold("many", "save-threshold").is_err());
    }
}
