use std::path::Path;

use log::debug;

use crate::{NotesSyncError, Result};

use super::runner::run_git;

/// Ahead/behind counts of the current branch against its upstream.
/// Computed fresh on every sync attempt; the remote can change between
/// checks, so this is never cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Divergence {
    pub ahead: u32,
    pub behind: u32,
    pub has_upstream: bool,
}

/// Report how far the current branch has diverged from its upstream.
/// A failing rev-list query means no upstream is configured, which is the
/// expected state for a first-use repository and reported as
/// `has_upstream: false` rather than an error.
pub fn divergence(root: &Path) -> Result<Divergence> {
    match run_git(root, &["rev-list", "--left-right", "--count", "HEAD...@{upstream}"]) {
        Ok(out) => {
            let (ahead, behind) = parse_counts(out.stdout.trim())?;
            Ok(Divergence {
                ahead,
                behind,
                has_upstream: true,
            })
        }
        Err(NotesSyncError::CommandFailed { stderr, .. }) => {
            debug!("no upstream for {}: {}", root.display(), stderr.trim());
            Ok(Divergence::default())
        }
        Err(e) => Err(e),
    }
}

/// Parse `rev-list --left-right --count` output: "<ahead>\t<behind>".
fn parse_counts(s: &str) -> Result<(u32, u32)> {
    let mut parts = s.split_whitespace();
    let ahead = parts.next().and_then(|v| v.parse().ok());
    let behind = parts.next().and_then(|v| v.parse().ok());

    match (ahead, behind) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(NotesSyncError::Other(format!(
            "unexpected rev-list count output: {:?}",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_counts() {
        assert_eq!(parse_counts("2\t3").unwrap(), (2, 3));
        assert_eq!(parse_counts("0\t0").unwrap(), (0, 0));
        assert_eq!(parse_counts("12 7").unwrap(), (12, 7));
    }

    #[test]
    fn test_parse_counts_rejects_garbage() {
        assert!(parse_counts("").is_err());
        assert!(parse_counts("abc\tdef").is_err());
        assert!(parse_counts("5").is_err());
    }
}
