use std::path::{Path, PathBuf};

/// Walk parent directories from `start` until a `.git` marker is found.
/// Returns the containing directory, or `None` once the filesystem root is
/// reached without a match. Deliberately uncached: the repository can be
/// initialized after a prior negative check.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);

    while let Some(d) = dir {
        // `.git` is a directory in a normal checkout and a file in a
        // linked worktree; either counts as the marker
        if d.join(".git").exists() {
            return Some(d.to_path_buf());
        }
        dir = d.parent();
    }

    None
}
