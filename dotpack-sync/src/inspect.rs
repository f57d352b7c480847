//! Working-tree cleanliness.

use std::path::Path;

use crate::error::VcsError;
use crate::vcs::Vcs;

/// Whether a working tree has pending modifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeState {
    Clean,
    Dirty,
}

/// Classify the working tree at `path`.
///
/// Staged, unstaged and untracked entries all make a tree dirty. A path that
/// cannot be opened is an error, never "dirty".
pub fn inspect<V: Vcs + ?Sized>(vcs: &V, path: &Path) -> Result<TreeState, VcsError> {
    let status = vcs.status(path)?;
    if status.is_clean() {
        return Ok(TreeState::Clean);
    }
    tracing::debug!(
        path = %path.display(),
        staged = status.staged,
        unstaged = status.unstaged,
        untracked = status.untracked,
        "working tree has local changes"
    );
    Ok(TreeState::Dirty)
}
