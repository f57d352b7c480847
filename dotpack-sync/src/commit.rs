//! Auto-commit of every local modification.

use std::path::Path;

use crate::error::VcsError;
use crate::vcs::{CommitId, Vcs};

/// Message of the commit created by the `keep` strategy before pulling.
pub const BEFORE_PULL_MESSAGE: &str = "auto-commit before pull";

/// Message of the commit created before pushing a dirty package.
pub const BEFORE_PUSH_MESSAGE: &str = "auto-commit before push";

/// Stage the whole tree (additions, modifications, deletions, untracked
/// files) and record exactly one commit with `message`.
pub fn auto_commit<V: Vcs + ?Sized>(
    vcs: &V,
    path: &Path,
    message: &str,
) -> Result<CommitId, VcsError> {
    vcs.add_all(path)?;
    let id = vcs.commit(path, message)?;
    tracing::info!(path = %path.display(), commit = %id.short(), message, "auto-committed local changes");
    Ok(id)
}
