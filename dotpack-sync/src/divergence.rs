//! Local vs. remote head comparison.

use std::path::Path;

use crate::error::VcsError;
use crate::vcs::{BranchSelector, CommitId, Vcs};

/// Heads observed right after a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    pub local_head: CommitId,
    pub remote_head: CommitId,
}

impl Divergence {
    pub fn diverged(&self) -> bool {
        self.local_head != self.remote_head
    }
}

/// Fetch, then resolve the local head of `branch` and its remote counterpart.
pub fn detect<V: Vcs + ?Sized>(
    vcs: &V,
    path: &Path,
    branch: &str,
) -> Result<Divergence, VcsError> {
    vcs.fetch(path, branch)?;
    let local_head = vcs.resolve_head(path)?;
    let remote_head = vcs.resolve_remote_head(path, branch)?;
    tracing::debug!(
        path = %path.display(),
        branch,
        local = %local_head.short(),
        remote = %remote_head.short(),
        "resolved heads"
    );
    Ok(Divergence {
        local_head,
        remote_head,
    })
}

/// Whether the remote head differs from the local head after a fetch.
pub fn has_pending_updates<V: Vcs + ?Sized>(
    vcs: &V,
    path: &Path,
    branch: &BranchSelector,
) -> Result<bool, VcsError> {
    let branch = branch.resolve(vcs, path)?;
    Ok(detect(vcs, path, &branch)?.diverged())
}
