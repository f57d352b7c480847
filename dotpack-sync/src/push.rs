//! Push one package's local edits to its remote.

use crate::commit::{auto_commit, BEFORE_PUSH_MESSAGE};
use crate::discover::RepoRef;
use crate::error::{SyncError, VcsError};
use crate::inspect::{inspect, TreeState};
use crate::vcs::{BranchSelector, CommitId, Vcs};

/// What a successful push did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    pub branch: String,
    /// Commit created for local modifications, if the tree was dirty.
    pub auto_commit: Option<CommitId>,
}

/// Commit local modifications if any, then push the branch upstream.
///
/// A package that is not a working tree or has no remote fails before
/// anything is committed.
pub fn push<V: Vcs + ?Sized>(
    vcs: &V,
    repo: &RepoRef,
    branch: &BranchSelector,
) -> Result<PushOutcome, SyncError> {
    let wrap = |err: VcsError| SyncError::vcs(&repo.name, err);

    if !vcs.is_repository(&repo.path) {
        return Err(SyncError::NotARepository {
            package: repo.name.clone(),
            path: repo.path.clone(),
        });
    }
    if vcs.list_remotes(&repo.path).map_err(wrap)?.is_empty() {
        return Err(SyncError::NoRemote {
            package: repo.name.clone(),
        });
    }

    let branch = branch.resolve(vcs, &repo.path).map_err(wrap)?;
    let committed = match inspect(vcs, &repo.path).map_err(wrap)? {
        TreeState::Dirty => Some(auto_commit(vcs, &repo.path, BEFORE_PUSH_MESSAGE).map_err(wrap)?),
        TreeState::Clean => None,
    };

    vcs.push(&repo.path, &branch).map_err(wrap)?;
    tracing::info!(package = %repo.name, branch = %branch, "pushed");
    Ok(PushOutcome {
        branch,
        auto_commit: committed,
    })
}
