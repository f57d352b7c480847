//! Per-package update state machine.
//!
//! | tree  | safe                   | keep                      | force                      |
//! |-------|------------------------|---------------------------|----------------------------|
//! | clean | pull                   | pull                      | fetch, hard reset to remote |
//! | dirty | reject, tree untouched | auto-commit, then pull    | fetch, hard reset to remote |
//!
//! `force` never merges: it always resets to the remote tip.

use std::path::Path;

use dotpack_core::PackageName;
pub use dotpack_core::Strategy;

use crate::commit::{auto_commit, BEFORE_PULL_MESSAGE};
use crate::discover::RepoRef;
use crate::divergence::detect;
use crate::error::{SyncError, VcsError};
use crate::inspect::{inspect, TreeState};
use crate::vcs::{BranchSelector, Vcs};

/// Result of updating one package.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Pulled or reset successfully (including "already up to date").
    Updated,
    /// `safe` found local modifications and left the package untouched.
    LocalChangesRejected,
    Failed(SyncError),
}

impl UpdateOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, UpdateOutcome::Updated)
    }
}

/// Apply `strategy` to one package. Every failure is folded into
/// [`UpdateOutcome::Failed`] with the package name attached.
pub fn execute<V: Vcs + ?Sized>(
    vcs: &V,
    repo: &RepoRef,
    strategy: Strategy,
    branch: &BranchSelector,
) -> UpdateOutcome {
    match run(vcs, repo, strategy, branch) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(package = %repo.name, %strategy, error = %err, "update failed");
            UpdateOutcome::Failed(SyncError::vcs(&repo.name, err))
        }
    }
}

fn run<V: Vcs + ?Sized>(
    vcs: &V,
    repo: &RepoRef,
    strategy: Strategy,
    branch: &BranchSelector,
) -> Result<UpdateOutcome, VcsError> {
    let state = inspect(vcs, &repo.path)?;

    match (strategy, state) {
        (Strategy::Safe, TreeState::Dirty) => {
            tracing::info!(package = %repo.name, "local changes present, not updating");
            return Ok(UpdateOutcome::LocalChangesRejected);
        }
        (Strategy::Safe | Strategy::Keep, TreeState::Clean) => {
            let branch = branch.resolve(vcs, &repo.path)?;
            vcs.pull(&repo.path, &branch)?;
        }
        (Strategy::Keep, TreeState::Dirty) => {
            // Resolve first so a detached HEAD fails before anything is committed.
            let branch = branch.resolve(vcs, &repo.path)?;
            auto_commit(vcs, &repo.path, BEFORE_PULL_MESSAGE)?;
            vcs.pull(&repo.path, &branch)?;
        }
        (Strategy::Force, state) => {
            let branch = branch.resolve(vcs, &repo.path)?;
            force_reset(vcs, &repo.name, &repo.path, &branch, state)?;
        }
    }
    tracing::debug!(package = %repo.name, %strategy, "updated");
    Ok(UpdateOutcome::Updated)
}

fn force_reset<V: Vcs + ?Sized>(
    vcs: &V,
    name: &PackageName,
    path: &Path,
    branch: &str,
    state: TreeState,
) -> Result<(), VcsError> {
    let divergence = detect(vcs, path, branch)?;
    if !divergence.diverged() && state == TreeState::Clean {
        tracing::debug!(package = %name, "already at remote head");
        return Ok(());
    }
    tracing::info!(
        package = %name,
        from = %divergence.local_head.short(),
        to = %divergence.remote_head.short(),
        discard_local = state == TreeState::Dirty,
        "resetting to remote head"
    );
    vcs.hard_reset(path, branch, &divergence.remote_head)
}
