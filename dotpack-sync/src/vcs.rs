//! VCS provider capability.
//!
//! The engine only talks to version control through [`Vcs`]. [`Git2Vcs`]
//! (in [`crate::git`]) is the production implementation; unit tests use an
//! in-memory provider.
//!
//! [`Git2Vcs`]: crate::git::Git2Vcs

use std::fmt;
use std::path::Path;

use crate::error::VcsError;

/// Hex object id of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(pub String);

impl CommitId {
    /// Abbreviated form for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for CommitId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Counts of pending working-tree entries. Ignored files are never counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStatus {
    pub staged: usize,
    pub unstaged: usize,
    pub untracked: usize,
}

impl TreeStatus {
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && self.untracked == 0
    }
}

/// Which local branch an operation targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BranchSelector {
    /// Whatever branch is checked out.
    #[default]
    Current,
    Named(String),
}

impl BranchSelector {
    pub fn resolve<V: Vcs + ?Sized>(&self, vcs: &V, path: &Path) -> Result<String, VcsError> {
        match self {
            BranchSelector::Current => vcs.current_branch(path),
            BranchSelector::Named(name) => Ok(name.clone()),
        }
    }
}

/// Version-control operations the sync engine consumes.
///
/// Every method takes the working-tree path; providers hold no per-repository
/// state between calls. Network operations block the calling thread.
pub trait Vcs {
    /// `true` when `path` is the root of a non-bare working tree.
    fn is_repository(&self, path: &Path) -> bool;

    fn list_remotes(&self, path: &Path) -> Result<Vec<String>, VcsError>;

    fn status(&self, path: &Path) -> Result<TreeStatus, VcsError>;

    /// Short name of the checked-out branch; `VcsError::DetachedHead` otherwise.
    fn current_branch(&self, path: &Path) -> Result<String, VcsError>;

    /// Refresh remote-tracking refs for the remote `branch` tracks.
    /// Nothing new to fetch is success.
    fn fetch(&self, path: &Path, branch: &str) -> Result<(), VcsError>;

    fn resolve_head(&self, path: &Path) -> Result<CommitId, VcsError>;

    /// Remote-tracking head for `branch`, falling back to the remote's
    /// default-branch pointer when `branch` has no upstream configured.
    fn resolve_remote_head(&self, path: &Path, branch: &str) -> Result<CommitId, VcsError>;

    /// Fetch and integrate the upstream of `branch` (fast-forward or merge).
    /// Already up to date is success.
    fn pull(&self, path: &Path, branch: &str) -> Result<(), VcsError>;

    /// Move `branch` to `commit` and make index and working tree match it
    /// exactly, removing untracked files. `branch` must be checked out.
    fn hard_reset(&self, path: &Path, branch: &str, commit: &CommitId) -> Result<(), VcsError>;

    /// Stage additions, modifications and deletions across the whole tree.
    fn add_all(&self, path: &Path) -> Result<(), VcsError>;

    /// Commit the index on top of HEAD with the provider's identity.
    fn commit(&self, path: &Path, message: &str) -> Result<CommitId, VcsError>;

    /// Push `branch` to its upstream using the host's configured credentials.
    fn push(&self, path: &Path, branch: &str) -> Result<(), VcsError>;

    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), VcsError>;
}
