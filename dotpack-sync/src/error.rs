//! Error types for dotpack-sync.

use std::path::PathBuf;

use thiserror::Error;

use dotpack_core::{CoreError, PackageName};

/// Failures reported by a [`Vcs`](crate::vcs::Vcs) provider.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("no remote configured for {path}")]
    NoRemote { path: PathBuf },

    #[error("HEAD is detached; check out a branch first")]
    DetachedHead,

    #[error("branch '{branch}' is not checked out (HEAD is '{head}')")]
    BranchNotCheckedOut { branch: String, head: String },

    /// Neither the tracked branch nor the remote's default branch pointer exists.
    #[error("remote branch for '{branch}' not found on '{remote}'")]
    MissingRemoteBranch { remote: String, branch: String },

    /// Merge stopped on conflicts; the branch was left at its pre-merge head.
    #[error("merging {upstream} conflicts in {} file(s): {}", .paths.len(), preview(.paths))]
    Conflict {
        upstream: String,
        paths: Vec<PathBuf>,
    },

    #[error("push of {refname} rejected: {message}")]
    PushRejected { refname: String, message: String },

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration, package store, or strategy parsing failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A VCS operation failed for one package.
    #[error("package '{package}': {source}")]
    Vcs {
        package: PackageName,
        #[source]
        source: VcsError,
    },

    #[error("package '{package}' is not a git repository ({path})")]
    NotARepository { package: PackageName, path: PathBuf },

    #[error("package '{package}' has no remote configured")]
    NoRemote { package: PackageName },
}

impl SyncError {
    /// Attach the package name to a provider failure.
    pub fn vcs(package: &PackageName, source: VcsError) -> Self {
        SyncError::Vcs {
            package: package.clone(),
            source,
        }
    }
}

/// Convenience constructor for [`VcsError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> VcsError {
    VcsError::Io {
        path: path.into(),
        source,
    }
}

fn preview(paths: &[PathBuf]) -> String {
    const LIMIT: usize = 3;
    let mut shown: Vec<String> = paths
        .iter()
        .take(LIMIT)
        .map(|p| p.display().to_string())
        .collect();
    if paths.len() > LIMIT {
        shown.push(format!("+{} more", paths.len() - LIMIT));
    }
    shown.join(", ")
}
