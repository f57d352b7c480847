//! # dotpack-sync
//!
//! Multi-repository synchronization engine for dotpack packages.
//!
//! - [`discover`] finds remote-backed packages in the store
//! - [`strategy`] applies `safe`, `keep` or `force` to one package
//! - [`batch`] folds per-package outcomes into a [`BatchReport`]
//! - [`push`] publishes local edits
//! - [`git`] is the libgit2-backed [`Vcs`] provider
//!
//! [`pipeline`] wires these to the user's configuration and is what the CLI
//! calls.

pub mod batch;
pub mod commit;
pub mod discover;
pub mod divergence;
pub mod error;
pub mod git;
pub mod inspect;
pub mod install;
pub mod pipeline;
pub mod push;
pub mod strategy;
pub mod vcs;

#[cfg(test)]
mod fake;

pub use batch::{pending_all, update_all, update_all_named, update_all_until, BatchReport, PendingStatus};
pub use discover::{discover, RepoRef};
pub use error::{SyncError, VcsError};
pub use git::Git2Vcs;
pub use push::PushOutcome;
pub use strategy::{execute, Strategy, UpdateOutcome};
pub use vcs::{BranchSelector, CommitId, TreeStatus, Vcs};
