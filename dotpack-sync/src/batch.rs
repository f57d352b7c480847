//! Batch update across every discovered package.
//!
//! Repositories are processed one at a time in discovery order. A failure in
//! one never stops the others, and nothing is retried.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use dotpack_core::PackageName;

use crate::discover::{discover, RepoRef};
use crate::divergence::has_pending_updates;
use crate::error::SyncError;
use crate::strategy::{execute, Strategy, UpdateOutcome};
use crate::vcs::{BranchSelector, Vcs};

/// Aggregated outcome of a batch update.
///
/// Built only through [`BatchReport::record`], so a package appears in at
/// most one of `updated`, `rejected` and `failed`.
#[derive(Debug, Default)]
pub struct BatchReport {
    updated: BTreeSet<PackageName>,
    rejected: BTreeSet<PackageName>,
    failed: BTreeMap<PackageName, SyncError>,
    skipped: Vec<PackageName>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one package's outcome into the report. Recording the same name
    /// twice keeps only the latest outcome.
    pub fn record(mut self, name: PackageName, outcome: UpdateOutcome) -> Self {
        self.updated.remove(&name);
        self.rejected.remove(&name);
        self.failed.remove(&name);
        match outcome {
            UpdateOutcome::Updated => {
                self.updated.insert(name);
            }
            UpdateOutcome::LocalChangesRejected => {
                self.rejected.insert(name);
            }
            UpdateOutcome::Failed(err) => {
                self.failed.insert(name, err);
            }
        }
        self
    }

    fn skip(mut self, name: PackageName) -> Self {
        self.skipped.push(name);
        self
    }

    /// Packages left untouched because of local modifications.
    pub fn rejected(&self) -> &BTreeSet<PackageName> {
        &self.rejected
    }

    /// Packages whose update failed, with the cause.
    pub fn failed(&self) -> &BTreeMap<PackageName, SyncError> {
        &self.failed
    }

    pub fn updated(&self) -> &BTreeSet<PackageName> {
        &self.updated
    }

    /// Packages never reached because the batch was cancelled.
    pub fn skipped(&self) -> &[PackageName] {
        &self.skipped
    }

    /// Nothing was rejected and nothing failed.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.failed.is_empty()
    }
}

/// Update every remote-backed package under `base` with `strategy`.
pub fn update_all<V: Vcs + ?Sized>(
    vcs: &V,
    base: &Path,
    strategy: Strategy,
    branch: &BranchSelector,
) -> Result<BatchReport, SyncError> {
    update_all_until(vcs, base, strategy, branch, &AtomicBool::new(false))
}

/// As [`update_all`], parsing the strategy name first. An unknown name fails
/// before any repository is touched.
pub fn update_all_named<V: Vcs + ?Sized>(
    vcs: &V,
    base: &Path,
    strategy: &str,
    branch: &BranchSelector,
) -> Result<BatchReport, SyncError> {
    let strategy: Strategy = strategy.parse()?;
    update_all(vcs, base, strategy, branch)
}

/// As [`update_all`], but stops starting new repositories once `cancel` is
/// set. The repository in progress always runs to completion; the rest are
/// listed in [`BatchReport::skipped`].
pub fn update_all_until<V: Vcs + ?Sized>(
    vcs: &V,
    base: &Path,
    strategy: Strategy,
    branch: &BranchSelector,
    cancel: &AtomicBool,
) -> Result<BatchReport, SyncError> {
    let repos = discover(vcs, base)?;
    tracing::info!(count = repos.len(), %strategy, "updating packages");

    let report = repos.into_iter().fold(BatchReport::new(), |report, repo| {
        if cancel.load(Ordering::SeqCst) {
            tracing::debug!(package = %repo.name, "cancelled, skipping");
            return report.skip(repo.name);
        }
        let outcome = execute(vcs, &repo, strategy, branch);
        report.record(repo.name, outcome)
    });

    tracing::info!(
        updated = report.updated.len(),
        rejected = report.rejected.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        "batch finished"
    );
    Ok(report)
}

/// Whether one package has remote commits it has not integrated.
#[derive(Debug)]
pub struct PendingStatus {
    pub repo: RepoRef,
    pub result: Result<bool, SyncError>,
}

/// Fetch every discovered package and report whether its remote head moved.
/// Per-package errors are reported in place and never stop the scan.
pub fn pending_all<V: Vcs + ?Sized>(
    vcs: &V,
    base: &Path,
    branch: &BranchSelector,
) -> Result<Vec<PendingStatus>, SyncError> {
    Ok(discover(vcs, base)?
        .into_iter()
        .map(|repo| {
            let result = has_pending_updates(vcs, &repo.path, branch)
                .map_err(|err| SyncError::vcs(&repo.name, err));
            PendingStatus { repo, result }
        })
        .collect())
}
