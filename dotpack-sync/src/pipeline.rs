//! Shared entrypoints used by the CLI.
//!
//! Each function loads `~/.dotpack/config.yaml` from the given home
//! directory, builds the git provider with the configured identity and runs
//! one engine operation against the configured package store.

use std::path::{Path, PathBuf};

use dotpack_core::{config, store, Config, PackageName, Strategy};

use crate::batch::{self, BatchReport, PendingStatus};
use crate::discover::{self, RepoRef};
use crate::git::Git2Vcs;
use crate::install;
use crate::push::{self, PushOutcome};
use crate::vcs::BranchSelector;
use crate::SyncError;

struct Context {
    config: Config,
    vcs: Git2Vcs,
    base: PathBuf,
}

impl Context {
    fn load(home: &Path) -> Result<Self, SyncError> {
        let config = config::load_at(home)?;
        let base = config.packages_dir_at(home);
        let vcs = Git2Vcs::new(config.identity.clone());
        Ok(Self { config, vcs, base })
    }
}

/// Update every package. `None` uses the configured default strategy.
pub fn update(home: &Path, strategy: Option<Strategy>) -> Result<BatchReport, SyncError> {
    let ctx = Context::load(home)?;
    let strategy = strategy.unwrap_or(ctx.config.default_strategy);
    batch::update_all(&ctx.vcs, &ctx.base, strategy, &BranchSelector::Current)
}

/// Update every package with a strategy given by name.
pub fn update_named(home: &Path, strategy: &str) -> Result<BatchReport, SyncError> {
    let ctx = Context::load(home)?;
    batch::update_all_named(&ctx.vcs, &ctx.base, strategy, &BranchSelector::Current)
}

/// Push one package by name.
pub fn push(home: &Path, name: &PackageName) -> Result<PushOutcome, SyncError> {
    let ctx = Context::load(home)?;
    let path = store::existing_package(&ctx.base, name)?;
    let repo = RepoRef {
        name: name.clone(),
        path,
    };
    push::push(&ctx.vcs, &repo, &BranchSelector::Current)
}

/// Pending-update status of every package.
pub fn pending(home: &Path) -> Result<Vec<PendingStatus>, SyncError> {
    let ctx = Context::load(home)?;
    batch::pending_all(&ctx.vcs, &ctx.base, &BranchSelector::Current)
}

/// Remote-backed packages in the store.
pub fn list(home: &Path) -> Result<Vec<RepoRef>, SyncError> {
    let ctx = Context::load(home)?;
    Ok(discover::discover(&ctx.vcs, &ctx.base)?)
}

/// Clone `url` into the store.
pub fn install(home: &Path, url: &str, name: Option<PackageName>) -> Result<RepoRef, SyncError> {
    let ctx = Context::load(home)?;
    install::install(&ctx.vcs, &ctx.base, url, name)
}
