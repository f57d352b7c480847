//! Clone a remote into the package store.

use std::path::Path;

use dotpack_core::{store, CoreError, PackageName};

use crate::discover::RepoRef;
use crate::error::{io_err, SyncError};
use crate::vcs::Vcs;

/// Clone `url` into `base` as a new package. The package name defaults to
/// the last path segment of the URL without a `.git` suffix. An existing
/// package directory is never overwritten.
pub fn install<V: Vcs + ?Sized>(
    vcs: &V,
    base: &Path,
    url: &str,
    name: Option<PackageName>,
) -> Result<RepoRef, SyncError> {
    let name = match name {
        Some(name) => name,
        None => store::name_from_url(url)
            .ok_or_else(|| CoreError::InvalidPackageName(url.to_owned()))?,
    };
    let path = store::vacant_package(base, &name)?;

    std::fs::create_dir_all(base)
        .map_err(|e| SyncError::vcs(&name, io_err(base, e)))?;
    vcs.clone_repo(url, &path)
        .map_err(|err| SyncError::vcs(&name, err))?;

    tracing::info!(package = %name, url, "installed");
    Ok(RepoRef { name, path })
}
