//! Remote-backed package discovery.

use std::path::{Path, PathBuf};

use dotpack_core::{store, CoreError, PackageName};

use crate::vcs::Vcs;

/// A package directory that is a git working tree with a remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub name: PackageName,
    pub path: PathBuf,
}

/// Immediate subdirectories of `base` that are working trees with at least
/// one remote, in directory-name order. Anything else is skipped silently.
pub fn discover<V: Vcs + ?Sized>(vcs: &V, base: &Path) -> Result<Vec<RepoRef>, CoreError> {
    let dirs = store::list_package_dirs(base)?;
    Ok(dirs
        .into_iter()
        .filter_map(|(name, path)| {
            if !vcs.is_repository(&path) {
                tracing::debug!(package = %name, "not a git repository, skipping");
                return None;
            }
            match vcs.list_remotes(&path) {
                Ok(remotes) if !remotes.is_empty() => Some(RepoRef { name, path }),
                Ok(_) => {
                    tracing::debug!(package = %name, "no remote configured, skipping");
                    None
                }
                Err(err) => {
                    tracing::debug!(package = %name, error = %err, "cannot list remotes, skipping");
                    None
                }
            }
        })
        .collect())
}
