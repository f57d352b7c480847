//! Package store: one directory per package under a base directory.
//!
//! All functions take the store root explicitly; callers resolve it with
//! [`Config::packages_dir_at`](crate::Config::packages_dir_at).

use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::types::PackageName;

/// `<base>/<name>`: pure, no I/O. Rejects names that are not a single
/// normal path component.
pub fn package_path(base: &Path, name: &PackageName) -> Result<PathBuf, CoreError> {
    let raw = name.as_str();
    let valid = !raw.is_empty()
        && raw != "."
        && raw != ".."
        && !raw.contains('/')
        && !raw.contains('\\');
    if !valid {
        return Err(CoreError::InvalidPackageName(raw.to_owned()));
    }
    Ok(base.join(raw))
}

/// Path of an existing package directory, or `CoreError::PackageNotFound`.
pub fn existing_package(base: &Path, name: &PackageName) -> Result<PathBuf, CoreError> {
    let path = package_path(base, name)?;
    if !path.is_dir() {
        return Err(CoreError::PackageNotFound {
            name: name.0.clone(),
            path,
        });
    }
    Ok(path)
}

/// Path for a package that must not exist yet, or `CoreError::PackageExists`.
pub fn vacant_package(base: &Path, name: &PackageName) -> Result<PathBuf, CoreError> {
    let path = package_path(base, name)?;
    if path.exists() {
        return Err(CoreError::PackageExists {
            name: name.0.clone(),
            path,
        });
    }
    Ok(path)
}

/// Immediate subdirectories of `base`, sorted by name. Hidden directories
/// are skipped. A missing `base` yields an empty list.
pub fn list_package_dirs(base: &Path) -> Result<Vec<(PackageName, PathBuf)>, CoreError> {
    if !base.exists() {
        return Ok(vec![]);
    }
    let mut entries: Vec<_> = std::fs::read_dir(base)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .collect();
    entries.sort_by_key(|e| e.file_name());

    Ok(entries
        .into_iter()
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                return None;
            }
            Some((PackageName::from(name), e.path()))
        })
        .collect())
}

/// Derive a package name from a remote URL: last path segment without `.git`.
///
/// `git@github.com:me/zsh-core.git` → `zsh-core`.
pub fn name_from_url(url: &str) -> Option<PackageName> {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next()?;
    let stem = last.strip_suffix(".git").unwrap_or(last);
    if stem.is_empty() {
        return None;
    }
    Some(PackageName::from(stem))
}
