//! Error types for dotpack-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from configuration and package store operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.dotpack/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// No package directory with this name exists in the store.
    #[error("package '{name}' not found at {path}")]
    PackageNotFound { name: String, path: PathBuf },

    /// A package directory with this name already exists in the store.
    #[error("package '{name}' already exists at {path}")]
    PackageExists { name: String, path: PathBuf },

    /// A package name that cannot be used as a single directory component.
    #[error("invalid package name '{0}'")]
    InvalidPackageName(String),

    /// A strategy name other than `safe`, `keep` or `force`.
    #[error("unknown update strategy '{0}'; expected: safe, keep, force")]
    UnknownStrategy(String),
}
