//! dotpack core library: domain types, configuration, package store, errors.
//!
//! - [`types`]: newtypes shared by the engine and the CLI
//! - [`error`]: [`CoreError`]
//! - [`config`]: `~/.dotpack/config.yaml` load / save
//! - [`store`]: package store path resolution

pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::CoreError;
pub use types::{Identity, PackageName, Strategy};
