pub mod install;
pub mod list;
pub mod push;
pub mod status;
pub mod update;

use std::path::PathBuf;

use anyhow::{Context, Result};

pub(crate) fn home() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}
