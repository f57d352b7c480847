//! `dotpack install`: clone a remote into the package store.

use anyhow::{Context, Result};
use clap::Args;

use dotpack_core::PackageName;
use dotpack_sync::pipeline;

/// Arguments for `dotpack install`.
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Remote URL to clone.
    pub url: String,

    /// Package name (defaults to the last segment of the URL).
    #[arg(long)]
    pub name: Option<String>,
}

impl InstallArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home()?;
        let name = self.name.map(PackageName::from);
        let repo = pipeline::install(&home, &self.url, name)
            .with_context(|| format!("install failed for '{}'", self.url))?;
        println!("✓ installed '{}' at {}", repo.name, repo.path.display());
        Ok(())
    }
}
