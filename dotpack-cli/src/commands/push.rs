//! `dotpack push`: publish local edits of one package.

use anyhow::{Context, Result};
use clap::Args;

use dotpack_core::PackageName;
use dotpack_sync::pipeline;

/// Arguments for `dotpack push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Package to push.
    pub package: String,
}

impl PushArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home()?;
        let name = PackageName::from(self.package.as_str());
        let outcome = pipeline::push(&home, &name)
            .with_context(|| format!("push failed for '{name}'"))?;

        match outcome.auto_commit {
            Some(commit) => println!(
                "✓ '{name}' pushed to {} (committed local changes as {})",
                outcome.branch,
                commit.short()
            ),
            None => println!("✓ '{name}' pushed to {}", outcome.branch),
        }
        Ok(())
    }
}
