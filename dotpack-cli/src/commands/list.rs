//! `dotpack list`: remote-backed packages in the store.

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use dotpack_sync::pipeline;

/// Arguments for `dotpack list`.
#[derive(Args, Debug)]
pub struct ListArgs {}

#[derive(Tabled)]
struct PackageRow {
    #[tabled(rename = "package")]
    package: String,
    #[tabled(rename = "path")]
    path: String,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home()?;
        let repos = pipeline::list(&home).context("failed to list packages")?;
        if repos.is_empty() {
            println!("No remote-backed packages found. Run `dotpack install <url>` to add one.");
            return Ok(());
        }

        let rows: Vec<PackageRow> = repos
            .into_iter()
            .map(|repo| PackageRow {
                package: repo.name.to_string(),
                path: repo.path.display().to_string(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
