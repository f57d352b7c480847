//! `dotpack status`: which packages have remote changes waiting.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use dotpack_sync::{pipeline, PendingStatus};

/// Arguments for `dotpack status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home()?;
        let pending = pipeline::pending(&home).context("failed to check packages")?;

        if self.json {
            print_json(&pending)?;
            return Ok(());
        }
        print_table(&pending);
        Ok(())
    }
}

#[derive(Serialize)]
struct PackageStatusJson {
    package: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "package")]
    package: String,
    #[tabled(rename = "status")]
    status: String,
}

fn status_key(status: &PendingStatus) -> &'static str {
    match status.result {
        Ok(true) => "behind",
        Ok(false) => "current",
        Err(_) => "error",
    }
}

fn status_label(status: &PendingStatus) -> String {
    match &status.result {
        Ok(true) => "UPDATES AVAILABLE".yellow().bold().to_string(),
        Ok(false) => "CURRENT".green().bold().to_string(),
        Err(err) => format!("{} {err}", "ERROR".red().bold()),
    }
}

fn print_json(pending: &[PendingStatus]) -> Result<()> {
    let payload: Vec<PackageStatusJson> = pending
        .iter()
        .map(|status| PackageStatusJson {
            package: status.repo.name.to_string(),
            status: status_key(status),
            error: status.result.as_ref().err().map(|e| e.to_string()),
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(pending: &[PendingStatus]) {
    if pending.is_empty() {
        println!("No remote-backed packages found.");
        return;
    }

    let rows: Vec<StatusTableRow> = pending
        .iter()
        .map(|status| StatusTableRow {
            package: status.repo.name.to_string(),
            status: status_label(status),
        })
        .collect();
    let behind = pending.iter().filter(|s| matches!(s.result, Ok(true))).count();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    if behind > 0 {
        println!("Run 'dotpack update' to pull {behind} package(s).");
    }
}
