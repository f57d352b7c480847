//! `dotpack update`: pull remote changes into every package.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use dotpack_core::Strategy;
use dotpack_sync::{pipeline, BatchReport};

/// Arguments for `dotpack update`.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Commit local edits before pulling instead of skipping the package.
    #[arg(long, conflicts_with_all = ["force", "strategy"])]
    pub keep: bool,

    /// Discard local edits and reset to the remote.
    #[arg(long, conflicts_with = "strategy")]
    pub force: bool,

    /// Strategy by name: safe, keep or force. Defaults to the configured one.
    #[arg(long, value_name = "NAME")]
    pub strategy: Option<String>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl UpdateArgs {
    pub fn run(self) -> Result<()> {
        let home = super::home()?;

        let report = match (self.keep, self.force, self.strategy.as_deref()) {
            (true, _, _) => pipeline::update(&home, Some(Strategy::Keep)),
            (_, true, _) => pipeline::update(&home, Some(Strategy::Force)),
            (_, _, Some(name)) => pipeline::update_named(&home, name),
            _ => pipeline::update(&home, None),
        }
        .context("update failed")?;

        if self.json {
            print_json(&report)?;
        } else {
            print_summary(&report);
        }

        if !report.failed().is_empty() {
            bail!("{} package(s) failed to update", report.failed().len());
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct UpdateReportJson {
    updated: Vec<String>,
    rejected: Vec<String>,
    failed: Vec<FailureJson>,
    skipped: Vec<String>,
}

#[derive(Serialize)]
struct FailureJson {
    package: String,
    error: String,
}

fn print_json(report: &BatchReport) -> Result<()> {
    let payload = UpdateReportJson {
        updated: report.updated().iter().map(|n| n.to_string()).collect(),
        rejected: report.rejected().iter().map(|n| n.to_string()).collect(),
        failed: report
            .failed()
            .iter()
            .map(|(name, err)| FailureJson {
                package: name.to_string(),
                error: err.to_string(),
            })
            .collect(),
        skipped: report.skipped().iter().map(|n| n.to_string()).collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize update JSON")?
    );
    Ok(())
}

/// Only packages that need the user are printed.
fn print_summary(report: &BatchReport) {
    if !report.rejected().is_empty() {
        println!("{}", "Local changes need your decision:".yellow().bold());
        for name in report.rejected() {
            println!("  ■ {name}");
        }
        println!("Run 'dotpack update --keep' to commit them first, or '--force' to discard them.");
    }

    if !report.failed().is_empty() {
        println!("{}", "These packages need your attention:".red().bold());
        for (name, err) in report.failed() {
            println!("  ✗ {name}: {err}");
        }
    }
}
