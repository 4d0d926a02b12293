//! The `check` command.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use crate::templating::View;

/// Reload every registered template and report failures.
///
/// Registration already fails on the first broken template; the reload then
/// reports every remaining problem at once, the same way a running
/// application would see them on refresh.
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Print every loaded alias, not only failures
    #[arg(long)]
    all: bool,
}

impl CheckCommand {
    pub fn execute(self, view: &View) -> Result<()> {
        let report = view.refresh_report();

        if self.all {
            for alias in &report.loaded {
                println!("{} {}", "✓".green(), alias);
            }
        }

        for dropped in &report.dropped {
            println!("{} {} ({})", "✗".red(), dropped.alias.bold(), dropped.path.display());
            println!("    {}", dropped.error);
        }

        if !report.is_complete() {
            bail!(
                "{} of {} templates failed to load",
                report.dropped.len(),
                report.dropped.len() + report.loaded.len()
            );
        }

        println!("{} {} templates loaded", "✓".green(), report.loaded.len());
        Ok(())
    }
}
