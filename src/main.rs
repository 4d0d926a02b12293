//! viewreg CLI entry point
//!
//! Parses arguments, sets up logging, builds the template registry and runs
//! the selected command:
//! - `render` - render a template with data from a file
//! - `list` - list registered aliases
//! - `check` - reload every template and report failures

use anyhow::Result;
use clap::Parser;
use viewreg::cli::Cli;
use viewreg::core::user_friendly_error;

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    cli.init_logging();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
