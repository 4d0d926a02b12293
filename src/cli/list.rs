//! The `list` command.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::templating::View;

/// List registered template aliases.
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Output format: text or json
    #[arg(short = 'f', long, default_value = "text")]
    format: String,

    /// Show the source path of each template
    #[arg(long)]
    paths: bool,

    /// Only list aliases containing this text
    #[arg(long, value_name = "PATTERN")]
    search: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListItem {
    alias: String,
    path: String,
    loaded: bool,
}

impl ListCommand {
    pub fn execute(self, view: &View) -> Result<()> {
        self.validate_arguments()?;

        let items = self.collect(view);
        match self.format.as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(&items)?),
            _ => self.print_text(&items),
        }
        Ok(())
    }

    fn validate_arguments(&self) -> Result<()> {
        match self.format.as_str() {
            "text" | "json" => Ok(()),
            other => bail!("Invalid format '{other}'. Valid formats are: text, json"),
        }
    }

    fn collect(&self, view: &View) -> Vec<ListItem> {
        let generation = view.snapshot();
        view.aliases()
            .into_iter()
            .filter(|alias| self.matches(alias))
            .map(|alias| ListItem {
                path: view
                    .source_path(&alias)
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                loaded: generation.contains(&alias),
                alias,
            })
            .collect()
    }

    fn matches(&self, alias: &str) -> bool {
        self.search.as_deref().is_none_or(|needle| alias.contains(needle))
    }

    fn print_text(&self, items: &[ListItem]) {
        if items.is_empty() {
            println!("No templates registered");
            return;
        }

        for item in items {
            let marker = if item.loaded {
                String::new()
            } else {
                format!(" {}", "(not loaded)".yellow())
            };
            if self.paths {
                println!("{}{}  {}", item.alias.bold(), marker, item.path.dimmed());
            } else {
                println!("{}{}", item.alias, marker);
            }
        }
    }
}
