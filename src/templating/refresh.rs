//! Rebuilding the compiled set from disk.

use std::path::PathBuf;
use std::sync::Arc;

use super::generation::{Generation, LoadedTemplate};
use super::loader::load_source;
use super::view::View;
use crate::core::ViewError;

/// Outcome of [`View::refresh_report`].
#[derive(Debug, Default)]
pub struct RefreshReport {
    /// Id of the generation the refresh published
    pub generation: u64,
    /// Aliases in the new compiled set, sorted
    pub loaded: Vec<String>,
    /// Aliases left out of the new compiled set, sorted by alias
    pub dropped: Vec<DroppedTemplate>,
}

/// A tracked template that could not be reloaded.
#[derive(Debug)]
pub struct DroppedTemplate {
    pub alias: String,
    pub path: PathBuf,
    pub error: ViewError,
}

impl RefreshReport {
    /// Aliases that were dropped, sorted.
    #[must_use]
    pub fn dropped_aliases(&self) -> Vec<String> {
        self.dropped.iter().map(|d| d.alias.clone()).collect()
    }

    /// Whether every tracked alias made it into the new compiled set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty()
    }
}

impl View {
    /// Reload every registered template from disk and publish the result.
    ///
    /// Returns the aliases that could not be reloaded, sorted. See
    /// [`refresh_report`](Self::refresh_report) for the reasons.
    pub fn refresh(&self) -> Vec<String> {
        self.refresh_report().dropped_aliases()
    }

    /// Reload every registered template from disk and publish the result.
    ///
    /// Each tracked path is read again (through the current preprocessor) and
    /// the whole set is compiled into a fresh generation. A template that is
    /// missing, unreadable or fails to compile is left out of that generation
    /// and reported; its alias stays registered, so a later refresh picks it up
    /// once the file is fixed. Renders keep using the previous generation until
    /// the new one is published in a single step.
    ///
    /// Registration that starts during a refresh waits for it to finish.
    pub fn refresh_report(&self) -> RefreshReport {
        let _writer = self.lock_writer();
        let (tracked, hook, id) = {
            let state = self.read_state();
            (state.aliases.clone(), state.preprocessor.clone(), state.current.id() + 1)
        };

        tracing::debug!("Refreshing {} templates", tracked.len());

        let mut sources = Vec::with_capacity(tracked.len());
        let mut dropped = Vec::new();
        for (alias, path) in tracked {
            match load_source(&path, hook.as_deref()) {
                Ok(source) => sources.push(LoadedTemplate {
                    alias,
                    path,
                    source,
                }),
                Err(error) => dropped.push(DroppedTemplate {
                    alias,
                    path,
                    error,
                }),
            }
        }

        let (generation, failures) = Generation::rebuild(&self.base, id, sources);
        dropped.extend(failures.into_iter().map(|(template, error)| DroppedTemplate {
            alias: template.alias,
            path: template.path,
            error,
        }));
        dropped.sort_by(|a, b| a.alias.cmp(&b.alias));

        for template in &dropped {
            tracing::warn!("Dropped template '{}': {}", template.alias, template.error);
        }

        let loaded: Vec<String> = generation.aliases().iter().cloned().collect();
        self.write_state().current = Arc::new(generation);

        tracing::info!(
            "Refreshed templates: {} loaded, {} dropped (generation {})",
            loaded.len(),
            dropped.len(),
            id
        );

        RefreshReport {
            generation: id,
            loaded,
            dropped,
        }
    }
}
