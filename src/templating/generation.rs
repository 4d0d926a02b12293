//! Immutable generations of compiled templates.
//!
//! A [`Generation`] is one complete, self-consistent compiled set: a Tera
//! instance carrying the helper namespace and every template loaded into it.
//! Generations are never mutated after construction. Registration derives a new
//! generation from the current one; refresh builds one from scratch on top of
//! the empty base. The registry publishes them by swapping an `Arc`, so a render
//! holding a generation keeps seeing exactly that set of templates.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use tera::{Context, Tera};

use super::alias::suggest_aliases;
use super::compiler;
use super::helpers::Helpers;
use crate::core::ViewError;

/// Tera's default autoescape suffixes.
pub(crate) const DEFAULT_AUTOESCAPE: [&str; 3] = [".html", ".htm", ".xml"];

/// One compiled set of templates.
#[derive(Clone)]
pub struct Generation {
    id: u64,
    tera: Tera,
    members: BTreeSet<String>,
}

/// A template source ready to compile during a rebuild.
#[derive(Debug, Clone)]
pub(crate) struct LoadedTemplate {
    pub(crate) alias: String,
    pub(crate) path: PathBuf,
    pub(crate) source: String,
}

impl Generation {
    /// The empty generation every registry starts from.
    pub(crate) fn base(helpers: &Helpers, autoescape: &[&'static str]) -> Self {
        let mut tera = Tera::default();
        tera.autoescape_on(autoescape.to_vec());
        helpers.register(&mut tera);
        Self {
            id: 0,
            tera,
            members: BTreeSet::new(),
        }
    }

    /// Sequence number, incremented on every publish.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Whether a template is loaded under `alias`.
    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.members.contains(alias)
    }

    /// Aliases loaded in this generation, sorted.
    #[must_use]
    pub fn aliases(&self) -> &BTreeSet<String> {
        &self.members
    }

    /// Number of loaded templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no templates are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Derive the next generation with `alias` compiled from `source`.
    ///
    /// An existing template under the same alias is replaced. On failure
    /// `self` is unchanged and no generation is produced.
    pub(crate) fn with_template(
        &self,
        alias: &str,
        source: &str,
        path: &Path,
    ) -> Result<Self, ViewError> {
        let tera = compiler::compile(&self.tera, alias, source, Some(path))?;
        let mut members = self.members.clone();
        members.insert(alias.to_string());
        Ok(Self {
            id: self.id + 1,
            tera,
            members,
        })
    }

    /// Build a complete generation from `sources` on top of `base`.
    ///
    /// All sources are first added as one batch. If the batch fails, templates
    /// are added one at a time in repeated passes until a pass makes no
    /// progress; this lets a template that extends another succeed regardless
    /// of order, while only the failing templates (and anything depending on
    /// them) are rejected. Returned failures keep the order of `sources`.
    pub(crate) fn rebuild(
        base: &Self,
        id: u64,
        sources: Vec<LoadedTemplate>,
    ) -> (Self, Vec<(LoadedTemplate, ViewError)>) {
        let mut batch = base.tera.clone();
        let pairs = sources.iter().map(|t| (t.alias.as_str(), t.source.as_str()));
        if batch.add_raw_templates(pairs).is_ok() {
            let members = sources.into_iter().map(|t| t.alias).collect();
            return (
                Self {
                    id,
                    tera: batch,
                    members,
                },
                Vec::new(),
            );
        }

        tracing::debug!("Batch compile failed, compiling {} templates individually", sources.len());

        let mut tera = base.tera.clone();
        let mut members = BTreeSet::new();
        let mut pending = sources;

        loop {
            let mut failures = Vec::new();
            let before = pending.len();

            for template in pending {
                let path = Some(template.path.as_path());
                match compiler::compile(&tera, &template.alias, &template.source, path) {
                    Ok(next) => {
                        tera = next;
                        members.insert(template.alias.clone());
                    }
                    Err(e) => failures.push((template, e)),
                }
            }

            if failures.is_empty() || failures.len() == before {
                let generation = Self {
                    id,
                    tera,
                    members,
                };
                return (generation, failures);
            }

            pending = failures.into_iter().map(|(template, _)| template).collect();
        }
    }

    /// Render `alias` against `context`.
    ///
    /// Fails with `TemplateNotFound` when the alias is not part of this
    /// generation, and with `Execution` when Tera rejects the data.
    pub fn render(&self, alias: &str, context: &Context) -> Result<String, ViewError> {
        self.ensure_loaded(alias)?;
        self.tera.render(alias, context).map_err(|e| compiler::execution_error(&e, alias))
    }

    /// Render `alias` into a writer.
    pub fn render_to(
        &self,
        alias: &str,
        context: &Context,
        write: impl Write,
    ) -> Result<(), ViewError> {
        self.ensure_loaded(alias)?;
        self.tera
            .render_to(alias, context, write)
            .map_err(|e| compiler::execution_error(&e, alias))
    }

    pub(crate) fn ensure_loaded(&self, alias: &str) -> Result<(), ViewError> {
        if self.contains(alias) {
            return Ok(());
        }
        Err(ViewError::TemplateNotFound {
            alias: alias.to_string(),
            suggestions: suggest_aliases(alias, &self.members),
        })
    }
}

impl std::fmt::Debug for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generation")
            .field("id", &self.id)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}
