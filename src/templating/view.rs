//! The template registry.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tera::{Context, Value};

use super::alias::{ExtensionFilter, join_alias, normalize_alias};
use super::compiler;
use super::generation::{DEFAULT_AUTOESCAPE, Generation};
use super::helpers::Helpers;
use super::loader::{DirectoryProvider, WalkDirProvider, load_source, resolve_path};
use super::preprocess::{Preprocessor, SharedPreprocessor};
use crate::core::ViewError;

/// A concurrency-safe registry of file-backed templates.
///
/// `View` is `Send + Sync`; share it behind an `Arc` and call any method from
/// any thread. See the [module documentation](super) for the consistency
/// guarantees between renders, registration and refresh.
pub struct View {
    pub(super) state: RwLock<ViewState>,
    /// Serializes registration, hook changes and refresh
    pub(super) writer: Mutex<()>,
    /// Empty generation carrying the helpers, the starting point of every refresh
    pub(super) base: Arc<Generation>,
    pub(super) provider: Arc<dyn DirectoryProvider>,
    helpers: Helpers,
}

pub(super) struct ViewState {
    /// Alias index: everything that should be loaded
    pub(super) aliases: BTreeMap<String, PathBuf>,
    /// The compiled set renders read from
    pub(super) current: Arc<Generation>,
    pub(super) preprocessor: Option<SharedPreprocessor>,
}

/// Builder for a [`View`] with non-default settings.
///
/// # Examples
///
/// ```rust
/// use viewreg::templating::{Helpers, View, WalkDirProvider};
///
/// let view = View::builder()
///     .helpers(Helpers::new())
///     .directory_provider(WalkDirProvider::new().follow_links(true))
///     .autoescape_off()
///     .build();
/// assert!(view.aliases().is_empty());
/// ```
#[must_use]
pub struct ViewBuilder {
    helpers: Helpers,
    preprocessor: Option<SharedPreprocessor>,
    provider: Option<Arc<dyn DirectoryProvider>>,
    autoescape: Vec<&'static str>,
}

impl ViewBuilder {
    fn new() -> Self {
        Self {
            helpers: Helpers::default(),
            preprocessor: None,
            provider: None,
            autoescape: DEFAULT_AUTOESCAPE.to_vec(),
        }
    }

    /// Set the helper namespace.
    pub fn helpers(mut self, helpers: Helpers) -> Self {
        self.helpers = helpers;
        self
    }

    /// Install a preprocessor from the start.
    pub fn preprocessor(mut self, hook: impl Preprocessor + 'static) -> Self {
        self.preprocessor = Some(Arc::new(hook));
        self
    }

    /// Replace the directory listing used by [`View::add_dir`].
    pub fn directory_provider(mut self, provider: impl DirectoryProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Autoescape templates whose alias ends with one of `suffixes`.
    ///
    /// Defaults to `.html`, `.htm` and `.xml`.
    pub fn autoescape(mut self, suffixes: Vec<&'static str>) -> Self {
        self.autoescape = suffixes;
        self
    }

    /// Disable autoescaping entirely.
    pub fn autoescape_off(mut self) -> Self {
        self.autoescape.clear();
        self
    }

    /// Build the view.
    #[must_use]
    pub fn build(self) -> View {
        let base = Arc::new(Generation::base(&self.helpers, &self.autoescape));
        let provider: Arc<dyn DirectoryProvider> = match self.provider {
            Some(provider) => provider,
            None => Arc::new(WalkDirProvider::new()),
        };
        View {
            state: RwLock::new(ViewState {
                aliases: BTreeMap::new(),
                current: Arc::clone(&base),
                preprocessor: self.preprocessor,
            }),
            writer: Mutex::new(()),
            base,
            provider,
            helpers: self.helpers,
        }
    }
}

impl View {
    /// Create an empty registry bound to `helpers`.
    #[must_use]
    pub fn new(helpers: Helpers) -> Self {
        Self::builder().helpers(helpers).build()
    }

    /// Start configuring a registry.
    pub fn builder() -> ViewBuilder {
        ViewBuilder::new()
    }

    /// Register one template file under `alias`.
    ///
    /// The alias is normalized first. The file is read, preprocessed and
    /// compiled against the current templates; only when all of that succeeds
    /// is the alias recorded and the new compiled set published. Registering an
    /// alias again replaces the previous template.
    ///
    /// # Errors
    ///
    /// - `InvalidAlias` when the alias is empty after normalization
    /// - `NotFound`, `NotRegularFile`, `Io` or `Encoding` when the file cannot be loaded
    /// - `Parse` when the source does not compile
    ///
    /// On any error the registry is unchanged.
    pub fn add_template(&self, alias: &str, path: impl AsRef<Path>) -> Result<(), ViewError> {
        let normalized = normalize_alias(alias);
        if normalized.is_empty() {
            return Err(ViewError::InvalidAlias {
                alias: alias.to_string(),
            });
        }
        let path = resolve_path(path.as_ref())?;

        let _writer = self.lock_writer();
        let (hook, current) = {
            let state = self.read_state();
            (state.preprocessor.clone(), Arc::clone(&state.current))
        };

        let source = load_source(&path, hook.as_deref())?;
        let next = current.with_template(&normalized, &source, &path)?;
        let id = next.id();

        let mut state = self.write_state();
        if let Some(previous) = state.aliases.insert(normalized.clone(), path.clone()) {
            tracing::debug!(
                "Overwriting template '{}' ({} -> {})",
                normalized,
                previous.display(),
                path.display()
            );
        }
        state.current = Arc::new(next);
        drop(state);

        tracing::debug!(
            "Registered template '{}' from {} (generation {})",
            normalized,
            path.display(),
            id
        );
        Ok(())
    }

    /// Like [`add_template`](Self::add_template), panicking on error.
    ///
    /// Meant for startup code where a missing template is a programming error.
    ///
    /// # Panics
    ///
    /// With the error's message when registration fails.
    pub fn must_add_template(&self, alias: &str, path: impl AsRef<Path>) {
        if let Err(e) = self.add_template(alias, path) {
            panic!("{e}");
        }
    }

    /// Register every matching file of a directory.
    ///
    /// Each file is registered under `prefix/<path relative to dir>`, with the
    /// relative path using `/`. Only files whose extension is in `extensions`
    /// are taken (an empty list takes every file). Subdirectories are descended
    /// into when `recursive` is set; entries that are neither files nor
    /// directories are skipped.
    ///
    /// # Errors
    ///
    /// Stops at the first listing or registration error and returns it.
    /// Templates registered before the failure stay registered.
    pub fn add_dir<I, S>(
        &self,
        prefix: &str,
        dir: impl AsRef<Path>,
        extensions: I,
        recursive: bool,
    ) -> Result<(), ViewError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let filter = ExtensionFilter::new(extensions);
        let dir = resolve_path(dir.as_ref())?;
        let count = self.add_dir_filtered(prefix, &dir, &filter, recursive)?;
        tracing::debug!("Registered {} templates from {}", count, dir.display());
        Ok(())
    }

    fn add_dir_filtered(
        &self,
        prefix: &str,
        dir: &Path,
        filter: &ExtensionFilter,
        recursive: bool,
    ) -> Result<usize, ViewError> {
        let entries = self.provider.list(dir).map_err(|e| ViewError::io(dir, e))?;

        let mut count = 0;
        for entry in entries {
            let alias = join_alias(prefix, &entry.name);
            let path = dir.join(&entry.name);

            if entry.is_dir {
                if recursive {
                    count += self.add_dir_filtered(&alias, &path, filter, recursive)?;
                }
            } else if entry.is_file && filter.matches(&path) {
                self.add_template(&alias, &path)?;
                count += 1;
            } else {
                tracing::trace!("Skipping {}", path.display());
            }
        }
        Ok(count)
    }

    /// Like [`add_dir`](Self::add_dir), panicking on error.
    ///
    /// # Panics
    ///
    /// With the error's message when any registration fails.
    pub fn must_add_dir<I, S>(
        &self,
        prefix: &str,
        dir: impl AsRef<Path>,
        extensions: I,
        recursive: bool,
    ) where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Err(e) = self.add_dir(prefix, dir, extensions, recursive) {
            panic!("{e}");
        }
    }

    /// Install or replace the preprocessor.
    ///
    /// Applies to every load that starts afterwards, including the next
    /// refresh. Templates already compiled are not reprocessed.
    pub fn set_preprocessor(&self, hook: impl Preprocessor + 'static) {
        let _writer = self.lock_writer();
        self.write_state().preprocessor = Some(Arc::new(hook));
        tracing::debug!("Preprocessor installed");
    }

    /// Remove the preprocessor.
    pub fn clear_preprocessor(&self) {
        let _writer = self.lock_writer();
        self.write_state().preprocessor = None;
    }

    /// Render `alias` with `data` and return the output bytes.
    ///
    /// `data` must serialize to a map (a struct, `HashMap`, `json!({..})`) or
    /// to null, which renders with no variables.
    ///
    /// # Errors
    ///
    /// - `TemplateNotFound` when nothing is loaded under the alias
    /// - `Execution` when the data is not a map or the template fails on it
    pub fn render<T>(&self, alias: &str, data: &T) -> Result<Vec<u8>, ViewError>
    where
        T: Serialize + ?Sized,
    {
        let alias = normalize_alias(alias);
        let generation = self.snapshot();
        generation.ensure_loaded(&alias)?;
        let context = context_from(&alias, data)?;
        generation.render(&alias, &context).map(String::into_bytes)
    }

    /// Render `alias` with a prepared Tera context.
    pub fn render_context(&self, alias: &str, context: &Context) -> Result<Vec<u8>, ViewError> {
        let alias = normalize_alias(alias);
        self.snapshot().render(&alias, context).map(String::into_bytes)
    }

    /// Render `alias` straight into `out`.
    ///
    /// On error `out` may have received partial output.
    pub fn render_to<T>(&self, alias: &str, data: &T, out: impl Write) -> Result<(), ViewError>
    where
        T: Serialize + ?Sized,
    {
        let alias = normalize_alias(alias);
        let generation = self.snapshot();
        generation.ensure_loaded(&alias)?;
        let context = context_from(&alias, data)?;
        generation.render_to(&alias, &context, out)
    }

    /// Every registered alias, loaded or not.
    #[must_use]
    pub fn aliases(&self) -> BTreeSet<String> {
        self.read_state().aliases.keys().cloned().collect()
    }

    /// Absolute source path recorded for `alias`.
    #[must_use]
    pub fn source_path(&self, alias: &str) -> Option<PathBuf> {
        self.read_state().aliases.get(&normalize_alias(alias)).cloned()
    }

    /// Whether `alias` is in the current compiled set.
    #[must_use]
    pub fn is_loaded(&self, alias: &str) -> bool {
        self.read_state().current.contains(&normalize_alias(alias))
    }

    /// Aliases in the current compiled set.
    #[must_use]
    pub fn loaded_aliases(&self) -> BTreeSet<String> {
        self.read_state().current.aliases().clone()
    }

    /// Id of the current compiled set. Starts at 0 and grows on every publish.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.read_state().current.id()
    }

    /// The current compiled set.
    ///
    /// The snapshot stays valid and unchanged however the registry changes
    /// afterwards, so several renders can share one consistent view.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Generation> {
        Arc::clone(&self.read_state().current)
    }

    /// The helper namespace bound at construction.
    #[must_use]
    pub const fn helpers(&self) -> &Helpers {
        &self.helpers
    }

    pub(super) fn read_state(&self) -> RwLockReadGuard<'_, ViewState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn write_state(&self) -> RwLockWriteGuard<'_, ViewState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new(Helpers::default())
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        f.debug_struct("View")
            .field("aliases", &state.aliases)
            .field("generation", &state.current)
            .field("preprocessor", &state.preprocessor.is_some())
            .field("helpers", &self.helpers)
            .finish_non_exhaustive()
    }
}

/// Turn render data into a Tera context.
fn context_from<T>(alias: &str, data: &T) -> Result<Context, ViewError>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(data).map_err(|e| ViewError::Execution {
        alias: alias.to_string(),
        message: format!("Template data could not be serialized: {e}"),
    })?;

    match value {
        Value::Null => Ok(Context::new()),
        Value::Object(_) => {
            Context::from_value(value).map_err(|e| compiler::execution_error(&e, alias))
        }
        other => Err(ViewError::Execution {
            alias: alias.to_string(),
            message: format!("Template data must be a map or null, got {}", json_type(&other)),
        }),
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a map",
    }
}
