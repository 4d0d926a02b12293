//! Alias normalization and extension filtering.
//!
//! Aliases are the logical names templates are registered and rendered under.
//! They are derived from directory-relative paths, so both `/` and `\` count as
//! separators; the normalized form uses a single `/` between segments and never
//! starts or ends with one.

use std::collections::BTreeSet;
use std::path::Path;

use strsim::levenshtein;

/// Maximum allowed Levenshtein distance as a percentage of the requested alias length.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Maximum number of suggestions attached to a "template not found" error.
const MAX_SUGGESTIONS: usize = 3;

/// Normalize an alias: unify separators, collapse repeats, trim the ends.
///
/// # Examples
///
/// ```
/// use viewreg::templating::normalize_alias;
///
/// assert_eq!(normalize_alias("/emails//welcome.tmpl/"), "emails/welcome.tmpl");
/// assert_eq!(normalize_alias("partials\\nav.html"), "partials/nav.html");
/// assert_eq!(normalize_alias("///"), "");
/// ```
#[must_use]
pub fn normalize_alias(alias: &str) -> String {
    alias
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the alias of a directory entry from its parent's alias.
///
/// An empty prefix yields the bare entry name.
#[must_use]
pub fn join_alias(prefix: &str, name: &str) -> String {
    normalize_alias(&format!("{prefix}/{name}"))
}

/// Extension of a path with its leading dot, or an empty string.
///
/// This is the value handed to preprocessor hooks.
#[must_use]
pub fn dotted_extension(path: &Path) -> String {
    path.extension().map(|ext| format!(".{}", ext.to_string_lossy())).unwrap_or_default()
}

/// Set of file extensions accepted when registering a directory.
///
/// Extensions may be given with or without the leading dot. An empty filter
/// accepts every file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl ExtensionFilter {
    /// Create a filter from a list of extensions.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{ext}"))
            .collect();
        Self {
            extensions,
        }
    }

    /// A filter that accepts every file.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Whether this filter accepts every file.
    #[must_use]
    pub fn accepts_all(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Whether a file name passes the filter.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        self.accepts_all() || self.extensions.contains(&dotted_extension(path))
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExtensionFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Find registered aliases similar to `target`, closest first.
pub fn suggest_aliases<'a, I>(target: &str, known: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let limit = target.len() * SIMILARITY_THRESHOLD_PERCENT / 100;

    let mut scored: Vec<_> = known
        .into_iter()
        .map(|alias| (levenshtein(target, alias), alias))
        .filter(|(distance, _)| *distance <= limit)
        .collect();

    scored.sort();
    scored.into_iter().take(MAX_SUGGESTIONS).map(|(_, alias)| alias.clone()).collect()
}
