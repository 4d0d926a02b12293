//! Tera integration: compiling sources and translating engine diagnostics.
//!
//! Tera reports parse failures as a short outer message ("Failed to parse 'x'")
//! with the pest diagnostic as its source, and render failures as a chain of
//! "while rendering" messages. Both are flattened into a single readable message
//! here; parse errors additionally keep the `line:column` location.

use std::error::Error as _;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tera::Tera;

use crate::core::ViewError;

/// Matches the `--> 3:15` location marker of pest diagnostics.
static LOCATION_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"-->\s*(\d+):(\d+)").ok());

/// Compile `source` into a copy of `tera` under `alias`.
///
/// The input instance is never modified: Tera inserts a template before it
/// validates inheritance, so a failed add would leave it half-updated.
pub(crate) fn compile(
    tera: &Tera,
    alias: &str,
    source: &str,
    path: Option<&Path>,
) -> Result<Tera, ViewError> {
    let mut candidate = tera.clone();
    candidate
        .add_raw_template(alias, source)
        .map_err(|e| parse_error(&e, alias, path))?;
    Ok(candidate)
}

/// Build a [`ViewError::Parse`] from a Tera compilation error.
pub(crate) fn parse_error(error: &tera::Error, alias: &str, path: Option<&Path>) -> ViewError {
    let (line, column) = extract_location(error).unzip();
    ViewError::Parse {
        alias: alias.to_string(),
        path: path.map(Path::to_path_buf),
        message: format_tera_error(error, alias),
        line,
        column,
    }
}

/// Build a [`ViewError::Execution`] from a Tera render error.
pub(crate) fn execution_error(error: &tera::Error, alias: &str) -> ViewError {
    ViewError::Execution {
        alias: alias.to_string(),
        message: format_tera_error(error, alias),
    }
}

/// Flatten the error chain into one message.
///
/// The outer "Failed to parse/render <alias>" wrappers repeat what the
/// [`ViewError`] variant already says, so they are dropped when a more
/// specific cause follows.
pub(crate) fn format_tera_error(error: &tera::Error, alias: &str) -> String {
    let mut messages = vec![error.to_string()];
    let mut current = error.source();
    while let Some(err) = current {
        messages.push(err.to_string());
        current = err.source();
    }

    let is_wrapper = |msg: &str| {
        (msg.starts_with("Failed to parse") || msg.starts_with("Failed to render"))
            && msg.contains(alias)
    };

    let useful: Vec<&str> = messages
        .iter()
        .map(|msg| msg.trim())
        .filter(|msg| !msg.is_empty() && !is_wrapper(msg))
        .collect();

    if useful.is_empty() {
        messages.join(": ")
    } else {
        useful.join("\n  → ")
    }
}

/// Extract the 1-based `(line, column)` of a parse error, if Tera reported one.
fn extract_location(error: &tera::Error) -> Option<(usize, usize)> {
    let re = LOCATION_RE.as_ref()?;

    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = current {
        let text = err.to_string();
        if let Some(caps) = re.captures(&text) {
            let line = caps.get(1)?.as_str().parse().ok()?;
            let column = caps.get(2)?.as_str().parse().ok()?;
            return Some((line, column));
        }
        current = err.source();
    }
    None
}
