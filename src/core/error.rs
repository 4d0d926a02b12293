//! Error handling for viewreg
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`ViewError`]) returned by every library operation
//! 2. **User-friendly messages** ([`ErrorContext`]) with suggestions for CLI users
//!
//! Registration errors are returned to the caller unchanged and leave the registry
//! untouched. Refresh never returns them; it reports them per alias in a
//! [`RefreshReport`](crate::templating::RefreshReport) instead.
//!
//! # Examples
//!
//! ```rust,no_run
//! use viewreg::core::{ErrorKind, ViewError};
//! use viewreg::templating::View;
//!
//! let view = View::default();
//! match view.render("missing.tmpl", &()) {
//!     Err(e) if e.kind() == ErrorKind::TemplateNotFound => eprintln!("{e}"),
//!     Err(e) => eprintln!("render failed: {e}"),
//!     Ok(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
//! }
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for registry operations.
#[derive(Error, Debug)]
pub enum ViewError {
    /// The template path does not exist
    #[error("Template file not found: {}", path.display())]
    NotFound {
        /// Absolute path that was looked up
        path: PathBuf,
    },

    /// The path exists but is a directory or special file
    #[error("Not a regular file: {}", path.display())]
    NotRegularFile {
        /// Absolute path that was looked up
        path: PathBuf,
    },

    /// Reading the file or listing the directory failed
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// Path being read or listed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The (preprocessed) template source is not valid UTF-8
    #[error("Template source is not valid UTF-8: {}", path.display())]
    Encoding {
        /// Path of the offending template
        path: PathBuf,
        /// Underlying conversion error
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Template compilation failed
    ///
    /// `line` and `column` are 1-based and come from the parser diagnostic when
    /// it carries a location.
    #[error("Failed to parse template '{alias}': {message}")]
    Parse {
        /// Alias the template was compiled under
        alias: String,
        /// Source file, when compiled from disk
        path: Option<PathBuf>,
        /// Diagnostic from the template engine
        message: String,
        /// Line of the error, if known
        line: Option<usize>,
        /// Column of the error, if known
        column: Option<usize>,
    },

    /// Rendering failed against the supplied data
    #[error("Failed to render template '{alias}': {message}")]
    Execution {
        /// Alias being rendered
        alias: String,
        /// Diagnostic from the template engine
        message: String,
    },

    /// No template is loaded under the alias
    #[error("Template '{alias}' not found")]
    TemplateNotFound {
        /// Alias that was requested
        alias: String,
        /// Similar aliases in the current generation
        suggestions: Vec<String>,
    },

    /// The alias is empty after normalization
    #[error("Invalid template alias: '{alias}'")]
    InvalidAlias {
        /// Alias as supplied by the caller
        alias: String,
    },

    /// Configuration file problems
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },

    /// Any other failure, reported as-is
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Discriminant of [`ViewError`], for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The source path does not exist
    NotFound,
    /// The source path is a directory or special file
    NotRegularFile,
    /// Reading a file or listing a directory failed
    Io,
    /// The source is not valid UTF-8
    Encoding,
    /// The template does not compile
    Parse,
    /// Rendering failed
    Execution,
    /// No template is loaded under the alias
    TemplateNotFound,
    /// The alias is empty after normalization
    InvalidAlias,
    /// The configuration file is invalid
    Config,
    /// Any other failure
    Other,
}

impl ViewError {
    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound {
                ..
            } => ErrorKind::NotFound,
            Self::NotRegularFile {
                ..
            } => ErrorKind::NotRegularFile,
            Self::Io {
                ..
            } => ErrorKind::Io,
            Self::Encoding {
                ..
            } => ErrorKind::Encoding,
            Self::Parse {
                ..
            } => ErrorKind::Parse,
            Self::Execution {
                ..
            } => ErrorKind::Execution,
            Self::TemplateNotFound {
                ..
            } => ErrorKind::TemplateNotFound,
            Self::InvalidAlias {
                ..
            } => ErrorKind::InvalidAlias,
            Self::Config {
                ..
            } => ErrorKind::Config,
            Self::Other {
                ..
            } => ErrorKind::Other,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Error wrapper that adds user-facing details and a suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ViewError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: ViewError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: error in red, details in yellow, suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with an actionable suggestion.
///
/// [`ViewError`]s anywhere in the chain get tailored suggestions; everything
/// else is reported with its full context chain as details.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let typed = error.chain().find_map(|e| e.downcast_ref::<ViewError>()).map(clone_for_display);

    let Some(view_error) = typed else {
        let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
        let ctx = ErrorContext::new(ViewError::Other {
            message: error.to_string(),
        });
        return if causes.is_empty() {
            ctx
        } else {
            ctx.with_details(causes.join(": "))
        };
    };

    // The outermost message is anyhow context when the typed error is wrapped
    let wrapped = error.chain().next().and_then(|e| e.downcast_ref::<ViewError>()).is_none();

    let ctx = create_error_context(view_error);
    if wrapped && ctx.details.is_none() {
        ctx.with_details(error.to_string())
    } else {
        ctx
    }
}

/// `ViewError` holds non-cloneable sources; rebuild an equivalent value for display.
fn clone_for_display(error: &ViewError) -> ViewError {
    match error {
        ViewError::NotFound {
            path,
        } => ViewError::NotFound {
            path: path.clone(),
        },
        ViewError::NotRegularFile {
            path,
        } => ViewError::NotRegularFile {
            path: path.clone(),
        },
        ViewError::Io {
            path,
            source,
        } => ViewError::Io {
            path: path.clone(),
            source: std::io::Error::new(source.kind(), source.to_string()),
        },
        ViewError::Encoding {
            path,
            source,
        } => ViewError::Encoding {
            path: path.clone(),
            source: source.clone(),
        },
        ViewError::Parse {
            alias,
            path,
            message,
            line,
            column,
        } => ViewError::Parse {
            alias: alias.clone(),
            path: path.clone(),
            message: message.clone(),
            line: *line,
            column: *column,
        },
        ViewError::Execution {
            alias,
            message,
        } => ViewError::Execution {
            alias: alias.clone(),
            message: message.clone(),
        },
        ViewError::TemplateNotFound {
            alias,
            suggestions,
        } => ViewError::TemplateNotFound {
            alias: alias.clone(),
            suggestions: suggestions.clone(),
        },
        ViewError::InvalidAlias {
            alias,
        } => ViewError::InvalidAlias {
            alias: alias.clone(),
        },
        ViewError::Config {
            message,
        } => ViewError::Config {
            message: message.clone(),
        },
        ViewError::Other {
            message,
        } => ViewError::Other {
            message: message.clone(),
        },
    }
}

fn create_error_context(error: ViewError) -> ErrorContext {
    match &error {
        ViewError::NotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that the template path exists and is spelled correctly"),
        ViewError::NotRegularFile {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Register directories with a directory entry (or --dir), not as a single template",
        ),
        ViewError::Io {
            source,
            ..
        } if source.kind() == std::io::ErrorKind::PermissionDenied => ErrorContext::new(error)
            .with_suggestion("Check file permissions on the template and its parent directories"),
        ViewError::Io {
            ..
        } => ErrorContext::new(error),
        ViewError::Encoding {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Save the template as UTF-8 or convert it in a preprocessor hook"),
        ViewError::Parse {
            path,
            line,
            column,
            ..
        } => {
            let mut details = String::new();
            if let Some(path) = path {
                details.push_str(&format!("File: {}", path.display()));
            }
            if let Some(line) = line {
                if !details.is_empty() {
                    details.push_str(", ");
                }
                details.push_str(&format!("line {line}"));
                if let Some(column) = column {
                    details.push_str(&format!(", column {column}"));
                }
            }
            let ctx = ErrorContext::new(error).with_suggestion(
                "Check template syntax for unclosed {{ }} or {% %} delimiters and unknown filters",
            );
            if details.is_empty() {
                ctx
            } else {
                ctx.with_details(details)
            }
        }
        ViewError::Execution {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that the data supplies every variable the template uses"),
        ViewError::TemplateNotFound {
            suggestions,
            ..
        } => {
            if suggestions.is_empty() {
                ErrorContext::new(error)
                    .with_suggestion("Run 'viewreg list' to see the registered aliases")
            } else {
                let hint = format!("Did you mean: {}?", suggestions.join(", "));
                ErrorContext::new(error).with_suggestion(hint)
            }
        }
        ViewError::InvalidAlias {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Aliases must contain at least one non-separator character"),
        ViewError::Config {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Check viewreg.toml: paths, [[directories]] entries and [templates] aliases",
        ),
        ViewError::Other {
            ..
        } => ErrorContext::new(error),
    }
}
