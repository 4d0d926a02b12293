//! Source preprocessing hooks.
//!
//! A [`Preprocessor`] sees every template source before it is compiled, both on
//! first registration and on every refresh, together with the file's extension
//! (leading dot included, empty when the file has none).

use std::sync::Arc;

/// Transform raw template bytes before compilation.
///
/// Implemented for any `Fn(&str, Vec<u8>) -> Vec<u8> + Send + Sync`, so a plain
/// closure works:
///
/// ```rust
/// use viewreg::templating::View;
///
/// let view = View::builder()
///     .preprocessor(|ext: &str, raw: Vec<u8>| -> Vec<u8> {
///         if ext == ".txt" {
///             String::from_utf8_lossy(&raw).replace("\r\n", "\n").into_bytes()
///         } else {
///             raw
///         }
///     })
///     .build();
/// ```
pub trait Preprocessor: Send + Sync {
    /// Return the source to compile for a file with the given extension.
    fn process(&self, extension: &str, source: Vec<u8>) -> Vec<u8>;
}

impl<F> Preprocessor for F
where
    F: Fn(&str, Vec<u8>) -> Vec<u8> + Send + Sync,
{
    fn process(&self, extension: &str, source: Vec<u8>) -> Vec<u8> {
        self(extension, source)
    }
}

/// Shared handle to a preprocessor, cloned into each load.
pub(crate) type SharedPreprocessor = Arc<dyn Preprocessor>;
