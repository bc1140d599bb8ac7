//! Configuration accepted by the parse functions.
//!
//! - [`ParseOptions`]: per-call configuration
//! - [`UnknownKeys`]: what object schemas do with keys they do not declare
//!
//! ## Examples
//!
//! ```rust
//! use schemata::{number, object, parse_with, value, ParseOptions, UnknownKeys};
//!
//! let schema = object([("x", number()), ("y", number())]);
//! let input = value!({ "x": 1, "y": 2, "z": 3 });
//!
//! let options = ParseOptions::new().with_unknown_keys(UnknownKeys::Strict);
//! assert!(parse_with(&schema, &input, &options).is_err());
//!
//! let options = ParseOptions::new().with_unknown_keys(UnknownKeys::Passthrough);
//! assert!(parse_with(&schema, &input, &options).is_ok());
//! ```

/// Handling of object keys that the schema does not declare.
///
/// An object schema built with [`Schema::strict`](crate::Schema::strict),
/// [`Schema::strip`](crate::Schema::strip) or
/// [`Schema::passthrough`](crate::Schema::passthrough) uses its own mode and
/// ignores the one in [`ParseOptions`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Unknown keys are not validated and are dropped from the output. An
    /// input without unknown keys is returned unchanged.
    #[default]
    Strip,
    /// Each unknown key is reported as a schema issue at its own path.
    Strict,
    /// Unknown keys are kept in the output untouched.
    Passthrough,
}

impl UnknownKeys {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            UnknownKeys::Strip => "strip",
            UnknownKeys::Strict => "strict",
            UnknownKeys::Passthrough => "passthrough",
        }
    }
}

/// Configuration for a parse call.
///
/// # Examples
///
/// ```rust
/// use schemata::{ParseOptions, UnknownKeys};
///
/// let options = ParseOptions::new()
///     .with_abort_early(true)
///     .with_unknown_keys(UnknownKeys::Strict)
///     .with_lang("de");
///
/// assert!(options.abort_early);
/// assert_eq!(options.lang.as_deref(), Some("de"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParseOptions {
    /// Stop at the first failure instead of collecting all of them.
    pub abort_early: bool,
    /// Default handling of undeclared object keys.
    pub unknown_keys: UnknownKeys,
    /// Locale tag copied onto every issue, for message functions to read.
    pub lang: Option<String>,
}

impl ParseOptions {
    /// Creates default options: collect all issues, strip unknown keys, no
    /// locale.
    ///
    /// ```rust
    /// use schemata::{ParseOptions, UnknownKeys};
    ///
    /// let options = ParseOptions::new();
    /// assert!(!options.abort_early);
    /// assert_eq!(options.unknown_keys, UnknownKeys::Strip);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_abort_early(mut self, abort_early: bool) -> Self {
        self.abort_early = abort_early;
        self
    }

    #[must_use]
    pub fn with_unknown_keys(mut self, unknown_keys: UnknownKeys) -> Self {
        self.unknown_keys = unknown_keys;
        self
    }

    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }
}
