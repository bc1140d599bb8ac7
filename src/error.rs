//! Error types.
//!
//! Two kinds of failure leave this crate:
//!
//! - [`ParseError`]: the input did not conform to the schema. It owns the
//!   structured [`Issue`] list; its `Display` is the flattened one-line-per-issue
//!   view.
//! - [`Error`]: programmer misuse detected while building a schema, such as
//!   picking a field an object schema does not declare, or a failed
//!   conversion out of a [`Value`](crate::Value).
//!
//! ## Examples
//!
//! ```rust
//! use schemata::{parse, string, Value};
//!
//! let err = parse(&string(), &Value::from(1)).unwrap_err();
//! assert_eq!(err.issues().len(), 1);
//! assert!(err.to_string().contains("Expected string"));
//! ```

use crate::issue::Issue;
use crate::Value;
use thiserror::Error;

/// Errors raised outside the validation protocol.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// A schema operation needs an object schema.
    #[error("Expected an object schema, found {found}")]
    NotAnObject { found: String },

    /// `pick`/`omit`/`required` named a field the object schema does not declare.
    #[error("Unknown field '{key}' for object schema with fields [{known}]")]
    UnknownField { key: String, known: String },

    /// A [`Value`] could not be converted into a Rust type.
    #[error("Cannot convert {found} into {target}")]
    Conversion { target: String, found: String },
}

impl Error {
    pub(crate) fn not_an_object(found: &str) -> Self {
        Error::NotAnObject {
            found: found.to_string(),
        }
    }

    pub(crate) fn unknown_field<'a>(key: &str, known: impl Iterator<Item = &'a str>) -> Self {
        Error::UnknownField {
            key: key.to_string(),
            known: known.collect::<Vec<_>>().join(", "),
        }
    }

    /// Creates a conversion error for a value that is not of the target type.
    pub fn conversion(target: &str, found: &Value) -> Self {
        Error::Conversion {
            target: target.to_string(),
            found: Value::describe(Some(found)),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The input failed validation.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{}", render(.issues))]
pub struct ParseError {
    issues: Vec<Issue>,
}

impl ParseError {
    pub(crate) fn new(issues: Vec<Issue>) -> Self {
        ParseError { issues }
    }

    /// The issues in the order they were found. Never empty.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    #[must_use]
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    /// The first issue found.
    #[must_use]
    pub fn first(&self) -> Option<&Issue> {
        self.issues.first()
    }
}

fn render(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
