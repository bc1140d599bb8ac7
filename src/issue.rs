//! Structured validation issues.
//!
//! Every failure a validator reports is an [`Issue`]: what kind of check
//! failed, what was expected and received, and where in the input it
//! happened. Issues are created once, at failure time, and never mutated
//! afterwards.
//!
//! The single-string view of a failure ([`crate::ParseError`]'s `Display`)
//! and [`flatten`] are both derived from the issue list.

use crate::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Which class of check produced an issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// Wrong primitive type, wrong container shape, wrong tuple length, no
    /// union member matched.
    Schema,
    /// Structurally valid, but a refinement predicate rejected the value.
    Validation,
    /// A coercion primitive could not convert the input.
    Transformation,
}

impl IssueKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Schema => "schema",
            IssueKind::Validation => "validation",
            IssueKind::Transformation => "transformation",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step from the root of the input to the offending sub-value.
#[derive(Clone, Debug, PartialEq)]
pub enum PathSegment {
    /// An object field or record key.
    Key(String),
    /// An array, tuple or set position.
    Index(usize),
    /// The key of a map entry.
    MapKey(Value),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "{}", index),
            PathSegment::MapKey(key) => write!(f, "{}", key),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A single validation failure.
#[derive(Clone, Debug, PartialEq)]
pub struct Issue {
    pub kind: IssueKind,
    /// The schema kind or refinement that raised the issue, e.g. `"string"`,
    /// `"min_length"` or `"coerce_number"`.
    pub type_name: String,
    /// The offending input. `None` when the value was missing.
    pub input: Option<Value>,
    pub expected: Option<String>,
    pub received: String,
    pub message: String,
    pub path: Vec<PathSegment>,
    /// Issues of the individual alternatives when a union failed as a whole.
    pub nested: Vec<Issue>,
    pub lang: Option<String>,
}

impl Issue {
    /// Renders the path as a dotted string (`a.0.b`), or `None` at the root.
    ///
    /// ```rust
    /// use schemata::{Issue, IssueKind, PathSegment};
    ///
    /// let mut issue = Issue::new(IssueKind::Schema, "number", None, Some("number".into()));
    /// issue.path = vec![PathSegment::from("a"), PathSegment::from(0), PathSegment::from("b")];
    /// assert_eq!(issue.dotted_path().as_deref(), Some("a.0.b"));
    /// ```
    #[must_use]
    pub fn dotted_path(&self) -> Option<String> {
        if self.path.is_empty() {
            return None;
        }
        Some(
            self.path
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("."),
        )
    }

    /// Builds an issue at the root with the default message.
    #[must_use]
    pub fn new(
        kind: IssueKind,
        type_name: &str,
        input: Option<&Value>,
        expected: Option<String>,
    ) -> Self {
        let received = Value::describe(input);
        let message = default_message(kind, type_name, expected.as_deref(), &received);
        Issue {
            kind,
            type_name: type_name.to_string(),
            input: input.cloned(),
            expected,
            received,
            message,
            path: Vec::new(),
            nested: Vec::new(),
            lang: None,
        }
    }
}

impl Issue {
    /// Replaces the received description and regenerates the default message.
    pub(crate) fn with_received(mut self, received: String) -> Self {
        self.message = default_message(
            self.kind,
            &self.type_name,
            self.expected.as_deref(),
            &received,
        );
        self.received = received;
        self
    }

    /// Prepends a path segment, here and in every nested issue.
    pub(crate) fn prefix(&mut self, segment: &PathSegment) {
        self.path.insert(0, segment.clone());
        for nested in &mut self.nested {
            nested.prefix(segment);
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dotted_path() {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// A custom failure message attached to a schema or refinement.
///
/// Either fixed text, or a function of the issue being reported. The
/// function form sees the issue's `lang`, which is how callers plug in their
/// own localisation.
///
/// ```rust
/// use schemata::{parse_with, string, Message, ParseOptions, Value};
///
/// let schema = string().message(Message::func(|issue| match issue.lang.as_deref() {
///     Some("de") => "Ungültiger Text".to_string(),
///     _ => "Invalid text".to_string(),
/// }));
/// let options = ParseOptions::new().with_lang("de");
/// let err = parse_with(&schema, &Value::from(1), &options).unwrap_err();
/// assert_eq!(err.issues()[0].message, "Ungültiger Text");
/// ```
#[derive(Clone)]
pub enum Message {
    Text(Arc<str>),
    Func(Arc<dyn Fn(&Issue) -> String + Send + Sync>),
}

impl Message {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Issue) -> String + Send + Sync + 'static,
    {
        Message::Func(Arc::new(f))
    }

    #[must_use]
    pub fn render(&self, issue: &Issue) -> String {
        match self {
            Message::Text(text) => text.to_string(),
            Message::Func(f) => f(issue),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Message::Func(_) => f.write_str("Func(..)"),
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(Arc::from(text))
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(Arc::from(text))
    }
}

/// The default English message for an issue.
///
/// Schema issues name the expected type (`Invalid type: Expected string but
/// received 42`); refinement and coercion issues name the check.
pub(crate) fn default_message(
    kind: IssueKind,
    type_name: &str,
    expected: Option<&str>,
    received: &str,
) -> String {
    let what = match kind {
        IssueKind::Schema => "type",
        IssueKind::Validation | IssueKind::Transformation => type_name,
    };
    match expected {
        Some(expected) => format!(
            "Invalid {}: Expected {} but received {}",
            what, expected, received
        ),
        None => format!("Invalid {}: Received {}", what, received),
    }
}

/// Messages grouped by where they occurred.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatErrors {
    /// Messages of issues raised at the root of the input.
    pub root: Vec<String>,
    /// Messages keyed by dotted path, in first-seen order.
    pub nested: IndexMap<String, Vec<String>>,
}

/// Groups issue messages by dotted path.
///
/// ```rust
/// use schemata::{flatten, number, object, parse, value};
///
/// let schema = object([("a", number())]);
/// let err = parse(&schema, &value!({ "a": "x" })).unwrap_err();
/// let flat = flatten(err.issues());
/// assert!(flat.root.is_empty());
/// assert_eq!(flat.nested["a"].len(), 1);
/// ```
#[must_use]
pub fn flatten(issues: &[Issue]) -> FlatErrors {
    let mut flat = FlatErrors::default();
    for issue in issues {
        match issue.dotted_path() {
            Some(path) => flat
                .nested
                .entry(path)
                .or_default()
                .push(issue.message.clone()),
            None => flat.root.push(issue.message.clone()),
        }
    }
    flat
}
