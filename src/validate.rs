//! The validator protocol.
//!
//! Every schema kind implements the same contract: a pure function from an
//! input (possibly missing) to an [`Outcome`]. Composite validators are built
//! purely by calling their children's validators and folding the outcomes.
//!
//! ## Outcomes
//!
//! - [`Outcome::Valid`]: the input conforms as-is. Nothing is allocated, and
//!   parents can hand the caller's own value back.
//! - [`Outcome::Coerced`]: the input conforms after conversion; carries the
//!   replacement.
//! - [`Outcome::Invalid`]: carries a [`Failure`] with one or more issues.
//!
//! Issues are created with a path relative to the validator that raised
//! them; each parent prepends its own segment while the failure bubbles up,
//! so the success path never builds paths.
//!
//! ## Custom Validators
//!
//! ```rust
//! use schemata::{parse, Context, IssueKind, Outcome, Schema, Validate, Value};
//!
//! struct Even;
//!
//! impl Validate for Even {
//!     fn validate(&self, input: Option<&Value>, ctx: &mut Context<'_>) -> Outcome {
//!         match input.and_then(Value::as_i64) {
//!             Some(n) if n % 2 == 0 => Outcome::Valid,
//!             _ => Outcome::invalid(ctx.issue(IssueKind::Schema, "even", input, Some("even integer".into()), None)),
//!         }
//!     }
//! }
//!
//! let schema = Schema::from_validator(Even);
//! assert!(parse(&schema, &Value::from(4)).is_ok());
//! assert!(parse(&schema, &Value::from(5)).is_err());
//! ```

use crate::issue::{Issue, IssueKind, Message, PathSegment};
use crate::options::ParseOptions;
use crate::Value;
use std::borrow::Cow;

/// The tri-state result of validating one value.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Valid,
    Coerced(Value),
    Invalid(Failure),
}

impl Outcome {
    /// A failure consisting of one structural issue.
    #[must_use]
    pub fn invalid(issue: Issue) -> Self {
        Outcome::Invalid(Failure::untyped(issue))
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        !matches!(self, Outcome::Invalid(_))
    }

    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        matches!(self, Outcome::Invalid(_))
    }

    /// Resolves the outcome against the input it was computed for.
    ///
    /// `Valid` borrows the input back, `Coerced` hands out the replacement.
    /// A `Valid` outcome for a missing input yields `None`.
    pub fn into_output(self, input: Option<&Value>) -> Result<Option<Cow<'_, Value>>, Failure> {
        match self {
            Outcome::Valid => Ok(input.map(Cow::Borrowed)),
            Outcome::Coerced(value) => Ok(Some(Cow::Owned(value))),
            Outcome::Invalid(failure) => Err(failure),
        }
    }
}

/// The issues of a failed validation.
///
/// `typed` records whether the value had the right structure and only
/// refinements rejected it. Unions use it to pick the closest alternative.
#[derive(Clone, Debug, PartialEq)]
pub struct Failure {
    pub issues: Vec<Issue>,
    pub typed: bool,
}

impl Failure {
    #[must_use]
    pub fn untyped(issue: Issue) -> Self {
        Failure {
            issues: vec![issue],
            typed: false,
        }
    }

    #[must_use]
    pub fn typed(issues: Vec<Issue>) -> Self {
        Failure {
            issues,
            typed: true,
        }
    }

    /// An empty accumulator for a composite whose own structure matched.
    pub(crate) fn empty() -> Self {
        Failure {
            issues: Vec::new(),
            typed: true,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Merges a child's failure, prefixing its issues with the child's position.
    pub(crate) fn absorb(&mut self, mut child: Failure, segment: Option<&PathSegment>) {
        if let Some(segment) = segment {
            for issue in &mut child.issues {
                issue.prefix(segment);
            }
        }
        self.typed &= child.typed;
        self.issues.append(&mut child.issues);
    }

    /// Adds a structural issue raised by the composite itself.
    pub(crate) fn push(&mut self, issue: Issue) {
        self.typed = false;
        self.issues.push(issue);
    }

    pub(crate) fn into_outcome(self) -> Outcome {
        Outcome::Invalid(self)
    }
}

/// Per-call validation state.
///
/// Holds the effective [`ParseOptions`] and the recursion guard for `lazy`
/// schemas. A fresh context is created for every parse call, so nothing
/// leaks between values.
#[derive(Debug)]
pub struct Context<'o> {
    options: &'o ParseOptions,
    lazy_frames: Vec<(usize, usize)>,
}

impl<'o> Context<'o> {
    #[must_use]
    pub fn new(options: &'o ParseOptions) -> Self {
        Context {
            options,
            lazy_frames: Vec::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &ParseOptions {
        self.options
    }

    #[inline]
    #[must_use]
    pub fn abort_early(&self) -> bool {
        self.options.abort_early
    }

    /// Builds an issue at the current position, applying `message` if given.
    #[must_use]
    pub fn issue(
        &self,
        kind: IssueKind,
        type_name: &str,
        input: Option<&Value>,
        expected: Option<String>,
        message: Option<&Message>,
    ) -> Issue {
        self.finish(self.draft(kind, type_name, input, expected), message)
    }

    /// An issue with the default message, for callers that still need to
    /// adjust it before [`Context::finish`].
    pub(crate) fn draft(
        &self,
        kind: IssueKind,
        type_name: &str,
        input: Option<&Value>,
        expected: Option<String>,
    ) -> Issue {
        let mut issue = Issue::new(kind, type_name, input, expected);
        issue.lang = self.options.lang.clone();
        issue
    }

    pub(crate) fn finish(&self, mut issue: Issue, message: Option<&Message>) -> Issue {
        if let Some(message) = message {
            issue.message = message.render(&issue);
        }
        issue
    }

    /// Registers a lazy frame. Returns `false` when the same lazy node is
    /// already validating the same value further up the stack, or when
    /// `limit` frames are already open on that value.
    pub(crate) fn enter_lazy(&mut self, input: Option<&Value>, node: usize, limit: usize) -> bool {
        let value = input.map_or(0, |v| v as *const Value as usize);
        let mut open = 0;
        for frame in &self.lazy_frames {
            if frame.0 == value {
                if frame.1 == node {
                    return false;
                }
                open += 1;
            }
        }
        if open >= limit {
            return false;
        }
        self.lazy_frames.push((value, node));
        true
    }

    pub(crate) fn exit_lazy(&mut self) {
        self.lazy_frames.pop();
    }
}

/// The validator contract.
///
/// Implementations must be total: any input, including a missing one, maps to
/// exactly one [`Outcome`] without panicking. They must not mutate shared
/// state, and must call each child validator at most once per position of the
/// input.
pub trait Validate: Send + Sync {
    fn validate(&self, input: Option<&Value>, ctx: &mut Context<'_>) -> Outcome;

    /// A short description of accepted values, used in union messages.
    fn expects(&self) -> Cow<'_, str> {
        Cow::Borrowed("unknown")
    }
}
