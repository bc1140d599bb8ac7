//! Refinements: predicates checked after a value has the right structure.
//!
//! A refinement never changes the value. It runs on the structural output
//! (the coerced value when there is one), and its issues are `validation`
//! issues, which mark the failure as typed so unions can tell "wrong shape"
//! apart from "right shape, failed a check".
//!
//! ```rust
//! use schemata::{parse, string, IssueKind, Refinement, Value};
//!
//! let slug = string().with_refinement(
//!     Refinement::new("slug", |v| {
//!         v.as_str().map_or(false, |s| s.chars().all(|c| c.is_ascii_lowercase() || c == '-'))
//!     })
//!     .with_requirement("lowercase words joined by '-'")
//!     .with_message("not a slug"),
//! );
//!
//! let err = parse(&slug, &Value::from("Hello World")).unwrap_err();
//! assert_eq!(err.issues()[0].kind, IssueKind::Validation);
//! assert_eq!(err.issues()[0].message, "not a slug");
//! ```

use crate::issue::{Issue, IssueKind, Message};
use crate::validate::{Context, Failure, Outcome};
use crate::Value;
use std::fmt;
use std::sync::Arc;

/// A named predicate attached to a schema.
#[derive(Clone)]
pub struct Refinement {
    name: Arc<str>,
    requirement: Option<String>,
    check: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
    received: Option<fn(&Value) -> String>,
    message: Option<Message>,
}

impl Refinement {
    /// A refinement that fails whenever `check` returns `false`.
    pub fn new<F>(name: &str, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Refinement {
            name: Arc::from(name),
            requirement: None,
            check: Arc::new(check),
            received: None,
            message: None,
        }
    }

    /// Describes what the check requires; becomes the issue's `expected`.
    #[must_use]
    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirement = Some(requirement.into());
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn with_received(mut self, received: fn(&Value) -> String) -> Self {
        self.received = Some(received);
        self
    }

    fn issue(&self, value: &Value, ctx: &Context<'_>) -> Issue {
        let mut issue = ctx.draft(
            IssueKind::Validation,
            &self.name,
            Some(value),
            self.requirement.clone(),
        );
        if let Some(received) = self.received {
            issue = issue.with_received(received(value));
        }
        ctx.finish(issue, self.message.as_ref())
    }
}

impl fmt::Debug for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refinement")
            .field("name", &self.name)
            .field("requirement", &self.requirement)
            .finish_non_exhaustive()
    }
}

/// Runs `refinements` against the structural outcome.
pub(crate) fn apply(
    refinements: &[Refinement],
    input: Option<&Value>,
    outcome: Outcome,
    ctx: &mut Context<'_>,
) -> Outcome {
    let value = match (&outcome, input) {
        (Outcome::Coerced(value), _) => value,
        (Outcome::Valid, Some(value)) => value,
        _ => return outcome,
    };
    let mut issues = Vec::new();
    for refinement in refinements {
        if !(refinement.check)(value) {
            issues.push(refinement.issue(value, ctx));
            if ctx.abort_early() {
                break;
            }
        }
    }
    if issues.is_empty() {
        outcome
    } else {
        Outcome::Invalid(Failure::typed(issues))
    }
}

/// Characters of a string, elements of an array, or entries of an object.
fn size(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        _ => None,
    }
}

fn received_size(value: &Value) -> String {
    size(value).map_or_else(|| Value::describe(Some(value)), |n| n.to_string())
}

pub(crate) fn min_length(min: usize) -> Refinement {
    Refinement::new("min_length", move |v| size(v).map_or(false, |n| n >= min))
        .with_requirement(format!(">={}", min))
        .with_received(received_size)
}

pub(crate) fn max_length(max: usize) -> Refinement {
    Refinement::new("max_length", move |v| size(v).map_or(false, |n| n <= max))
        .with_requirement(format!("<={}", max))
        .with_received(received_size)
}

pub(crate) fn length(exact: usize) -> Refinement {
    Refinement::new("length", move |v| size(v) == Some(exact))
        .with_requirement(exact.to_string())
        .with_received(received_size)
}

pub(crate) fn non_empty() -> Refinement {
    Refinement::new("non_empty", |v| size(v).map_or(false, |n| n > 0))
        .with_requirement("!0")
        .with_received(received_size)
}

pub(crate) fn min_value(min: f64) -> Refinement {
    Refinement::new("min_value", move |v| v.as_f64().map_or(false, |x| x >= min))
        .with_requirement(format!(">={}", min))
}

pub(crate) fn max_value(max: f64) -> Refinement {
    Refinement::new("max_value", move |v| v.as_f64().map_or(false, |x| x <= max))
        .with_requirement(format!("<={}", max))
}

pub(crate) fn integer() -> Refinement {
    Refinement::new("integer", |v| v.as_number().map_or(false, |n| n.is_whole()))
}
