//! # schemata
//!
//! Runtime schema validation for dynamically-typed data.
//!
//! Schemas are immutable values composed from small constructors. Parsing a
//! [`Value`] against a schema either returns the value (unchanged, or with
//! coercions and defaults applied) or a [`ParseError`] listing every issue
//! with the path at which it occurred.
//!
//! ## Key Features
//!
//! - **Composable**: objects, arrays, tuples, records, maps, sets, unions,
//!   intersections, and wrappers such as `optional`, `nullable`, `default`
//!   and `lazy` or `recursive` for recursive shapes
//! - **Zero-copy on success**: a value that needs no coercion is handed back
//!   by reference, never cloned
//! - **Structured issues**: every failure carries its kind, expected and
//!   received descriptions, message and path
//! - **Compiled objects**: object schemas with several fields are compiled
//!   into a plan on first use, with identical results to the generic path
//! - **Thread safe**: schemas are `Send + Sync` and can be shared freely
//!
//! ## Quick Start
//!
//! ```rust
//! use schemata::{array, number, object, optional, parse, string, value};
//!
//! let user = object([
//!     ("name", string().min_length(1)),
//!     ("age", optional(number().integer())),
//!     ("tags", array(string())),
//! ]);
//!
//! let input = value!({ "name": "Ada", "tags": ["admin"] });
//! let output = parse(&user, &input).unwrap();
//! assert_eq!(*output, input);
//!
//! let err = parse(&user, &value!({ "name": "", "tags": [1] })).unwrap_err();
//! let paths: Vec<_> = err.issues().iter().map(|i| i.dotted_path()).collect();
//! assert_eq!(paths, vec![Some("name".to_string()), Some("tags.0".to_string())]);
//! ```
//!
//! ### Coercion
//!
//! ```rust
//! use schemata::{coerce_number, object, parse, value};
//!
//! let query = object([("page", coerce_number())]);
//! let input = value!({ "page": "3" });
//! let output = parse(&query, &input).unwrap();
//! assert_eq!(*output, value!({ "page": 3 }));
//! ```
//!
//! ### Options
//!
//! ```rust
//! use schemata::{number, object, parse_with, value, ParseOptions};
//!
//! let schema = object([("a", number()), ("b", number())]);
//! let input = value!({ "a": "x", "b": "y" });
//!
//! let all = parse_with(&schema, &input, &ParseOptions::default()).unwrap_err();
//! assert_eq!(all.issues().len(), 2);
//!
//! let first = parse_with(&schema, &input, &ParseOptions::new().with_abort_early(true)).unwrap_err();
//! assert_eq!(first.issues().len(), 1);
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events at `debug` and `trace` level when
//! object plans are compiled and lazy schemas are resolved. Install any
//! `tracing` subscriber to see them.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Objects, coercion and error reporting
//! - **`recursive.rs`** - Self-referential schemas with `lazy` and `recursive`
//!
//! Run any of them with: `cargo run --example <name>`

pub mod error;
pub mod issue;
pub mod macros;
pub mod map;
pub mod options;
pub mod refine;
pub mod schema;
pub mod transform;
pub mod validate;
pub mod value;

mod compose;
mod primitives;
mod specialize;
mod wrappers;

pub use error::{Error, ParseError, Result};
pub use issue::{flatten, FlatErrors, Issue, IssueKind, Message, PathSegment};
pub use map::ValueMap;
pub use options::{ParseOptions, UnknownKeys};
pub use refine::Refinement;
pub use schema::{
    any, array, bigint, boolean, coerce_bigint, coerce_boolean, coerce_date, coerce_number,
    coerce_string, custom, date, intersection, lazy, literal, map, nullable, nullish, null,
    number, object, object_with_rest, optional, picklist, readonly, record, recursive, set,
    string, tuple, tuple_with_rest, union, with_default, Schema,
};
pub use transform::{extend, keyof, omit, partial, pick, required};
pub use validate::{Context, Failure, Outcome, Validate};
pub use value::{Number, Value};

use std::borrow::Cow;

/// The result of parsing one value: the validated value, borrowed when it
/// needed no changes.
pub type ParseResult<'a> = std::result::Result<Cow<'a, Value>, ParseError>;

/// Validates `value` against `schema` with default options.
///
/// # Examples
///
/// ```rust
/// use schemata::{parse, string, Value};
/// use std::borrow::Cow;
///
/// let value = Value::from("hello");
/// match parse(&string(), &value) {
///     Ok(Cow::Borrowed(v)) => assert!(std::ptr::eq(v, &value)),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
///
/// # Errors
///
/// Returns a [`ParseError`] with every issue found.
pub fn parse<'a>(schema: &Schema, value: &'a Value) -> ParseResult<'a> {
    parse_with(schema, value, &ParseOptions::default())
}

/// Validates `value` against `schema` with explicit options.
///
/// # Errors
///
/// Returns a [`ParseError`] with the issues found; only the first one when
/// `abort_early` is set.
pub fn parse_with<'a>(schema: &Schema, value: &'a Value, options: &ParseOptions) -> ParseResult<'a> {
    let mut ctx = Context::new(options);
    match schema.run(Some(value), &mut ctx) {
        Outcome::Valid => Ok(Cow::Borrowed(value)),
        Outcome::Coerced(output) => Ok(Cow::Owned(output)),
        Outcome::Invalid(failure) => Err(ParseError::new(failure.issues)),
    }
}

/// Validates each value independently with default options.
///
/// A failing value never affects the others.
///
/// ```rust
/// use schemata::{number, parse_bulk, Value};
///
/// let values = [Value::from(1), Value::from("two"), Value::from(3)];
/// let results = parse_bulk(&number(), &values);
/// assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
/// ```
#[must_use]
pub fn parse_bulk<'a>(schema: &Schema, values: &'a [Value]) -> Vec<ParseResult<'a>> {
    parse_bulk_with(schema, values, &ParseOptions::default())
}

/// Validates each value independently with explicit options.
#[must_use]
pub fn parse_bulk_with<'a>(
    schema: &Schema,
    values: &'a [Value],
    options: &ParseOptions,
) -> Vec<ParseResult<'a>> {
    values
        .iter()
        .map(|value| parse_with(schema, value, options))
        .collect()
}

/// Whether `value` satisfies `schema`. Stops at the first issue.
#[must_use]
pub fn is(schema: &Schema, value: &Value) -> bool {
    let options = ParseOptions::new().with_abort_early(true);
    schema.run(Some(value), &mut Context::new(&options)).is_valid()
}
