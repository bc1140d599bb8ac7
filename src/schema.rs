//! Schemas and their constructors.
//!
//! A [`Schema`] is an immutable description of an expected shape. It is a
//! cheap handle (`Arc`) around a node holding the schema kind, the kind's
//! children, an optional custom message and an ordered list of refinements.
//! Children are shared, so the same sub-schema can appear in any number of
//! parents, and a schema can be validated from many threads at once.
//!
//! ## Building Schemas
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
//! assert!(parse(&user, &value!({ "name": "Ada", "tags": ["x"] })).is_ok());
//! assert!(parse(&user, &value!({ "name": "", "tags": [] })).is_err());
//! ```

use crate::compose::{self, ObjectShape};
use crate::issue::Message;
use crate::options::UnknownKeys;
use crate::primitives::{self, Primitive};
use crate::refine::{self, Refinement};
use crate::validate::{Context, Outcome, Validate};
use crate::wrappers::{self, LazyShape};
use crate::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// An immutable, shareable validation schema.
#[derive(Clone)]
pub struct Schema(Arc<Node>);

pub(crate) struct Node {
    pub(crate) kind: Kind,
    pub(crate) message: Option<Message>,
    pub(crate) refinements: Vec<Refinement>,
}

#[derive(Clone)]
pub(crate) enum Kind {
    Primitive(Primitive),
    Coerce(Primitive),
    Literal(Value),
    Picklist(Vec<Value>),
    Object(ObjectShape),
    Array(Schema),
    Tuple {
        items: Vec<Schema>,
        rest: Option<Schema>,
    },
    Record {
        key: Schema,
        value: Schema,
    },
    Map {
        key: Schema,
        value: Schema,
    },
    Set(Schema),
    Union(Vec<Schema>),
    Intersection(Vec<Schema>),
    Optional(Schema),
    Nullable(Schema),
    Nullish(Schema),
    Default {
        inner: Schema,
        fallback: Value,
    },
    Readonly(Schema),
    Lazy(LazyShape),
    Custom(Arc<dyn Validate>),
}

impl Kind {
    pub(crate) const fn name(&self) -> &'static str {
        match self {
            Kind::Primitive(p) => p.name(),
            Kind::Coerce(p) => p.coerce_name(),
            Kind::Literal(_) => "literal",
            Kind::Picklist(_) => "picklist",
            Kind::Object(_) => "object",
            Kind::Array(_) => "array",
            Kind::Tuple { .. } => "tuple",
            Kind::Record { .. } => "record",
            Kind::Map { .. } => "map",
            Kind::Set(_) => "set",
            Kind::Union(_) => "union",
            Kind::Intersection(_) => "intersection",
            Kind::Optional(_) => "optional",
            Kind::Nullable(_) => "nullable",
            Kind::Nullish(_) => "nullish",
            Kind::Default { .. } => "default",
            Kind::Readonly(_) => "readonly",
            Kind::Lazy(_) => "lazy",
            Kind::Custom(_) => "custom",
        }
    }
}

impl Schema {
    pub(crate) fn from_kind(kind: Kind) -> Self {
        Schema(Arc::new(Node {
            kind,
            message: None,
            refinements: Vec::new(),
        }))
    }

    /// Wraps a user-defined validator.
    pub fn from_validator<V>(validator: V) -> Self
    where
        V: Validate + 'static,
    {
        Schema::from_kind(Kind::Custom(Arc::new(validator)))
    }

    pub(crate) fn node(&self) -> &Node {
        &self.0
    }

    pub(crate) fn kind(&self) -> &Kind {
        &self.0.kind
    }

    pub(crate) fn downgrade(&self) -> Weak<Node> {
        Arc::downgrade(&self.0)
    }

    pub(crate) fn upgrade(node: &Weak<Node>) -> Option<Schema> {
        node.upgrade().map(Schema)
    }

    /// The kind tag, e.g. `"object"` or `"coerce_number"`.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.0.kind.name()
    }

    /// Whether two handles refer to the same schema node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Whether this schema has neither a custom message nor refinements.
    pub(crate) fn is_bare(&self) -> bool {
        self.0.message.is_none() && self.0.refinements.is_empty()
    }

    /// Declared field names for object schemas, in declaration order.
    #[must_use]
    pub fn field_names(&self) -> Option<Vec<&str>> {
        match &self.0.kind {
            Kind::Object(shape) => Some(shape.fields.keys().map(String::as_str).collect()),
            _ => None,
        }
    }

    /// Whether this is an object schema whose validation runs through a
    /// compiled plan (when the call does not request `abort_early`).
    ///
    /// ```rust
    /// use schemata::{lazy, number, object, string, Schema};
    ///
    /// assert!(object([("a", number()), ("b", string())]).is_specialized());
    /// assert!(!object([("a", number())]).is_specialized());
    ///
    /// fn node() -> Schema { object([("v", number()), ("next", lazy(node))]) }
    /// assert!(!node().is_specialized());
    /// ```
    #[must_use]
    pub fn is_specialized(&self) -> bool {
        match &self.0.kind {
            Kind::Object(shape) => shape.plan().is_some(),
            _ => false,
        }
    }

    fn rebuild(&self, update: impl FnOnce(&mut Node)) -> Schema {
        let mut node = Node {
            kind: self.0.kind.clone(),
            message: self.0.message.clone(),
            refinements: self.0.refinements.clone(),
        };
        update(&mut node);
        Schema(Arc::new(node))
    }

    /// Replaces the default message of this schema's own structural issues.
    ///
    /// Issues raised by children keep their own messages.
    #[must_use]
    pub fn message(&self, message: impl Into<Message>) -> Schema {
        let message = message.into();
        self.rebuild(|node| node.message = Some(message))
    }

    /// Appends a refinement, evaluated after structural validation succeeds.
    #[must_use]
    pub fn with_refinement(&self, refinement: Refinement) -> Schema {
        self.rebuild(|node| node.refinements.push(refinement))
    }

    /// Appends a named predicate.
    ///
    /// ```rust
    /// use schemata::{number, parse, Value};
    ///
    /// let even = number().refine("even", |v| v.as_i64().map_or(false, |n| n % 2 == 0));
    /// assert!(parse(&even, &Value::from(4)).is_ok());
    /// assert_eq!(parse(&even, &Value::from(3)).unwrap_err().issues()[0].type_name, "even");
    /// ```
    #[must_use]
    pub fn refine<F>(&self, name: &str, predicate: F) -> Schema
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.with_refinement(Refinement::new(name, predicate))
    }

    #[must_use]
    pub fn min_length(&self, min: usize) -> Schema {
        self.with_refinement(refine::min_length(min))
    }

    #[must_use]
    pub fn max_length(&self, max: usize) -> Schema {
        self.with_refinement(refine::max_length(max))
    }

    #[must_use]
    pub fn length(&self, exact: usize) -> Schema {
        self.with_refinement(refine::length(exact))
    }

    #[must_use]
    pub fn non_empty(&self) -> Schema {
        self.with_refinement(refine::non_empty())
    }

    #[must_use]
    pub fn min_value(&self, min: f64) -> Schema {
        self.with_refinement(refine::min_value(min))
    }

    #[must_use]
    pub fn max_value(&self, max: f64) -> Schema {
        self.with_refinement(refine::max_value(max))
    }

    #[must_use]
    pub fn integer(&self) -> Schema {
        self.with_refinement(refine::integer())
    }

    /// Object schemas only: report undeclared keys as issues.
    #[must_use]
    pub fn strict(&self) -> Schema {
        self.with_unknown_keys(UnknownKeys::Strict)
    }

    /// Object schemas only: drop undeclared keys from the output.
    #[must_use]
    pub fn strip(&self) -> Schema {
        self.with_unknown_keys(UnknownKeys::Strip)
    }

    /// Object schemas only: keep undeclared keys untouched.
    #[must_use]
    pub fn passthrough(&self) -> Schema {
        self.with_unknown_keys(UnknownKeys::Passthrough)
    }

    /// Fixes the unknown-key mode of an object schema. Other schemas are
    /// returned unchanged.
    #[must_use]
    pub fn with_unknown_keys(&self, mode: UnknownKeys) -> Schema {
        match &self.0.kind {
            Kind::Object(shape) => {
                let shape = shape.with_unknown_keys(mode);
                self.rebuild(|node| node.kind = Kind::Object(shape))
            }
            _ => self.clone(),
        }
    }

    /// Runs this schema's validator: structure first, then refinements.
    pub(crate) fn run(&self, input: Option<&Value>, ctx: &mut Context<'_>) -> Outcome {
        let node = &*self.0;
        let message = node.message.as_ref();
        let outcome = match &node.kind {
            Kind::Primitive(p) => primitives::check(*p, message, input, ctx),
            Kind::Coerce(p) => primitives::coerce(*p, message, input, ctx),
            Kind::Literal(expected) => compose::literal(expected, message, input, ctx),
            Kind::Picklist(options) => compose::picklist(options, message, input, ctx),
            Kind::Object(shape) => shape.validate(message, input, ctx),
            Kind::Array(item) => compose::array(item, message, input, ctx),
            Kind::Tuple { items, rest } => {
                compose::tuple(items, rest.as_ref(), message, input, ctx)
            }
            Kind::Record { key, value } => compose::record(key, value, message, input, ctx),
            Kind::Map { key, value } => compose::map(key, value, message, input, ctx),
            Kind::Set(item) => compose::set(item, message, input, ctx),
            Kind::Union(options) => compose::union(options, message, input, ctx),
            Kind::Intersection(members) => compose::intersection(members, message, input, ctx),
            Kind::Optional(inner) => wrappers::optional(inner, input, ctx),
            Kind::Nullable(inner) => wrappers::nullable(inner, input, ctx),
            Kind::Nullish(inner) => wrappers::nullish(inner, input, ctx),
            Kind::Default { inner, fallback } => wrappers::default(inner, fallback, input, ctx),
            Kind::Readonly(inner) => inner.run(input, ctx),
            Kind::Lazy(shape) => shape.validate(message, input, ctx),
            Kind::Custom(validator) => validator.validate(input, ctx),
        };
        if node.refinements.is_empty() {
            outcome
        } else {
            refine::apply(&node.refinements, input, outcome, ctx)
        }
    }

    /// Describes the accepted values, e.g. `string | null`.
    #[must_use]
    pub fn expects(&self) -> String {
        match &self.0.kind {
            Kind::Primitive(p) | Kind::Coerce(p) => p.expects().to_string(),
            Kind::Literal(value) => Value::describe(Some(value)),
            Kind::Picklist(options) => join(options.iter().map(|v| Value::describe(Some(v))), " | "),
            Kind::Object(_) | Kind::Record { .. } => "Object".to_string(),
            Kind::Array(_) | Kind::Tuple { .. } | Kind::Map { .. } | Kind::Set(_) => {
                "Array".to_string()
            }
            Kind::Union(options) => join(options.iter().map(Schema::expects), " | "),
            Kind::Intersection(members) => join(members.iter().map(Schema::expects), " & "),
            Kind::Optional(inner) => format!("{} | undefined", inner.expects()),
            Kind::Nullable(inner) => format!("{} | null", inner.expects()),
            Kind::Nullish(inner) => format!("{} | null | undefined", inner.expects()),
            Kind::Default { inner, .. } | Kind::Readonly(inner) => inner.expects(),
            // Resolving here could recurse without bound on self-referential schemas.
            Kind::Lazy(_) => "unknown".to_string(),
            Kind::Custom(validator) => validator.expects().into_owned(),
        }
    }
}

fn join(parts: impl Iterator<Item = String>, separator: &str) -> String {
    parts.collect::<Vec<_>>().join(separator)
}

impl Validate for Schema {
    fn validate(&self, input: Option<&Value>, ctx: &mut Context<'_>) -> Outcome {
        self.run(input, ctx)
    }

    fn expects(&self) -> Cow<'_, str> {
        Cow::Owned(Schema::expects(self))
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Schema");
        debug.field("kind", &self.kind_name());
        if let Kind::Object(shape) = &self.0.kind {
            debug.field("fields", &shape.fields.keys().collect::<Vec<_>>());
        }
        if let Some(message) = &self.0.message {
            debug.field("message", message);
        }
        if !self.0.refinements.is_empty() {
            debug.field(
                "refinements",
                &self
                    .0
                    .refinements
                    .iter()
                    .map(Refinement::name)
                    .collect::<Vec<_>>(),
            );
        }
        debug.finish()
    }
}

/// Accepts any value, including a missing one.
#[must_use]
pub fn any() -> Schema {
    Schema::from_kind(Kind::Primitive(Primitive::Any))
}

#[must_use]
pub fn null() -> Schema {
    Schema::from_kind(Kind::Primitive(Primitive::Null))
}

#[must_use]
pub fn boolean() -> Schema {
    Schema::from_kind(Kind::Primitive(Primitive::Boolean))
}

/// Accepts any number except NaN.
#[must_use]
pub fn number() -> Schema {
    Schema::from_kind(Kind::Primitive(Primitive::Number))
}

#[must_use]
pub fn string() -> Schema {
    Schema::from_kind(Kind::Primitive(Primitive::String))
}

#[must_use]
pub fn date() -> Schema {
    Schema::from_kind(Kind::Primitive(Primitive::Date))
}

#[must_use]
pub fn bigint() -> Schema {
    Schema::from_kind(Kind::Primitive(Primitive::BigInt))
}

#[must_use]
pub fn coerce_string() -> Schema {
    Schema::from_kind(Kind::Coerce(Primitive::String))
}

/// Numeric strings, booleans, in-range bigints and dates become numbers.
///
/// ```rust
/// use schemata::{coerce_number, parse, Value};
///
/// let schema = coerce_number();
/// let input = Value::from("12");
/// let out = parse(&schema, &input).unwrap();
/// assert_eq!(*out, Value::from(12));
/// assert!(parse(&coerce_number(), &Value::from("twelve")).is_err());
/// ```
#[must_use]
pub fn coerce_number() -> Schema {
    Schema::from_kind(Kind::Coerce(Primitive::Number))
}

#[must_use]
pub fn coerce_boolean() -> Schema {
    Schema::from_kind(Kind::Coerce(Primitive::Boolean))
}

#[must_use]
pub fn coerce_date() -> Schema {
    Schema::from_kind(Kind::Coerce(Primitive::Date))
}

#[must_use]
pub fn coerce_bigint() -> Schema {
    Schema::from_kind(Kind::Coerce(Primitive::BigInt))
}

/// Accepts exactly one value.
#[must_use]
pub fn literal(value: impl Into<Value>) -> Schema {
    Schema::from_kind(Kind::Literal(value.into()))
}

/// Accepts any of the listed values.
#[must_use]
pub fn picklist<I, V>(options: I) -> Schema
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Schema::from_kind(Kind::Picklist(options.into_iter().map(Into::into).collect()))
}

/// An object with a fixed set of fields, validated in declaration order.
///
/// Undeclared keys follow [`ParseOptions::unknown_keys`](crate::ParseOptions)
/// unless the schema fixes a mode with [`Schema::strict`],
/// [`Schema::strip`] or [`Schema::passthrough`].
#[must_use]
pub fn object<I, K>(fields: I) -> Schema
where
    I: IntoIterator<Item = (K, Schema)>,
    K: Into<String>,
{
    Schema::from_kind(Kind::Object(ObjectShape::new(
        fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        None,
        None,
    )))
}

/// An object whose undeclared keys are validated against `rest`.
#[must_use]
pub fn object_with_rest<I, K>(fields: I, rest: Schema) -> Schema
where
    I: IntoIterator<Item = (K, Schema)>,
    K: Into<String>,
{
    Schema::from_kind(Kind::Object(ObjectShape::new(
        fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        None,
        Some(rest),
    )))
}

#[must_use]
pub fn array(item: Schema) -> Schema {
    Schema::from_kind(Kind::Array(item))
}

/// A fixed-length array with one schema per position.
#[must_use]
pub fn tuple(items: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::from_kind(Kind::Tuple {
        items: items.into_iter().collect(),
        rest: None,
    })
}

/// A tuple whose positions past the fixed items are validated against `rest`.
#[must_use]
pub fn tuple_with_rest(items: impl IntoIterator<Item = Schema>, rest: Schema) -> Schema {
    Schema::from_kind(Kind::Tuple {
        items: items.into_iter().collect(),
        rest: Some(rest),
    })
}

/// An object used as a dictionary. Keys are validated as strings.
#[must_use]
pub fn record(key: Schema, value: Schema) -> Schema {
    Schema::from_kind(Kind::Record { key, value })
}

/// An array of `[key, value]` entries.
#[must_use]
pub fn map(key: Schema, value: Schema) -> Schema {
    Schema::from_kind(Kind::Map { key, value })
}

/// An array of unique elements.
///
/// Uniqueness is checked after element validation, on the output values, by
/// comparing each element with every earlier one, so the cost grows with the
/// square of the length. An integer and a float with the same value count
/// as duplicates. Inside nested arrays and objects, numbers compare by
/// representation, so `[1]` and `[1.0]` are distinct.
///
/// ```rust
/// use schemata::{number, parse, set, value, Value};
///
/// assert!(parse(&set(number()), &value!([1, 2])).is_ok());
/// assert!(parse(&set(number()), &Value::Array(vec![Value::from(1), Value::from(1.0)])).is_err());
/// ```
#[must_use]
pub fn set(item: Schema) -> Schema {
    Schema::from_kind(Kind::Set(item))
}

/// The first matching option wins.
#[must_use]
pub fn union(options: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::from_kind(Kind::Union(options.into_iter().collect()))
}

/// All members must match; coerced outputs are deep-merged.
#[must_use]
pub fn intersection(members: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::from_kind(Kind::Intersection(members.into_iter().collect()))
}

/// A missing value is valid.
#[must_use]
pub fn optional(inner: Schema) -> Schema {
    Schema::from_kind(Kind::Optional(inner))
}

/// `null` is valid.
#[must_use]
pub fn nullable(inner: Schema) -> Schema {
    Schema::from_kind(Kind::Nullable(inner))
}

/// A missing value or `null` is valid.
#[must_use]
pub fn nullish(inner: Schema) -> Schema {
    Schema::from_kind(Kind::Nullish(inner))
}

/// A missing value is replaced by `fallback`, which must itself satisfy `inner`.
///
/// ```rust
/// use schemata::{number, object, parse, value, with_default};
///
/// let schema = object([("page", with_default(number(), 1))]);
/// let input = value!({});
/// let out = parse(&schema, &input).unwrap();
/// assert_eq!(*out, value!({ "page": 1 }));
/// ```
#[must_use]
pub fn with_default(inner: Schema, fallback: impl Into<Value>) -> Schema {
    Schema::from_kind(Kind::Default {
        inner,
        fallback: fallback.into(),
    })
}

/// Validates exactly like `inner`; marks the output as not to be modified.
#[must_use]
pub fn readonly(inner: Schema) -> Schema {
    Schema::from_kind(Kind::Readonly(inner))
}

/// Defers building the child schema until it is first needed, which allows
/// self-referential schemas.
///
/// The resolver is called at most once per `lazy` schema and must not call
/// itself eagerly. A resolver that captures nothing, such as a plain `fn`,
/// is resolved once for the whole process and every `lazy` node built from
/// it shares that schema, so validating deep input does not grow the graph.
/// Re-entering the same `lazy` node for the same value (a schema that would
/// loop without consuming input) is reported as an issue.
///
/// ```rust
/// use schemata::{array, lazy, number, object, parse, value, Schema};
///
/// fn tree() -> Schema {
///     object([("value", number()), ("children", array(lazy(tree)))])
/// }
///
/// let input = value!({ "value": 1, "children": [{ "value": 2, "children": [] }] });
/// assert!(parse(&tree(), &input).is_ok());
/// ```
#[must_use]
pub fn lazy<F>(resolver: F) -> Schema
where
    F: Fn() -> Schema + Send + Sync + 'static,
{
    Schema::from_kind(Kind::Lazy(LazyShape::new(resolver)))
}

/// Builds a self-referential schema in one step.
///
/// `build` receives a handle that stands for the finished schema. The
/// handle holds only a weak reference, so the graph has no `Arc` cycle and
/// is freed with the returned schema. Nothing is resolved at validation
/// time. The returned schema is a `lazy` node around the body, so object
/// transforms do not apply to it.
///
/// ```rust
/// use schemata::{array, number, object, parse, recursive, value};
///
/// let tree = recursive(|tree| object([("value", number()), ("children", array(tree))]));
///
/// let input = value!({ "value": 1, "children": [{ "value": 2, "children": [] }] });
/// assert!(parse(&tree, &input).is_ok());
/// ```
#[must_use]
pub fn recursive<F>(build: F) -> Schema
where
    F: FnOnce(Schema) -> Schema,
{
    let knot = Arc::new(OnceLock::new());
    let this = Schema::from_kind(Kind::Lazy(LazyShape::knot(Arc::clone(&knot))));
    let body = build(this);
    // Fresh cell, so this set cannot fail.
    let _ = knot.set(body.downgrade());
    Schema::from_kind(Kind::Lazy(LazyShape::root(body)))
}

/// A schema defined by a predicate over present values.
///
/// `expects` names the accepted values in issue messages.
#[must_use]
pub fn custom<F>(expects: &str, predicate: F) -> Schema
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Schema::from_validator(Predicate {
        expects: expects.to_string(),
        predicate: Box::new(predicate),
    })
}

struct Predicate {
    expects: String,
    predicate: Box<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl Validate for Predicate {
    fn validate(&self, input: Option<&Value>, ctx: &mut Context<'_>) -> Outcome {
        match input {
            Some(value) if (self.predicate)(value) => Outcome::Valid,
            _ => Outcome::invalid(ctx.issue(
                crate::IssueKind::Schema,
                "custom",
                input,
                Some(self.expects.clone()),
                None,
            )),
        }
    }

    fn expects(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.expects)
    }
}

/// Shorthand used by transforms to build an object schema from a shape.
pub(crate) fn object_from_shape(shape: ObjectShape, message: Option<Message>) -> Schema {
    Schema(Arc::new(Node {
        kind: Kind::Object(shape),
        message,
        refinements: Vec::new(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(string().kind_name(), "string");
        assert_eq!(coerce_date().kind_name(), "coerce_date");
        assert_eq!(optional(number()).kind_name(), "optional");
        assert_eq!(tuple_with_rest([string()], number()).kind_name(), "tuple");
    }

    #[test]
    fn test_expects() {
        assert_eq!(union([string(), number()]).expects(), "string | number");
        assert_eq!(nullish(date()).expects(), "Date | null | undefined");
        assert_eq!(picklist(["a", "b"]).expects(), "\"a\" | \"b\"");
        assert_eq!(intersection([object([("a", any())]), record(string(), any())]).expects(), "Object & Object");
    }

    #[test]
    fn test_builders_do_not_mutate_original() {
        let base = string();
        let refined = base.min_length(2).message("too short");
        assert!(base.is_bare());
        assert!(!refined.is_bare());
        assert!(!base.ptr_eq(&refined));
    }

    #[test]
    fn test_unknown_key_builders_only_touch_objects() {
        let s = string();
        assert!(s.strict().ptr_eq(&s));
        let o = object([("a", string())]);
        assert!(!o.strict().ptr_eq(&o));
    }

    #[test]
    fn test_schemas_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Schema>();
    }
}
