//! Composite validators.
//!
//! Each composite folds its children's outcomes into one:
//!
//! - A child's `Valid` costs nothing. The composite only allocates an output
//!   container at the first `Coerced` child, by cloning the input container
//!   and patching the coerced positions in, so an input that needs no
//!   coercion is handed back untouched.
//! - A child's `Invalid` is absorbed with the child's position prefixed to
//!   its issues. With `abort_early` the composite returns right away;
//!   otherwise it keeps validating siblings to collect every issue.
//!
//! Object schemas additionally carry a compiled plan (see
//! [`crate::specialize`]) that produces the same outcomes as
//! [`ObjectShape::validate_fields`] with less per-field dispatch.

use crate::issue::{IssueKind, Message, PathSegment};
use crate::options::UnknownKeys;
use crate::primitives::Primitive;
use crate::schema::{Kind, Schema};
use crate::specialize::Plan;
use crate::validate::{Context, Failure, Outcome};
use crate::{Number, Value, ValueMap};
use indexmap::IndexMap;
use std::sync::OnceLock;

fn type_issue(
    type_name: &str,
    expected: &str,
    message: Option<&Message>,
    input: Option<&Value>,
    ctx: &mut Context<'_>,
) -> Outcome {
    Outcome::invalid(ctx.issue(
        IssueKind::Schema,
        type_name,
        input,
        Some(expected.to_string()),
        message,
    ))
}

fn conclude(failure: Failure, output: Option<Value>) -> Outcome {
    if !failure.is_empty() {
        return failure.into_outcome();
    }
    match output {
        Some(value) => Outcome::Coerced(value),
        None => Outcome::Valid,
    }
}

/// The declared fields of an object schema and its unknown-key policy.
pub(crate) struct ObjectShape {
    pub(crate) fields: IndexMap<String, Schema>,
    /// Fixed unknown-key mode; `None` defers to the parse options.
    pub(crate) unknown_keys: Option<UnknownKeys>,
    /// Schema for undeclared keys; takes precedence over `unknown_keys`.
    pub(crate) rest: Option<Schema>,
    plan: OnceLock<Option<Plan>>,
}

impl Clone for ObjectShape {
    fn clone(&self) -> Self {
        ObjectShape::new(self.fields.clone(), self.unknown_keys, self.rest.clone())
    }
}

impl ObjectShape {
    pub(crate) fn new(
        fields: IndexMap<String, Schema>,
        unknown_keys: Option<UnknownKeys>,
        rest: Option<Schema>,
    ) -> Self {
        ObjectShape {
            fields,
            unknown_keys,
            rest,
            plan: OnceLock::new(),
        }
    }

    pub(crate) fn with_unknown_keys(&self, mode: UnknownKeys) -> Self {
        ObjectShape::new(self.fields.clone(), Some(mode), self.rest.clone())
    }

    /// Same policy, different field set.
    pub(crate) fn with_fields(&self, fields: IndexMap<String, Schema>) -> Self {
        ObjectShape::new(fields, self.unknown_keys, self.rest.clone())
    }

    /// The compiled plan, built on first use and cached for the lifetime of
    /// this shape.
    pub(crate) fn plan(&self) -> Option<&Plan> {
        self.plan.get_or_init(|| Plan::compile(self)).as_ref()
    }

    pub(crate) fn validate(
        &self,
        message: Option<&Message>,
        input: Option<&Value>,
        ctx: &mut Context<'_>,
    ) -> Outcome {
        let map = match input {
            Some(Value::Object(map)) => map,
            _ => return type_issue("object", "Object", message, input, ctx),
        };
        // abort_early is a call-time setting the plan is not built for.
        if !ctx.abort_early() {
            if let Some(plan) = self.plan() {
                return plan.run(self, map, ctx);
            }
        }
        self.validate_fields(map, ctx)
    }

    /// Generic field-by-field validation of an object input.
    pub(crate) fn validate_fields(&self, map: &ValueMap, ctx: &mut Context<'_>) -> Outcome {
        let mut output = None;
        let mut failure = Failure::empty();
        for (key, field) in &self.fields {
            let outcome = field.run(map.get(key), ctx);
            if self.fold_field(key, outcome, map, &mut output, &mut failure, ctx) {
                return failure.into_outcome();
            }
        }
        let has_unknown = map.keys().any(|key| !self.fields.contains_key(key));
        self.finish(map, has_unknown, output, failure, ctx)
    }

    /// Folds one field's outcome into the running result. Returns `true`
    /// when validation must stop.
    pub(crate) fn fold_field(
        &self,
        key: &str,
        outcome: Outcome,
        map: &ValueMap,
        output: &mut Option<ValueMap>,
        failure: &mut Failure,
        ctx: &Context<'_>,
    ) -> bool {
        match outcome {
            Outcome::Valid => false,
            Outcome::Coerced(value) => {
                output
                    .get_or_insert_with(|| map.clone())
                    .insert(key.to_string(), value);
                false
            }
            Outcome::Invalid(child) => {
                failure.absorb(child, Some(&PathSegment::Key(key.to_string())));
                ctx.abort_early()
            }
        }
    }

    /// Applies the unknown-key policy and produces the final outcome.
    pub(crate) fn finish(
        &self,
        map: &ValueMap,
        has_unknown: bool,
        mut output: Option<ValueMap>,
        mut failure: Failure,
        ctx: &mut Context<'_>,
    ) -> Outcome {
        if has_unknown {
            let unknown = map
                .iter()
                .filter(|(key, _)| !self.fields.contains_key(key.as_str()));
            if let Some(rest) = &self.rest {
                for (key, value) in unknown {
                    let outcome = rest.run(Some(value), ctx);
                    if self.fold_field(key, outcome, map, &mut output, &mut failure, ctx) {
                        return failure.into_outcome();
                    }
                }
            } else {
                match self.unknown_keys.unwrap_or(ctx.options().unknown_keys) {
                    UnknownKeys::Strict => {
                        for (key, value) in unknown {
                            let draft = ctx
                                .draft(
                                    IssueKind::Schema,
                                    "object",
                                    Some(value),
                                    Some("never".to_string()),
                                )
                                .with_received(format!("\"{}\"", key));
                            let mut issue = ctx.finish(draft, None);
                            issue.prefix(&PathSegment::Key(key.clone()));
                            failure.push(issue);
                            if ctx.abort_early() {
                                return failure.into_outcome();
                            }
                        }
                    }
                    UnknownKeys::Strip => {
                        if failure.is_empty() {
                            output
                                .get_or_insert_with(|| map.clone())
                                .retain(|key, _| self.fields.contains_key(key));
                        }
                    }
                    UnknownKeys::Passthrough => {}
                }
            }
        }
        conclude(failure, output.map(Value::Object))
    }
}

pub(crate) fn literal(
    expected: &Value,
    message: Option<&Message>,
    input: Option<&Value>,
    ctx: &mut Context<'_>,
) -> Outcome {
    if input == Some(expected) {
        Outcome::Valid
    } else {
        type_issue(
            "literal",
            &Value::describe(Some(expected)),
            message,
            input,
            ctx,
        )
    }
}

pub(crate) fn picklist(
    options: &[Value],
    message: Option<&Message>,
    input: Option<&Value>,
    ctx: &mut Context<'_>,
) -> Outcome {
    match input {
        Some(value) if options.contains(value) => Outcome::Valid,
        _ => {
            let expected = options
                .iter()
                .map(|v| Value::describe(Some(v)))
                .collect::<Vec<_>>()
                .join(" | ");
            type_issue("picklist", &expected, message, input, ctx)
        }
    }
}

/// Validates `values` element-wise. `schema_for` maps a position to its schema.
fn elements<'s>(
    values: &[Value],
    schema_for: impl Fn(usize) -> Option<&'s Schema>,
    failure: &mut Failure,
    ctx: &mut Context<'_>,
) -> Result<Option<Vec<Value>>, ()> {
    let mut output: Option<Vec<Value>> = None;
    for (index, value) in values.iter().enumerate() {
        let schema = match schema_for(index) {
            Some(schema) => schema,
            None => continue,
        };
        match schema.run(Some(value), ctx) {
            Outcome::Valid => {}
            Outcome::Coerced(coerced) => {
                output.get_or_insert_with(|| values.to_vec())[index] = coerced;
            }
            Outcome::Invalid(child) => {
                failure.absorb(child, Some(&PathSegment::Index(index)));
                if ctx.abort_early() {
                    return Err(());
                }
            }
        }
    }
    Ok(output)
}

pub(crate) fn array(
    item: &Schema,
    message: Option<&Message>,
    input: Option<&Value>,
    ctx: &mut Context<'_>,
) -> Outcome {
    let values = match input {
        Some(Value::Array(values)) => values,
        _ => return type_issue("array", "Array", message, input, ctx),
    };
    let mut failure = Failure::empty();
    match elements(values, |_| Some(item), &mut failure, ctx) {
        Ok(output) => conclude(failure, output.map(Value::Array)),
        Err(()) => failure.into_outcome(),
    }
}

pub(crate) fn tuple(
    items: &[Schema],
    rest: Option<&Schema>,
    message: Option<&Message>,
    input: Option<&Value>,
    ctx: &mut Context<'_>,
) -> Outcome {
    let values = match input {
        Some(Value::Array(values)) => values,
        _ => return type_issue("tuple", "Array", message, input, ctx),
    };
    let fixed = items.len();
    if values.len() < fixed || (rest.is_none() && values.len() > fixed) {
        let expected = match rest {
            Some(_) => format!("length >={}", fixed),
            None => format!("length {}", fixed),
        };
        let draft = ctx
            .draft(IssueKind::Schema, "tuple", input, Some(expected))
            .with_received(format!("length {}", values.len()));
        return Outcome::invalid(ctx.finish(draft, message));
    }
    let mut failure = Failure::empty();
    match elements(values, |index| items.get(index).or(rest), &mut failure, ctx) {
        Ok(output) => conclude(failure, output.map(Value::Array)),
        Err(()) => failure.into_outcome(),
    }
}

pub(crate) fn record(
    key_schema: &Schema,
    value_schema: &Schema,
    message: Option<&Message>,
    input: Option<&Value>,
    ctx: &mut Context<'_>,
) -> Outcome {
    let map = match input {
        Some(Value::Object(map)) => map,
        _ => return type_issue("record", "Object", message, input, ctx),
    };
    // Keys are strings already; a bare string/any key schema cannot reject them.
    let check_keys = !(key_schema.is_bare()
        && matches!(
            key_schema.kind(),
            Kind::Primitive(Primitive::String) | Kind::Primitive(Primitive::Any)
        ));
    let mut output: Option<ValueMap> = None;
    let mut renamed: Vec<(usize, String)> = Vec::new();
    let mut failure = Failure::empty();
    for (index, (key, value)) in map.iter().enumerate() {
        if check_keys {
            let key_value = Value::String(key.clone());
            match key_schema.run(Some(&key_value), ctx) {
                Outcome::Valid => {}
                Outcome::Coerced(coerced) => renamed.push((index, key_text(&coerced))),
                Outcome::Invalid(child) => {
                    failure.absorb(child, Some(&PathSegment::Key(key.clone())));
                    if ctx.abort_early() {
                        return failure.into_outcome();
                    }
                }
            }
        }
        match value_schema.run(Some(value), ctx) {
            Outcome::Valid => {}
            Outcome::Coerced(coerced) => {
                output
                    .get_or_insert_with(|| map.clone())
                    .insert(key.clone(), coerced);
            }
            Outcome::Invalid(child) => {
                failure.absorb(child, Some(&PathSegment::Key(key.clone())));
                if ctx.abort_early() {
                    return failure.into_outcome();
                }
            }
        }
    }
    if !failure.is_empty() {
        return failure.into_outcome();
    }
    if !renamed.is_empty() {
        let source = output.unwrap_or_else(|| map.clone());
        let mut renames = renamed.into_iter().peekable();
        let mut rebuilt = ValueMap::with_capacity(source.len());
        for (index, (key, value)) in source.into_iter().enumerate() {
            let renamed = if renames.peek().map_or(false, |(at, _)| *at == index) {
                renames.next().map(|(_, renamed)| renamed)
            } else {
                None
            };
            // A coerced key must not overwrite an entry already placed.
            if rebuilt.contains_key(renamed.as_deref().unwrap_or(&key)) {
                let mut issue = ctx.issue(
                    IssueKind::Schema,
                    "record",
                    Some(&Value::String(key.clone())),
                    Some("unique key".to_string()),
                    message,
                );
                issue.prefix(&PathSegment::Key(key));
                failure.push(issue);
                if ctx.abort_early() {
                    break;
                }
                continue;
            }
            rebuilt.insert(renamed.unwrap_or(key), value);
        }
        if !failure.is_empty() {
            return failure.into_outcome();
        }
        output = Some(rebuilt);
    }
    conclude(failure, output.map(Value::Object))
}

/// The string form a coerced record key takes.
fn key_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn map(
    key_schema: &Schema,
    value_schema: &Schema,
    message: Option<&Message>,
    input: Option<&Value>,
    ctx: &mut Context<'_>,
) -> Outcome {
    let entries = match input {
        Some(Value::Array(entries)) => entries,
        _ => return type_issue("map", "Array", message, input, ctx),
    };
    let mut output: Option<Vec<Value>> = None;
    let mut failure = Failure::empty();
    for (index, entry) in entries.iter().enumerate() {
        let (key, value) = match entry {
            Value::Array(pair) if pair.len() == 2 => (&pair[0], &pair[1]),
            _ => {
                let mut issue = ctx.issue(
                    IssueKind::Schema,
                    "map",
                    Some(entry),
                    Some("[key, value]".to_string()),
                    message,
                );
                issue.prefix(&PathSegment::Index(index));
                failure.push(issue);
                if ctx.abort_early() {
                    return failure.into_outcome();
                }
                continue;
            }
        };
        let mut coerced_key = None;
        let mut coerced_value = None;
        match key_schema.run(Some(key), ctx) {
            Outcome::Valid => {}
            Outcome::Coerced(k) => coerced_key = Some(k),
            Outcome::Invalid(child) => {
                failure.absorb(child, Some(&PathSegment::MapKey(key.clone())));
                if ctx.abort_early() {
                    return failure.into_outcome();
                }
            }
        }
        match value_schema.run(Some(value), ctx) {
            Outcome::Valid => {}
            Outcome::Coerced(v) => coerced_value = Some(v),
            Outcome::Invalid(child) => {
                failure.absorb(child, Some(&PathSegment::MapKey(key.clone())));
                if ctx.abort_early() {
                    return failure.into_outcome();
                }
            }
        }
        if coerced_key.is_some() || coerced_value.is_some() {
            let pair = vec![
                coerced_key.unwrap_or_else(|| key.clone()),
                coerced_value.unwrap_or_else(|| value.clone()),
            ];
            output.get_or_insert_with(|| entries.to_vec())[index] = Value::Array(pair);
        }
    }
    conclude(failure, output.map(Value::Array))
}

/// 2^63; i64 covers exactly [-2^63, 2^63).
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Equality for set members, treating an integer and a float with the same
/// value as one number.
fn same_member(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(Number::Integer(i)), Value::Number(Number::Float(f)))
        | (Value::Number(Number::Float(f)), Value::Number(Number::Integer(i))) => {
            f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(f) && *f as i64 == *i
        }
        _ => left == right,
    }
}

pub(crate) fn set(
    item: &Schema,
    message: Option<&Message>,
    input: Option<&Value>,
    ctx: &mut Context<'_>,
) -> Outcome {
    let values = match input {
        Some(Value::Array(values)) => values,
        _ => return type_issue("set", "Array", message, input, ctx),
    };
    let mut failure = Failure::empty();
    let output = match elements(values, |_| Some(item), &mut failure, ctx) {
        Ok(output) => output,
        Err(()) => return failure.into_outcome(),
    };
    if !failure.is_empty() {
        return failure.into_outcome();
    }
    let members = output.as_deref().unwrap_or(values);
    for index in 1..members.len() {
        if members[..index]
            .iter()
            .any(|earlier| same_member(earlier, &members[index]))
        {
            let mut issue = ctx.issue(
                IssueKind::Schema,
                "set",
                Some(&members[index]),
                Some("unique elements".to_string()),
                message,
            );
            issue.prefix(&PathSegment::Index(index));
            failure.push(issue);
            if ctx.abort_early() {
                break;
            }
        }
    }
    conclude(failure, output.map(Value::Array))
}

/// Tries each option in order; the first success wins.
///
/// When every option fails, a single typed failure (right structure, failed
/// refinement) is the closest match and is reported as-is. Otherwise one
/// `union` issue is reported with the options' issues nested under it.
pub(crate) fn union(
    options: &[Schema],
    message: Option<&Message>,
    input: Option<&Value>,
    ctx: &mut Context<'_>,
) -> Outcome {
    let mut typed: Vec<Failure> = Vec::new();
    let mut untyped: Vec<Failure> = Vec::new();
    for option in options {
        match option.run(input, ctx) {
            Outcome::Invalid(failure) if failure.typed => typed.push(failure),
            Outcome::Invalid(failure) => untyped.push(failure),
            success => return success,
        }
    }
    if typed.len() == 1 {
        return typed.pop().map_or(Outcome::Valid, Failure::into_outcome);
    }
    let any_typed = !typed.is_empty();
    let nested = if any_typed { typed } else { untyped };
    let expected = options
        .iter()
        .map(Schema::expects)
        .collect::<Vec<_>>()
        .join(" | ");
    let mut issue = ctx.draft(IssueKind::Schema, "union", input, Some(expected));
    issue.nested = nested.into_iter().flat_map(|f| f.issues).collect();
    let issue = ctx.finish(issue, message);
    Outcome::Invalid(Failure {
        issues: vec![issue],
        typed: any_typed,
    })
}

/// Every member must accept the input. Coerced member outputs are merged.
pub(crate) fn intersection(
    members: &[Schema],
    message: Option<&Message>,
    input: Option<&Value>,
    ctx: &mut Context<'_>,
) -> Outcome {
    let mut outputs: Vec<Option<Value>> = Vec::with_capacity(members.len());
    let mut failure = Failure::empty();
    for member in members {
        match member.run(input, ctx) {
            Outcome::Valid => outputs.push(None),
            Outcome::Coerced(value) => outputs.push(Some(value)),
            Outcome::Invalid(child) => {
                failure.absorb(child, None);
                if ctx.abort_early() {
                    return failure.into_outcome();
                }
            }
        }
    }
    if !failure.is_empty() {
        return failure.into_outcome();
    }
    if outputs.iter().all(Option::is_none) {
        return Outcome::Valid;
    }
    let mut merged: Option<Value> = None;
    for output in outputs {
        let value = match output.or_else(|| input.cloned()) {
            Some(value) => value,
            None => continue,
        };
        merged = match merged {
            None => Some(value),
            Some(acc) => match merge(acc, value) {
                Some(value) => Some(value),
                None => {
                    let expected = members
                        .iter()
                        .map(Schema::expects)
                        .collect::<Vec<_>>()
                        .join(" & ");
                    return type_issue("intersection", &expected, message, input, ctx);
                }
            },
        };
    }
    match merged {
        Some(value) => Outcome::Coerced(value),
        None => Outcome::Valid,
    }
}

/// Deep-merges two outputs: objects key-wise, equal-length arrays
/// element-wise, anything else must be equal. `None` on conflict.
pub(crate) fn merge(left: Value, right: Value) -> Option<Value> {
    match (left, right) {
        (Value::Object(mut left), Value::Object(right)) => {
            for (key, value) in right {
                match left.get_mut(&key) {
                    Some(slot) => {
                        let current = std::mem::take(slot);
                        *slot = merge(current, value)?;
                    }
                    None => {
                        left.insert(key, value);
                    }
                }
            }
            Some(Value::Object(left))
        }
        (Value::Array(left), Value::Array(right)) if left.len() == right.len() => left
            .into_iter()
            .zip(right)
            .map(|(l, r)| merge(l, r))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        (left, right) => (left == right).then_some(left),
    }
}
