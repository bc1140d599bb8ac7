//! Primitive validators and coercions.
//!
//! Plain primitives only check the type of the input and never convert it.
//! Coercion primitives first try a canonical conversion from another type and
//! then run the plain check on the converted value:
//!
//! | Target    | Accepted conversions                                        |
//! |-----------|-------------------------------------------------------------|
//! | `string`  | number, boolean, bigint (decimal digits), date (RFC 3339)  |
//! | `number`  | numeric string, boolean (`1`/`0`), bigint in `i64` range, date (epoch millis) |
//! | `boolean` | `"true"`/`"false"`/`"1"`/`"0"` (case-insensitive), numbers `1`/`0` |
//! | `date`    | RFC 3339 string, `YYYY-MM-DD` string (midnight UTC), integer epoch millis |
//! | `bigint`  | integer string, whole number                                |
//!
//! A value that is already of the target type is returned unchanged, so
//! re-validating a coerced output is always `Valid`.

use crate::issue::{IssueKind, Message};
use crate::validate::{Context, Outcome};
use crate::{Number, Value};
use chrono::{DateTime, NaiveDate, Utc};
use num_bigint::BigInt;

/// The leaf types with a direct structural check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Primitive {
    Any,
    Null,
    Boolean,
    Number,
    String,
    Date,
    BigInt,
}

impl Primitive {
    pub(crate) const fn name(self) -> &'static str {
        match self {
            Primitive::Any => "any",
            Primitive::Null => "null",
            Primitive::Boolean => "boolean",
            Primitive::Number => "number",
            Primitive::String => "string",
            Primitive::Date => "date",
            Primitive::BigInt => "bigint",
        }
    }

    pub(crate) const fn expects(self) -> &'static str {
        match self {
            Primitive::Date => "Date",
            other => other.name(),
        }
    }

    pub(crate) const fn coerce_name(self) -> &'static str {
        match self {
            Primitive::Any => "coerce_any",
            Primitive::Null => "coerce_null",
            Primitive::Boolean => "coerce_boolean",
            Primitive::Number => "coerce_number",
            Primitive::String => "coerce_string",
            Primitive::Date => "coerce_date",
            Primitive::BigInt => "coerce_bigint",
        }
    }

    /// The structural check. NaN is not a number.
    #[inline]
    pub(crate) fn accepts(self, input: Option<&Value>) -> bool {
        match (self, input) {
            (Primitive::Any, _) => true,
            (Primitive::Null, Some(Value::Null)) => true,
            (Primitive::Boolean, Some(Value::Bool(_))) => true,
            (Primitive::Number, Some(Value::Number(n))) => !n.is_nan(),
            (Primitive::String, Some(Value::String(_))) => true,
            (Primitive::Date, Some(Value::Date(_))) => true,
            (Primitive::BigInt, Some(Value::BigInt(_))) => true,
            _ => false,
        }
    }

    /// Whether the input already has this primitive's representation, valid
    /// or not.
    fn same_type(self, input: &Value) -> bool {
        matches!(
            (self, input),
            (Primitive::Null, Value::Null)
                | (Primitive::Boolean, Value::Bool(_))
                | (Primitive::Number, Value::Number(_))
                | (Primitive::String, Value::String(_))
                | (Primitive::Date, Value::Date(_))
                | (Primitive::BigInt, Value::BigInt(_))
        )
    }
}

/// Validates a plain primitive.
#[inline]
pub(crate) fn check(
    primitive: Primitive,
    message: Option<&Message>,
    input: Option<&Value>,
    ctx: &mut Context<'_>,
) -> Outcome {
    if primitive.accepts(input) {
        Outcome::Valid
    } else {
        Outcome::invalid(ctx.issue(
            IssueKind::Schema,
            primitive.name(),
            input,
            Some(primitive.expects().to_string()),
            message,
        ))
    }
}

/// Validates a coercion primitive.
pub(crate) fn coerce(
    primitive: Primitive,
    message: Option<&Message>,
    input: Option<&Value>,
    ctx: &mut Context<'_>,
) -> Outcome {
    if primitive.accepts(input) {
        return Outcome::Valid;
    }
    let value = match input {
        Some(value) if !primitive.same_type(value) => value,
        _ => return check(primitive, message, input, ctx),
    };
    match convert(primitive, value) {
        Some(converted) if primitive.accepts(Some(&converted)) => Outcome::Coerced(converted),
        Some(converted) => check(primitive, message, Some(&converted), ctx),
        None => Outcome::invalid(ctx.issue(
            IssueKind::Transformation,
            primitive.coerce_name(),
            input,
            Some(primitive.expects().to_string()),
            message,
        )),
    }
}

fn convert(primitive: Primitive, value: &Value) -> Option<Value> {
    match primitive {
        Primitive::String => to_string(value).map(Value::String),
        Primitive::Number => to_number(value).map(Value::Number),
        Primitive::Boolean => to_boolean(value).map(Value::Bool),
        Primitive::Date => to_date(value).map(Value::Date),
        Primitive::BigInt => to_bigint(value).map(Value::BigInt),
        Primitive::Any | Primitive::Null => None,
    }
}

fn to_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::BigInt(bi) => Some(bi.to_string()),
        Value::Date(dt) => Some(dt.to_rfc3339()),
        _ => None,
    }
}

fn to_number(value: &Value) -> Option<Number> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(i) = s.parse::<i64>() {
                return Some(Number::Integer(i));
            }
            s.parse::<f64>().ok().map(Number::from_f64)
        }
        Value::Bool(b) => Some(Number::Integer(i64::from(*b))),
        Value::BigInt(bi) => i64::try_from(bi).ok().map(Number::Integer),
        Value::Date(dt) => Some(Number::Integer(dt.timestamp_millis())),
        _ => None,
    }
}

fn to_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn to_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        Value::Number(Number::Integer(millis)) => DateTime::<Utc>::from_timestamp_millis(*millis),
        _ => None,
    }
}

fn to_bigint(value: &Value) -> Option<BigInt> {
    match value {
        Value::String(s) => s.trim().parse::<BigInt>().ok(),
        Value::Number(n) => n.as_i64().map(BigInt::from),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;

    fn run(f: fn(Primitive, Option<&Message>, Option<&Value>, &mut Context<'_>) -> Outcome, p: Primitive, v: Option<&Value>) -> Outcome {
        let options = ParseOptions::default();
        let mut ctx = Context::new(&options);
        f(p, None, v, &mut ctx)
    }

    #[test]
    fn test_plain_primitives_never_coerce() {
        assert_eq!(run(check, Primitive::Number, Some(&Value::from(1))), Outcome::Valid);
        assert!(run(check, Primitive::Number, Some(&Value::from("1"))).is_invalid());
        assert!(run(check, Primitive::String, Some(&Value::from(1))).is_invalid());
        assert!(run(check, Primitive::Null, None).is_invalid());
        assert_eq!(run(check, Primitive::Any, None), Outcome::Valid);
    }

    #[test]
    fn test_nan_is_not_a_number() {
        let outcome = run(check, Primitive::Number, Some(&Value::Number(Number::NaN)));
        match outcome {
            Outcome::Invalid(failure) => {
                assert_eq!(failure.issues[0].received, "NaN");
                assert!(!failure.typed);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(
            run(coerce, Primitive::Number, Some(&Value::from(" 42 "))),
            Outcome::Coerced(Value::from(42))
        );
        assert_eq!(
            run(coerce, Primitive::Number, Some(&Value::from("2.5"))),
            Outcome::Coerced(Value::from(2.5))
        );
        assert_eq!(
            run(coerce, Primitive::Number, Some(&Value::from(true))),
            Outcome::Coerced(Value::from(1))
        );
        assert_eq!(run(coerce, Primitive::Number, Some(&Value::from(7))), Outcome::Valid);
    }

    #[test]
    fn test_coerce_number_failures() {
        match run(coerce, Primitive::Number, Some(&Value::from("abc"))) {
            Outcome::Invalid(failure) => {
                assert_eq!(failure.issues[0].kind, IssueKind::Transformation);
                assert_eq!(failure.issues[0].type_name, "coerce_number");
            }
            other => panic!("unexpected {:?}", other),
        }
        // Converts, then fails the structural check.
        match run(coerce, Primitive::Number, Some(&Value::from("NaN"))) {
            Outcome::Invalid(failure) => {
                assert_eq!(failure.issues[0].kind, IssueKind::Schema);
                assert_eq!(failure.issues[0].type_name, "number");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(run(coerce, Primitive::Number, None).is_invalid());
    }

    #[test]
    fn test_coerce_string_boolean_bigint() {
        assert_eq!(
            run(coerce, Primitive::String, Some(&Value::from(12))),
            Outcome::Coerced(Value::from("12"))
        );
        assert_eq!(
            run(coerce, Primitive::Boolean, Some(&Value::from("TRUE"))),
            Outcome::Coerced(Value::from(true))
        );
        assert!(run(coerce, Primitive::Boolean, Some(&Value::from("yes"))).is_invalid());
        assert_eq!(
            run(coerce, Primitive::BigInt, Some(&Value::from("123456789012345678901234567890"))),
            Outcome::Coerced(Value::BigInt(
                "123456789012345678901234567890".parse().unwrap()
            ))
        );
    }

    #[test]
    fn test_coerce_date() {
        let expected = DateTime::parse_from_rfc3339("2024-01-15T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            run(coerce, Primitive::Date, Some(&Value::from("2024-01-15"))),
            Outcome::Coerced(Value::Date(expected))
        );
        assert_eq!(
            run(coerce, Primitive::Date, Some(&Value::from(expected.timestamp_millis()))),
            Outcome::Coerced(Value::Date(expected))
        );
        assert!(run(coerce, Primitive::Date, Some(&Value::from("yesterday"))).is_invalid());
    }
}
