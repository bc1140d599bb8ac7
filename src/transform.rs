//! Object schema transforms.
//!
//! Each transform builds a new object schema from an existing one; the
//! source schema is never modified. The result keeps the source's field
//! order, unknown-key policy, rest schema and custom message, but not its
//! refinements, which were written against the original field set.
//!
//! # Examples
//!
//! ```rust
//! use schemata::{number, object, omit, parse, partial, pick, string, value};
//!
//! let user = object([("id", number()), ("name", string()), ("email", string())]);
//!
//! let summary = pick(&user, &["id", "name"]).unwrap();
//! assert_eq!(summary.field_names(), Some(vec!["id", "name"]));
//!
//! let public = omit(&user, &["email"]).unwrap();
//! assert_eq!(public.field_names(), Some(vec!["id", "name"]));
//!
//! let patch = partial(&user).unwrap();
//! assert!(parse(&patch, &value!({ "name": "Ada" })).is_ok());
//! ```

use crate::compose::ObjectShape;
use crate::error::{Error, Result};
use crate::schema::{self, object_from_shape, Kind, Schema};
use indexmap::IndexMap;

fn shape_of(schema: &Schema) -> Result<&ObjectShape> {
    match schema.kind() {
        Kind::Object(shape) => Ok(shape),
        other => Err(Error::not_an_object(other.name())),
    }
}

fn check_known(shape: &ObjectShape, keys: &[&str]) -> Result<()> {
    match keys.iter().find(|key| !shape.fields.contains_key(**key)) {
        Some(key) => Err(Error::unknown_field(
            key,
            shape.fields.keys().map(String::as_str),
        )),
        None => Ok(()),
    }
}

fn reshape(source: &Schema, shape: &ObjectShape, fields: IndexMap<String, Schema>) -> Schema {
    object_from_shape(shape.with_fields(fields), source.node().message.clone())
}

/// Keeps only the listed fields.
///
/// # Errors
///
/// Fails if `source` is not an object schema or a key is not declared.
pub fn pick(source: &Schema, keys: &[&str]) -> Result<Schema> {
    let shape = shape_of(source)?;
    check_known(shape, keys)?;
    let fields = shape
        .fields
        .iter()
        .filter(|(key, _)| keys.contains(&key.as_str()))
        .map(|(key, field)| (key.clone(), field.clone()))
        .collect();
    Ok(reshape(source, shape, fields))
}

/// Drops the listed fields.
///
/// # Errors
///
/// Fails if `source` is not an object schema or a key is not declared.
pub fn omit(source: &Schema, keys: &[&str]) -> Result<Schema> {
    let shape = shape_of(source)?;
    check_known(shape, keys)?;
    let fields = shape
        .fields
        .iter()
        .filter(|(key, _)| !keys.contains(&key.as_str()))
        .map(|(key, field)| (key.clone(), field.clone()))
        .collect();
    Ok(reshape(source, shape, fields))
}

/// Makes every field optional. Fields that already accept a missing value
/// are left as they are. New `optional` wrappers carry no message or
/// refinements; those of the wrapped field still apply to present values.
///
/// # Errors
///
/// Fails if `source` is not an object schema.
pub fn partial(source: &Schema) -> Result<Schema> {
    let shape = shape_of(source)?;
    let fields = shape
        .fields
        .iter()
        .map(|(key, field)| {
            let field = match field.kind() {
                Kind::Optional(_) | Kind::Nullish(_) | Kind::Default { .. } => field.clone(),
                _ => schema::optional(field.clone()),
            };
            (key.clone(), field)
        })
        .collect();
    Ok(reshape(source, shape, fields))
}

/// Makes every field required: `optional` and `default` wrappers are
/// removed, and `nullish` becomes `nullable`.
///
/// A removed wrapper takes its own custom message and refinements with it.
/// Only those attached to the inner schema remain, so attach checks to the
/// inner schema when they must survive `required`.
///
/// ```rust
/// use schemata::{number, object, optional, parse, required, value};
///
/// let schema = required(&object([("a", optional(number()))])).unwrap();
/// assert!(parse(&schema, &value!({})).is_err());
/// ```
///
/// # Errors
///
/// Fails if `source` is not an object schema.
pub fn required(source: &Schema) -> Result<Schema> {
    let shape = shape_of(source)?;
    let fields = shape
        .fields
        .iter()
        .map(|(key, field)| {
            let field = match field.kind() {
                Kind::Optional(inner) | Kind::Default { inner, .. } => inner.clone(),
                Kind::Nullish(inner) => schema::nullable(inner.clone()),
                _ => field.clone(),
            };
            (key.clone(), field)
        })
        .collect();
    Ok(reshape(source, shape, fields))
}

/// A picklist of the object's field names, in declaration order.
///
/// ```rust
/// use schemata::{keyof, number, object, parse, Value};
///
/// let keys = keyof(&object([("x", number()), ("y", number())])).unwrap();
/// assert!(parse(&keys, &Value::from("y")).is_ok());
/// assert!(parse(&keys, &Value::from("z")).is_err());
/// ```
///
/// # Errors
///
/// Fails if `source` is not an object schema.
pub fn keyof(source: &Schema) -> Result<Schema> {
    let shape = shape_of(source)?;
    Ok(schema::picklist(shape.fields.keys().cloned()))
}

/// Adds fields, replacing declared fields of the same name in place.
///
/// # Errors
///
/// Fails if `source` is not an object schema.
pub fn extend<I, K>(source: &Schema, fields: I) -> Result<Schema>
where
    I: IntoIterator<Item = (K, Schema)>,
    K: Into<String>,
{
    let shape = shape_of(source)?;
    let mut merged = shape.fields.clone();
    for (key, field) in fields {
        merged.insert(key.into(), field);
    }
    Ok(reshape(source, shape, merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{nullish, number, object, optional, string, with_default};

    fn user() -> Schema {
        object([
            ("id", number()),
            ("name", string()),
            ("nick", nullish(string())),
            ("role", with_default(string(), "member")),
        ])
        .strict()
        .message("bad user")
    }

    #[test]
    fn test_pick_keeps_schema_order_and_policy() {
        let picked = pick(&user(), &["name", "id"]).unwrap();
        assert_eq!(picked.field_names(), Some(vec!["id", "name"]));
        match picked.kind() {
            Kind::Object(shape) => assert_eq!(shape.unknown_keys, Some(crate::UnknownKeys::Strict)),
            _ => panic!("not an object"),
        }
        assert!(picked.node().message.is_some());
    }

    #[test]
    fn test_unknown_keys_are_errors() {
        let err = omit(&user(), &["age"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown field 'age' for object schema with fields [id, name, nick, role]"
        );
        assert!(matches!(pick(&string(), &[]), Err(Error::NotAnObject { .. })));
    }

    #[test]
    fn test_required_unwraps() {
        let schema = required(&user()).unwrap();
        let kinds: Vec<&str> = match schema.kind() {
            Kind::Object(shape) => shape.fields.values().map(Schema::kind_name).collect(),
            _ => panic!("not an object"),
        };
        assert_eq!(kinds, vec!["number", "string", "nullable", "string"]);
    }

    #[test]
    fn test_partial_wraps_only_required_fields() {
        let schema = partial(&user()).unwrap();
        let kinds: Vec<&str> = match schema.kind() {
            Kind::Object(shape) => shape.fields.values().map(Schema::kind_name).collect(),
            _ => panic!("not an object"),
        };
        assert_eq!(kinds, vec!["optional", "optional", "nullish", "default"]);
    }

    #[test]
    fn test_required_drops_wrapper_checks() {
        let source = object([
            ("a", optional(string().min_length(2)).message("wrapper")),
            ("b", string()),
        ]);
        let schema = required(&source).unwrap();
        let Kind::Object(shape) = schema.kind() else {
            panic!("not an object");
        };
        let a = &shape.fields["a"];
        assert_eq!(a.kind_name(), "string");
        assert!(a.node().message.is_none());
        assert_eq!(a.node().refinements.len(), 1);
    }

    #[test]
    fn test_extend_replaces_in_place() {
        let schema = extend(&user(), [("name", number()), ("age", number())]).unwrap();
        assert_eq!(
            schema.field_names(),
            Some(vec!["id", "name", "nick", "role", "age"])
        );
    }
}
