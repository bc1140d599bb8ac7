//! Compiled validation plans for object schemas.
//!
//! The generic object path dispatches through [`Schema::run`] for every
//! field. A plan is built once per object shape and checks bare primitive
//! fields (and optional bare primitives) inline, calling into the generic
//! machinery only for composite fields. Plans share the field fold and the
//! unknown-key handling with the generic path, so both produce identical
//! outcomes for every input.
//!
//! Shapes that contain a `lazy` field, or have fewer than two fields, are
//! not compiled and always take the generic path.

use crate::compose::ObjectShape;
use crate::primitives::{self, Primitive};
use crate::schema::{Kind, Schema};
use crate::validate::{Context, Failure, Outcome};
use crate::ValueMap;
use tracing::{debug, trace};

pub(crate) struct Plan {
    steps: Vec<Step>,
}

struct Step {
    key: String,
    op: Op,
}

enum Op {
    Check(Primitive),
    OptionalCheck(Primitive),
    Call(Schema),
}

impl Op {
    /// `None` when the field cannot be part of a plan.
    fn for_field(field: &Schema) -> Option<Op> {
        match field.kind() {
            Kind::Lazy(_) => None,
            Kind::Primitive(p) if field.is_bare() => Some(Op::Check(*p)),
            Kind::Optional(inner) if field.is_bare() && inner.is_bare() => match inner.kind() {
                Kind::Primitive(p) => Some(Op::OptionalCheck(*p)),
                _ => Some(Op::Call(field.clone())),
            },
            _ => Some(Op::Call(field.clone())),
        }
    }

    const fn is_inline(&self) -> bool {
        !matches!(self, Op::Call(_))
    }
}

impl Plan {
    pub(crate) fn compile(shape: &ObjectShape) -> Option<Plan> {
        if shape.fields.len() < 2 {
            trace!(fields = shape.fields.len(), "object too small to compile");
            return None;
        }
        let mut steps = Vec::with_capacity(shape.fields.len());
        for (key, field) in &shape.fields {
            match Op::for_field(field) {
                Some(op) => steps.push(Step {
                    key: key.clone(),
                    op,
                }),
                None => {
                    trace!(field = %key, kind = field.kind_name(), "field blocks compilation");
                    return None;
                }
            }
        }
        debug!(
            fields = steps.len(),
            inline = steps.iter().filter(|s| s.op.is_inline()).count(),
            "compiled object plan"
        );
        Some(Plan { steps })
    }

    pub(crate) fn run(&self, shape: &ObjectShape, map: &ValueMap, ctx: &mut Context<'_>) -> Outcome {
        let mut output = None;
        let mut failure = Failure::empty();
        let mut present = 0usize;
        for step in &self.steps {
            let value = map.get(&step.key);
            present += usize::from(value.is_some());
            let outcome = match &step.op {
                Op::Check(p) => primitives::check(*p, None, value, ctx),
                Op::OptionalCheck(_) if value.is_none() => Outcome::Valid,
                Op::OptionalCheck(p) => primitives::check(*p, None, value, ctx),
                Op::Call(schema) => schema.run(value, ctx),
            };
            if shape.fold_field(&step.key, outcome, map, &mut output, &mut failure, ctx) {
                return failure.into_outcome();
            }
        }
        // Declared keys are unique, so any shortfall means undeclared keys.
        shape.finish(map, present < map.len(), output, failure, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ParseOptions, UnknownKeys};
    use crate::schema::{
        array, boolean, coerce_number, lazy, number, object, optional, string, union,
        with_default,
    };
    use crate::Value;
    use proptest::prelude::*;

    fn shape_of(schema: &Schema) -> &ObjectShape {
        match schema.kind() {
            Kind::Object(shape) => shape,
            _ => panic!("not an object schema"),
        }
    }

    fn user() -> Schema {
        object([
            ("a", string()),
            ("b", optional(number())),
            ("c", array(coerce_number())),
            ("d", with_default(boolean(), false)),
            ("e", union([string(), number()])),
        ])
    }

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-5i64..5).prop_map(Value::from),
            "[a-c0-9]{0,2}".prop_map(Value::String),
        ]
    }

    fn input() -> impl Strategy<Value = Value> {
        let nested = leaf().prop_recursive(2, 8, 3, |inner| {
            prop::collection::vec(inner, 0..3).prop_map(Value::Array)
        });
        prop::collection::vec(("[a-g]", nested), 0..7)
            .prop_map(|entries| Value::Object(entries.into_iter().collect()))
    }

    fn both(schema: &Schema, value: &Value, mode: UnknownKeys) -> (Outcome, Outcome) {
        let options = ParseOptions::new().with_unknown_keys(mode);
        let shape = shape_of(schema);
        let map = match value {
            Value::Object(map) => map,
            _ => panic!("not an object input"),
        };
        let plan = shape.plan().expect("shape should compile");
        let generic = shape.validate_fields(map, &mut Context::new(&options));
        let compiled = plan.run(shape, map, &mut Context::new(&options));
        (generic, compiled)
    }

    #[test]
    fn test_compiles_mixed_shape() {
        let schema = user();
        let plan = shape_of(&schema).plan().unwrap();
        let inline: Vec<bool> = plan.steps.iter().map(|s| s.op.is_inline()).collect();
        assert_eq!(inline, vec![true, true, false, false, false]);
    }

    #[test]
    fn test_refined_fields_are_called_not_inlined() {
        let schema = object([("a", string().min_length(1)), ("b", optional(number().integer()))]);
        let plan = shape_of(&schema).plan().unwrap();
        assert!(plan.steps.iter().all(|s| !s.op.is_inline()));
    }

    #[test]
    fn test_ineligible_shapes() {
        assert!(shape_of(&object([("a", crate::schema::any())])).plan().is_none());
        let recursive = object([("a", number()), ("b", lazy(number))]);
        assert!(shape_of(&recursive).plan().is_none());
    }

    #[test]
    fn test_plan_is_cached() {
        let schema = user();
        let first = shape_of(&schema).plan().unwrap() as *const Plan;
        let second = shape_of(&schema).plan().unwrap() as *const Plan;
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_plan_matches_generic_path(value in input()) {
            let schema = user();
            for mode in [UnknownKeys::Strip, UnknownKeys::Strict, UnknownKeys::Passthrough] {
                let (generic, compiled) = both(&schema, &value, mode);
                prop_assert_eq!(generic, compiled);
            }
        }

        #[test]
        fn prop_plan_matches_generic_path_with_strict_schema(value in input()) {
            let schema = user().strict();
            let (generic, compiled) = both(&schema, &value, UnknownKeys::Strip);
            prop_assert_eq!(generic, compiled);
        }
    }
}
