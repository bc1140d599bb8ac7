use schemata::{
    any, array, boolean, coerce_date, coerce_number, coerce_string, custom, flatten,
    intersection, is, keyof, lazy, literal, map, nullable, number, object, object_with_rest,
    omit, optional, parse, parse_bulk, parse_with, partial, pick, picklist, readonly, record,
    recursive, required, set, string, tuple, tuple_with_rest, union, value, with_default,
    IssueKind, Message, ParseOptions, PathSegment, Schema, UnknownKeys, Value,
};
use std::borrow::Cow;

fn issues_of(schema: &Schema, input: &Value) -> Vec<schemata::Issue> {
    parse(schema, input).unwrap_err().into_issues()
}

#[test]
fn test_nested_path() {
    let schema = object([("a", array(object([("b", number())])))]);
    let issues = issues_of(&schema, &value!({ "a": [{ "b": "x" }] }));

    assert_eq!(issues.len(), 1);
    assert_eq!(
        issues[0].path,
        vec![
            PathSegment::from("a"),
            PathSegment::from(0),
            PathSegment::from("b")
        ]
    );
    assert_eq!(issues[0].type_name, "number");
    assert_eq!(
        issues[0].message,
        "Invalid type: Expected number but received \"x\""
    );
}

#[test]
fn test_identity_on_success() {
    let schema = object([
        ("id", number()),
        ("name", string()),
        ("tags", array(string())),
        ("meta", record(string(), any())),
    ]);
    let input = value!({ "id": 1, "name": "n", "tags": ["a"], "meta": { "k": null } });
    match parse(&schema, &input) {
        Ok(Cow::Borrowed(output)) => assert!(std::ptr::eq(output, &input)),
        other => panic!("expected borrowed output, got {:?}", other),
    }
}

#[test]
fn test_collects_all_issues() {
    let schema = object([("a", number()), ("b", string()), ("c", boolean())]);
    let issues = issues_of(&schema, &value!({ "a": "1", "b": 2 }));
    let paths: Vec<_> = issues.iter().map(|i| i.dotted_path().unwrap()).collect();
    assert_eq!(paths, vec!["a", "b", "c"]);
    assert_eq!(issues[2].received, "undefined");
}

#[test]
fn test_abort_early_stops_at_first_issue() {
    let schema = array(number());
    let options = ParseOptions::new().with_abort_early(true);
    let err = parse_with(&schema, &value!(["a", "b", "c"]), &options).unwrap_err();
    assert_eq!(err.issues().len(), 1);
    assert_eq!(err.issues()[0].dotted_path().as_deref(), Some("0"));
}

#[test]
fn test_non_object_input() {
    let issues = issues_of(&object([("a", number())]), &value!([1]));
    assert_eq!(issues[0].type_name, "object");
    assert_eq!(issues[0].expected.as_deref(), Some("Object"));
    assert_eq!(issues[0].received, "Array");
}

#[test]
fn test_unknown_keys_modes() {
    let schema = object([("a", number()), ("b", number())]);
    let input = value!({ "a": 1, "b": 2, "c": 3 });

    let stripped = parse(&schema, &input).unwrap();
    assert_eq!(*stripped, value!({ "a": 1, "b": 2 }));

    let passthrough = ParseOptions::new().with_unknown_keys(UnknownKeys::Passthrough);
    match parse_with(&schema, &input, &passthrough) {
        Ok(Cow::Borrowed(v)) => assert!(std::ptr::eq(v, &input)),
        other => panic!("unexpected {:?}", other),
    }

    let strict = ParseOptions::new().with_unknown_keys(UnknownKeys::Strict);
    let err = parse_with(&schema, &input, &strict).unwrap_err();
    assert_eq!(err.issues().len(), 1);
    assert_eq!(err.issues()[0].dotted_path().as_deref(), Some("c"));
    assert_eq!(
        err.issues()[0].message,
        "Invalid type: Expected never but received \"c\""
    );
}

#[test]
fn test_schema_level_mode_wins() {
    let schema = object([("a", number())]).strict();
    let input = value!({ "a": 1, "z": 0 });
    let options = ParseOptions::new().with_unknown_keys(UnknownKeys::Passthrough);
    assert!(parse_with(&schema, &input, &options).is_err());

    let loose = schema.passthrough();
    assert!(parse(&loose, &input).is_ok());
}

#[test]
fn test_object_with_rest() {
    let schema = object_with_rest([("id", number())], coerce_number());
    let input = value!({ "id": 1, "x": "2", "y": 3 });
    let output = parse(&schema, &input).unwrap();
    assert_eq!(*output, value!({ "id": 1, "x": 2, "y": 3 }));

    let issues = issues_of(&schema, &value!({ "id": 1, "x": "two" }));
    assert_eq!(issues[0].dotted_path().as_deref(), Some("x"));
    assert_eq!(issues[0].kind, IssueKind::Transformation);
}

#[test]
fn test_coercion_and_defaults() {
    let schema = object([
        ("page", coerce_number()),
        ("size", with_default(number(), 20)),
        ("since", optional(coerce_date())),
        ("label", coerce_string()),
    ]);
    let input = value!({ "page": "2", "label": 7 });
    let output = parse(&schema, &input).unwrap();
    assert_eq!(*output, value!({ "page": 2, "label": "7", "size": 20 }));

    let again = parse(&schema, &output).unwrap();
    assert!(matches!(again, Cow::Borrowed(_)));
}

#[test]
fn test_tuple_length() {
    let pair = tuple([string(), number()]);
    assert!(parse(&pair, &value!(["a", 1])).is_ok());

    let short = issues_of(&pair, &value!(["a"]));
    assert_eq!(short.len(), 1);
    assert_eq!(short[0].type_name, "tuple");
    assert_eq!(
        short[0].message,
        "Invalid type: Expected length 2 but received length 1"
    );
    assert!(short[0].path.is_empty());

    assert!(parse(&pair, &value!(["a", 1, 2])).is_err());

    let rest = tuple_with_rest([string()], number());
    assert!(parse(&rest, &value!(["a", 1, 2, 3])).is_ok());
    let issues = issues_of(&rest, &value!(["a", 1, "x"]));
    assert_eq!(issues[0].dotted_path().as_deref(), Some("2"));
    let issues = issues_of(&rest, &value!([]));
    assert_eq!(issues[0].expected.as_deref(), Some("length >=1"));
}

#[test]
fn test_union_order() {
    let schema = union([coerce_number(), string()]);
    assert_eq!(*parse(&schema, &value!("5")).unwrap(), value!(5));

    let schema = union([string(), coerce_number()]);
    assert!(matches!(parse(&schema, &value!("5")).unwrap(), Cow::Borrowed(_)));
}

#[test]
fn test_union_failure_nests_issues() {
    let schema = union([string(), number()]);
    let issues = issues_of(&schema, &value!(true));
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].type_name, "union");
    assert_eq!(
        issues[0].message,
        "Invalid type: Expected string | number but received true"
    );
    assert_eq!(issues[0].nested.len(), 2);
}

#[test]
fn test_union_prefers_single_typed_failure() {
    let schema = union([string().min_length(3), number()]);
    let issues = issues_of(&schema, &value!("ab"));
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].type_name, "min_length");
    assert_eq!(issues[0].kind, IssueKind::Validation);
}

#[test]
fn test_intersection_merges_outputs() {
    let schema = intersection([
        object([("a", coerce_number())]),
        object([("b", coerce_string())]),
    ]);
    let input = value!({ "a": "1", "b": 2 });
    let output = parse(&schema, &input).unwrap();
    assert_eq!(*output, value!({ "a": 1, "b": "2" }));

    let conflicting = intersection([coerce_number(), coerce_string()]);
    let issues = issues_of(&conflicting, &value!(true));
    assert_eq!(issues[0].type_name, "intersection");
}

#[test]
fn test_record_map_set() {
    let scores = record(string().min_length(2), number());
    assert!(parse(&scores, &value!({ "ab": 1, "cd": 2 })).is_ok());
    let issues = issues_of(&scores, &value!({ "a": 1, "cd": "x" }));
    let paths: Vec<_> = issues.iter().map(|i| i.dotted_path().unwrap()).collect();
    assert_eq!(paths, vec!["a", "cd"]);

    let renamed = record(coerce_number(), number());
    let issues = issues_of(&renamed, &value!({ "x": 1 }));
    assert_eq!(issues[0].kind, IssueKind::Transformation);

    let lookup = map(number(), coerce_string());
    let input = value!([[1, "a"], [2, 3]]);
    let output = parse(&lookup, &input).unwrap();
    assert_eq!(*output, value!([[1, "a"], [2, "3"]]));
    let issues = issues_of(&lookup, &value!([[1, "a"], [2]]));
    assert_eq!(issues[0].path, vec![PathSegment::Index(1)]);
    let issues = issues_of(&map(number(), string()), &value!([[7, 1]]));
    assert_eq!(issues[0].path, vec![PathSegment::MapKey(value!(7))]);

    let tags = set(string());
    assert!(parse(&tags, &value!(["a", "b"])).is_ok());
    let issues = issues_of(&tags, &value!(["a", "b", "a"]));
    assert_eq!(issues[0].type_name, "set");
    assert_eq!(issues[0].dotted_path().as_deref(), Some("2"));
    let mixed = Value::Array(vec![Value::from(1), Value::from(1.0)]);
    assert!(!is(&set(number()), &mixed));
}

#[test]
fn test_record_coerced_key_collision() {
    let schema = record(coerce_number(), number());
    let issues = issues_of(&schema, &value!({ "1": 1, "01": 2 }));
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].type_name, "record");
    assert_eq!(issues[0].path, vec![PathSegment::from("01")]);
    assert_eq!(issues[0].expected.as_deref(), Some("unique key"));

    let input = value!({ "1": 1, "02": 2 });
    let output = parse(&schema, &input).unwrap();
    assert_eq!(*output, value!({ "1": 1, "2": 2 }));
}

#[test]
fn test_literals_and_picklists() {
    let kind = picklist(["draft", "published"]);
    assert!(is(&kind, &value!("draft")));
    let issues = issues_of(&kind, &value!("gone"));
    assert_eq!(
        issues[0].message,
        "Invalid type: Expected \"draft\" | \"published\" but received \"gone\""
    );
    assert!(is(&literal(3), &value!(3)));
    assert!(!is(&literal(3), &value!("3")));
}

fn category() -> Schema {
    object([
        ("name", string()),
        ("children", array(lazy(category))),
    ])
}

#[test]
fn test_recursive_schema() {
    let input = value!({
        "name": "root",
        "children": [
            { "name": "a", "children": [] },
            { "name": "b", "children": [{ "name": "c", "children": [{ "name": 1, "children": [] }] }] }
        ]
    });
    let issues = issues_of(&category(), &input);
    assert_eq!(issues.len(), 1);
    assert_eq!(
        issues[0].dotted_path().as_deref(),
        Some("children.1.children.0.children.0.name")
    );
}

fn boxed(inner: Schema) -> Schema {
    lazy(move || inner.clone())
}

#[test]
fn test_lazy_nodes_from_one_helper_nest() {
    assert!(parse(&boxed(boxed(number())), &value!(1)).is_ok());
    let issues = issues_of(&boxed(boxed(number())), &value!("x"));
    assert_eq!(issues[0].type_name, "number");
}

#[test]
fn test_recursive_constructor() {
    let category = recursive(|category| {
        object([("name", string()), ("children", array(category))])
    });
    let input = value!({
        "name": "root",
        "children": [{ "name": "a", "children": [{ "name": 2, "children": [] }] }]
    });
    let issues = issues_of(&category, &input);
    assert_eq!(issues.len(), 1);
    assert_eq!(
        issues[0].dotted_path().as_deref(),
        Some("children.0.children.0.name")
    );
}

#[test]
fn test_wrappers() {
    let schema = object([
        ("a", nullable(number())),
        ("b", optional(string())),
        ("c", readonly(array(number()))),
    ]);
    assert!(parse(&schema, &value!({ "a": null, "c": [] })).is_ok());
    let issues = issues_of(&schema, &value!({ "b": null, "c": [] }));
    let paths: Vec<_> = issues.iter().map(|i| i.dotted_path().unwrap()).collect();
    assert_eq!(paths, vec!["a", "b"]);
}

#[test]
fn test_transforms() {
    let user = object([
        ("id", number()),
        ("name", string()),
        ("email", optional(string())),
    ]);
    let input = value!({ "id": 1, "name": "n" });

    assert!(parse(&required(&user).unwrap(), &input).is_err());
    assert!(parse(&partial(&user).unwrap(), &value!({})).is_ok());
    assert!(parse(&pick(&user, &["id"]).unwrap(), &input).is_ok());
    assert_eq!(
        *parse(&omit(&user, &["name"]).unwrap(), &input).unwrap(),
        value!({ "id": 1 })
    );
    assert!(is(&keyof(&user).unwrap(), &value!("email")));
    assert!(pick(&user, &["missing"]).is_err());
}

#[test]
fn test_custom_messages() {
    let schema = object([
        ("age", number().message("age must be a number")),
        (
            "name",
            string().min_length(2).message(Message::func(|issue| {
                format!("bad {} ({})", issue.type_name, issue.received)
            })),
        ),
    ]);
    let issues = issues_of(&schema, &value!({ "age": "x", "name": 1 }));
    assert_eq!(issues[0].message, "age must be a number");
    assert_eq!(issues[1].message, "bad string (1)");

    let flat = flatten(&issues);
    assert_eq!(flat.nested["age"], vec!["age must be a number".to_string()]);
}

#[test]
fn test_custom_schema() {
    let even = custom("even number", |v| v.as_i64().map_or(false, |n| n % 2 == 0));
    assert!(is(&even, &value!(2)));
    let issues = issues_of(&even, &value!(3));
    assert_eq!(
        issues[0].message,
        "Invalid type: Expected even number but received 3"
    );
}

#[test]
fn test_lang_is_carried() {
    let options = ParseOptions::new().with_lang("fr");
    let err = parse_with(&string(), &value!(1), &options).unwrap_err();
    assert_eq!(err.issues()[0].lang.as_deref(), Some("fr"));
}

#[test]
fn test_bulk_independence() {
    let schema = object([("n", coerce_number())]);
    let values = vec![
        value!({ "n": "1" }),
        value!({ "n": "x" }),
        value!({ "n": 3 }),
    ];
    let results = parse_bulk(&schema, &values);
    assert_eq!(results.len(), 3);
    assert_eq!(*results[0].as_ref().unwrap().as_ref(), value!({ "n": 1 }));
    assert!(results[1].is_err());
    assert!(matches!(results[2], Ok(Cow::Borrowed(_))));

    for (value, result) in values.iter().zip(&results) {
        assert_eq!(result.is_ok(), parse(&schema, value).is_ok());
    }
}

#[test]
fn test_schemas_are_shareable_across_threads() {
    let schema = object([("a", number()), ("b", string())]);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let schema = schema.clone();
            std::thread::spawn(move || is(&schema, &value!({ "a": i, "b": "x" })))
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
