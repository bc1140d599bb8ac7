use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use schemata::{
    array, boolean, coerce_number, is, number, object, optional, parse, parse_bulk, parse_with,
    string, union, value, ParseOptions, Schema, Value,
};

fn user_schema() -> Schema {
    object([
        ("id", number()),
        ("name", string()),
        ("email", string()),
        ("active", boolean()),
        ("nickname", optional(string())),
    ])
}

fn user(i: i64) -> Value {
    let name = format!("User {}", i);
    let email = format!("user{}@example.com", i);
    let active = i % 2 == 0;
    value!({ "id": i, "name": name, "email": email, "active": active })
}

fn benchmark_object_valid(c: &mut Criterion) {
    let schema = user_schema();
    let input = user(1);

    c.bench_function("object_valid", |b| {
        b.iter(|| parse(black_box(&schema), black_box(&input)).is_ok())
    });
}

// The abort-early path never uses the compiled plan, so this compares the
// generic object validator against the one above.
fn benchmark_object_generic(c: &mut Criterion) {
    let schema = user_schema();
    let input = user(1);
    let options = ParseOptions::new().with_abort_early(true);

    c.bench_function("object_valid_generic", |b| {
        b.iter(|| parse_with(black_box(&schema), black_box(&input), &options).is_ok())
    });
}

fn benchmark_object_invalid(c: &mut Criterion) {
    let schema = user_schema();
    let input = value!({ "id": "1", "name": 2, "email": null, "active": "yes" });

    c.bench_function("object_invalid_all_issues", |b| {
        b.iter(|| parse(black_box(&schema), black_box(&input)).is_err())
    });
}

fn benchmark_array_of_objects(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_of_objects");
    let schema = array(user_schema());

    for size in [10, 100, 1000].iter() {
        let input = Value::Array((0..*size as i64).map(user).collect());
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| parse(black_box(&schema), black_box(input)).is_ok())
        });
    }
    group.finish();
}

fn benchmark_coercion(c: &mut Criterion) {
    let schema = object([("page", coerce_number()), ("size", coerce_number())]);
    let input = value!({ "page": "3", "size": "25" });

    c.bench_function("coerce_object", |b| {
        b.iter(|| parse(black_box(&schema), black_box(&input)).is_ok())
    });
}

fn benchmark_union(c: &mut Criterion) {
    let schema = union([number(), string(), boolean()]);
    let values = [Value::from(1), Value::from("a"), Value::from(true), Value::Null];

    c.bench_function("union_members", |b| {
        b.iter(|| {
            values
                .iter()
                .filter(|v| is(black_box(&schema), v))
                .count()
        })
    });
}

fn benchmark_bulk(c: &mut Criterion) {
    let schema = user_schema();
    let values: Vec<Value> = (0..500).map(user).collect();

    c.bench_function("parse_bulk_500", |b| {
        b.iter(|| parse_bulk(black_box(&schema), black_box(&values)).len())
    });
}

criterion_group!(
    benches,
    benchmark_object_valid,
    benchmark_object_generic,
    benchmark_object_invalid,
    benchmark_array_of_objects,
    benchmark_coercion,
    benchmark_union,
    benchmark_bulk
);
criterion_main!(benches);
