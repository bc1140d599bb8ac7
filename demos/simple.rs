//! Validating request-like data with objects, coercion and defaults.
//!
//! Run with: cargo run --example simple

use schemata::{
    array, coerce_number, flatten, object, optional, parse, picklist, string, value,
    with_default,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let signup = object([
        ("name", string().min_length(1)),
        ("email", string().refine("email", |v| v.as_str().map_or(false, |s| s.contains('@')))),
        ("age", optional(coerce_number().integer().min_value(13.0))),
        ("plan", with_default(picklist(["free", "pro"]), "free")),
        ("tags", array(string()).max_length(3)),
    ]);

    // Valid input: "age" is coerced and "plan" gets its default
    let input = value!({
        "name": "Ada",
        "email": "ada@example.com",
        "age": "36",
        "tags": ["admin"]
    });
    let output = parse(&signup, &input)?;
    println!("Parsed: {}\n", *output);

    // Invalid input: every issue is reported with its path
    let input = value!({
        "name": "",
        "email": "nope",
        "age": "twelve",
        "plan": "enterprise",
        "tags": ["a", "b", "c", "d"]
    });
    let err = parse(&signup, &input).unwrap_err();
    println!("Issues:\n{}\n", err);

    // Grouped by field, e.g. for a form
    let flat = flatten(err.issues());
    for (field, messages) in &flat.nested {
        println!("{:>6}: {}", field, messages.join("; "));
    }

    Ok(())
}
