//! Self-referential schemas with `lazy` and `recursive`.
//!
//! Run with: cargo run --example recursive

use schemata::{
    array, lazy, nullable, number, object, parse, recursive, string, value, Schema,
};

fn comment() -> Schema {
    object([
        ("author", string()),
        ("score", nullable(number())),
        ("replies", array(lazy(comment))),
    ])
}

fn main() {
    let thread = value!({
        "author": "ada",
        "score": 10,
        "replies": [
            { "author": "grace", "score": null, "replies": [] },
            {
                "author": "alan",
                "score": 3,
                "replies": [{ "author": 42, "score": "high", "replies": [] }]
            }
        ]
    });

    // The same shape, tied into one knot instead of resolved through `fn`.
    let knotted = recursive(|reply| {
        object([
            ("author", string()),
            ("score", nullable(number())),
            ("replies", array(reply)),
        ])
    });
    println!("Knotted schema rejects it too: {}", parse(&knotted, &thread).is_err());

    match parse(&comment(), &thread) {
        Ok(_) => println!("Thread is valid"),
        Err(err) => {
            for issue in err.issues() {
                println!(
                    "{} at {}",
                    issue.message,
                    issue.dotted_path().unwrap_or_default()
                );
            }
        }
    }
}
