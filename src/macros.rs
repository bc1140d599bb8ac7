/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// ```rust
/// use schemata::{value, Value};
///
/// let v = value!({ "id": 1, "tags": ["a", "b"], "owner": null });
/// assert_eq!(v.get("id"), Some(&Value::from(1)));
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::ValueMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::ValueMap::new();
        $(
            object.insert($key.to_string(), $crate::value!($value));
        )*
        $crate::Value::Object(object)
    }};

    // Any other expression goes through `From`.
    ($other:expr) => {
        $crate::Value::from($other)
    };
}
