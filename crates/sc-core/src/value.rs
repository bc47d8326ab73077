//! Observable payloads and their tracked (comparison) form.
//!
//! Payloads are JSON-shaped [`Value`]s. Containers (objects and arrays) are
//! compared by their serialized text, which is stable and preserves key
//! insertion order, so `{"a":1}` written twice compares equal while the
//! payload handed to renderers stays the original value.

pub use serde_json::Value;

/// Whether a value is an object or an array.
#[inline]
#[must_use]
pub fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Short human description of a value's shape, for error messages.
#[must_use]
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The form in which a binding remembers the last value it rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum Tracked {
    /// A scalar kept as-is.
    Plain(Value),
    /// A container kept as its serialized text.
    Serialized(String),
}

impl Tracked {
    /// Normalize a value for equality tracking.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        if is_container(value) {
            Self::Serialized(value.to_string())
        } else {
            Self::Plain(value.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn scalars_stay_plain() {
        assert_eq!(Tracked::of(&json!("red")), Tracked::Plain(json!("red")));
        assert_eq!(Tracked::of(&json!(3)), Tracked::Plain(json!(3)));
        assert_eq!(Tracked::of(&Value::Null), Tracked::Plain(Value::Null));
    }

    #[test]
    fn containers_serialize() {
        assert_eq!(
            Tracked::of(&json!({"a": 1})),
            Tracked::Serialized(r#"{"a":1}"#.into())
        );
        assert_eq!(
            Tracked::of(&json!([1, 2])),
            Tracked::Serialized("[1,2]".into())
        );
    }

    #[test]
    fn equal_objects_track_equal() {
        assert_eq!(Tracked::of(&json!({"a": 1})), Tracked::of(&json!({"a": 1})));
        assert_ne!(Tracked::of(&json!({"a": 1})), Tracked::of(&json!({"a": 2})));
    }

    #[test]
    fn key_order_is_preserved() {
        let ab = json!({"a": 1, "b": 2});
        let ba = json!({"b": 2, "a": 1});
        assert_eq!(ab.to_string(), r#"{"a":1,"b":2}"#);
        assert_ne!(Tracked::of(&ab), Tracked::of(&ba));
    }

    #[test]
    fn string_never_equals_serialized_object() {
        let text = json!(r#"{"a":1}"#);
        assert_ne!(Tracked::of(&text), Tracked::of(&json!({"a": 1})));
    }

    fn object(entries: &[(String, i64)]) -> Value {
        let mut map = serde_json::Map::new();
        for (key, value) in entries {
            map.insert(key.clone(), json!(value));
        }
        Value::Object(map)
    }

    proptest! {
        #[test]
        fn tracking_agrees_with_structural_equality(
            a in proptest::collection::vec(("[a-c]", 0i64..3), 0..4),
            b in proptest::collection::vec(("[a-c]", 0i64..3), 0..4),
        ) {
            let (a, b) = (object(&a), object(&b));
            prop_assert_eq!(Tracked::of(&a) == Tracked::of(&b), a.to_string() == b.to_string());
            prop_assert_eq!(Tracked::of(&a), Tracked::of(&a.clone()));
        }
    }

    #[test]
    fn kind_descriptions() {
        assert_eq!(kind_of(&json!(true)), "a boolean");
        assert_eq!(kind_of(&json!({})), "an object");
        assert!(is_container(&json!([])));
        assert!(!is_container(&Value::Null));
    }
}
