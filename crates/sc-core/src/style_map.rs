//! Ordered CSS property maps.

use std::fmt;

use crate::value::Value;

/// An ordered map of CSS property to value.
///
/// Insertion order is kept so generated CSS text and duplicate-content
/// checks are deterministic. Setting an existing property replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StyleMap {
    entries: Vec<(String, String)>,
}

impl StyleMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any previous value.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((property, value)),
        }
    }

    /// Builder form of [`StyleMap::set`].
    #[must_use]
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    /// Value of a property.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a property, returning its value.
    pub fn remove(&mut self, property: &str) -> Option<String> {
        let index = self.entries.iter().position(|(p, _)| p == property)?;
        Some(self.entries.remove(index).1)
    }

    /// Overlay every property of `other` onto `self`.
    pub fn merge(&mut self, other: &StyleMap) {
        for (property, value) in other.iter() {
            self.set(property, value);
        }
    }

    /// Iterate properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a map from a JSON object whose values are strings or numbers.
    ///
    /// Returns `None` for anything else.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut map = Self::new();
        for (property, value) in object {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            map.set(property.as_str(), text);
        }
        Some(map)
    }

    /// JSON object form of this map.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(p, v)| (p.to_owned(), Value::String(v.to_owned())))
                .collect(),
        )
    }
}

impl fmt::Display for StyleMap {
    /// Renders as CSS declaration text: `color:red;margin:0;`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (property, value) in self.iter() {
            write!(f, "{property}:{value};")?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (property, value) in iter {
            map.set(property, value);
        }
        map
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for StyleMap {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_replaces_in_place() {
        let mut map = StyleMap::from([("color", "red"), ("margin", "0")]);
        map.set("color", "blue");
        let props: Vec<_> = map.iter().collect();
        assert_eq!(props, vec![("color", "blue"), ("margin", "0")]);
    }

    #[test]
    fn merge_overlays() {
        let mut base = StyleMap::from([("color", "red"), ("padding", "1px")]);
        base.merge(&StyleMap::from([("color", "green"), ("border", "none")]));
        assert_eq!(base.to_string(), "color:green;padding:1px;border:none;");
    }

    #[test]
    fn remove_property() {
        let mut map = StyleMap::new().with("a", "1").with("b", "2");
        assert_eq!(map.remove("a").as_deref(), Some("1"));
        assert_eq!(map.remove("a"), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn from_json_object() {
        let map = StyleMap::from_json(&json!({"color": "red", "z-index": 3})).unwrap();
        assert_eq!(map.get("color"), Some("red"));
        assert_eq!(map.get("z-index"), Some("3"));
        assert!(StyleMap::from_json(&json!({"color": ["red"]})).is_none());
        assert!(StyleMap::from_json(&json!("red")).is_none());
    }

    #[test]
    fn json_round_keeps_order() {
        let map = StyleMap::from([("b", "2"), ("a", "1")]);
        assert_eq!(map.to_json().to_string(), r#"{"b":"2","a":"1"}"#);
    }
}
