//! CSS declaration text.
//!
//! Parsing is lenient: pieces without a `:` or with an empty property are
//! skipped, and a repeated property keeps its last value, as a browser does.

use sc_core::StyleMap;

/// Parse declaration text, with or without surrounding braces.
///
/// `"{color: red; margin: 0}"` and `"color:red;margin:0"` give the same map.
#[must_use]
pub fn parse(text: &str) -> StyleMap {
    let text = text.trim();
    let text = text.strip_prefix('{').unwrap_or(text);
    let text = text.strip_suffix('}').unwrap_or(text);

    let mut map = StyleMap::new();
    for piece in text.split(';') {
        let Some((property, value)) = piece.split_once(':') else {
            continue;
        };
        let property = property.trim();
        if property.is_empty() {
            continue;
        }
        map.set(property, value.trim());
    }
    map
}

/// Render declarations as CSS text (`color:red;margin:0;`).
#[must_use]
pub fn to_css_text(map: &StyleMap) -> String {
    map.to_string()
}

/// Render a full rule (`.btn{color:red;}`).
#[must_use]
pub fn rule_text(selector: &str, map: &StyleMap) -> String {
    format!("{selector}{{{map}}}")
}
