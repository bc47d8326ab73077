//! Style instructions: the small command language of `stylize`.
//!
//! | Text | Instruction |
//! |------|-------------|
//! | `.btn` | add the scoped class for `.btn` |
//! | `-btn` | remove the scoped class for `.btn` |
//! | `!line` | drop the inline style |
//! | `!class` | drop every class |
//! | `*remove` | detach the element |
//! | `*empty` | remove every child |
//! | anything else | replace the inline style with the named style record |
//!
//! Payload values decode the same way: strings parse as above, arrays are
//! batches, and objects are literal inline declarations.

use sc_core::{LookupKind, ScError, StyleMap, Value};

/// Sentinel payload that clears a target's children.
pub const CLEAR_CHILDREN: &str = "*empty";
/// Sentinel payload that detaches a target.
pub const REMOVE_NODE: &str = "*remove";

const CLEAR_INLINE: &str = "!line";
const CLEAR_CLASSES: &str = "!class";

/// One stylize command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleInstruction {
    /// Add the scoped class for a tracked class (`.btn`).
    AddClass(String),
    /// Remove the scoped class for a tracked class (`.btn`).
    RemoveClass(String),
    ClearInline,
    ClearClasses,
    Remove,
    Empty,
    /// Apply each instruction in order.
    Batch(Vec<StyleInstruction>),
    /// Merge literal declarations into the inline style.
    Inline(StyleMap),
    /// Replace the inline style with a named style record.
    Named(String),
}

impl StyleInstruction {
    /// Parse instruction text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text {
            CLEAR_INLINE => Self::ClearInline,
            CLEAR_CLASSES => Self::ClearClasses,
            REMOVE_NODE => Self::Remove,
            CLEAR_CHILDREN => Self::Empty,
            _ if text.starts_with('.') => Self::AddClass(text.to_owned()),
            _ => match text.strip_prefix('-') {
                Some(class) => Self::RemoveClass(format!(".{class}")),
                None => Self::Named(text.to_owned()),
            },
        }
    }

    /// Decode a payload value.
    pub fn from_value(value: &Value) -> Result<Self, ScError> {
        match value {
            Value::String(text) => Ok(Self::parse(text)),
            Value::Number(n) => Ok(Self::Named(n.to_string())),
            Value::Array(items) => items
                .iter()
                .map(Self::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Batch),
            Value::Object(_) => StyleMap::from_json(value)
                .map(Self::Inline)
                .ok_or_else(|| ScError::lookup(LookupKind::Instruction, value.to_string())),
            Value::Null | Value::Bool(_) => {
                Err(ScError::lookup(LookupKind::Instruction, value.to_string()))
            }
        }
    }
}

impl From<&str> for StyleInstruction {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<StyleMap> for StyleInstruction {
    fn from(map: StyleMap) -> Self {
        Self::Inline(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_command_text() {
        assert_eq!(StyleInstruction::parse(".btn"), StyleInstruction::AddClass(".btn".into()));
        assert_eq!(StyleInstruction::parse("-btn"), StyleInstruction::RemoveClass(".btn".into()));
        assert_eq!(StyleInstruction::parse("!line"), StyleInstruction::ClearInline);
        assert_eq!(StyleInstruction::parse("!class"), StyleInstruction::ClearClasses);
        assert_eq!(StyleInstruction::parse("*remove"), StyleInstruction::Remove);
        assert_eq!(StyleInstruction::parse("*empty"), StyleInstruction::Empty);
        assert_eq!(StyleInstruction::parse("hero"), StyleInstruction::Named("hero".into()));
    }

    #[test]
    fn decodes_payloads() {
        assert_eq!(
            StyleInstruction::from_value(&json!([".a", "-a"])).unwrap(),
            StyleInstruction::Batch(vec![
                StyleInstruction::AddClass(".a".into()),
                StyleInstruction::RemoveClass(".a".into()),
            ])
        );
        assert_eq!(
            StyleInstruction::from_value(&json!({"color": "red"})).unwrap(),
            StyleInstruction::Inline(StyleMap::from([("color", "red")]))
        );
        assert_eq!(
            StyleInstruction::from_value(&json!(2)).unwrap(),
            StyleInstruction::Named("2".into())
        );
    }

    #[test]
    fn rejects_shapeless_payloads() {
        for value in [json!(null), json!(true), json!({"color": ["red"]}), json!([".a", null])] {
            assert!(matches!(
                StyleInstruction::from_value(&value),
                Err(ScError::Lookup {
                    kind: LookupKind::Instruction,
                    ..
                })
            ));
        }
    }
}
