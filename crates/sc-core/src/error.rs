//! Error taxonomy shared by every SC crate.
//!
//! # Propagation policy
//!
//! | Variant | Raised by | Behavior |
//! |---------|-----------|----------|
//! | `Configuration` | unregistered target, mode mismatch | reported, call aborted |
//! | `Lookup` | unknown style, class, rule | reported, degrades to no-op |
//! | `Type` | write through a non-container | returned to the caller of `set` |
//! | `Parse` | malformed rule or declaration text | reported, input skipped |
//! | `Duplicate` | repeated names or contents | error for names, warning otherwise |

use std::fmt;

/// What a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    /// A named style record.
    Style,
    /// The style table has no records at all.
    EmptyTable,
    /// A tracked CSS class.
    Class,
    /// An SC rule.
    Rule,
    /// A payload that does not describe any style instruction.
    Instruction,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Style => "style",
            Self::EmptyTable => "style table",
            Self::Class => "css class",
            Self::Rule => "sc rule",
            Self::Instruction => "style instruction",
        };
        f.write_str(label)
    }
}

/// What a duplicate report is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DuplicateKind {
    /// Two style records share a name.
    StyleName,
    /// Two style records share the same declarations.
    StyleContent,
    /// Two tracked stylesheet rules share a selector.
    Selector,
}

/// Errors from SC operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ScError {
    /// A reactive or per-element call was made against a target that the
    /// context never registered, or against a binding in another mode.
    Configuration(String),
    /// A named style, class, or rule was not found.
    Lookup { kind: LookupKind, name: String },
    /// A nested write went through a value that is not an object or array.
    Type { path: String, found: &'static str },
    /// Rule or declaration text could not be parsed.
    Parse { context: &'static str, message: String },
    /// Names (or contents) that must be unique were repeated.
    Duplicate { kind: DuplicateKind, names: Vec<String> },
}

impl ScError {
    /// Shorthand for a lookup failure.
    pub fn lookup(kind: LookupKind, name: impl Into<String>) -> Self {
        Self::Lookup {
            kind,
            name: name.into(),
        }
    }

    /// Shorthand for a configuration failure.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether this error is fatal to the call that produced it.
    ///
    /// Only structural misuse is fatal; everything else is reported and the
    /// remaining targets of a dispatch still render.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Type { .. })
    }
}

impl fmt::Display for ScError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Self::Lookup {
                kind: LookupKind::EmptyTable,
                name,
            } => write!(f, "no styles registered, cannot resolve '{name}'"),
            Self::Lookup { kind, name } => write!(f, "{kind} not found: '{name}'"),
            Self::Type { path, found } => {
                write!(f, "cannot write through '{path}': value is {found}")
            }
            Self::Parse { context, message } => write!(f, "parse error in {context}: {message}"),
            Self::Duplicate { kind, names } => {
                let what = match kind {
                    DuplicateKind::StyleName => "duplicate style names",
                    DuplicateKind::StyleContent => "duplicate style contents",
                    DuplicateKind::Selector => "duplicate css selectors",
                };
                write!(f, "{what}: {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for ScError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lookup() {
        let err = ScError::lookup(LookupKind::Style, "hero");
        assert_eq!(err.to_string(), "style not found: 'hero'");
    }

    #[test]
    fn display_empty_table() {
        let err = ScError::lookup(LookupKind::EmptyTable, "hero");
        assert!(err.to_string().contains("no styles registered"));
    }

    #[test]
    fn display_duplicate_lists_names() {
        let err = ScError::Duplicate {
            kind: DuplicateKind::StyleName,
            names: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "duplicate style names: a, b");
    }

    #[test]
    fn only_type_errors_are_fatal() {
        assert!(
            ScError::Type {
                path: "value.a".into(),
                found: "a string"
            }
            .is_fatal()
        );
        assert!(!ScError::configuration("x").is_fatal());
        assert!(!ScError::lookup(LookupKind::Class, ".btn").is_fatal());
    }
}
