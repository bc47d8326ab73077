//! DOM capability consumed by the style engine.
//!
//! The engine never touches a browser directly. It resolves targets and
//! applies mutations through a [`DomHost`], which a page integration (or
//! [`MemoryDom`](crate::MemoryDom) in tests) provides.

use crate::style_map::StyleMap;

/// Attribute carrying the id of the context that registered an element.
pub const SC_ATTR: &str = "sc";

/// Opaque handle to a DOM element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// A selector-like value that resolves to zero or more elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A CSS selector string.
    Css(String),
    /// Element handles resolved earlier. Handles that are no longer live
    /// resolve to nothing.
    Nodes(Vec<NodeId>),
}

impl Selector {
    /// The CSS text, if this is a CSS selector.
    #[must_use]
    pub fn as_css(&self) -> Option<&str> {
        match self {
            Self::Css(text) => Some(text),
            Self::Nodes(_) => None,
        }
    }
}

impl From<&str> for Selector {
    fn from(text: &str) -> Self {
        Self::Css(text.to_owned())
    }
}

impl From<String> for Selector {
    fn from(text: String) -> Self {
        Self::Css(text)
    }
}

impl From<NodeId> for Selector {
    fn from(node: NodeId) -> Self {
        Self::Nodes(vec![node])
    }
}

impl From<Vec<NodeId>> for Selector {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self::Nodes(nodes)
    }
}

impl From<&[NodeId]> for Selector {
    fn from(nodes: &[NodeId]) -> Self {
        Self::Nodes(nodes.to_vec())
    }
}

/// A single mutation applied to one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomOp {
    /// Add a class name (without the leading dot).
    AddClass(String),
    /// Remove a class name (without the leading dot).
    RemoveClass(String),
    /// Remove every class.
    ClearClasses,
    /// Set an attribute.
    SetAttribute { name: String, value: String },
    /// Remove an attribute.
    RemoveAttribute(String),
    /// Merge properties into the inline style.
    SetStyle(StyleMap),
    /// Drop the inline style attribute.
    ClearStyle,
    /// Remove every child.
    Empty,
    /// Detach the element.
    Remove,
}

/// Selector resolution and element mutation.
///
/// Implementations must treat operations on handles that are no longer live
/// as no-ops.
pub trait DomHost {
    /// Resolve a selector to live elements, in document order.
    fn select(&self, selector: &Selector) -> Vec<NodeId>;

    /// Apply one operation to one element.
    fn apply(&mut self, node: NodeId, op: &DomOp);

    /// Read an attribute.
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Whether the element carries a class (without the leading dot).
    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Create a detached element with the given lower-case tag name.
    fn create_element(&mut self, tag: &str) -> NodeId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_conversions() {
        assert_eq!(Selector::from("#app"), Selector::Css("#app".into()));
        assert_eq!(Selector::from(NodeId(3)), Selector::Nodes(vec![NodeId(3)]));
        assert_eq!(Selector::from("#app").as_css(), Some("#app"));
        assert_eq!(Selector::from(vec![NodeId(1)]).as_css(), None);
    }
}
