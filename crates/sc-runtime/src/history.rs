//! Action history of a style context.

use std::fmt;
use std::time::Duration;

use sc_core::NodeId;
use web_time::Instant;

use crate::reactive::BindMode;

/// What a context did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    /// An element was created from a tag name.
    Created,
    /// A selector was resolved and its elements registered.
    Lookup,
    /// A fallback lookup through a scoped class selector.
    ScopedLookup(String),
    ClassAdded(String),
    ClassRemoved(String),
    InlineCleared,
    ClassesCleared,
    Removed,
    Emptied,
    /// A named (or generated) style was applied inline.
    InlineStyle(String),
    /// Literal declarations were merged into the inline style.
    InlineDeclarations,
    /// A binding target was added.
    Bound(BindMode),
    /// An SC rule was applied.
    RuleApplied(String),
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Lookup => f.write_str("lookup"),
            Self::ScopedLookup(selector) => write!(f, "lookup via {selector}"),
            Self::ClassAdded(class) => write!(f, "class {class} added"),
            Self::ClassRemoved(class) => write!(f, "class {class} removed"),
            Self::InlineCleared => f.write_str("inline style cleared"),
            Self::ClassesCleared => f.write_str("classes cleared"),
            Self::Removed => f.write_str("removed"),
            Self::Emptied => f.write_str("children removed"),
            Self::InlineStyle(name) => write!(f, "inline style {name}"),
            Self::InlineDeclarations => f.write_str("inline declarations"),
            Self::Bound(mode) => write!(f, "bound ({mode:?})"),
            Self::RuleApplied(rule) => write!(f, "rule {rule} applied"),
        }
    }
}

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub action: HistoryAction,
    pub nodes: Vec<NodeId>,
    /// Time since the context was created.
    pub elapsed: Duration,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SC_LOG | +{}ms - {} ({} node{})",
            self.elapsed.as_millis(),
            self.action,
            self.nodes.len(),
            if self.nodes.len() == 1 { "" } else { "s" }
        )
    }
}

/// Append-only action log.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    started: Instant,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            started: Instant::now(),
        }
    }

    pub fn push(&mut self, action: HistoryAction, nodes: &[NodeId]) {
        self.entries.push(HistoryEntry {
            action,
            nodes: nodes.to_vec(),
            elapsed: self.started.elapsed(),
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Actions only, oldest first.
    pub fn actions(&self) -> impl Iterator<Item = &HistoryAction> {
        self.entries.iter().map(|e| &e.action)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_display() {
        let entry = HistoryEntry {
            action: HistoryAction::ClassAdded(".btn".into()),
            nodes: vec![NodeId(1), NodeId(2)],
            elapsed: Duration::from_millis(12),
        };
        assert_eq!(entry.to_string(), "SC_LOG | +12ms - class .btn added (2 nodes)");
    }

    #[test]
    fn push_keeps_order() {
        let mut history = History::new();
        history.push(HistoryAction::Lookup, &[NodeId(1)]);
        history.push(HistoryAction::Removed, &[]);
        let actions: Vec<_> = history.actions().cloned().collect();
        assert_eq!(actions, vec![HistoryAction::Lookup, HistoryAction::Removed]);
    }
}
