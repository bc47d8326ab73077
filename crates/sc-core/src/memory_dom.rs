//! Headless DOM for tests and non-browser hosts.
//!
//! `MemoryDom` is a small element tree implementing [`DomHost`]. It is
//! designed for:
//!
//! - **Unit and integration tests** that need to observe exactly which
//!   mutations a dispatch produced (see [`MemoryDom::ops`])
//! - **Headless hosts** that want SC semantics without a browser
//!
//! # Selector support
//!
//! Comma-separated groups of compound selectors joined by descendant
//! combinators: `div`, `*`, `#id`, `.class`, `[attr]`, `[attr=value]`.
//! Pseudo-classes and other combinators never match.
//!
//! # Example
//!
//! ```
//! use sc_core::{DomHost, DomOp, MemoryDom, Selector};
//!
//! let mut dom = MemoryDom::new();
//! let card = dom.insert(dom.root(), "div#card.panel");
//! dom.apply(card, &DomOp::AddClass("active".into()));
//!
//! assert_eq!(dom.select(&Selector::from(".panel.active")), vec![card]);
//! ```

use ahash::AHashMap;

use crate::dom::{DomHost, DomOp, NodeId, Selector};
use crate::style_map::StyleMap;

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    style: StyleMap,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// An in-memory element tree with an operation log.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: AHashMap<NodeId, Element>,
    root: NodeId,
    next_id: u64,
    log: Vec<(NodeId, DomOp)>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Create a document containing only a `body` root.
    #[must_use]
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = AHashMap::new();
        nodes.insert(root, Element::new("body"));
        Self {
            nodes,
            root,
            next_id: 1,
            log: Vec::new(),
        }
    }

    /// The document root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Append a child described by `tag#id.class.class` under `parent`.
    ///
    /// Setup through this method is not recorded in the operation log.
    pub fn insert(&mut self, parent: NodeId, spec: &str) -> NodeId {
        let (tag, id, classes) = split_spec(spec);
        let node = self.alloc(Element::new(if tag.is_empty() { "div" } else { tag }));
        if let Some(element) = self.nodes.get_mut(&node) {
            if let Some(id) = id {
                element.attributes.push(("id".into(), id.into()));
            }
            element.classes = classes.into_iter().map(str::to_owned).collect();
        }
        self.attach(parent, node);
        node
    }

    /// Attach a (possibly detached) element as the last child of `parent`.
    pub fn attach(&mut self, parent: NodeId, node: NodeId) {
        if !self.nodes.contains_key(&parent) || !self.nodes.contains_key(&node) {
            return;
        }
        self.detach(node);
        if let Some(element) = self.nodes.get_mut(&node) {
            element.parent = Some(parent);
        }
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.push(node);
        }
    }

    /// Whether a handle still refers to a live element.
    #[must_use]
    pub fn exists(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Children of an element, in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&node)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    /// Class list of an element.
    #[must_use]
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.nodes
            .get(&node)
            .map(|e| e.classes.clone())
            .unwrap_or_default()
    }

    /// Inline style of an element.
    #[must_use]
    pub fn inline_style(&self, node: NodeId) -> StyleMap {
        self.nodes
            .get(&node)
            .map(|e| e.style.clone())
            .unwrap_or_default()
    }

    /// Tag name of an element.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|e| e.tag.as_str())
    }

    /// Every operation applied to a live element, in order.
    #[must_use]
    pub fn ops(&self) -> &[(NodeId, DomOp)] {
        &self.log
    }

    /// Operations applied to one element.
    #[must_use]
    pub fn ops_for(&self, node: NodeId) -> Vec<DomOp> {
        self.log
            .iter()
            .filter(|(n, _)| *n == node)
            .map(|(_, op)| op.clone())
            .collect()
    }

    /// Drain the operation log.
    pub fn take_ops(&mut self) -> Vec<(NodeId, DomOp)> {
        std::mem::take(&mut self.log)
    }

    fn alloc(&mut self, element: Element) -> NodeId {
        let node = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(node, element);
        node
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.nodes.get_mut(&node).and_then(|e| e.parent.take());
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != node);
        }
    }

    fn drop_subtree(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(element) = self.nodes.remove(&current) {
                stack.extend(element.children);
            }
        }
    }

    fn document_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            order.push(node);
            if let Some(element) = self.nodes.get(&node) {
                stack.extend(element.children.iter().rev());
            }
        }
        order
    }

    fn matches_compound(&self, node: NodeId, compound: &Compound) -> bool {
        let Some(element) = self.nodes.get(&node) else {
            return false;
        };
        if compound.unsupported {
            return false;
        }
        let tag_ok = compound
            .tag
            .as_deref()
            .is_none_or(|tag| tag == "*" || tag.eq_ignore_ascii_case(&element.tag));
        let id_ok = compound
            .id
            .as_deref()
            .is_none_or(|id| element.attribute("id") == Some(id));
        if !tag_ok || !id_ok {
            return false;
        }
        if !compound
            .classes
            .iter()
            .all(|c| element.classes.iter().any(|have| have == c))
        {
            return false;
        }
        compound.attrs.iter().all(|(name, value)| {
            match (element.attribute(name), value) {
                (Some(have), Some(want)) => have == want,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }

    fn matches_complex(&self, node: NodeId, compounds: &[Compound]) -> bool {
        let Some((last, ancestors)) = compounds.split_last() else {
            return false;
        };
        if !self.matches_compound(node, last) {
            return false;
        }
        let mut cursor = self.nodes.get(&node).and_then(|e| e.parent);
        for compound in ancestors.iter().rev() {
            loop {
                let Some(candidate) = cursor else {
                    return false;
                };
                cursor = self.nodes.get(&candidate).and_then(|e| e.parent);
                if self.matches_compound(candidate, compound) {
                    break;
                }
            }
        }
        true
    }
}

impl DomHost for MemoryDom {
    fn select(&self, selector: &Selector) -> Vec<NodeId> {
        match selector {
            Selector::Nodes(nodes) => nodes
                .iter()
                .copied()
                .filter(|n| self.nodes.contains_key(n))
                .collect(),
            Selector::Css(text) => {
                let groups = parse_selector(text);
                if groups.is_empty() {
                    return Vec::new();
                }
                self.document_order()
                    .into_iter()
                    .filter(|node| groups.iter().any(|g| self.matches_complex(*node, g)))
                    .collect()
            }
        }
    }

    fn apply(&mut self, node: NodeId, op: &DomOp) {
        if !self.nodes.contains_key(&node) {
            return;
        }
        self.log.push((node, op.clone()));
        match op {
            DomOp::Remove => {
                self.detach(node);
                self.drop_subtree(node);
            }
            DomOp::Empty => {
                let children = self
                    .nodes
                    .get_mut(&node)
                    .map(|e| std::mem::take(&mut e.children))
                    .unwrap_or_default();
                for child in children {
                    self.drop_subtree(child);
                }
            }
            _ => {
                let Some(element) = self.nodes.get_mut(&node) else {
                    return;
                };
                match op {
                    DomOp::AddClass(class) => {
                        if !element.classes.iter().any(|c| c == class) {
                            element.classes.push(class.clone());
                        }
                    }
                    DomOp::RemoveClass(class) => element.classes.retain(|c| c != class),
                    DomOp::ClearClasses => element.classes.clear(),
                    DomOp::SetAttribute { name, value } => {
                        match element.attributes.iter_mut().find(|(n, _)| n == name) {
                            Some(slot) => slot.1 = value.clone(),
                            None => element.attributes.push((name.clone(), value.clone())),
                        }
                    }
                    DomOp::RemoveAttribute(name) => element.attributes.retain(|(n, _)| n != name),
                    DomOp::SetStyle(style) => element.style.merge(style),
                    DomOp::ClearStyle => element.style = StyleMap::new(),
                    DomOp::Empty | DomOp::Remove => {}
                }
            }
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes
            .get(&node)
            .and_then(|e| e.attribute(name))
            .map(str::to_owned)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(&node)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Element::new(tag))
    }
}

// ---------------------------------------------------------------------------
// Selector parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
    unsupported: bool,
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn split_spec(spec: &str) -> (&str, Option<&str>, Vec<&str>) {
    let tag_end = spec.find(['#', '.']).unwrap_or(spec.len());
    let (tag, rest) = spec.split_at(tag_end);
    let mut id = None;
    let mut classes = Vec::new();
    let marks: Vec<usize> = rest
        .char_indices()
        .filter(|(_, c)| *c == '#' || *c == '.')
        .map(|(i, _)| i)
        .collect();
    for (i, pos) in marks.iter().enumerate() {
        let end = marks.get(i + 1).copied().unwrap_or(rest.len());
        let name = &rest[pos + 1..end];
        if name.is_empty() {
            continue;
        }
        if rest[*pos..].starts_with('#') {
            id = Some(name);
        } else {
            classes.push(name);
        }
    }
    (tag, id, classes)
}

fn parse_selector(text: &str) -> Vec<Vec<Compound>> {
    text.split(',')
        .map(|group| {
            group
                .split_whitespace()
                .map(parse_compound)
                .collect::<Vec<_>>()
        })
        .filter(|group| !group.is_empty())
        .collect()
}

fn parse_compound(text: &str) -> Compound {
    let mut compound = Compound::default();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    let read_ident = |from: usize| -> (String, usize) {
        let mut end = from;
        while end < chars.len() && is_ident_char(chars[end]) {
            end += 1;
        }
        (chars[from..end].iter().collect(), end)
    };

    if i < chars.len() && chars[i] == '*' {
        compound.tag = Some("*".into());
        i += 1;
    } else if i < chars.len() && is_ident_char(chars[i]) {
        let (tag, end) = read_ident(i);
        compound.tag = Some(tag);
        i = end;
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                let (id, end) = read_ident(i + 1);
                compound.id = Some(id);
                i = end;
            }
            '.' => {
                let (class, end) = read_ident(i + 1);
                compound.classes.push(class);
                i = end;
            }
            '[' => {
                let Some(close) = chars[i..].iter().position(|c| *c == ']') else {
                    compound.unsupported = true;
                    break;
                };
                let inner: String = chars[i + 1..i + close].iter().collect();
                let attr = match inner.split_once('=') {
                    Some((name, value)) => (
                        name.trim().to_owned(),
                        Some(value.trim().trim_matches(['"', '\'']).to_owned()),
                    ),
                    None => (inner.trim().to_owned(), None),
                };
                compound.attrs.push(attr);
                i += close + 1;
            }
            _ => {
                compound.unsupported = true;
                break;
            }
        }
    }
    compound
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (MemoryDom, NodeId, NodeId, NodeId) {
        let mut dom = MemoryDom::new();
        let app = dom.insert(dom.root(), "div#app.shell");
        let button = dom.insert(app, "button.btn.primary");
        let label = dom.insert(button, "span.label");
        (dom, app, button, label)
    }

    #[test]
    fn select_by_id_class_and_tag() {
        let (dom, app, button, label) = sample();
        assert_eq!(dom.select(&"#app".into()), vec![app]);
        assert_eq!(dom.select(&".btn.primary".into()), vec![button]);
        assert_eq!(dom.select(&"span".into()), vec![label]);
        assert_eq!(dom.select(&"button.btn, #app".into()), vec![app, button]);
    }

    #[test]
    fn descendant_combinator() {
        let (dom, _, _, label) = sample();
        assert_eq!(dom.select(&"#app .label".into()), vec![label]);
        assert!(dom.select(&".label #app".into()).is_empty());
    }

    #[test]
    fn attribute_selector() {
        let (mut dom, app, _, _) = sample();
        dom.apply(
            app,
            &DomOp::SetAttribute {
                name: "sc".into(),
                value: "ctx1".into(),
            },
        );
        assert_eq!(dom.select(&"[sc=ctx1]".into()), vec![app]);
        assert_eq!(dom.select(&"[sc]".into()), vec![app]);
        assert!(dom.select(&"[sc=other]".into()).is_empty());
    }

    #[test]
    fn pseudo_classes_never_match() {
        let (dom, ..) = sample();
        assert!(dom.select(&".btn:hover".into()).is_empty());
    }

    #[test]
    fn remove_drops_subtree() {
        let (mut dom, app, button, label) = sample();
        dom.apply(button, &DomOp::Remove);
        assert!(!dom.exists(button));
        assert!(!dom.exists(label));
        assert!(dom.children(app).is_empty());
        assert!(dom.select(&Selector::Nodes(vec![button, app])) == vec![app]);
    }

    #[test]
    fn empty_clears_children_only() {
        let (mut dom, app, button, _) = sample();
        dom.apply(app, &DomOp::Empty);
        assert!(dom.exists(app));
        assert!(!dom.exists(button));
        assert_eq!(dom.classes(app), vec!["shell".to_string()]);
    }

    #[test]
    fn style_merges_and_clears() {
        let (mut dom, app, ..) = sample();
        dom.apply(app, &DomOp::SetStyle(StyleMap::from([("color", "red")])));
        dom.apply(app, &DomOp::SetStyle(StyleMap::from([("margin", "0")])));
        assert_eq!(dom.inline_style(app).to_string(), "color:red;margin:0;");
        dom.apply(app, &DomOp::ClearStyle);
        assert!(dom.inline_style(app).is_empty());
    }

    #[test]
    fn ops_on_dead_nodes_are_ignored() {
        let (mut dom, _, button, _) = sample();
        dom.apply(button, &DomOp::Remove);
        dom.take_ops();
        dom.apply(button, &DomOp::AddClass("x".into()));
        assert!(dom.ops().is_empty());
    }

    #[test]
    fn created_elements_are_detached_until_attached() {
        let mut dom = MemoryDom::new();
        let div = dom.create_element("div");
        assert!(dom.exists(div));
        assert!(dom.select(&"div".into()).is_empty());
        dom.attach(dom.root(), div);
        assert_eq!(dom.select(&"div".into()), vec![div]);
    }

    #[test]
    fn class_lifecycle() {
        let (mut dom, _, button, _) = sample();
        dom.apply(button, &DomOp::AddClass("active".into()));
        assert!(dom.has_class(button, "active"));
        dom.apply(button, &DomOp::RemoveClass("btn".into()));
        assert!(!dom.has_class(button, "btn"));
        dom.apply(button, &DomOp::ClearClasses);
        assert!(dom.classes(button).is_empty());
    }
}
