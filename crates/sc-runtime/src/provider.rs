//! Several style contexts over one page.
//!
//! Each element remembers its owning context through the `sc` attribute.
//! [`ContextSet`] routes per-element calls to that owner, so one page can
//! host independent style tables without their bindings crossing.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use sc_core::{DomHost, SC_ATTR, ScError, Selector};
use tracing::error;

use crate::context::{SharedDom, StyleContext};
use crate::instruction::StyleInstruction;
use crate::reactive::{BindOptions, BindingKey, ObservableValue, RenderSpec};

/// Style contexts keyed by id.
pub struct ContextSet {
    dom: SharedDom,
    contexts: AHashMap<String, StyleContext>,
}

impl std::fmt::Debug for ContextSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextSet")
            .field("contexts", &self.contexts.len())
            .finish_non_exhaustive()
    }
}

impl ContextSet {
    pub fn new(dom: SharedDom) -> Self {
        Self {
            dom,
            contexts: AHashMap::new(),
        }
    }

    /// Add a context, replacing any previous context with the same id.
    pub fn insert(&mut self, context: StyleContext) {
        self.contexts.insert(context.id().to_owned(), context);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&StyleContext> {
        self.contexts.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// The context owning the first element `selector` matches.
    pub fn owner_of(&self, selector: &Selector) -> Result<&StyleContext, ScError> {
        let owner = {
            let dom = self.dom.borrow();
            dom.select(selector)
                .first()
                .and_then(|&node| dom.attribute(node, SC_ATTR))
        };
        let found = owner.as_deref().and_then(|id| self.contexts.get(id));
        found.ok_or_else(|| {
            let err = ScError::configuration(format!(
                "no style context owns the elements of {selector:?}"
            ));
            error!(target: "sc", error = %err, "unrouted call");
            err
        })
    }

    /// Bind through the owning context.
    pub fn bind(
        &self,
        observable: &ObservableValue,
        target: impl Into<Selector>,
        spec: RenderSpec,
        options: BindOptions,
    ) -> Result<BindingKey, ScError> {
        let target = target.into();
        self.owner_of(&target)?
            .bind(observable, target, spec, options)
    }

    /// Apply an instruction through the owning context.
    pub fn add(
        &self,
        selector: impl Into<Selector>,
        instruction: impl Into<StyleInstruction>,
    ) -> Result<(), ScError> {
        let selector = selector.into();
        self.owner_of(&selector)?.add(selector, instruction).map(|_| ())
    }

    /// Class check through the owning context.
    pub fn has_class(&self, selector: impl Into<Selector>, class: &str) -> Result<bool, ScError> {
        let selector = selector.into();
        self.owner_of(&selector)?.has_class(selector, class)
    }

    /// Contexts in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &StyleContext> {
        self.contexts.values()
    }
}

/// Shorthand for building a shared DOM handle.
pub fn share<D: DomHost + 'static>(dom: D) -> (Rc<RefCell<D>>, SharedDom) {
    let concrete = Rc::new(RefCell::new(dom));
    let shared: SharedDom = concrete.clone();
    (concrete, shared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::{MemoryDom, SequentialIds, StyleMap};
    use sc_style::StyleRecord;
    use serde_json::json;

    fn context(dom: &SharedDom, color: &str, ids: SequentialIds) -> StyleContext {
        StyleContext::builder(dom.clone())
            .records([StyleRecord::new("tone", StyleMap::from([("color", color)]))])
            .ids(Box::new(ids))
            .build()
            .unwrap()
    }

    #[test]
    fn routes_to_owning_context() {
        let (dom, shared) = share(MemoryDom::new());
        let root = dom.borrow().root();
        let left = dom.borrow_mut().insert(root, "div#left");
        let right = dom.borrow_mut().insert(root, "div#right");

        let first = context(&shared, "red", SequentialIds::new());
        let second = context(&shared, "blue", SequentialIds::starting_after(100));
        assert_ne!(first.id(), second.id());
        first.stylize("#left");
        second.stylize("#right");

        let mut set = ContextSet::new(shared.clone());
        set.insert(first);
        set.insert(second);

        set.add("#left", "tone").unwrap();
        set.add("#right", "tone").unwrap();
        assert_eq!(dom.borrow().inline_style(left).get("color"), Some("red"));
        assert_eq!(dom.borrow().inline_style(right).get("color"), Some("blue"));

        set.add("#right", "!line").unwrap();
        assert!(dom.borrow().inline_style(right).is_empty());

        let value = ObservableValue::new(json!("tone"));
        set.bind(&value, "#right", RenderSpec::Mutation, BindOptions::default())
            .unwrap();
        assert_eq!(dom.borrow().inline_style(right).get("color"), Some("blue"));
        assert_eq!(dom.borrow().inline_style(left).get("color"), Some("red"));

        let owner = set.owner_of(&Selector::from("#right")).unwrap();
        assert_eq!(owner.render_count(&value), 1);
        assert!(value.proxy().attached_context().is_some());
    }

    #[test]
    fn unowned_elements_are_rejected() {
        let (dom, shared) = share(MemoryDom::new());
        let root = dom.borrow().root();
        dom.borrow_mut().insert(root, "div#free");
        let mut set = ContextSet::new(shared.clone());
        set.insert(context(&shared, "red", SequentialIds::new()));
        assert!(matches!(set.has_class("#free", ".x"), Err(ScError::Configuration(_))));
    }
}
