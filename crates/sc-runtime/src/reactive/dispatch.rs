#![forbid(unsafe_code)]

//! Fan-out of observable writes to bound targets.
//!
//! # Design
//!
//! The [`Dispatcher`] owns a context's [`BindingRegistry`]. For each write it
//! snapshots the matching binding, releases the registry, renders every
//! target through a [`Renderer`], then commits the outcome. Because no
//! borrow is held while rendering, a render may write to any observable and
//! the nested dispatch completes synchronously before the outer one
//! continues. A nested dispatch of the same observable renders every target
//! with the newer value, so the outer one stops at that point instead of
//! overwriting the remaining targets with its older value.
//!
//! # Failure Modes
//!
//! Lookup failures inside a render go to [`Renderer::report`] and the
//! remaining targets still render. A target resolving to no live elements
//! renders as a no-op.

use std::cell::{Ref, RefCell};

use sc_core::{NodeId, ScError, Selector, StyleMap, Tracked, Value};
use tracing::{debug, trace};

use crate::instruction::{CLEAR_CHILDREN, REMOVE_NODE, StyleInstruction};
use crate::reactive::binding::{
    BindMode, BindingKey, BindingRegistry, RenderSpec, Rendered, StyleSpec, TargetEntry,
};
use crate::reactive::observable::{DispatchEvent, ProxyId, Verdict};

/// A mutation-mode payload, decoded once per dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationInstruction {
    /// Apply each element in order.
    ApplyList(Vec<Value>),
    /// `"*empty"`.
    ClearChildren,
    /// `"*remove"`.
    Remove,
    /// Apply the value as one instruction.
    SingleValue(Value),
}

impl MutationInstruction {
    #[must_use]
    pub fn decode(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self::ApplyList(items.clone()),
            Value::String(s) if s == CLEAR_CHILDREN => Self::ClearChildren,
            Value::String(s) if s == REMOVE_NODE => Self::Remove,
            other => Self::SingleValue(other.clone()),
        }
    }
}

/// DOM side of rendering, provided by the style context.
pub trait Renderer {
    /// Live elements of a target.
    fn resolve(&self, target: &Selector) -> Vec<NodeId>;

    /// Apply an instruction to elements.
    fn apply(&self, nodes: &[NodeId], instruction: &StyleInstruction);

    /// Register (or update) a generated style for `style`, apply it, and
    /// return its name.
    fn apply_generated(&self, nodes: &[NodeId], existing: Option<&str>, style: StyleMap) -> String;

    /// Report a non-fatal render failure.
    fn report(&self, error: ScError);
}

/// Binding registry plus the render loop.
#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: RefCell<BindingRegistry>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a target.
    pub fn bind(
        &self,
        owner: ProxyId,
        initial: &Value,
        entry: TargetEntry,
    ) -> Result<BindingKey, ScError> {
        let key = self.registry.borrow_mut().bind(owner, initial, entry)?;
        debug!(%owner, ?key, "target bound");
        Ok(key)
    }

    /// Read access to the registry.
    ///
    /// # Panics
    ///
    /// Panics if held across a write that dispatches to this context.
    pub fn registry(&self) -> Ref<'_, BindingRegistry> {
        self.registry.borrow()
    }

    /// Render every target bound to the proxy that produced `event`.
    pub fn dispatch(&self, event: &DispatchEvent, renderer: &dyn Renderer) -> Verdict {
        let Some(snapshot) = self.registry.borrow().snapshot(event.proxy) else {
            trace!(proxy = %event.proxy, "write to unbound proxy");
            return Verdict::Accept;
        };

        let incoming = Tracked::of(&event.value);
        let mutation = (snapshot.mode == BindMode::Mutation)
            .then(|| MutationInstruction::decode(&event.value));
        let mut rendered = Vec::new();
        for (index, entry) in snapshot.targets.iter().enumerate() {
            if !entry.should_render(&incoming, &snapshot.current) {
                continue;
            }
            let nodes = renderer.resolve(&entry.target);
            let generated_name = render_target(entry, &nodes, &event.value, mutation.as_ref(), renderer);
            rendered.push(Rendered {
                index,
                generated_name,
            });
            if self.registry.borrow().epoch(event.proxy) != Some(snapshot.epoch) {
                trace!(proxy = %event.proxy, "superseded by a nested write");
                break;
            }
        }

        debug!(
            proxy = %event.proxy,
            targets = snapshot.targets.len(),
            rendered = rendered.len(),
            "dispatched"
        );
        self.registry
            .borrow_mut()
            .commit(event.proxy, snapshot.epoch, incoming, rendered);
        Verdict::Accept
    }
}

fn render_target(
    entry: &TargetEntry,
    nodes: &[NodeId],
    value: &Value,
    mutation: Option<&MutationInstruction>,
    renderer: &dyn Renderer,
) -> Option<String> {
    match &entry.spec {
        RenderSpec::Effect(effect) => {
            effect(nodes, value);
            None
        }
        RenderSpec::Mutation => {
            match mutation {
                Some(MutationInstruction::ApplyList(items)) => {
                    for item in items {
                        apply_value(nodes, item, renderer);
                    }
                }
                Some(MutationInstruction::ClearChildren) => {
                    renderer.apply(nodes, &StyleInstruction::Empty);
                }
                Some(MutationInstruction::Remove) => {
                    renderer.apply(nodes, &StyleInstruction::Remove);
                }
                Some(MutationInstruction::SingleValue(value)) => apply_value(nodes, value, renderer),
                None => {}
            }
            None
        }
        RenderSpec::Style(StyleSpec::Named(name)) => {
            renderer.apply(nodes, &StyleInstruction::Named(name.clone()));
            None
        }
        RenderSpec::Style(StyleSpec::Map(map)) => Some(renderer.apply_generated(
            nodes,
            entry.generated_name.as_deref(),
            map.clone(),
        )),
        RenderSpec::Style(StyleSpec::Derive(derive)) => match derive(value) {
            StyleInstruction::Inline(map) => {
                Some(renderer.apply_generated(nodes, entry.generated_name.as_deref(), map))
            }
            instruction => {
                renderer.apply(nodes, &instruction);
                None
            }
        },
    }
}

fn apply_value(nodes: &[NodeId], value: &Value, renderer: &dyn Renderer) {
    match StyleInstruction::from_value(value) {
        Ok(instruction) => renderer.apply(nodes, &instruction),
        Err(err) => renderer.report(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::binding::BindOptions;
    use crate::reactive::observable::ObservableValue;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Log {
        applied: RefCell<Vec<StyleInstruction>>,
        generated: RefCell<Vec<(Option<String>, StyleMap)>>,
        errors: RefCell<Vec<ScError>>,
    }

    impl Renderer for Log {
        fn resolve(&self, _target: &Selector) -> Vec<NodeId> {
            vec![NodeId(1)]
        }

        fn apply(&self, _nodes: &[NodeId], instruction: &StyleInstruction) {
            self.applied.borrow_mut().push(instruction.clone());
        }

        fn apply_generated(&self, _nodes: &[NodeId], existing: Option<&str>, style: StyleMap) -> String {
            self.generated.borrow_mut().push((existing.map(str::to_owned), style));
            "gen-1".to_owned()
        }

        fn report(&self, error: ScError) {
            self.errors.borrow_mut().push(error);
        }
    }

    fn event(value: &ObservableValue, payload: Value) -> DispatchEvent {
        DispatchEvent {
            value: payload,
            key: "value".into(),
            path: Vec::new(),
            proxy: value.id(),
            previous: Value::Null,
        }
    }

    fn bind(dispatcher: &Dispatcher, value: &ObservableValue, spec: RenderSpec) {
        let entry = TargetEntry::new(
            Selector::Nodes(vec![NodeId(1)]),
            spec,
            BindOptions::default(),
            false,
        );
        dispatcher.bind(value.id(), &value.get(), entry).unwrap();
    }

    #[test]
    fn decodes_sentinels() {
        assert_eq!(MutationInstruction::decode(&json!("*empty")), MutationInstruction::ClearChildren);
        assert_eq!(MutationInstruction::decode(&json!("*remove")), MutationInstruction::Remove);
        assert_eq!(
            MutationInstruction::decode(&json!("empty")),
            MutationInstruction::SingleValue(json!("empty"))
        );
        assert_eq!(
            MutationInstruction::decode(&json!([1])),
            MutationInstruction::ApplyList(vec![json!(1)])
        );
    }

    #[test]
    fn unknown_proxy_is_a_noop() {
        let dispatcher = Dispatcher::new();
        let log = Log::default();
        let value = ObservableValue::new("x");
        assert_eq!(dispatcher.dispatch(&event(&value, json!("y")), &log), Verdict::Accept);
        assert!(log.applied.borrow().is_empty());
    }

    #[test]
    fn list_payload_applies_each_item_and_reports_bad_ones() {
        let dispatcher = Dispatcher::new();
        let log = Log::default();
        let value = ObservableValue::new(Value::Null);
        bind(&dispatcher, &value, RenderSpec::Mutation);

        dispatcher.dispatch(&event(&value, json!([".a", null, "*empty"])), &log);
        assert_eq!(
            *log.applied.borrow(),
            vec![StyleInstruction::AddClass(".a".into()), StyleInstruction::Empty]
        );
        assert_eq!(log.errors.borrow().len(), 1);
    }

    #[test]
    fn literal_map_reuses_generated_name() {
        let dispatcher = Dispatcher::new();
        let log = Log::default();
        let value = ObservableValue::new(Value::Null);
        bind(&dispatcher, &value, RenderSpec::map([("color", "red")]));

        dispatcher.dispatch(&event(&value, json!(1)), &log);
        dispatcher.dispatch(&event(&value, json!(2)), &log);
        let generated = log.generated.borrow();
        assert_eq!(generated[0].0, None);
        assert_eq!(generated[1].0.as_deref(), Some("gen-1"));
    }

    #[test]
    fn derived_instructions_apply_directly() {
        let dispatcher = Dispatcher::new();
        let log = Log::default();
        let value = ObservableValue::new(Value::Null);
        bind(
            &dispatcher,
            &value,
            RenderSpec::derive(|v| match v.as_bool() {
                Some(true) => StyleInstruction::parse(".on"),
                _ => StyleInstruction::parse("-on"),
            }),
        );
        dispatcher.dispatch(&event(&value, json!(true)), &log);
        dispatcher.dispatch(&event(&value, json!(false)), &log);
        assert_eq!(
            *log.applied.borrow(),
            vec![
                StyleInstruction::AddClass(".on".into()),
                StyleInstruction::RemoveClass(".on".into())
            ]
        );
    }
}
