//! Style contexts: one style table, its tracked sheets, and its bindings.
//!
//! # Role
//!
//! A [`StyleContext`] is what a page creates once per style table. It
//! registers elements (stamping them with its id in the `sc` attribute),
//! applies style instructions, applies SC rules, and is the dispatch hook
//! of every observable bound through it.
//!
//! # Invariants
//!
//! 1. Reactive and per-element calls only accept elements this context
//!    registered; anything else is a `Configuration` error and changes
//!    nothing.
//! 2. Non-fatal failures are reported to the context's diagnostics and
//!    the call degrades to a no-op for the affected part.
//! 3. No `RefCell` borrow of the DOM, engine, or registry is held while a
//!    user effect runs.

use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use sc_core::{
    Diagnostic, Diagnostics, DomHost, DomOp, DuplicateKind, IdSource, LookupKind, NodeId,
    RandomIds, SC_ATTR, ScError, Selector, Severity, StyleMap, Value,
};
use sc_style::{CssDocument, RuleMode, StyleRecord, StyleRuleEngine, StyleTable};
use tracing::{debug, info, instrument};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::config::Settings;
use crate::history::{History, HistoryAction, HistoryEntry};
use crate::instruction::StyleInstruction;
use crate::reactive::{
    BindMode, BindOptions, BindingKey, DispatchEvent, DispatchHook, Dispatcher, Effect,
    ObservableValue, RenderSpec, Renderer, StyleSpec, TargetEntry, TargetState, Verdict,
};
use crate::tags::{self, TagRequest};

/// Shared handle to the page DOM.
pub type SharedDom = Rc<RefCell<dyn DomHost>>;

/// Prefix of generated style names for literal-map targets.
const GENERATED_BASE: &str = "sc-style-";
const ID_SUFFIX_LEN: usize = 6;

static NEXT_CONTEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

struct ContextInner {
    serial: u64,
    id: String,
    settings: Settings,
    dom: SharedDom,
    engine: RefCell<StyleRuleEngine>,
    dispatcher: Dispatcher,
    history: RefCell<History>,
    diagnostics: RefCell<Diagnostics>,
}

/// One style table and everything bound through it.
///
/// Cloning shares the context.
#[derive(Clone)]
pub struct StyleContext {
    inner: Rc<ContextInner>,
}

impl std::fmt::Debug for StyleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleContext")
            .field("id", &self.inner.id)
            .field("settings", &self.inner.settings)
            .field("bindings", &self.binding_count())
            .finish_non_exhaustive()
    }
}

/// Builder for [`StyleContext`].
pub struct StyleContextBuilder {
    dom: SharedDom,
    records: Vec<StyleRecord>,
    documents: Vec<CssDocument>,
    tracked_files: Vec<String>,
    rules: Vec<String>,
    settings: Settings,
    ids: Option<Box<dyn IdSource>>,
}

impl StyleContextBuilder {
    /// Named style records.
    #[must_use]
    pub fn records(mut self, records: impl IntoIterator<Item = StyleRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Page stylesheets available for tracking.
    #[must_use]
    pub fn documents(mut self, documents: impl IntoIterator<Item = CssDocument>) -> Self {
        self.documents.extend(documents);
        self
    }

    /// File names (`theme.css`) of the stylesheets to track.
    #[must_use]
    pub fn track<S: Into<String>>(mut self, files: impl IntoIterator<Item = S>) -> Self {
        self.tracked_files.extend(files.into_iter().map(Into::into));
        self
    }

    /// An `sc_rules` body supplied in code rather than in a stylesheet.
    #[must_use]
    pub fn rules(mut self, text: impl Into<String>) -> Self {
        self.rules.push(text.into());
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the random id source (tests use `SequentialIds`).
    #[must_use]
    pub fn ids(mut self, ids: Box<dyn IdSource>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Validate the style table, read tracked sheets, and create the context.
    ///
    /// Repeated style names are fatal. Repeated contents, repeated tracked
    /// selectors, and unparsable rule blocks are reported and skipped.
    #[instrument(level = "debug", skip_all, fields(records = self.records.len()))]
    pub fn build(self) -> Result<StyleContext, ScError> {
        let mut diagnostics = Diagnostics::new().with_warnings(!self.settings.off_warn);
        let table = match StyleTable::from_records(self.records) {
            Ok(table) => table,
            Err(err) => {
                diagnostics.error(err.clone());
                return Err(err);
            }
        };
        let repeated = table.duplicate_contents();
        if !repeated.is_empty() {
            diagnostics.warn(ScError::Duplicate {
                kind: DuplicateKind::StyleContent,
                names: repeated,
            });
        }

        let mut ids = self.ids.unwrap_or_else(|| Box::new(RandomIds));
        let id = format!("{}{}", epoch_millis() / 28, ids.suffix(ID_SUFFIX_LEN));

        let mut engine = StyleRuleEngine::new(table, ids);
        let report = engine.ingest(
            self.documents,
            &self.tracked_files,
            self.settings.delete_native_css,
        );
        if !report.duplicate_selectors.is_empty() {
            diagnostics.warn(ScError::Duplicate {
                kind: DuplicateKind::Selector,
                names: report.duplicate_selectors,
            });
        }
        for err in report.errors {
            diagnostics.error(err);
        }
        for text in &self.rules {
            if let Err(err) = engine.add_rules(text) {
                diagnostics.error(err);
            }
        }

        debug!(%id, tracked = report.tracked, "style context ready");
        Ok(StyleContext {
            inner: Rc::new(ContextInner {
                serial: NEXT_CONTEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
                id,
                settings: self.settings,
                dom: self.dom,
                engine: RefCell::new(engine),
                dispatcher: Dispatcher::new(),
                history: RefCell::new(History::new()),
                diagnostics: RefCell::new(diagnostics),
            }),
        })
    }
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis())
}

impl StyleContext {
    /// Start building a context over `dom`.
    pub fn builder(dom: SharedDom) -> StyleContextBuilder {
        StyleContextBuilder {
            dom,
            records: Vec::new(),
            documents: Vec::new(),
            tracked_files: Vec::new(),
            rules: Vec::new(),
            settings: Settings::default(),
            ids: None,
        }
    }

    /// A context with named styles only.
    pub fn new(
        dom: SharedDom,
        records: impl IntoIterator<Item = StyleRecord>,
    ) -> Result<Self, ScError> {
        Self::builder(dom).records(records).build()
    }

    /// The id stamped into the `sc` attribute of registered elements.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    // --- stylize ----------------------------------------------------------

    /// Resolve (or create) elements and register them with this context.
    ///
    /// An upper-case tag name (`"DIV"`) creates a detached element. A
    /// selector matching nothing falls back to the elements carrying the
    /// scoped version of that class.
    pub fn stylize(&self, selector: impl Into<Selector>) -> Vec<NodeId> {
        let nodes = self.inner.locate(&selector.into(), true);
        self.inner.register(&nodes);
        nodes
    }

    /// Resolve (or create) elements and apply an instruction to them.
    pub fn stylize_with(
        &self,
        selector: impl Into<Selector>,
        instruction: impl Into<StyleInstruction>,
    ) -> Vec<NodeId> {
        let nodes = self.inner.locate(&selector.into(), false);
        self.inner.apply_instruction(&nodes, &instruction.into());
        nodes
    }

    /// Apply an instruction to elements this context registered.
    pub fn add(
        &self,
        selector: impl Into<Selector>,
        instruction: impl Into<StyleInstruction>,
    ) -> Result<Vec<NodeId>, ScError> {
        let nodes = self.registered_nodes(&selector.into())?;
        self.inner.apply_instruction(&nodes, &instruction.into());
        Ok(nodes)
    }

    /// Whether any of the registered elements carries the scoped version of
    /// `class`.
    pub fn has_class(&self, selector: impl Into<Selector>, class: &str) -> Result<bool, ScError> {
        let nodes = self.registered_nodes(&selector.into())?;
        let engine = self.inner.engine.borrow();
        let Some(scoped) = engine.scoped_class_name(class) else {
            return Ok(false);
        };
        let dom = self.inner.dom.borrow();
        Ok(nodes.iter().any(|&node| dom.has_class(node, scoped)))
    }

    /// Apply SC rules in order.
    ///
    /// Unknown rules are reported and skipped.
    pub fn rules<I, S>(&self, names: I, mode: RuleMode)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            let outcome = self.inner.engine.borrow_mut().apply_rule(name, mode);
            match outcome {
                Ok(assignments) => {
                    for assignment in assignments {
                        let nodes = self.stylize(assignment.selector.as_str());
                        self.inner
                            .apply_instruction(&nodes, &StyleInstruction::Named(assignment.style));
                    }
                    self.inner
                        .record(HistoryAction::RuleApplied(name.to_owned()), &[]);
                }
                Err(err) => self.inner.report(err),
            }
        }
    }

    /// Add an `sc_rules` body at runtime.
    pub fn add_rules(&self, text: &str) -> Result<(), ScError> {
        let outcome = self.inner.engine.borrow_mut().add_rules(text);
        outcome.inspect_err(|err| self.inner.report(err.clone()))
    }

    // --- binding ----------------------------------------------------------

    /// Bind registered elements to an observable.
    ///
    /// The elements are captured now; elements registered later do not join.
    /// When the observable has an initial value it is rendered immediately.
    pub fn bind(
        &self,
        observable: &ObservableValue,
        target: impl Into<Selector>,
        spec: RenderSpec,
        options: BindOptions,
    ) -> Result<BindingKey, ScError> {
        let nodes = self.registered_nodes(&target.into())?;
        let mode = spec.mode();

        let weak: Weak<ContextInner> = Rc::downgrade(&self.inner);
        let hook: Weak<dyn DispatchHook> = weak;
        observable
            .proxy()
            .attach(self.inner.serial, hook)
            .inspect_err(|err| self.inner.report(err.clone()))?;

        let entry = TargetEntry::new(
            Selector::Nodes(nodes.clone()),
            spec,
            options,
            observable.has_initial(),
        );
        let key = self
            .inner
            .dispatcher
            .bind(observable.id(), &observable.get(), entry)
            .inspect_err(|err| self.inner.report(err.clone()))?;
        self.inner.record(HistoryAction::Bound(mode), &nodes);

        if observable.has_initial() {
            observable.replay()?;
        }
        Ok(key)
    }

    /// Bind a style-mode target.
    pub fn bind_style(
        &self,
        observable: &ObservableValue,
        target: impl Into<Selector>,
        spec: StyleSpec,
    ) -> Result<BindingKey, ScError> {
        self.bind(observable, target, RenderSpec::Style(spec), BindOptions::default())
    }

    /// Bind a mutation-mode target: the value itself is the instruction.
    pub fn bind_mutation(
        &self,
        observable: &ObservableValue,
        target: impl Into<Selector>,
    ) -> Result<BindingKey, ScError> {
        self.bind(observable, target, RenderSpec::Mutation, BindOptions::default())
    }

    /// Bind a callback run with the target elements and each new value.
    pub fn bind_effect(
        &self,
        observable: &ObservableValue,
        target: impl Into<Selector>,
        effect: impl Fn(&[NodeId], &Value) + 'static,
    ) -> Result<BindingKey, ScError> {
        let effect: Effect = Rc::new(effect);
        self.bind(observable, target, RenderSpec::Effect(effect), BindOptions::default())
    }

    /// Number of observables bound through this context.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.inner.dispatcher.registry().len()
    }

    /// Target renders performed for an observable.
    #[must_use]
    pub fn render_count(&self, observable: &ObservableValue) -> u64 {
        self.inner
            .dispatcher
            .registry()
            .get(observable.id())
            .map_or(0, |binding| binding.renders())
    }

    /// Lifecycle state of the `index`-th target bound to an observable.
    #[must_use]
    pub fn target_state(&self, observable: &ObservableValue, index: usize) -> TargetState {
        self.inner
            .dispatcher
            .registry()
            .target_state(observable.id(), index)
    }

    /// Mode of an observable's binding.
    #[must_use]
    pub fn bind_mode(&self, observable: &ObservableValue) -> Option<BindMode> {
        self.inner
            .dispatcher
            .registry()
            .get(observable.id())
            .map(|binding| binding.mode())
    }

    // --- inspection -------------------------------------------------------

    /// Recorded actions, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.inner.history.borrow().entries().to_vec()
    }

    /// Emit the history through `tracing` at info level.
    pub fn log_history(&self) {
        for entry in self.inner.history.borrow().entries() {
            info!(target: "sc", context = %self.inner.id, "{entry}");
        }
    }

    /// Diagnostics reported so far.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.diagnostics.borrow().entries().to_vec()
    }

    /// Remove and return the diagnostics reported so far.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.diagnostics.borrow_mut().drain()
    }

    /// The style engine, for inspection.
    ///
    /// # Panics
    ///
    /// Panics if held across a call that restyles through this context.
    pub fn engine(&self) -> Ref<'_, StyleRuleEngine> {
        self.inner.engine.borrow()
    }

    /// CSS text of the generated sheet.
    #[must_use]
    pub fn generated_css(&self) -> String {
        self.inner.engine.borrow().generated().to_css_text()
    }

    /// Elements matched by `selector`, all registered with this context.
    fn registered_nodes(&self, selector: &Selector) -> Result<Vec<NodeId>, ScError> {
        let nodes = self.inner.dom.borrow().select(selector);
        let dom = self.inner.dom.borrow();
        let foreign = nodes
            .iter()
            .any(|&node| dom.attribute(node, SC_ATTR).as_deref() != Some(self.inner.id.as_str()));
        drop(dom);
        if nodes.is_empty() || foreign {
            let err = ScError::configuration(format!(
                "target {selector:?} is not registered with style context {}",
                self.inner.id
            ));
            self.inner.report(err.clone());
            return Err(err);
        }
        Ok(nodes)
    }
}

impl ContextInner {
    /// Resolve a selector, creating an element for an upper-case tag name.
    fn locate(&self, selector: &Selector, stamp_created: bool) -> Vec<NodeId> {
        if let Some(text) = selector.as_css() {
            match tags::classify(text) {
                TagRequest::Create(tag) => {
                    let node = self.dom.borrow_mut().create_element(tag);
                    if stamp_created {
                        self.stamp(&[node]);
                    }
                    self.record(HistoryAction::Created, &[node]);
                    return vec![node];
                }
                TagRequest::Refused => {
                    self.report(ScError::configuration(format!(
                        "'{text}' is document metadata and cannot be created; \
                         write it in lower case to select it"
                    )));
                    return Vec::new();
                }
                TagRequest::Select => {}
            }
        }

        let nodes = self.dom.borrow().select(selector);
        if !nodes.is_empty() {
            return nodes;
        }
        let scoped = selector
            .as_css()
            .and_then(|text| self.engine.borrow().scoped_selector(text));
        match scoped {
            Some(scoped) => {
                let nodes = self.dom.borrow().select(&Selector::Css(scoped.clone()));
                self.record(HistoryAction::ScopedLookup(scoped), &nodes);
                nodes
            }
            None => nodes,
        }
    }

    fn register(&self, nodes: &[NodeId]) {
        self.stamp(nodes);
        self.record(HistoryAction::Lookup, nodes);
    }

    fn stamp(&self, nodes: &[NodeId]) {
        self.each(
            nodes,
            &DomOp::SetAttribute {
                name: SC_ATTR.to_owned(),
                value: self.id.clone(),
            },
        );
    }

    fn each(&self, nodes: &[NodeId], op: &DomOp) {
        let mut dom = self.dom.borrow_mut();
        for &node in nodes {
            dom.apply(node, op);
        }
    }

    fn record(&self, action: HistoryAction, nodes: &[NodeId]) {
        self.history.borrow_mut().push(action, nodes);
    }

    /// Route a failure to diagnostics with its severity.
    fn report(&self, err: ScError) {
        let severity = match &err {
            ScError::Lookup {
                kind: LookupKind::Class,
                ..
            }
            | ScError::Duplicate {
                kind: DuplicateKind::StyleContent | DuplicateKind::Selector,
                ..
            } => Severity::Warning,
            _ => Severity::Error,
        };
        self.diagnostics.borrow_mut().report(severity, err);
    }

    fn apply_instruction(&self, nodes: &[NodeId], instruction: &StyleInstruction) {
        match instruction {
            StyleInstruction::AddClass(class) => {
                let scoped = self.engine.borrow_mut().scope_class(class);
                match scoped {
                    Ok(scoped) => {
                        self.each(nodes, &DomOp::AddClass(scoped));
                        self.stamp(nodes);
                        self.record(HistoryAction::ClassAdded(class.clone()), nodes);
                    }
                    Err(err) => self.report(err),
                }
            }
            StyleInstruction::RemoveClass(class) => {
                let scoped = self
                    .engine
                    .borrow()
                    .scoped_class_name(class)
                    .map(str::to_owned);
                if let Some(scoped) = scoped {
                    self.each(nodes, &DomOp::RemoveClass(scoped));
                }
                self.record(HistoryAction::ClassRemoved(class.clone()), nodes);
            }
            StyleInstruction::ClearInline => {
                self.each(nodes, &DomOp::ClearStyle);
                self.record(HistoryAction::InlineCleared, nodes);
            }
            StyleInstruction::ClearClasses => {
                self.each(nodes, &DomOp::ClearClasses);
                self.record(HistoryAction::ClassesCleared, nodes);
            }
            StyleInstruction::Remove => {
                self.each(nodes, &DomOp::Remove);
                self.record(HistoryAction::Removed, nodes);
            }
            StyleInstruction::Empty => {
                self.each(nodes, &DomOp::Empty);
                self.record(HistoryAction::Emptied, nodes);
            }
            StyleInstruction::Batch(items) => {
                for item in items {
                    self.apply_instruction(nodes, item);
                }
            }
            StyleInstruction::Inline(map) => {
                self.each(nodes, &DomOp::SetStyle(map.clone()));
                self.stamp(nodes);
                self.record(HistoryAction::InlineDeclarations, nodes);
            }
            StyleInstruction::Named(name) => {
                let style = self.engine.borrow().resolve_named_style(name);
                match style {
                    Ok(style) => {
                        self.each(nodes, &DomOp::ClearStyle);
                        self.each(nodes, &DomOp::SetStyle(style));
                        self.stamp(nodes);
                        self.record(HistoryAction::InlineStyle(name.clone()), nodes);
                    }
                    Err(err) => self.report(err),
                }
            }
        }
    }
}

impl Renderer for ContextInner {
    fn resolve(&self, target: &Selector) -> Vec<NodeId> {
        self.dom.borrow().select(target)
    }

    fn apply(&self, nodes: &[NodeId], instruction: &StyleInstruction) {
        self.apply_instruction(nodes, instruction);
    }

    fn apply_generated(&self, nodes: &[NodeId], existing: Option<&str>, style: StyleMap) -> String {
        let name = {
            let mut engine = self.engine.borrow_mut();
            match existing {
                Some(name) => {
                    engine.update_generated_style(name, style);
                    name.to_owned()
                }
                None => engine.register_generated_style(GENERATED_BASE, style),
            }
        };
        self.apply_instruction(nodes, &StyleInstruction::Named(name.clone()));
        name
    }

    fn report(&self, error: ScError) {
        ContextInner::report(self, error);
    }
}

impl DispatchHook for ContextInner {
    fn dispatch(&self, event: &DispatchEvent) -> Verdict {
        self.dispatcher.dispatch(event, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::{MemoryDom, SequentialIds};
    use serde_json::json;

    fn setup() -> (Rc<RefCell<MemoryDom>>, StyleContext) {
        let dom = Rc::new(RefCell::new(MemoryDom::new()));
        let shared: SharedDom = dom.clone();
        let ctx = StyleContext::builder(shared)
            .records([StyleRecord::new("hero", StyleMap::from([("font-size", "2em")]))])
            .ids(Box::new(SequentialIds::new()))
            .build()
            .unwrap();
        (dom, ctx)
    }

    #[test]
    fn id_has_timestamp_and_suffix() {
        let (_, ctx) = setup();
        assert!(ctx.id().ends_with("000001"));
        assert!(ctx.id().len() > ID_SUFFIX_LEN);
    }

    #[test]
    fn stylize_registers_matches() {
        let (dom, ctx) = setup();
        let root = dom.borrow().root();
        let a = dom.borrow_mut().insert(root, "p.note");
        let nodes = ctx.stylize(".note");
        assert_eq!(nodes, vec![a]);
        assert_eq!(dom.borrow().attribute(a, SC_ATTR).as_deref(), Some(ctx.id()));
    }

    #[test]
    fn upper_case_tag_creates_element() {
        let (dom, ctx) = setup();
        let nodes = ctx.stylize("SPAN");
        assert_eq!(nodes.len(), 1);
        assert_eq!(dom.borrow().tag(nodes[0]), Some("span"));
        assert_eq!(dom.borrow().attribute(nodes[0], SC_ATTR).as_deref(), Some(ctx.id()));
    }

    #[test]
    fn metadata_tags_are_refused() {
        let (_, ctx) = setup();
        assert!(ctx.stylize("HEAD").is_empty());
        let diagnostics = ctx.take_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn named_style_replaces_inline_style() {
        let (dom, ctx) = setup();
        let root = dom.borrow().root();
        let a = dom.borrow_mut().insert(root, "h1#title");
        ctx.stylize_with("#title", StyleMap::from([("color", "red")]));
        ctx.stylize_with("#title", "hero");
        assert_eq!(dom.borrow().inline_style(a), StyleMap::from([("font-size", "2em")]));
    }

    #[test]
    fn unknown_named_style_is_a_noop() {
        let (dom, ctx) = setup();
        let root = dom.borrow().root();
        let a = dom.borrow_mut().insert(root, "h1#title");
        ctx.stylize_with("#title", StyleMap::from([("color", "red")]));
        ctx.stylize_with("#title", "missing");
        assert_eq!(dom.borrow().inline_style(a).get("color"), Some("red"));
        assert!(ctx.diagnostics().iter().any(|d| matches!(
            d.error,
            ScError::Lookup {
                kind: LookupKind::Style,
                ..
            }
        )));
    }

    #[test]
    fn add_requires_registration() {
        let (dom, ctx) = setup();
        let root = dom.borrow().root();
        dom.borrow_mut().insert(root, "div#free");
        assert!(matches!(ctx.add("#free", "!line"), Err(ScError::Configuration(_))));
        ctx.stylize("#free");
        assert!(ctx.add("#free", "!line").is_ok());
    }

    #[test]
    fn duplicate_names_abort_build() {
        let dom: SharedDom = Rc::new(RefCell::new(MemoryDom::new()));
        let err = StyleContext::new(
            dom,
            [
                StyleRecord::new("a", StyleMap::new()),
                StyleRecord::new("a", StyleMap::new()),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScError::Duplicate {
                kind: DuplicateKind::StyleName,
                ..
            }
        ));
    }

    #[test]
    fn binding_unregistered_target_creates_nothing() {
        let (dom, ctx) = setup();
        let root = dom.borrow().root();
        dom.borrow_mut().insert(root, "div#free");
        let value = ObservableValue::new(json!("hero"));
        assert!(ctx.bind_mutation(&value, "#free").is_err());
        assert_eq!(ctx.binding_count(), 0);
        assert_eq!(value.proxy().attached_context(), None);
    }
}
