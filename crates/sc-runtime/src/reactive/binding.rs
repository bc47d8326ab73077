#![forbid(unsafe_code)]

//! Bindings between observable values and DOM targets.
//!
//! # Design
//!
//! A [`Binding`] belongs to exactly one observable (by [`ProxyId`]) and lists
//! the targets that render its value. The [`BindingRegistry`] owns every
//! binding of one style context. Bindings are never removed: they live as
//! long as the context.
//!
//! # Invariants
//!
//! 1. A binding's target list is never empty.
//! 2. A binding's mode is fixed by its first target.
//! 3. Targets render in insertion order.
//! 4. A target is skipped iff the incoming value equals the tracked value,
//!    its equality check is on, and it is not awaiting a forced first render.
//!
//! # Failure Modes
//!
//! - **Mode mismatch**: binding a mutation target to an observable already
//!   bound in style mode (or vice versa) returns `ScError::Configuration` and
//!   leaves the registry unchanged.
//! - **Duplicate targets**: binding the same target twice adds two entries;
//!   both render.

use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use sc_core::{NodeId, ScError, Selector, StyleMap, Tracked, Value};

use crate::instruction::StyleInstruction;
use crate::reactive::observable::ProxyId;

/// How a binding renders its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindMode {
    /// The value selects a style for the targets.
    Style,
    /// The value is applied to the targets as an instruction or handed to an
    /// effect.
    Mutation,
}

/// Callback run with the live target elements and the new value.
pub type Effect = Rc<dyn Fn(&[NodeId], &Value)>;

/// Maps a value to the instruction a style-mode target applies.
pub type Derive = Rc<dyn Fn(&Value) -> StyleInstruction>;

/// Which style a style-mode target applies.
#[derive(Clone)]
pub enum StyleSpec {
    /// A named style record, applied regardless of the value.
    Named(String),
    /// Literal declarations, registered as a generated style.
    Map(StyleMap),
    /// Derived from the value. Derived literal declarations are registered as
    /// a generated style like [`StyleSpec::Map`].
    Derive(Derive),
}

impl fmt::Debug for StyleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Self::Derive(_) => f.write_str("Derive(..)"),
        }
    }
}

/// What a target does when its binding's value changes.
#[derive(Clone)]
pub enum RenderSpec {
    Style(StyleSpec),
    /// Apply the value itself as an instruction (`*empty`, `*remove`, lists).
    Mutation,
    /// Run a callback.
    Effect(Effect),
}

impl RenderSpec {
    /// Binding mode this spec belongs to.
    #[must_use]
    pub fn mode(&self) -> BindMode {
        match self {
            Self::Style(_) => BindMode::Style,
            Self::Mutation | Self::Effect(_) => BindMode::Mutation,
        }
    }

    /// Shorthand for a named style target.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Style(StyleSpec::Named(name.into()))
    }

    /// Shorthand for a literal style target.
    pub fn map(map: impl Into<StyleMap>) -> Self {
        Self::Style(StyleSpec::Map(map.into()))
    }

    /// Shorthand for a value-derived style target.
    pub fn derive(f: impl Fn(&Value) -> StyleInstruction + 'static) -> Self {
        Self::Style(StyleSpec::Derive(Rc::new(f)))
    }

    /// Shorthand for an effect target.
    pub fn effect(f: impl Fn(&[NodeId], &Value) + 'static) -> Self {
        Self::Effect(Rc::new(f))
    }
}

impl fmt::Debug for RenderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Style(spec) => f.debug_tuple("Style").field(spec).finish(),
            Self::Mutation => f.write_str("Mutation"),
            Self::Effect(_) => f.write_str("Effect(..)"),
        }
    }
}

/// Per-call binding options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindOptions {
    /// Render on every write, even when the value is unchanged.
    pub skip_equality_check: bool,
    /// Render the first write even when it equals the tracked value.
    /// `None` defers to whether the observable has an initial value.
    pub force_first_render: Option<bool>,
}

impl BindOptions {
    #[must_use]
    pub fn skip_equality_check(mut self, skip: bool) -> Self {
        self.skip_equality_check = skip;
        self
    }

    #[must_use]
    pub fn force_first_render(mut self, force: bool) -> Self {
        self.force_first_render = Some(force);
        self
    }
}

/// Lifecycle of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    /// Not registered with any binding.
    Unbound,
    /// Registered; the next dispatch renders regardless of equality.
    PendingFirstRender,
    /// Registered; renders follow the equality rule.
    Steady,
}

/// One subscribed target.
#[derive(Debug, Clone)]
pub struct TargetEntry {
    pub target: Selector,
    pub spec: RenderSpec,
    pub force_first_render: bool,
    pub skip_equality_check: bool,
    /// Generated style name reused by literal-map targets.
    pub generated_name: Option<String>,
}

impl TargetEntry {
    #[must_use]
    pub fn new(target: Selector, spec: RenderSpec, options: BindOptions, has_initial: bool) -> Self {
        Self {
            target,
            spec,
            force_first_render: options.force_first_render.unwrap_or(has_initial),
            skip_equality_check: options.skip_equality_check,
            generated_name: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> TargetState {
        if self.force_first_render {
            TargetState::PendingFirstRender
        } else {
            TargetState::Steady
        }
    }

    /// The skip rule.
    #[must_use]
    pub fn should_render(&self, incoming: &Tracked, current: &Tracked) -> bool {
        incoming != current || self.skip_equality_check || self.force_first_render
    }
}

/// Creation token of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingKey(u64);

/// All targets subscribed to one observable.
#[derive(Debug, Clone)]
pub struct Binding {
    key: BindingKey,
    owner: ProxyId,
    mode: BindMode,
    targets: Vec<TargetEntry>,
    current: Tracked,
    /// Bumped on every commit; lets an outer dispatch detect that a nested
    /// one already committed a newer value.
    epoch: u64,
    renders: u64,
}

impl Binding {
    #[must_use]
    pub fn key(&self) -> BindingKey {
        self.key
    }

    #[must_use]
    pub fn owner(&self) -> ProxyId {
        self.owner
    }

    #[must_use]
    pub fn mode(&self) -> BindMode {
        self.mode
    }

    #[must_use]
    pub fn targets(&self) -> &[TargetEntry] {
        &self.targets
    }

    /// The value last rendered, in tracked form.
    #[must_use]
    pub fn current(&self) -> &Tracked {
        &self.current
    }

    /// Number of target renders performed so far.
    #[must_use]
    pub fn renders(&self) -> u64 {
        self.renders
    }
}

/// Copy of a binding taken before rendering.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub mode: BindMode,
    pub targets: Vec<TargetEntry>,
    pub current: Tracked,
    pub epoch: u64,
}

/// Result of rendering one target, fed back through
/// [`BindingRegistry::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub index: usize,
    pub generated_name: Option<String>,
}

/// Bindings of one style context.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: Vec<Binding>,
    index: AHashMap<ProxyId, usize>,
    next_key: u64,
}

impl BindingRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a target to an observable.
    ///
    /// Creates the observable's binding on first use, tracking `initial` as
    /// its current value; later calls append.
    pub fn bind(
        &mut self,
        owner: ProxyId,
        initial: &Value,
        entry: TargetEntry,
    ) -> Result<BindingKey, ScError> {
        let mode = entry.spec.mode();
        if let Some(&slot) = self.index.get(&owner) {
            let binding = &mut self.bindings[slot];
            if binding.mode != mode {
                return Err(ScError::configuration(format!(
                    "{owner} is bound in {:?} mode; cannot add a {mode:?} target",
                    binding.mode
                )));
            }
            binding.targets.push(entry);
            return Ok(binding.key);
        }

        self.next_key += 1;
        let key = BindingKey(self.next_key);
        self.index.insert(owner, self.bindings.len());
        self.bindings.push(Binding {
            key,
            owner,
            mode,
            targets: vec![entry],
            current: Tracked::of(initial),
            epoch: 0,
            renders: 0,
        });
        Ok(key)
    }

    /// Copy the binding of `owner` for rendering.
    #[must_use]
    pub fn snapshot(&self, owner: ProxyId) -> Option<Snapshot> {
        self.get(owner).map(|binding| Snapshot {
            mode: binding.mode,
            targets: binding.targets.clone(),
            current: binding.current.clone(),
            epoch: binding.epoch,
        })
    }

    /// Record a finished dispatch.
    ///
    /// Rendered targets lose their forced flag and keep any generated style
    /// name. The tracked value is stored unless a nested dispatch committed
    /// since `epoch`.
    pub fn commit(&mut self, owner: ProxyId, epoch: u64, tracked: Tracked, rendered: Vec<Rendered>) {
        let Some(&slot) = self.index.get(&owner) else {
            return;
        };
        let binding = &mut self.bindings[slot];
        for Rendered {
            index,
            generated_name,
        } in rendered
        {
            let Some(entry) = binding.targets.get_mut(index) else {
                continue;
            };
            entry.force_first_render = false;
            if generated_name.is_some() {
                entry.generated_name = generated_name;
            }
            binding.renders += 1;
        }
        if binding.epoch == epoch {
            binding.current = tracked;
        }
        binding.epoch += 1;
    }

    /// Commit counter of an observable's binding.
    #[must_use]
    pub fn epoch(&self, owner: ProxyId) -> Option<u64> {
        self.get(owner).map(|binding| binding.epoch)
    }

    /// Binding of an observable.
    #[must_use]
    pub fn get(&self, owner: ProxyId) -> Option<&Binding> {
        self.index.get(&owner).map(|&slot| &self.bindings[slot])
    }

    /// State of the `index`-th target of an observable.
    #[must_use]
    pub fn target_state(&self, owner: ProxyId, index: usize) -> TargetState {
        self.get(owner)
            .and_then(|b| b.targets.get(index))
            .map_or(TargetState::Unbound, TargetEntry::state)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
