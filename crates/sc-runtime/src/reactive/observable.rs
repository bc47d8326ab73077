#![forbid(unsafe_code)]

//! Observable values and their write-intercepting proxies.
//!
//! # Design
//!
//! An [`ObservableValue`] boxes its payload one level deep as
//! `{"value": payload}` in shared storage (`Rc<RefCell<Value>>`) and hands
//! out a root [`Proxy`]. Every write through a proxy is offered to the
//! attached [`DispatchHook`], which renders the bound targets.
//!
//! Child proxies address their container by path from the root rather than
//! holding a reference into it, so a child obtained before its container
//! was replaced always sees the current value at that path.
//!
//! # Invariants
//!
//! 1. Repeated access to the same container key returns the same child
//!    proxy (same [`ProxyId`]).
//! 2. `null` is terminal: it is returned as a value, never wrapped.
//! 3. A write is stored before the hook runs, so renders reading through the
//!    proxy see the new value; a [`Verdict::Reject`] restores the previous
//!    value.
//! 4. No `RefCell` borrow is held while the hook runs; hooks may write to
//!    this or any other observable.
//!
//! # Failure Modes
//!
//! | Condition | Result |
//! |-----------|--------|
//! | write through a proxy whose container became a scalar | `ScError::Type` |
//! | array write past the end (other than push at `len`) | `ScError::Type` |
//! | attaching to a second live context | `ScError::Configuration` |

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use sc_core::{ScError, Value, is_container, kind_of};

const VALUE_KEY: &str = "value";

static NEXT_PROXY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one proxy. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyId(u64);

impl ProxyId {
    fn next() -> Self {
        Self(NEXT_PROXY_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proxy#{}", self.0)
    }
}

/// Outcome of offering a write to the dispatch hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    /// Undo the write.
    Reject,
}

/// A write offered to the dispatch hook.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchEvent {
    /// The value written.
    pub value: Value,
    /// Key written on the proxy.
    pub key: String,
    /// Path of the proxy from the root box.
    pub path: Vec<String>,
    /// Proxy the write went through.
    pub proxy: ProxyId,
    /// Value previously stored at `key` (`null` when absent).
    pub previous: Value,
}

/// Receiver of proxy writes.
pub trait DispatchHook {
    fn dispatch(&self, event: &DispatchEvent) -> Verdict;
}

/// What [`Proxy::get`] found.
#[derive(Debug, Clone)]
pub enum Access {
    /// A terminal value (including `null`).
    Value(Value),
    /// A container, wrapped in its cached child proxy.
    Child(Proxy),
}

struct Attachment {
    context: u64,
    hook: Weak<dyn DispatchHook>,
}

struct Shared {
    root: RefCell<Value>,
    hook: RefCell<Option<Attachment>>,
}

impl Shared {
    fn hook(&self) -> Option<Rc<dyn DispatchHook>> {
        self.hook.borrow().as_ref().and_then(|a| a.hook.upgrade())
    }
}

struct ProxyNode {
    id: ProxyId,
    path: Vec<String>,
    shared: Rc<Shared>,
    children: RefCell<AHashMap<String, Proxy>>,
}

/// Write-intercepting handle onto one container of an observable.
///
/// Cloning shares identity.
#[derive(Clone)]
pub struct Proxy {
    node: Rc<ProxyNode>,
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("id", &self.node.id)
            .field("path", &self.node.path)
            .finish_non_exhaustive()
    }
}

impl Proxy {
    fn root(value: Value) -> Self {
        Self::with_path(
            Vec::new(),
            Rc::new(Shared {
                root: RefCell::new(value),
                hook: RefCell::new(None),
            }),
        )
    }

    fn with_path(path: Vec<String>, shared: Rc<Shared>) -> Self {
        Self {
            node: Rc::new(ProxyNode {
                id: ProxyId::next(),
                path,
                shared,
                children: RefCell::new(AHashMap::new()),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> ProxyId {
        self.node.id
    }

    /// Keys from the root box to this proxy's container.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.node.path
    }

    /// Whether two handles are the same proxy.
    #[must_use]
    pub fn ptr_eq(&self, other: &Proxy) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    /// Read a key: terminal values directly, containers as child proxies.
    ///
    /// `None` when the key is absent or this proxy's container is gone.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Access> {
        let terminal = {
            let root = self.node.shared.root.borrow();
            let value = resolve(&root, &self.node.path).and_then(|c| entry(c, key))?;
            (!is_container(value)).then(|| value.clone())
        };
        Some(match terminal {
            Some(value) => Access::Value(value),
            None => Access::Child(self.cached_child(key)),
        })
    }

    /// Child proxy for a container key.
    pub fn child(&self, key: &str) -> Result<Proxy, ScError> {
        match self.get(key) {
            Some(Access::Child(child)) => Ok(child),
            Some(Access::Value(value)) => Err(ScError::Type {
                path: self.path_text(Some(key)),
                found: kind_of(&value),
            }),
            None => Err(ScError::Type {
                path: self.path_text(Some(key)),
                found: "missing",
            }),
        }
    }

    fn cached_child(&self, key: &str) -> Proxy {
        self.node
            .children
            .borrow_mut()
            .entry(key.to_owned())
            .or_insert_with(|| {
                let mut path = self.node.path.clone();
                path.push(key.to_owned());
                Proxy::with_path(path, Rc::clone(&self.node.shared))
            })
            .clone()
    }

    /// Current value of this proxy's container.
    #[must_use]
    pub fn snapshot(&self) -> Option<Value> {
        resolve(&self.node.shared.root.borrow(), &self.node.path).cloned()
    }

    /// Write a key and offer the write to the attached hook.
    ///
    /// Without a hook the write is stored and accepted silently.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<Verdict, ScError> {
        let value = value.into();
        let previous = self.write(key, value.clone())?;
        let Some(hook) = self.node.shared.hook() else {
            return Ok(Verdict::Accept);
        };

        let event = DispatchEvent {
            value,
            key: key.to_owned(),
            path: self.node.path.clone(),
            proxy: self.node.id,
            previous: previous.clone().unwrap_or(Value::Null),
        };
        let verdict = hook.dispatch(&event);
        if verdict == Verdict::Reject {
            self.restore(key, previous);
        }
        Ok(verdict)
    }

    /// Write without dispatch.
    pub(crate) fn write_silent(&self, key: &str, value: Value) -> Result<(), ScError> {
        self.write(key, value).map(|_| ())
    }

    fn write(&self, key: &str, value: Value) -> Result<Option<Value>, ScError> {
        let mut root = self.node.shared.root.borrow_mut();
        match resolve_mut(&mut root, &self.node.path) {
            Some(Value::Object(map)) => Ok(map.insert(key.to_owned(), value)),
            Some(Value::Array(items)) => match key.parse::<usize>() {
                Ok(index) if index < items.len() => {
                    Ok(Some(std::mem::replace(&mut items[index], value)))
                }
                Ok(index) if index == items.len() => {
                    items.push(value);
                    Ok(None)
                }
                _ => Err(ScError::Type {
                    path: self.path_text(Some(key)),
                    found: "an array",
                }),
            },
            other => Err(ScError::Type {
                path: self.path_text(None),
                found: other.map_or("missing", |v| kind_of(v)),
            }),
        }
    }

    fn restore(&self, key: &str, previous: Option<Value>) {
        let mut root = self.node.shared.root.borrow_mut();
        match (resolve_mut(&mut root, &self.node.path), previous) {
            (Some(Value::Object(map)), Some(value)) => {
                map.insert(key.to_owned(), value);
            }
            (Some(Value::Object(map)), None) => {
                map.remove(key);
            }
            (Some(Value::Array(items)), previous) => match (key.parse::<usize>(), previous) {
                (Ok(index), Some(value)) if index < items.len() => items[index] = value,
                (Ok(index), None) if index + 1 == items.len() => {
                    items.pop();
                }
                _ => {}
            },
            _ => {}
        }
    }

    /// Attach the dispatch hook of a context.
    ///
    /// Re-attaching the same context is a no-op. Attaching a second context
    /// while the first is alive is rejected.
    pub fn attach(&self, context: u64, hook: Weak<dyn DispatchHook>) -> Result<(), ScError> {
        let mut slot = self.node.shared.hook.borrow_mut();
        if let Some(existing) = slot.as_ref() {
            if existing.context != context && existing.hook.strong_count() > 0 {
                return Err(ScError::configuration(format!(
                    "observable {} is already bound to another style context",
                    self.node.id
                )));
            }
        }
        *slot = Some(Attachment { context, hook });
        Ok(())
    }

    /// Serial of the context whose hook is attached, if it is alive.
    #[must_use]
    pub fn attached_context(&self) -> Option<u64> {
        self.node
            .shared
            .hook
            .borrow()
            .as_ref()
            .filter(|a| a.hook.strong_count() > 0)
            .map(|a| a.context)
    }

    fn path_text(&self, key: Option<&str>) -> String {
        let mut parts: Vec<&str> = self.node.path.iter().map(String::as_str).collect();
        parts.extend(key);
        if parts.is_empty() {
            "<root>".to_owned()
        } else {
            parts.join(".")
        }
    }
}

fn entry<'a>(container: &'a Value, key: &str) -> Option<&'a Value> {
    match container {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn resolve<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| entry(node, key))
}

fn resolve_mut<'a>(root: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut node = root;
    for key in path {
        node = match node {
            Value::Object(map) => map.get_mut(key)?,
            Value::Array(items) => items.get_mut(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}

struct ObservableInner {
    proxy: Proxy,
    has_initial: bool,
}

/// A reactive value. Writes through [`ObservableValue::set`] re-render every
/// target bound to it.
///
/// Cloning shares the value and its identity.
#[derive(Clone)]
pub struct ObservableValue {
    inner: Rc<ObservableInner>,
}

impl fmt::Debug for ObservableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableValue")
            .field("id", &self.id())
            .field("value", &self.get())
            .finish()
    }
}

impl ObservableValue {
    /// Wrap an initial value. `null` means "no initial value".
    #[must_use]
    pub fn new(initial: impl Into<Value>) -> Self {
        let initial = initial.into();
        let has_initial = !initial.is_null();
        let mut boxed = serde_json::Map::new();
        boxed.insert(VALUE_KEY.to_owned(), initial);
        Self {
            inner: Rc::new(ObservableInner {
                proxy: Proxy::root(Value::Object(boxed)),
                has_initial,
            }),
        }
    }

    /// The current value, including writes made through child proxies.
    #[must_use]
    pub fn get(&self) -> Value {
        self.inner
            .proxy
            .node
            .shared
            .root
            .borrow()
            .get(VALUE_KEY)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Set the value, re-rendering bound targets.
    pub fn set(&self, value: impl Into<Value>) -> Result<Verdict, ScError> {
        self.inner.proxy.set(VALUE_KEY, value)
    }

    /// Store a value without rendering anything.
    pub fn seed(&self, value: impl Into<Value>) -> Result<(), ScError> {
        self.inner.proxy.write_silent(VALUE_KEY, value.into())
    }

    /// Re-dispatch the current value to bound targets.
    pub fn replay(&self) -> Result<Verdict, ScError> {
        self.inner.proxy.set(VALUE_KEY, self.get())
    }

    /// Whether the value was created with a non-null initial value.
    #[must_use]
    pub fn has_initial(&self) -> bool {
        self.inner.has_initial
    }

    /// The root proxy.
    #[must_use]
    pub fn proxy(&self) -> &Proxy {
        &self.inner.proxy
    }

    /// Identity of the root proxy; bindings are keyed by it.
    #[must_use]
    pub fn id(&self) -> ProxyId {
        self.inner.proxy.id()
    }
}
