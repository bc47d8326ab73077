#![forbid(unsafe_code)]

//! Reactive core: observable values, bindings, and dispatch.
//!
//! # Architecture
//!
//! - [`ObservableValue`] / [`Proxy`]: values whose writes are intercepted.
//! - [`BindingRegistry`]: which targets render which observable.
//! - [`Dispatcher`]: renders the targets of a written observable.
//!
//! Everything is single-threaded (`Rc` / `RefCell`) and synchronous: a write
//! is fully rendered before `set` returns.

pub mod binding;
pub mod dispatch;
pub mod observable;

pub use binding::{
    BindMode, BindOptions, Binding, BindingKey, BindingRegistry, Derive, Effect, RenderSpec,
    Rendered, Snapshot, StyleSpec, TargetEntry, TargetState,
};
pub use dispatch::{Dispatcher, MutationInstruction, Renderer};
pub use observable::{
    Access, DispatchEvent, DispatchHook, ObservableValue, Proxy, ProxyId, Verdict,
};
