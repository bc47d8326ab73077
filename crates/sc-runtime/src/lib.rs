#![forbid(unsafe_code)]

//! Runtime: style contexts, stylize instructions, and reactive bindings.
//!
//! # Role in SC
//! `sc-runtime` is the user-facing crate. A [`StyleContext`] owns a style
//! table, the stylesheets it tracks, and the bindings made through it.
//!
//! # Primary responsibilities
//! - **StyleContext**: `stylize`, `add`, `has_class`, `rules`, and `bind`.
//! - **StyleInstruction**: the text and value forms of a stylize command.
//! - **reactive**: observable values and the render loop their writes drive.
//! - **ContextSet**: routes per-element calls to the owning context.
//! - **History / Settings**: action log and environment-driven settings.
//!
//! # Example
//!
//! ```
//! use sc_core::{MemoryDom, StyleMap};
//! use sc_runtime::{ObservableValue, StyleContext, StyleRecord, share};
//!
//! let (dom, shared) = share(MemoryDom::new());
//! let root = dom.borrow().root();
//! let title = dom.borrow_mut().insert(root, "h1#title");
//!
//! let ctx = StyleContext::new(
//!     shared,
//!     [StyleRecord::new("loud", StyleMap::from([("font-weight", "bold")]))],
//! )
//! .unwrap();
//! ctx.stylize("#title");
//!
//! let tone = ObservableValue::new("loud");
//! ctx.bind_mutation(&tone, "#title").unwrap();
//! assert_eq!(dom.borrow().inline_style(title).get("font-weight"), Some("bold"));
//! ```

pub mod config;
pub mod context;
pub mod history;
pub mod instruction;
pub mod provider;
pub mod reactive;
mod tags;

pub use config::Settings;
pub use context::{SharedDom, StyleContext, StyleContextBuilder};
pub use history::{History, HistoryAction, HistoryEntry};
pub use instruction::{CLEAR_CHILDREN, REMOVE_NODE, StyleInstruction};
pub use provider::{ContextSet, share};
pub use reactive::{
    BindMode, BindOptions, BindingKey, DispatchEvent, DispatchHook, ObservableValue, Proxy,
    ProxyId, RenderSpec, StyleSpec, TargetState, Verdict,
};
pub use sc_style::{CssDocument, RuleMode, StyleRecord};
