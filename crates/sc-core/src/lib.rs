#![forbid(unsafe_code)]

//! Core: payload values, DOM capabilities, and diagnostics for SC.
//!
//! # Role in SC
//! `sc-core` is the boundary layer. It names the things the reactive engine
//! consumes from the page without implementing the page itself.
//!
//! # Primary responsibilities
//! - **Value / Tracked**: JSON-shaped payloads and their equality form.
//! - **DomHost**: selector resolution and element mutation capability.
//! - **MemoryDom**: a headless DOM used by tests and non-browser hosts.
//! - **IdSource**: unique names for generated styles and scoped classes.
//! - **Diagnostics**: the reporting channel for non-fatal failures.
//!
//! # How it fits in the system
//! `sc-style` builds the style table and rule engine on top of these types,
//! and `sc-runtime` drives both from observable writes.

pub mod diagnostics;
pub mod dom;
pub mod error;
pub mod ids;
pub mod memory_dom;
pub mod style_map;
pub mod value;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use dom::{DomHost, DomOp, NodeId, SC_ATTR, Selector};
pub use error::{DuplicateKind, LookupKind, ScError};
pub use ids::{IdSource, RandomIds, SequentialIds};
pub use memory_dom::MemoryDom;
pub use style_map::StyleMap;
pub use value::{Tracked, Value, is_container, kind_of};
