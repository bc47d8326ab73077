#![forbid(unsafe_code)]

//! Style: named style records, CSS text, SC rules, and scoped classes.
//!
//! # Role in SC
//! `sc-style` is the style collaborator of the reactive engine. Everything
//! that turns a name into CSS declarations lives here.
//!
//! # Primary responsibilities
//! - **StyleTable**: name to property map lookup with duplicate checks.
//! - **declarations**: CSS declaration text in and out.
//! - **RuleSet**: the `sc_rules` mini-language of named rule variants.
//! - **CssDocument / GeneratedSheet**: tracked stylesheets and the sheet
//!   SC writes scoped classes into.
//! - **StyleRuleEngine**: the facade the runtime talks to.
//!
//! # How it fits in the system
//! `sc-runtime` owns one [`StyleRuleEngine`] per style context and calls it
//! from stylize requests and style-mode renders.

pub mod declarations;
pub mod engine;
pub mod record;
pub mod rules;
pub mod sheet;
pub mod table;

pub use engine::{IngestReport, OverlayAssignment, RuleMode, StyleRuleEngine};
pub use record::StyleRecord;
pub use rules::{Rule, RuleSet};
pub use sheet::{CssDocument, CssRule, DocumentRule, GeneratedSheet, TrackedClass};
pub use table::StyleTable;
