//! Style rule engine: the facade over table, sheets, and rules.
//!
//! # Scoping model
//!
//! Page stylesheets listed as tracked are read once into [`TrackedClass`]
//! entries. The first time a class such as `.btn` is requested, every
//! tracked rule mentioning it is copied into the [`GeneratedSheet`] with the
//! class renamed to `.SC_btn-<suffix>`. Elements then receive the scoped
//! class, so SC can rewrite the generated copy (rules in replace mode)
//! without touching the page's own stylesheet.
//!
//! # Failure modes
//!
//! | Call | Failure | Result |
//! |------|---------|--------|
//! | `resolve_named_style` | empty table / unknown name | `Lookup` |
//! | `scope_class` | no tracked rule mentions the class | `Lookup(Class)` |
//! | `apply_rule` | unknown rule | `Lookup(Rule)` |
//! | `ingest` | unparsable `sc_rules` block | recorded in the report |

use std::fmt;

use ahash::AHashMap;
use sc_core::{IdSource, LookupKind, ScError, StyleMap};
use tracing::{debug, instrument, trace};

use crate::declarations;
use crate::record::StyleRecord;
use crate::rules::RuleSet;
use crate::sheet::{CssDocument, CssRule, GeneratedSheet, TrackedClass};
use crate::table::StyleTable;

/// Selector marking the rule-list block in a tracked stylesheet.
pub const RULES_SELECTOR: &str = "sc_rules";

/// Length of the random part of a scoped class name.
const SCOPE_SUFFIX_LEN: usize = 6;

/// How [`StyleRuleEngine::apply_rule`] applies declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleMode {
    /// Rewrite the generated rule of each scoped class.
    #[default]
    Replace,
    /// Register the declarations as a generated style for inline use.
    Overlay,
}

/// Inline style the caller should apply for an overlay rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayAssignment {
    /// Class the rule names (`.btn`).
    pub selector: String,
    /// Generated style record holding the declarations.
    pub style: String,
}

/// What [`StyleRuleEngine::ingest`] found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Selectors tracked more than once, each listed once.
    pub duplicate_selectors: Vec<String>,
    /// Rule blocks that failed to parse.
    pub errors: Vec<ScError>,
    /// Number of tracked rules read.
    pub tracked: usize,
}

/// Named styles, tracked stylesheets, SC rules, and the generated sheet.
pub struct StyleRuleEngine {
    table: StyleTable,
    documents: Vec<CssDocument>,
    tracked: Vec<TrackedClass>,
    generated: GeneratedSheet,
    rules: RuleSet,
    /// Class as written by the page to scoped class name (no dot).
    scopes: AHashMap<String, String>,
    /// `(rule, class)` to generated style name for overlay mode.
    overlay_names: AHashMap<(String, String), String>,
    ids: Box<dyn IdSource>,
}

impl fmt::Debug for StyleRuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleRuleEngine")
            .field("styles", &self.table.len())
            .field("documents", &self.documents.len())
            .field("tracked", &self.tracked.len())
            .field("generated", &self.generated.len())
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

impl StyleRuleEngine {
    /// Create an engine over a validated table.
    pub fn new(table: StyleTable, ids: Box<dyn IdSource>) -> Self {
        Self {
            table,
            documents: Vec::new(),
            tracked: Vec::new(),
            generated: GeneratedSheet::new(),
            rules: RuleSet::new(),
            scopes: AHashMap::new(),
            overlay_names: AHashMap::new(),
            ids,
        }
    }

    // --- named styles -----------------------------------------------------

    /// Declarations of a named style record.
    pub fn resolve_named_style(&self, name: &str) -> Result<StyleMap, ScError> {
        self.table.resolve(name).cloned()
    }

    /// Register `map` under a fresh name starting with `base`.
    pub fn register_generated_style(&mut self, base: &str, map: StyleMap) -> String {
        let name = format!("{base}{}", self.ids.uuid());
        trace!(%name, "registering generated style");
        self.table
            .insert(StyleRecord::new(name.clone(), map).with_origin(format!("generated from {base}")));
        name
    }

    /// Replace the declarations of a previously generated style.
    pub fn update_generated_style(&mut self, name: &str, map: StyleMap) {
        let origin = self
            .table
            .get(name)
            .and_then(|r| r.origin.clone())
            .unwrap_or_else(|| "generated".to_owned());
        self.table.insert(StyleRecord::new(name, map).with_origin(origin));
    }

    /// A fresh random suffix from the engine's id source.
    pub fn next_suffix(&mut self, len: usize) -> String {
        self.ids.suffix(len)
    }

    // --- tracked stylesheets ----------------------------------------------

    /// Read tracked stylesheets.
    ///
    /// Only documents whose file name is listed in `tracked_files` are read.
    /// `sc_rules` blocks become rules and are removed from their document.
    /// With `delete_native`, every other rule is removed from its document
    /// too, leaving SC's copy as the only one.
    #[instrument(level = "debug", skip_all, fields(documents = documents.len()))]
    pub fn ingest<S: AsRef<str>>(
        &mut self,
        documents: Vec<CssDocument>,
        tracked_files: &[S],
        delete_native: bool,
    ) -> IngestReport {
        let mut report = IngestReport::default();
        for mut doc in documents {
            let tracked = doc
                .file_name()
                .is_some_and(|name| tracked_files.iter().any(|f| f.as_ref() == name));
            if !tracked {
                self.documents.push(doc);
                continue;
            }

            let mut kept = Vec::with_capacity(doc.rules.len());
            for rule in doc.rules.drain(..) {
                if rule.selector.contains(RULES_SELECTOR) {
                    match RuleSet::parse(&rule.body) {
                        Ok(set) => self.rules.merge(set),
                        Err(err) => report.errors.push(err),
                    }
                    continue;
                }
                self.tracked.push(TrackedClass::new(
                    rule.selector.clone(),
                    declarations::parse(&rule.body),
                ));
                report.tracked += 1;
                if !delete_native {
                    kept.push(rule);
                }
            }
            doc.rules = kept;
            self.documents.push(doc);
        }

        for (i, class) in self.tracked.iter().enumerate() {
            let selector = &class.selector_text;
            let repeated = self.tracked[i + 1..]
                .iter()
                .any(|other| other.selector_text == *selector);
            if repeated && !report.duplicate_selectors.contains(selector) {
                report.duplicate_selectors.push(selector.clone());
            }
        }
        debug!(
            tracked = report.tracked,
            rules = self.rules.len(),
            "ingested tracked stylesheets"
        );
        report
    }

    /// Add an `sc_rules` body supplied outside any stylesheet.
    pub fn add_rules(&mut self, text: &str) -> Result<(), ScError> {
        self.rules.merge(RuleSet::parse(text)?);
        Ok(())
    }

    // --- scoped classes ---------------------------------------------------

    /// Scope a tracked class, returning the scoped class name (no dot).
    ///
    /// The first call copies every tracked rule mentioning the class into
    /// the generated sheet under a fresh name; later calls return it.
    pub fn scope_class(&mut self, class: &str) -> Result<String, ScError> {
        let class = normalize_class(class)
            .ok_or_else(|| ScError::lookup(LookupKind::Class, class))?;
        if let Some(scoped) = self.scopes.get(&class) {
            return Ok(scoped.clone());
        }

        let bare = &class[1..];
        let scoped = format!("SC_{bare}-{}", self.ids.suffix(SCOPE_SUFFIX_LEN));
        let replacement = format!(".{scoped}");
        let mut matched = false;
        for tracked in &mut self.tracked {
            let Some(renamed) = replace_class_token(&tracked.selector_text, &class, &replacement)
            else {
                continue;
            };
            matched = true;
            if tracked.is_scoped() {
                if let Some(index) = self.generated.position(&tracked.selector_text) {
                    self.generated.rename(index, renamed.clone());
                }
            } else {
                tracked.original_selector = Some(tracked.selector_text.clone());
                self.generated.insert(
                    0,
                    CssRule {
                        selector: renamed.clone(),
                        declarations: tracked.declarations.clone(),
                    },
                );
            }
            tracked.selector_text = renamed;
        }

        if !matched {
            return Err(ScError::lookup(LookupKind::Class, class));
        }
        debug!(%class, %scoped, "scoped tracked class");
        self.scopes.insert(class, scoped.clone());
        Ok(scoped)
    }

    /// Scoped class name (no dot) of an already scoped class.
    #[must_use]
    pub fn scoped_class_name(&self, class: &str) -> Option<&str> {
        let class = normalize_class(class)?;
        self.scopes.get(&class).map(String::as_str)
    }

    /// Selector for the elements carrying a scoped class (`.SC_btn-abc123`).
    #[must_use]
    pub fn scoped_selector(&self, class: &str) -> Option<String> {
        self.scoped_class_name(class).map(|name| format!(".{name}"))
    }

    // --- rules ------------------------------------------------------------

    /// Apply a named SC rule.
    ///
    /// Replace mode rewrites the generated rule of every scoped class the
    /// rule names and returns no assignments. Classes that were never scoped
    /// have no generated rule and are left alone. Overlay mode returns one
    /// assignment per class; the caller applies it inline.
    #[instrument(level = "debug", skip(self))]
    pub fn apply_rule(
        &mut self,
        name: &str,
        mode: RuleMode,
    ) -> Result<Vec<OverlayAssignment>, ScError> {
        let rule = self
            .rules
            .get(name)
            .cloned()
            .ok_or_else(|| ScError::lookup(LookupKind::Rule, name))?;

        match mode {
            RuleMode::Replace => {
                for (class, overlay) in rule.classes() {
                    let selectors: Vec<String> = self
                        .tracked
                        .iter()
                        .filter(|t| t.original_selector.as_deref() == Some(class))
                        .map(|t| t.selector_text.clone())
                        .collect();
                    for selector in selectors {
                        let Some(index) = self.generated.position(&selector) else {
                            continue;
                        };
                        let Some(mut css) = self.generated.delete(index) else {
                            continue;
                        };
                        css.declarations.merge(overlay);
                        trace!(selector = %css.selector, "rewrote generated rule");
                        self.generated.insert(0, css);
                    }
                }
                Ok(Vec::new())
            }
            RuleMode::Overlay => {
                let mut assignments = Vec::new();
                for (class, overlay) in rule.classes() {
                    let key = (name.to_owned(), class.to_owned());
                    let style = match self.overlay_names.get(&key) {
                        Some(style) => style.clone(),
                        None => {
                            let style = self.register_generated_style(name, overlay.clone());
                            self.overlay_names.insert(key, style.clone());
                            style
                        }
                    };
                    assignments.push(OverlayAssignment {
                        selector: class.to_owned(),
                        style,
                    });
                }
                Ok(assignments)
            }
        }
    }

    // --- accessors --------------------------------------------------------

    #[must_use]
    pub fn table(&self) -> &StyleTable {
        &self.table
    }

    #[must_use]
    pub fn documents(&self) -> &[CssDocument] {
        &self.documents
    }

    #[must_use]
    pub fn tracked(&self) -> &[TrackedClass] {
        &self.tracked
    }

    #[must_use]
    pub fn generated(&self) -> &GeneratedSheet {
        &self.generated
    }

    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

/// `.btn` or `btn` to `.btn`; `None` for an empty name.
fn normalize_class(class: &str) -> Option<String> {
    let bare = class.trim().trim_start_matches('.');
    (!bare.is_empty()).then(|| format!(".{bare}"))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Replace whole-token occurrences of `class` in `selector`.
///
/// `.btn` matches in `.btn:hover` and `div .btn.big` but not in `.btn-primary`.
fn replace_class_token(selector: &str, class: &str, replacement: &str) -> Option<String> {
    let mut out = String::with_capacity(selector.len() + replacement.len());
    let mut rest = selector;
    let mut found = false;
    while let Some(pos) = rest.find(class) {
        let end = pos + class.len();
        out.push_str(&rest[..pos]);
        if rest[end..].chars().next().is_none_or(|c| !is_ident_char(c)) {
            out.push_str(replacement);
            found = true;
        } else {
            out.push_str(&rest[pos..end]);
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    found.then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::SequentialIds;
    use tracing_test::traced_test;

    fn engine() -> StyleRuleEngine {
        StyleRuleEngine::new(StyleTable::new(), Box::new(SequentialIds::new()))
    }

    fn doc(text: &str) -> CssDocument {
        CssDocument::parse("https://x.test/css/app.css", text).unwrap()
    }

    #[test]
    fn token_replacement_respects_boundaries() {
        assert_eq!(
            replace_class_token(".btn:hover, .btn-primary", ".btn", ".X").as_deref(),
            Some(".X:hover, .btn-primary")
        );
        assert_eq!(replace_class_token(".btn-primary", ".btn", ".X"), None);
        assert_eq!(
            replace_class_token("div .btn.big", ".btn", ".X").as_deref(),
            Some("div .X.big")
        );
    }

    #[test]
    fn normalizes_class_names() {
        assert_eq!(normalize_class("btn").as_deref(), Some(".btn"));
        assert_eq!(normalize_class(" .btn").as_deref(), Some(".btn"));
        assert_eq!(normalize_class("."), None);
    }

    #[test]
    fn generated_styles_get_unique_names() {
        let mut engine = engine();
        let a = engine.register_generated_style("theme", StyleMap::from([("color", "red")]));
        let b = engine.register_generated_style("theme", StyleMap::from([("color", "red")]));
        assert_ne!(a, b);
        assert!(a.starts_with("theme"));
        assert!(engine.table().get(&a).is_some_and(StyleRecord::is_generated));

        engine.update_generated_style(&a, StyleMap::from([("color", "blue")]));
        assert_eq!(
            engine.resolve_named_style(&a).unwrap().get("color"),
            Some("blue")
        );
    }

    #[test]
    fn untracked_documents_are_left_alone() {
        let mut engine = engine();
        let report = engine.ingest(vec![doc(".btn{color:red}")], &["other.css"], true);
        assert_eq!(report.tracked, 0);
        assert!(engine.tracked().is_empty());
        assert_eq!(engine.documents()[0].rules.len(), 1);
    }

    #[test]
    fn scoping_twice_reuses_the_name() {
        let mut engine = engine();
        engine.ingest(vec![doc(".btn{color:red}")], &["app.css"], false);
        let first = engine.scope_class(".btn").unwrap();
        let second = engine.scope_class("btn").unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.generated().len(), 1);
    }

    #[test]
    #[traced_test]
    fn scoping_is_logged() {
        let mut engine = engine();
        engine.ingest(vec![doc(".card{border:0}")], &["app.css"], false);
        engine.scope_class("card").unwrap();
        assert!(logs_contain("scoped tracked class"));
        assert!(logs_contain("SC_card-000001"));
    }

    #[test]
    fn unknown_rule_is_a_lookup_failure() {
        let mut engine = engine();
        assert_eq!(
            engine.apply_rule("dark", RuleMode::Replace),
            Err(ScError::lookup(LookupKind::Rule, "dark"))
        );
    }
}
