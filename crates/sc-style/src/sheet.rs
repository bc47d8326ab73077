//! Stylesheets: tracked page documents and the generated SC sheet.

use sc_core::{ScError, StyleMap};

use crate::declarations;

/// One `selector { body }` block of a page stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRule {
    pub selector: String,
    pub body: String,
}

/// A page stylesheet as loaded from `href`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssDocument {
    pub href: String,
    pub rules: Vec<DocumentRule>,
}

impl CssDocument {
    /// Split stylesheet text into rule blocks.
    ///
    /// Comments are dropped. Nested blocks (`@media`) are kept whole as the
    /// body of their outer selector.
    pub fn parse(href: impl Into<String>, text: &str) -> Result<Self, ScError> {
        let text = strip_comments(text)?;
        let mut rules = Vec::new();
        let mut rest = text.as_str();
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            let open = rest.find('{').ok_or_else(|| {
                parse_error(format!("selector '{}' has no block", rest.trim()))
            })?;
            let selector = rest[..open].trim();
            let close = matching_brace(rest, open)
                .ok_or_else(|| parse_error(format!("unclosed block for '{selector}'")))?;
            rules.push(DocumentRule {
                selector: selector.to_owned(),
                body: rest[open + 1..close].trim().to_owned(),
            });
            rest = &rest[close + 1..];
        }
        Ok(Self {
            href: href.into(),
            rules,
        })
    }

    /// The `name.css` segment at the end of the href, if any.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        let (_, name) = self.href.rsplit_once('/')?;
        (name.len() > ".css".len() && name.ends_with(".css")).then_some(name)
    }

    /// Index of the first rule with this exact selector.
    #[must_use]
    pub fn position(&self, selector: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.selector == selector)
    }
}

fn parse_error(message: String) -> ScError {
    ScError::Parse {
        context: "stylesheet",
        message,
    }
}

fn strip_comments(text: &str) -> Result<String, ScError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        let end = rest[start + 2..]
            .find("*/")
            .ok_or_else(|| parse_error("unterminated comment".to_owned()))?;
        rest = &rest[start + 2 + end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// A rule SC owns in its generated sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector: String,
    pub declarations: StyleMap,
}

impl CssRule {
    /// `selector{prop:value;}`.
    #[must_use]
    pub fn css_text(&self) -> String {
        declarations::rule_text(&self.selector, &self.declarations)
    }
}

/// The sheet SC writes scoped classes into.
///
/// New and rewritten rules are inserted at index 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedSheet {
    rules: Vec<CssRule>,
}

impl GeneratedSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at `index`, clamped to the end of the sheet.
    pub fn insert(&mut self, index: usize, rule: CssRule) {
        let index = index.min(self.rules.len());
        self.rules.insert(index, rule);
    }

    /// Remove the rule at `index`.
    pub fn delete(&mut self, index: usize) -> Option<CssRule> {
        (index < self.rules.len()).then(|| self.rules.remove(index))
    }

    /// Index of the first rule with this exact selector.
    #[must_use]
    pub fn position(&self, selector: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.selector == selector)
    }

    /// Rule by selector.
    #[must_use]
    pub fn find(&self, selector: &str) -> Option<&CssRule> {
        self.rules.iter().find(|r| r.selector == selector)
    }

    pub(crate) fn rename(&mut self, index: usize, selector: String) {
        if let Some(rule) = self.rules.get_mut(index) {
            rule.selector = selector;
        }
    }

    #[must_use]
    pub fn rules(&self) -> &[CssRule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The whole sheet as CSS text, one rule per line.
    #[must_use]
    pub fn to_css_text(&self) -> String {
        self.rules
            .iter()
            .map(CssRule::css_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A rule read from a tracked stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedClass {
    /// Current selector; rewritten when a class in it is scoped.
    pub selector_text: String,
    pub declarations: StyleMap,
    /// The selector as the page wrote it, once scoping rewrote it.
    pub original_selector: Option<String>,
}

impl TrackedClass {
    #[must_use]
    pub fn new(selector_text: impl Into<String>, declarations: StyleMap) -> Self {
        Self {
            selector_text: selector_text.into(),
            declarations,
            original_selector: None,
        }
    }

    /// Whether scoping has rewritten this rule.
    #[must_use]
    pub fn is_scoped(&self) -> bool {
        self.original_selector.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_rule_blocks() {
        let doc = CssDocument::parse(
            "https://x.test/css/app.css",
            "/* header */ .btn { color: red; }\n.card{margin:0}\n@media (max-width: 1px) { .btn { color: blue } }",
        )
        .unwrap();
        let selectors: Vec<_> = doc.rules.iter().map(|r| r.selector.as_str()).collect();
        assert_eq!(selectors, vec![".btn", ".card", "@media (max-width: 1px)"]);
        assert_eq!(doc.rules[0].body, "color: red;");
        assert_eq!(doc.rules[2].body, ".btn { color: blue }");
        assert_eq!(doc.position(".card"), Some(1));
    }

    #[test]
    fn malformed_documents_fail() {
        assert!(CssDocument::parse("a.css", ".btn { color: red;").is_err());
        assert!(CssDocument::parse("a.css", ".btn color: red;").is_err());
        assert!(CssDocument::parse("a.css", "/* open .btn{}").is_err());
    }

    #[test]
    fn file_name_needs_a_path_and_css_suffix() {
        let doc = |href: &str| CssDocument {
            href: href.into(),
            rules: Vec::new(),
        };
        assert_eq!(doc("https://x.test/a/theme.css").file_name(), Some("theme.css"));
        assert_eq!(doc("theme.css").file_name(), None);
        assert_eq!(doc("https://x.test/a/.css").file_name(), None);
        assert_eq!(doc("https://x.test/a/theme.scss.map").file_name(), None);
    }

    #[test]
    fn generated_sheet_orders_newest_first() {
        let mut sheet = GeneratedSheet::new();
        let rule = |s: &str| CssRule {
            selector: s.into(),
            declarations: StyleMap::from([("color", "red")]),
        };
        sheet.insert(0, rule(".a"));
        sheet.insert(0, rule(".b"));
        sheet.insert(99, rule(".c"));
        assert_eq!(sheet.position(".b"), Some(0));
        assert_eq!(sheet.to_css_text(), ".b{color:red;}\n.a{color:red;}\n.c{color:red;}");
        assert_eq!(sheet.delete(5), None);
        assert_eq!(sheet.delete(0).map(|r| r.selector), Some(".b".into()));
        assert_eq!(sheet.len(), 2);
    }
}
