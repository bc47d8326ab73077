//! SC rules: named style variants declared inside a stylesheet.
//!
//! A tracked stylesheet may carry one `sc_rules` block whose body lists
//! named variants of tracked classes:
//!
//! ```text
//! sc_rules { dark=.btn[color:white,background:black], dark=.card[border:none] }
//! ```
//!
//! Each entry is `rule=class[property:value,...]`. Repeating a rule name adds
//! classes to it; repeating a class inside a rule overlays its declarations.
//! Commas inside parentheses (`rgba(0,0,0,.5)`) belong to the value.

use sc_core::{ScError, StyleMap};

const CONTEXT: &str = "sc_rules";

/// One named rule: declarations to apply per class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    classes: Vec<(String, StyleMap)>,
}

impl Rule {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: Vec::new(),
        }
    }

    fn add(&mut self, class: String, declarations: StyleMap) {
        match self.classes.iter_mut().find(|(c, _)| *c == class) {
            Some((_, existing)) => existing.merge(&declarations),
            None => self.classes.push((class, declarations)),
        }
    }

    /// Classes this rule touches, with their declarations, in source order.
    pub fn classes(&self) -> impl Iterator<Item = (&str, &StyleMap)> {
        self.classes.iter().map(|(c, d)| (c.as_str(), d))
    }

    /// Declarations for one class.
    #[must_use]
    pub fn declarations_for(&self, class: &str) -> Option<&StyleMap> {
        self.classes.iter().find(|(c, _)| c == class).map(|(_, d)| d)
    }
}

/// All rules known to a style engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `sc_rules` body, with or without its braces.
    pub fn parse(text: &str) -> Result<Self, ScError> {
        let text = text.trim();
        let body = match (text.strip_prefix('{'), text.ends_with('}')) {
            (Some(inner), true) => &inner[..inner.len() - 1],
            (None, false) => text,
            _ => return Err(parse_error("unbalanced braces around rule list")),
        };

        let mut set = Self::new();
        let mut rest = body;
        loop {
            rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
            if rest.is_empty() {
                break;
            }
            let (name, after) = rest
                .split_once('=')
                .ok_or_else(|| parse_error(format!("missing '=' in '{}'", rest.trim())))?;
            let (class, after) = after
                .split_once('[')
                .ok_or_else(|| parse_error(format!("missing '[' after '{}'", name.trim())))?;
            let (list, after) = after
                .split_once(']')
                .ok_or_else(|| parse_error(format!("unclosed '[' in rule '{}'", name.trim())))?;

            let name = name.trim();
            let class = class.trim();
            if name.is_empty() || class.is_empty() {
                return Err(parse_error("rule entries need a name and a class"));
            }
            set.entry(name).add(class.to_owned(), parse_list(list)?);
            rest = after;
        }
        Ok(set)
    }

    fn entry(&mut self, name: &str) -> &mut Rule {
        let slot = match self.rules.iter().position(|r| r.name == name) {
            Some(slot) => slot,
            None => {
                self.rules.push(Rule::new(name));
                self.rules.len() - 1
            }
        };
        &mut self.rules[slot]
    }

    /// Fold another set into this one.
    pub fn merge(&mut self, other: RuleSet) {
        for rule in other.rules {
            let target = self.entry(&rule.name);
            for (class, declarations) in rule.classes {
                target.add(class, declarations);
            }
        }
    }

    /// Rule by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Rule names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn parse_error(message: impl Into<String>) -> ScError {
    ScError::Parse {
        context: CONTEXT,
        message: message.into(),
    }
}

/// Split `prop:value,prop:value` on top-level commas.
fn parse_list(list: &str) -> Result<StyleMap, ScError> {
    let mut map = StyleMap::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut pieces = Vec::new();
    for (i, c) in list.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&list[start..]);

    for piece in pieces.into_iter().map(str::trim).filter(|p| !p.is_empty()) {
        let (property, value) = piece
            .split_once(':')
            .ok_or_else(|| parse_error(format!("declaration '{piece}' has no ':'")))?;
        map.set(property.trim(), value.trim());
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_rules() {
        let set = RuleSet::parse(
            "{ dark=.btn[color:white, background:black],\n  light=.btn[color:black] }",
        )
        .unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["dark", "light"]);
        let dark = set.get("dark").unwrap().declarations_for(".btn").unwrap();
        assert_eq!(dark.to_string(), "color:white;background:black;");
    }

    #[test]
    fn repeated_rule_names_collect_classes() {
        let set = RuleSet::parse("dark=.btn[color:white],dark=.card[border:none]").unwrap();
        let classes: Vec<_> = set.get("dark").unwrap().classes().map(|(c, _)| c).collect();
        assert_eq!(classes, vec![".btn", ".card"]);
    }

    #[test]
    fn values_keep_spaces_and_parenthesized_commas() {
        let set = RuleSet::parse("{x=.a[box-shadow:0 0 2px rgba(0,0,0,.5),margin:0 auto]}").unwrap();
        let map = set.get("x").unwrap().declarations_for(".a").unwrap();
        assert_eq!(map.get("box-shadow"), Some("0 0 2px rgba(0,0,0,.5)"));
        assert_eq!(map.get("margin"), Some("0 auto"));
    }

    #[test]
    fn merge_overlays_same_class() {
        let mut set = RuleSet::parse("dark=.btn[color:white,padding:1px]").unwrap();
        set.merge(RuleSet::parse("dark=.btn[color:grey]").unwrap());
        let map = set.get("dark").unwrap().declarations_for(".btn").unwrap();
        assert_eq!(map.to_string(), "color:grey;padding:1px;");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn malformed_entries_are_parse_errors() {
        for text in ["dark.btn[color:red]", "dark=.btn color:red", "dark=.btn[color red]", "{dark=.b[c:d]"] {
            assert!(
                matches!(RuleSet::parse(text), Err(ScError::Parse { .. })),
                "{text} should not parse"
            );
        }
        assert!(RuleSet::parse("{}").unwrap().is_empty());
    }
}
