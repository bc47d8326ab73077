//! The named style table.
//!
//! # Invariants
//!
//! 1. Names are unique. Construction rejects repeated names; later inserts
//!    replace the record in place.
//! 2. An empty table and an unknown name are different lookup failures.

use ahash::AHashMap;
use sc_core::{DuplicateKind, LookupKind, ScError, StyleMap};

use crate::record::StyleRecord;

/// Style records indexed by name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    records: Vec<StyleRecord>,
    index: AHashMap<String, usize>,
}

impl StyleTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, rejecting repeated names.
    ///
    /// The error lists every repeated name once, in first-seen order.
    pub fn from_records(records: impl IntoIterator<Item = StyleRecord>) -> Result<Self, ScError> {
        let mut table = Self::new();
        let mut repeated: Vec<String> = Vec::new();
        for record in records {
            if table.index.contains_key(&record.name) {
                if !repeated.contains(&record.name) {
                    repeated.push(record.name);
                }
                continue;
            }
            table.push(record);
        }
        if repeated.is_empty() {
            Ok(table)
        } else {
            Err(ScError::Duplicate {
                kind: DuplicateKind::StyleName,
                names: repeated,
            })
        }
    }

    fn push(&mut self, record: StyleRecord) {
        self.index.insert(record.name.clone(), self.records.len());
        self.records.push(record);
    }

    /// Names of records whose declarations equal another record's.
    ///
    /// Harmless, but usually a sign of copy-paste in the page's table.
    #[must_use]
    pub fn duplicate_contents(&self) -> Vec<String> {
        self.records
            .iter()
            .enumerate()
            .filter(|(i, record)| {
                self.records
                    .iter()
                    .enumerate()
                    .any(|(j, other)| j != *i && other.style == record.style)
            })
            .map(|(_, record)| record.name.clone())
            .collect()
    }

    /// Look up a record's declarations by name.
    pub fn resolve(&self, name: &str) -> Result<&StyleMap, ScError> {
        if self.records.is_empty() {
            return Err(ScError::lookup(LookupKind::EmptyTable, name));
        }
        self.get(name)
            .map(|record| &record.style)
            .ok_or_else(|| ScError::lookup(LookupKind::Style, name))
    }

    /// Insert a record, returning the one it replaced.
    pub fn insert(&mut self, record: StyleRecord) -> Option<StyleRecord> {
        match self.index.get(&record.name) {
            Some(&slot) => Some(std::mem::replace(&mut self.records[slot], record)),
            None => {
                self.push(record);
                None
            }
        }
    }

    /// Record by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StyleRecord> {
        self.index.get(name).map(|&slot| &self.records[slot])
    }

    /// Records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &StyleRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> StyleMap {
        StyleMap::from([("color", "red")])
    }

    #[test]
    fn repeated_names_reject_the_table() {
        let err = StyleTable::from_records([
            StyleRecord::new("a", red()),
            StyleRecord::new("b", red()),
            StyleRecord::new("a", StyleMap::new()),
            StyleRecord::new("a", StyleMap::new()),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ScError::Duplicate {
                kind: DuplicateKind::StyleName,
                names: vec!["a".into()],
            }
        );
    }

    #[test]
    fn repeated_contents_are_listed() {
        let table = StyleTable::from_records([
            StyleRecord::new("a", red()),
            StyleRecord::new("b", StyleMap::from([("margin", "0")])),
            StyleRecord::new("c", red()),
        ])
        .unwrap();
        assert_eq!(table.duplicate_contents(), vec!["a", "c"]);
    }

    #[test]
    fn empty_table_and_unknown_name_differ() {
        let empty = StyleTable::new();
        assert!(matches!(
            empty.resolve("x"),
            Err(ScError::Lookup {
                kind: LookupKind::EmptyTable,
                ..
            })
        ));

        let table = StyleTable::from_records([StyleRecord::new("a", red())]).unwrap();
        assert!(matches!(
            table.resolve("x"),
            Err(ScError::Lookup {
                kind: LookupKind::Style,
                ..
            })
        ));
        assert_eq!(table.resolve("a").unwrap(), &red());
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut table = StyleTable::from_records([
            StyleRecord::new("a", red()),
            StyleRecord::new("b", StyleMap::new()),
        ])
        .unwrap();
        let old = table.insert(StyleRecord::new("a", StyleMap::from([("color", "blue")])));
        assert_eq!(old.map(|r| r.style), Some(red()));
        let names: Vec<_> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(table.resolve("a").unwrap().get("color"), Some("blue"));
    }
}
