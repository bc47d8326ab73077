//! Named style records.

use sc_core::StyleMap;

/// A reusable named style: the unit of the style table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRecord {
    pub name: String,
    pub style: StyleMap,
    /// Where the record came from when it was generated rather than
    /// registered by the page (`"rule dark for .btn"`).
    pub origin: Option<String>,
}

impl StyleRecord {
    /// Create a page-registered record.
    pub fn new(name: impl Into<String>, style: impl Into<StyleMap>) -> Self {
        Self {
            name: name.into(),
            style: style.into(),
            origin: None,
        }
    }

    /// Tag the record with its origin.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Whether SC generated this record.
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.origin.is_some()
    }
}
