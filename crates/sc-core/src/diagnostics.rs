//! Diagnostic channel for non-fatal failures.
//!
//! Lookup and configuration problems never abort a dispatch. They are
//! recorded here and emitted through `tracing` so the page author sees them
//! while the remaining targets keep rendering.
//!
//! # Invariants
//!
//! 1. Errors are always recorded and emitted.
//! 2. Warnings are dropped entirely when warnings are disabled.
//! 3. Entries are kept in report order until drained.

use tracing::{error, warn};

use crate::error::ScError;

/// How loudly a diagnostic is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Suspicious but harmless (duplicates, missing classes).
    Warning,
    /// Something the caller asked for did not happen.
    Error,
}

/// One recorded report.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub error: ScError,
}

/// Recorded diagnostics for one style context.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    warnings_enabled: bool,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Create an empty channel with warnings enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            warnings_enabled: true,
        }
    }

    /// Enable or silence warning-severity reports.
    #[must_use]
    pub fn with_warnings(mut self, enabled: bool) -> Self {
        self.warnings_enabled = enabled;
        self
    }

    /// Report a warning.
    pub fn warn(&mut self, err: ScError) {
        if !self.warnings_enabled {
            return;
        }
        warn!(target: "sc", error = %err, "sc warning");
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            error: err,
        });
    }

    /// Report an error.
    pub fn error(&mut self, err: ScError) {
        error!(target: "sc", error = %err, "sc error");
        self.entries.push(Diagnostic {
            severity: Severity::Error,
            error: err,
        });
    }

    /// Report with an explicit severity.
    pub fn report(&mut self, severity: Severity, err: ScError) {
        match severity {
            Severity::Warning => self.warn(err),
            Severity::Error => self.error(err),
        }
    }

    /// All recorded entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Remove and return all recorded entries.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    /// Whether any error-severity entry is recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupKind;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn warnings_are_logged_and_recorded() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn(ScError::lookup(LookupKind::Class, ".missing"));
        assert_eq!(diagnostics.len(), 1);
        assert!(!diagnostics.has_errors());
        assert!(logs_contain("css class not found: '.missing'"));
    }

    #[test]
    fn silenced_warnings_leave_no_trace() {
        let mut diagnostics = Diagnostics::new().with_warnings(false);
        diagnostics.warn(ScError::lookup(LookupKind::Class, ".missing"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn errors_survive_silenced_warnings() {
        let mut diagnostics = Diagnostics::new().with_warnings(false);
        diagnostics.report(Severity::Error, ScError::configuration("unregistered"));
        assert!(diagnostics.has_errors());
        let drained = diagnostics.drain();
        assert_eq!(drained.len(), 1);
        assert!(diagnostics.is_empty());
    }
}
