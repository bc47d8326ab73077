//! Unique name generation for generated styles, scoped classes, and
//! context ids.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Source of unique fragments used to build generated names.
pub trait IdSource {
    /// A UUID-shaped string (`8-4-4-4-12` hex groups).
    fn uuid(&mut self) -> String;

    /// A short alphanumeric suffix of `len` characters.
    fn suffix(&mut self, len: usize) -> String;
}

/// Random ids: UUID v4 and alphanumeric suffixes from the thread RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn uuid(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn suffix(&mut self, len: usize) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }
}

/// Deterministic ids for tests and reproducible snapshots.
///
/// Every call advances a shared counter, so a uuid and a suffix never repeat
/// each other's number.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    /// Start counting from 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from `n + 1`.
    #[must_use]
    pub fn starting_after(n: u64) -> Self {
        Self { next: n }
    }

    fn bump(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

impl IdSource for SequentialIds {
    fn uuid(&mut self) -> String {
        format!("00000000-0000-4000-8000-{:012x}", self.bump())
    }

    fn suffix(&mut self, len: usize) -> String {
        let n = self.bump();
        let digits = format!("{n:0len$}");
        digits[digits.len().saturating_sub(len)..].to_owned()
    }
}
