use std::collections::HashSet;

use parking_lot::Mutex;
use serde::Serialize;

/// Outcome of one validation run.
///
/// Entry order inside the three lists carries no meaning; compare them
/// as sets. `is_complete` is derived by
/// [`ResultAggregator::finalize`] and never set on its own.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_complete: bool,
    /// Well-formed identifiers that are supplied or required but absent
    /// from the store, in canonical string form.
    pub missing_blocks: Vec<String>,
    /// Candidate strings that failed to decode, exactly as supplied.
    pub invalid_blocks: Vec<String>,
    /// Sum of the sizes of distinct reachable blocks that could be sized.
    pub reachable_size: u64,
    /// Advisory restorability verdict. Never authorizes a restore.
    pub can_restore: bool,
    pub error_details: Vec<String>,
}

impl ValidationResult {
    /// Whether the record satisfies its own invariants: `is_complete`
    /// matches the lists, a complete-looking record is not marked
    /// restorable while incomplete, and no string is both missing and
    /// invalid.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let derived = self.missing_blocks.is_empty() && self.invalid_blocks.is_empty();
        let invalid: HashSet<&str> = self.invalid_blocks.iter().map(String::as_str).collect();
        self.is_complete == derived
            && (!self.can_restore || self.is_complete)
            && !self
                .missing_blocks
                .iter()
                .any(|m| invalid.contains(m.as_str()))
    }
}

/// Concurrency-safe accumulator behind a [`ValidationResult`].
///
/// One coarse lock guards the whole record. Mutation is rare next to
/// store round trips, so contention is not a concern, and a single lock
/// keeps `finalize` trivially consistent with concurrent appends.
///
/// # `can_restore` is only ever lowered
///
/// ```text
/// set_can_restore(v):  can_restore ← can_restore ∧ v
/// finalize():          is_complete ← missing = ∅ ∧ invalid = ∅
///                      if can_restore { can_restore ← is_complete }
/// ```
///
/// Once a traversal failure forces `can_restore = false`, no later
/// `finalize` (however clean the lists look) raises it again.
#[derive(Debug)]
pub struct ResultAggregator {
    inner: Mutex<ValidationResult>,
}

impl ResultAggregator {
    /// Empty record with list capacity for `expected` candidates.
    #[must_use]
    pub fn with_capacity(expected: usize) -> Self {
        Self {
            inner: Mutex::new(ValidationResult {
                is_complete: false,
                missing_blocks: Vec::with_capacity(expected),
                invalid_blocks: Vec::with_capacity(expected),
                reachable_size: 0,
                can_restore: true,
                error_details: Vec::with_capacity(expected),
            }),
        }
    }

    pub fn add_missing(&self, cid: impl Into<String>) {
        self.inner.lock().missing_blocks.push(cid.into());
    }

    pub fn add_invalid(&self, input: impl Into<String>) {
        self.inner.lock().invalid_blocks.push(input.into());
    }

    pub fn add_error(&self, message: impl Into<String>) {
        self.inner.lock().error_details.push(message.into());
    }

    /// Lower the verdict. Passing `true` never raises a `false` flag.
    pub fn set_can_restore(&self, can_restore: bool) {
        self.inner.lock().can_restore &= can_restore;
    }

    /// Record the walk total. Keeps the larger value so the size never
    /// moves backwards.
    pub fn set_reachable_size(&self, bytes: u64) {
        let mut inner = self.inner.lock();
        inner.reachable_size = inner.reachable_size.max(bytes);
    }

    /// Derive the flags from the current lists. Idempotent.
    pub fn finalize(&self) {
        let mut inner = self.inner.lock();
        inner.is_complete = inner.missing_blocks.is_empty() && inner.invalid_blocks.is_empty();
        if inner.can_restore {
            inner.can_restore = inner.is_complete;
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> ValidationResult {
        self.inner.lock().clone()
    }

    #[must_use]
    pub fn into_result(self) -> ValidationResult {
        self.inner.into_inner()
    }
}
