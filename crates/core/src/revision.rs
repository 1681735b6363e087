//! Optimistic revision checks for per-record writes.

use crate::error::{DomainError, DomainResult};

/// Revision expectation for a single-record write.
///
/// Price overrides are the only mutable shared records; every write names the
/// revision it was computed from so a concurrent edit of the same part is
/// rejected instead of silently lost.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ExpectedVersion {
    /// Skip revision checking (last writer wins).
    #[default]
    Any,
    /// Require the record to be at an exact revision (0 = absent).
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "stale revision (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}
