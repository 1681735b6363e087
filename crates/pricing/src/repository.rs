//! Override storage abstraction and the in-memory implementation.

use std::sync::{Arc, RwLock};

use rackquote_core::{DomainError, DomainResult, ExpectedVersion, PartId};

use crate::overrides::{OverrideHistoryEntry, OverrideSnapshot, PriceOverride};

/// Key-value store for overrides and their history.
///
/// Writes carry an [`ExpectedVersion`]; implementations check it against the
/// part's current revision (0 when absent) under their write lock, so two
/// edits of the same part cannot silently overwrite each other.
pub trait OverrideRepository: Send + Sync {
    fn get(&self, part_id: &PartId) -> DomainResult<Option<PriceOverride>>;

    fn list(&self) -> DomainResult<Vec<(PartId, PriceOverride)>>;

    /// Upsert and return the new revision.
    fn put(
        &self,
        part_id: &PartId,
        record: PriceOverride,
        expected: ExpectedVersion,
    ) -> DomainResult<u64>;

    fn remove(&self, part_id: &PartId, expected: ExpectedVersion) -> DomainResult<Option<PriceOverride>>;

    /// Most recent first.
    fn history(&self, part_id: &PartId) -> DomainResult<Vec<OverrideHistoryEntry>>;

    /// Prepend `entry` and truncate the part's history to `cap`.
    fn prepend_history(
        &self,
        part_id: &PartId,
        entry: OverrideHistoryEntry,
        cap: usize,
    ) -> DomainResult<()>;

    /// Upsert (`Some`) or remove (`None`) the override and prepend `entry`
    /// to the part's history as one write. Returns the new revision, 0 after
    /// a removal.
    fn record_change(
        &self,
        part_id: &PartId,
        change: Option<PriceOverride>,
        expected: ExpectedVersion,
        entry: OverrideHistoryEntry,
        cap: usize,
    ) -> DomainResult<u64>;

    fn snapshot(&self) -> DomainResult<OverrideSnapshot>;

    /// Replace the whole state (backup restore, bulk import).
    fn restore(&self, snapshot: OverrideSnapshot) -> DomainResult<()>;
}

impl<R> OverrideRepository for Arc<R>
where
    R: OverrideRepository + ?Sized,
{
    fn get(&self, part_id: &PartId) -> DomainResult<Option<PriceOverride>> {
        (**self).get(part_id)
    }

    fn list(&self) -> DomainResult<Vec<(PartId, PriceOverride)>> {
        (**self).list()
    }

    fn put(
        &self,
        part_id: &PartId,
        record: PriceOverride,
        expected: ExpectedVersion,
    ) -> DomainResult<u64> {
        (**self).put(part_id, record, expected)
    }

    fn remove(&self, part_id: &PartId, expected: ExpectedVersion) -> DomainResult<Option<PriceOverride>> {
        (**self).remove(part_id, expected)
    }

    fn history(&self, part_id: &PartId) -> DomainResult<Vec<OverrideHistoryEntry>> {
        (**self).history(part_id)
    }

    fn prepend_history(
        &self,
        part_id: &PartId,
        entry: OverrideHistoryEntry,
        cap: usize,
    ) -> DomainResult<()> {
        (**self).prepend_history(part_id, entry, cap)
    }

    fn record_change(
        &self,
        part_id: &PartId,
        change: Option<PriceOverride>,
        expected: ExpectedVersion,
        entry: OverrideHistoryEntry,
        cap: usize,
    ) -> DomainResult<u64> {
        (**self).record_change(part_id, change, expected, entry, cap)
    }

    fn snapshot(&self) -> DomainResult<OverrideSnapshot> {
        (**self).snapshot()
    }

    fn restore(&self, snapshot: OverrideSnapshot) -> DomainResult<()> {
        (**self).restore(snapshot)
    }
}

fn poisoned() -> DomainError {
    DomainError::storage("override store lock poisoned")
}

/// In-memory override store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryOverrideRepository {
    state: RwLock<OverrideSnapshot>,
}

impl InMemoryOverrideRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: OverrideSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    fn current_revision(state: &OverrideSnapshot, part_id: &PartId) -> u64 {
        state.overrides.get(part_id).map(|o| o.revision).unwrap_or(0)
    }

    fn push_history(state: &mut OverrideSnapshot, part_id: &PartId, entry: OverrideHistoryEntry, cap: usize) {
        let history = state.history.entry(part_id.clone()).or_default();
        history.insert(0, entry);
        history.truncate(cap);
    }
}

impl OverrideRepository for InMemoryOverrideRepository {
    fn get(&self, part_id: &PartId) -> DomainResult<Option<PriceOverride>> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.overrides.get(part_id).cloned())
    }

    fn list(&self) -> DomainResult<Vec<(PartId, PriceOverride)>> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state
            .overrides
            .iter()
            .map(|(id, o)| (id.clone(), o.clone()))
            .collect())
    }

    fn put(
        &self,
        part_id: &PartId,
        mut record: PriceOverride,
        expected: ExpectedVersion,
    ) -> DomainResult<u64> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        let current = Self::current_revision(&state, part_id);
        expected.check(current)?;

        record.revision = current + 1;
        state.overrides.insert(part_id.clone(), record);
        Ok(current + 1)
    }

    fn remove(&self, part_id: &PartId, expected: ExpectedVersion) -> DomainResult<Option<PriceOverride>> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        let current = Self::current_revision(&state, part_id);
        expected.check(current)?;
        Ok(state.overrides.remove(part_id))
    }

    fn history(&self, part_id: &PartId) -> DomainResult<Vec<OverrideHistoryEntry>> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.history.get(part_id).cloned().unwrap_or_default())
    }

    fn prepend_history(
        &self,
        part_id: &PartId,
        entry: OverrideHistoryEntry,
        cap: usize,
    ) -> DomainResult<()> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        Self::push_history(&mut state, part_id, entry, cap);
        Ok(())
    }

    fn record_change(
        &self,
        part_id: &PartId,
        change: Option<PriceOverride>,
        expected: ExpectedVersion,
        entry: OverrideHistoryEntry,
        cap: usize,
    ) -> DomainResult<u64> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        let current = Self::current_revision(&state, part_id);
        expected.check(current)?;

        let revision = match change {
            Some(mut record) => {
                record.revision = current + 1;
                state.overrides.insert(part_id.clone(), record);
                current + 1
            }
            None => {
                state.overrides.remove(part_id);
                0
            }
        };
        Self::push_history(&mut state, part_id, entry, cap);
        Ok(revision)
    }

    fn snapshot(&self) -> DomainResult<OverrideSnapshot> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.clone())
    }

    fn restore(&self, snapshot: OverrideSnapshot) -> DomainResult<()> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        *state = snapshot;
        Ok(())
    }
}
