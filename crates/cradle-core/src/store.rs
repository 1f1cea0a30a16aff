//! # Startup Store
//!
//! The persistence gateway: atomic single-record storage for startup
//! snapshots, with optimistic concurrency on writes.
//!
//! Two implementations exist: the in-memory [`MemoryStore`] here (fast,
//! volatile) and the disk-backed [`crate::storage::RedbStore`] (ACID,
//! persistent). Both commit whole snapshots: a guarded update either applies
//! the full record or nothing.

use crate::model::{Profile, Startup};
use crate::types::{Actor, CradleError, StartupId, Timestamp, Version};
use std::collections::BTreeMap;

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Atomic single-record read-modify-write storage for startups.
///
/// The version check in `update_guarded` is the concurrency contract: the
/// engine computes a new snapshot from a read snapshot, and the write commits
/// only if nobody else committed in between.
pub trait StartupStore {
    /// Create a new startup at intake: allocates the id, starts at
    /// (S0, Active) with version 1.
    fn create(
        &mut self,
        profile: Profile,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<Startup, CradleError>;

    /// Fetch a snapshot by id.
    fn get(&self, id: StartupId) -> Result<Option<Startup>, CradleError>;

    /// All snapshots in id order.
    fn list(&self) -> Result<Vec<Startup>, CradleError>;

    /// Commit `updated` iff the stored version still equals `expected`.
    ///
    /// On success the stored record carries `expected.bump()` and the
    /// committed snapshot is returned. A stale `expected` fails with
    /// `ConcurrentModification`; a missing id fails with `NotFound`.
    fn update_guarded(
        &mut self,
        expected: Version,
        updated: &Startup,
    ) -> Result<Startup, CradleError>;

    /// Hard delete. Administrative, not a lifecycle transition: no invariant
    /// checks apply. Returns whether a record was removed.
    fn remove(&mut self, id: StartupId) -> Result<bool, CradleError>;

    /// Number of stored records.
    fn count(&self) -> Result<usize, CradleError>;
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Volatile store backed by a `BTreeMap` (deterministic iteration order).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<StartupId, Startup>,
    next_id: u64,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl StartupStore for MemoryStore {
    fn create(
        &mut self,
        profile: Profile,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<Startup, CradleError> {
        let id = StartupId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let startup = Startup::register(id, profile, actor.name.clone(), actor.role, now);
        self.records.insert(id, startup.clone());
        Ok(startup)
    }

    fn get(&self, id: StartupId) -> Result<Option<Startup>, CradleError> {
        Ok(self.records.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Startup>, CradleError> {
        Ok(self.records.values().cloned().collect())
    }

    fn update_guarded(
        &mut self,
        expected: Version,
        updated: &Startup,
    ) -> Result<Startup, CradleError> {
        let Some(stored) = self.records.get_mut(&updated.id) else {
            return Err(CradleError::NotFound(updated.id));
        };
        if stored.version != expected {
            return Err(CradleError::ConcurrentModification {
                expected: expected.value(),
                found: stored.version.value(),
            });
        }

        let mut committed = updated.clone();
        committed.version = expected.bump();
        *stored = committed.clone();
        Ok(committed)
    }

    fn remove(&mut self, id: StartupId) -> Result<bool, CradleError> {
        Ok(self.records.remove(&id).is_some())
    }

    fn count(&self) -> Result<usize, CradleError> {
        Ok(self.records.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================
