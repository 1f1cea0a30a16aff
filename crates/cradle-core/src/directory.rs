//! # Directory Module
//!
//! The directory combines a store backend with the lifecycle engine and is
//! the only write path the app layer sees. Every mutation follows the same
//! loop: read the current snapshot, compute the new snapshot through the
//! engine, commit with a version-guarded write. A conflicting concurrent
//! write surfaces as `ConcurrentModification` and the caller retries with a
//! fresh snapshot.
//!
//! ## Storage Backends
//!
//! - `InMemory`: `MemoryStore` (fast, volatile)
//! - `Persistent`: `RedbStore` for disk-backed ACID storage

use crate::engine::{AchievementReport, LifecycleEngine, OnboardingTerms, PitchOutcome};
use crate::intake::IntakeForm;
use crate::model::Startup;
use crate::storage::RedbStore;
use crate::store::{MemoryStore, StartupStore};
use crate::types::{Actor, CradleError, Stage, StartupId, Status, Timestamp};
use std::path::Path;

// =============================================================================
// OPERATION TABLE
// =============================================================================

/// The closed set of lifecycle operations.
///
/// There is deliberately no generic "update any field" variant: every
/// mutation is a named operation with explicit preconditions enforced by the
/// engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleOp {
    AdvanceStage {
        next: Stage,
        pitch: Option<PitchOutcome>,
    },
    MoveToOneOnOne,
    RecordSession {
        date: Timestamp,
        mentor: String,
        feedback: String,
    },
    Onboard(OnboardingTerms),
    Reject {
        reason: String,
    },
    Graduate {
        graduation_date: Option<Timestamp>,
    },
    RecordAchievement(AchievementReport),
}

// =============================================================================
// BACKEND
// =============================================================================

/// Storage backend for a Directory.
#[derive(Debug)]
pub enum StoreBackend {
    /// In-memory store (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StoreBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

// NOTE: StoreBackend does NOT implement Clone.
// RedbStore (database handle) cannot be safely cloned.

// =============================================================================
// LIST FILTER
// =============================================================================

/// Read-side filter for directory listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub stage: Option<Stage>,
    pub status: Option<Status>,
    /// Case-insensitive substring match over name, founder, and email.
    pub search: Option<String>,
}

impl ListFilter {
    fn matches(&self, startup: &Startup) -> bool {
        if let Some(stage) = self.stage {
            if startup.stage != stage {
                return false;
            }
        }
        if let Some(status) = self.status {
            if startup.status != status {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let profile = &startup.profile;
            let hit = profile.name.to_lowercase().contains(&needle)
                || profile.founder.to_lowercase().contains(&needle)
                || profile.email.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        true
    }
}

// =============================================================================
// DIRECTORY
// =============================================================================

/// The startup directory: store backend + lifecycle engine.
#[derive(Debug, Default)]
pub struct Directory {
    backend: StoreBackend,
}

impl Directory {
    /// Create a new directory with in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory over an existing in-memory store.
    #[must_use]
    pub fn with_store(store: MemoryStore) -> Self {
        Self {
            backend: StoreBackend::InMemory(store),
        }
    }

    /// Create a directory with persistent redb storage.
    ///
    /// Opens or creates a redb database at the given path. All changes are
    /// persisted to disk automatically.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, CradleError> {
        let store = RedbStore::open(path)?;
        Ok(Self {
            backend: StoreBackend::Persistent(store),
        })
    }

    /// Create a directory over an existing RedbStore.
    #[must_use]
    pub fn with_redb_store(store: RedbStore) -> Self {
        Self {
            backend: StoreBackend::Persistent(store),
        }
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StoreBackend::Persistent(_))
    }

    // =========================================================================
    // INTAKE
    // =========================================================================

    /// Register a new startup from a raw intake form.
    ///
    /// Normalizes to the canonical schema first; nothing unvalidated reaches
    /// the store. Requires the admin role.
    pub fn intake(
        &mut self,
        form: IntakeForm,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<Startup, CradleError> {
        if !actor.is_admin() {
            return Err(CradleError::Unauthorized);
        }
        let profile = form.normalize()?;
        match &mut self.backend {
            StoreBackend::InMemory(store) => store.create(profile, actor, now),
            StoreBackend::Persistent(store) => store.create(profile, actor, now),
        }
    }

    /// Register a batch of intake forms. The whole batch is validated before
    /// any record is created; a partial batch is never persisted.
    pub fn intake_batch(
        &mut self,
        forms: Vec<IntakeForm>,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<Vec<Startup>, CradleError> {
        if !actor.is_admin() {
            return Err(CradleError::Unauthorized);
        }
        let profiles = IntakeForm::normalize_batch(forms)?;
        let mut created = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let startup = match &mut self.backend {
                StoreBackend::InMemory(store) => store.create(profile, actor, now)?,
                StoreBackend::Persistent(store) => store.create(profile, actor, now)?,
            };
            created.push(startup);
        }
        Ok(created)
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Fetch a snapshot, failing with `NotFound` if the id does not resolve.
    pub fn get(&self, id: StartupId) -> Result<Startup, CradleError> {
        let found = match &self.backend {
            StoreBackend::InMemory(store) => store.get(id)?,
            StoreBackend::Persistent(store) => store.get(id)?,
        };
        found.ok_or(CradleError::NotFound(id))
    }

    /// All startups in id order.
    pub fn list(&self) -> Result<Vec<Startup>, CradleError> {
        match &self.backend {
            StoreBackend::InMemory(store) => store.list(),
            StoreBackend::Persistent(store) => store.list(),
        }
    }

    /// Filtered listing for the read side.
    pub fn search(&self, filter: &ListFilter) -> Result<Vec<Startup>, CradleError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect())
    }

    /// Number of startups on record.
    pub fn count(&self) -> Result<usize, CradleError> {
        match &self.backend {
            StoreBackend::InMemory(store) => store.count(),
            StoreBackend::Persistent(store) => store.count(),
        }
    }

    // =========================================================================
    // LIFECYCLE OPERATIONS
    // =========================================================================

    /// Apply a lifecycle operation: read the current snapshot, run the
    /// engine, commit with a version guard.
    ///
    /// On `ConcurrentModification` the entity was changed underneath the
    /// caller; retry with a fresh read.
    pub fn apply(
        &mut self,
        id: StartupId,
        actor: &Actor,
        now: Timestamp,
        op: LifecycleOp,
    ) -> Result<Startup, CradleError> {
        let snapshot = self.get(id)?;

        let updated = match op {
            LifecycleOp::AdvanceStage { next, pitch } => {
                LifecycleEngine::advance_stage(&snapshot, actor, now, next, pitch)?
            }
            LifecycleOp::MoveToOneOnOne => {
                LifecycleEngine::move_to_one_on_one(&snapshot, actor, now)?
            }
            LifecycleOp::RecordSession {
                date,
                mentor,
                feedback,
            } => LifecycleEngine::record_mentorship_session(
                &snapshot, actor, now, date, mentor, feedback,
            )?,
            LifecycleOp::Onboard(terms) => LifecycleEngine::onboard(&snapshot, actor, now, terms)?,
            LifecycleOp::Reject { reason } => {
                LifecycleEngine::reject(&snapshot, actor, now, reason)?
            }
            LifecycleOp::Graduate { graduation_date } => {
                LifecycleEngine::graduate(&snapshot, actor, now, graduation_date)?
            }
            LifecycleOp::RecordAchievement(report) => {
                LifecycleEngine::record_achievement(&snapshot, actor, now, report)?
            }
        };

        match &mut self.backend {
            StoreBackend::InMemory(store) => store.update_guarded(snapshot.version, &updated),
            StoreBackend::Persistent(store) => store.update_guarded(snapshot.version, &updated),
        }
    }

    /// Hard delete by explicit administrative action.
    ///
    /// Deletion is not a lifecycle transition: no invariant checks beyond
    /// authorization.
    pub fn delete(&mut self, id: StartupId, actor: &Actor) -> Result<bool, CradleError> {
        if !actor.is_admin() {
            return Err(CradleError::Unauthorized);
        }
        match &mut self.backend {
            StoreBackend::InMemory(store) => store.remove(id),
            StoreBackend::Persistent(store) => store.remove(id),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
