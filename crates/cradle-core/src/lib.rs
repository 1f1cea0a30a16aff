//! # cradle-core
//!
//! The deterministic lifecycle engine for Cradle - THE LOGIC.
//!
//! This crate implements the incubation pipeline substrate: a validated,
//! attributed, append-only record of every startup's path from intake
//! through pitch rounds, mentorship, onboarding, and graduation or
//! rejection.
//!
//! ## Architectural Constraints
//!
//! - The engine is the ONLY writer of `stage`/`status` and their metadata;
//!   there is no generic field-update path
//! - Deterministic: no clock access (callers pass timestamps), no floats,
//!   `BTreeMap` ordering throughout
//! - Has NO async, NO network dependencies (pure Rust)
//! - Stores commit whole snapshots atomically; a failed operation never
//!   leaves a partial transition behind

// =============================================================================
// MODULES
// =============================================================================

pub mod directory;
pub mod engine;
pub mod intake;
pub mod limits;
pub mod model;
pub mod report;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Actor, ActorRole, CradleError, Money, Stage, StartupId, Status, Timestamp, Version,
};

// =============================================================================
// RE-EXPORTS: Model
// =============================================================================

pub use model::{
    AchievementRecord, EngagementMedium, LifecycleAction, LifecycleEvent, OnboardingRecord,
    PitchRecord, Profile, RejectionRecord, SessionRecord, Startup,
};

// =============================================================================
// RE-EXPORTS: Engine & Directory
// =============================================================================

pub use directory::{Directory, LifecycleOp, ListFilter, StoreBackend};
pub use engine::{AchievementReport, LifecycleEngine, OnboardingTerms, PitchOutcome};
pub use intake::IntakeForm;
pub use report::PortfolioStats;
pub use storage::RedbStore;
pub use store::{MemoryStore, StartupStore};
