//! # Core Type Definitions
//!
//! This module contains all core types for the Cradle lifecycle substrate:
//! - Entity identifiers and scalars (`StartupId`, `Version`, `Timestamp`, `Money`)
//! - Pipeline position and lifecycle category (`Stage`, `Status`)
//! - Caller identity (`Actor`, `ActorRole`)
//! - Error types (`CradleError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Never read the system clock; callers pass `Timestamp` values in

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// IDENTIFIERS & SCALARS
// =============================================================================

/// Unique identifier for a startup record. Allocated by the store at intake
/// and immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StartupId(pub u64);

impl std::fmt::Display for StartupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-record modification counter used for optimistic concurrency.
///
/// Every committed write bumps the version by one. A guarded update that
/// observes a different stored version fails with `ConcurrentModification`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Version(pub u64);

impl Version {
    /// The version assigned to a freshly created record.
    #[must_use]
    pub const fn initial() -> Self {
        Self(1)
    }

    /// The version after one committed write, using saturating arithmetic.
    #[must_use]
    pub const fn bump(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Get the raw counter value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// A point in time as unix seconds.
///
/// The core never reads the clock: the app layer resolves "now" once per
/// request and passes it into every operation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Create a timestamp from unix seconds.
    #[must_use]
    pub const fn from_unix(secs: i64) -> Self {
        Self(secs)
    }

    /// Get the raw unix-seconds value.
    #[must_use]
    pub const fn unix(self) -> i64 {
        self.0
    }
}

/// A revenue amount in minor currency units.
///
/// Stored as i64 with saturating arithmetic; the workspace denies float
/// arithmetic, so aggregation never rounds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Money(pub i64);

impl Money {
    /// Create a new amount from minor units.
    #[must_use]
    pub const fn new(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// Add another amount using saturating arithmetic.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Get the raw minor-units value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

// =============================================================================
// STAGE
// =============================================================================

/// Pipeline position of an active startup.
///
/// S0 is intake; S1 through S3 are the pitch rounds evaluated by the
/// selection committee; One-on-One is dedicated mentorship after the rounds.
/// Progression is strictly forward: a stage can never decrease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Intake: registered, not yet pitched.
    S0,
    /// First pitch round.
    S1,
    /// Second pitch round.
    S2,
    /// Third pitch round.
    S3,
    /// Dedicated mentorship after the pitch rounds.
    #[serde(rename = "One-on-One")]
    OneOnOne,
}

impl Stage {
    /// Get the human-readable stage name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Stage::S0 => "Intake",
            Stage::S1 => "Pitch Round 1",
            Stage::S2 => "Pitch Round 2",
            Stage::S3 => "Pitch Round 3",
            Stage::OneOnOne => "One-on-One Mentorship",
        }
    }

    /// The next pitch round, if any.
    ///
    /// One-on-One is not a pitch round; it is entered explicitly and has no
    /// round successor.
    #[must_use]
    pub fn next_round(&self) -> Option<Stage> {
        match self {
            Stage::S0 => Some(Stage::S1),
            Stage::S1 => Some(Stage::S2),
            Stage::S2 => Some(Stage::S3),
            Stage::S3 | Stage::OneOnOne => None,
        }
    }

    /// Check whether `next` is a valid forward successor of this stage.
    ///
    /// The partial order: S0 → S1; S1/S2/S3 → next round or One-on-One.
    /// No transition may move backward or skip a round.
    #[must_use]
    pub fn permits_advance_to(&self, next: Stage) -> bool {
        if self.next_round() == Some(next) {
            return true;
        }
        next == Stage::OneOnOne && self.eligible_for_one_on_one()
    }

    /// Pitch rounds S1–S3 may move into One-on-One mentorship.
    #[must_use]
    pub fn eligible_for_one_on_one(&self) -> bool {
        matches!(self, Stage::S1 | Stage::S2 | Stage::S3)
    }

    /// Onboarding is offered from any pitch round or from mentorship,
    /// never straight out of intake.
    #[must_use]
    pub fn eligible_for_onboarding(&self) -> bool {
        matches!(self, Stage::S1 | Stage::S2 | Stage::S3 | Stage::OneOnOne)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Stage::S0 => "S0",
            Stage::S1 => "S1",
            Stage::S2 => "S2",
            Stage::S3 => "S3",
            Stage::OneOnOne => "One-on-One",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for Stage {
    type Err = CradleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s0" => Ok(Stage::S0),
            "s1" => Ok(Stage::S1),
            "s2" => Ok(Stage::S2),
            "s3" => Ok(Stage::S3),
            "one-on-one" | "oneonone" => Ok(Stage::OneOnOne),
            other => Err(CradleError::InvalidField(format!(
                "unknown stage '{other}'"
            ))),
        }
    }
}

// =============================================================================
// STATUS
// =============================================================================

/// Lifecycle category independent of stage.
///
/// `stage` is meaningful only while `Active`. `Onboarded` freezes the stage
/// at its value when onboarding occurred. `Graduated` and `Rejected` are
/// terminal: no further lifecycle operation succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    /// In the pipeline; stage transitions apply.
    Active,
    /// Accepted into the incubation program; stage frozen.
    Onboarded,
    /// Completed the program. Terminal.
    Graduated,
    /// Removed from the pipeline. Terminal and reachable from every
    /// non-terminal state.
    Rejected,
}

impl Status {
    /// Terminal statuses admit no further lifecycle mutation.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Graduated | Status::Rejected)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Status::Active => "Active",
            Status::Onboarded => "Onboarded",
            Status::Graduated => "Graduated",
            Status::Rejected => "Rejected",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for Status {
    type Err = CradleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "onboarded" => Ok(Status::Onboarded),
            "graduated" => Ok(Status::Graduated),
            "rejected" => Ok(Status::Rejected),
            other => Err(CradleError::InvalidField(format!(
                "unknown status '{other}'"
            ))),
        }
    }
}

// =============================================================================
// ACTOR
// =============================================================================

/// Role resolved by the authorization gate before any operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    /// Full access: may invoke every mutating operation.
    Admin,
    /// Read-only access.
    Guest,
}

/// The identity a request acts as. Every state change is attributed to an
/// actor in the entity's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Display name recorded in history entries.
    pub name: String,
    /// Resolved role.
    pub role: ActorRole,
}

impl Actor {
    /// Create an admin actor.
    #[must_use]
    pub fn admin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: ActorRole::Admin,
        }
    }

    /// Create a guest actor.
    #[must_use]
    pub fn guest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: ActorRole::Guest,
        }
    }

    /// Check for the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Cradle system.
///
/// - No silent failures
/// - Use `Result<T, CradleError>` for fallible operations
/// - Business-rule violations are reported synchronously; they are not
///   transient faults and must not be retried blindly
#[derive(Debug, Error)]
pub enum CradleError {
    /// The requested stage/status change violates the pipeline partial order.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// The entity's current status precludes the operation (terminal, or not
    /// in the status the operation requires).
    #[error("Entity locked: {0}")]
    EntityLocked(String),

    /// A guarded write observed a stale snapshot; the caller must re-read
    /// and retry.
    #[error("Concurrent modification: expected version {expected}, found {found}")]
    ConcurrentModification {
        /// The version the caller's snapshot was based on.
        expected: u64,
        /// The version actually stored.
        found: u64,
    },

    /// The startup id does not resolve.
    #[error("Startup not found: {0}")]
    NotFound(StartupId),

    /// The actor lacks the admin role required for mutating operations.
    #[error("Unauthorized: admin role required")]
    Unauthorized,

    /// An intake or payload field failed validation.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl CradleError {
    /// Stable machine-readable kind, used by the API error envelope.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            CradleError::InvalidTransition(_) => "invalid_transition",
            CradleError::EntityLocked(_) => "entity_locked",
            CradleError::ConcurrentModification { .. } => "concurrent_modification",
            CradleError::NotFound(_) => "not_found",
            CradleError::Unauthorized => "unauthorized",
            CradleError::InvalidField(_) => "invalid_field",
            CradleError::SerializationError(_) => "serialization_error",
            CradleError::DeserializationError(_) => "deserialization_error",
            CradleError::IoError(_) => "io_error",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_bump_saturates() {
        let v = Version(u64::MAX);
        assert_eq!(v.bump().value(), u64::MAX);
        assert_eq!(Version::initial().bump().value(), 2);
    }

    #[test]
    fn money_saturating_add() {
        let a = Money::new(i64::MAX);
        assert_eq!(a.saturating_add(Money::new(1)).value(), i64::MAX);
        assert_eq!(Money::new(2).saturating_add(Money::new(3)).value(), 5);
    }

    #[test]
    fn stage_partial_order_forward_only() {
        assert!(Stage::S0.permits_advance_to(Stage::S1));
        assert!(Stage::S1.permits_advance_to(Stage::S2));
        assert!(Stage::S2.permits_advance_to(Stage::S3));
        assert!(Stage::S1.permits_advance_to(Stage::OneOnOne));
        assert!(Stage::S3.permits_advance_to(Stage::OneOnOne));

        // No skipping, no going back, no pitching out of mentorship.
        assert!(!Stage::S0.permits_advance_to(Stage::S2));
        assert!(!Stage::S0.permits_advance_to(Stage::OneOnOne));
        assert!(!Stage::S2.permits_advance_to(Stage::S1));
        assert!(!Stage::OneOnOne.permits_advance_to(Stage::S3));
    }

    #[test]
    fn onboarding_excluded_from_intake() {
        assert!(!Stage::S0.eligible_for_onboarding());
        assert!(Stage::S1.eligible_for_onboarding());
        assert!(Stage::OneOnOne.eligible_for_onboarding());
    }

    #[test]
    fn terminal_statuses() {
        assert!(Status::Graduated.is_terminal());
        assert!(Status::Rejected.is_terminal());
        assert!(!Status::Active.is_terminal());
        assert!(!Status::Onboarded.is_terminal());
    }

    #[test]
    fn stage_serde_uses_hyphenated_one_on_one() {
        let json = serde_json::to_string(&Stage::OneOnOne).expect("serialize");
        assert_eq!(json, "\"One-on-One\"");
        let back: Stage = serde_json::from_str("\"One-on-One\"").expect("deserialize");
        assert_eq!(back, Stage::OneOnOne);
    }

    #[test]
    fn error_kinds_are_stable() {
        assert_eq!(
            CradleError::InvalidTransition(String::new()).kind(),
            "invalid_transition"
        );
        assert_eq!(CradleError::Unauthorized.kind(), "unauthorized");
        assert_eq!(
            CradleError::ConcurrentModification {
                expected: 1,
                found: 2
            }
            .kind(),
            "concurrent_modification"
        );
    }
}
