//! # Entity Model
//!
//! The `Startup` record and its append-only history collections.
//!
//! The denormalized lifecycle fields (`stage`, `status`) and every history
//! collection have exactly one writer: the lifecycle engine. Nothing else in
//! the system mutates them; the stores persist whole snapshots atomically.

use crate::types::{ActorRole, Money, Stage, StartupId, Status, Timestamp, Version};
use serde::{Deserialize, Serialize};

// =============================================================================
// PROFILE (static metadata, lifecycle-irrelevant)
// =============================================================================

/// How an onboarded startup engages with the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementMedium {
    Virtual,
    InPerson,
    Hybrid,
}

impl std::fmt::Display for EngagementMedium {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EngagementMedium::Virtual => "virtual",
            EngagementMedium::InPerson => "in_person",
            EngagementMedium::Hybrid => "hybrid",
        };
        write!(f, "{}", label)
    }
}

/// Canonical static metadata captured at intake.
///
/// Produced exclusively by intake normalization; classification fields carry
/// no lifecycle meaning and are never touched by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub founder: String,
    pub email: String,
    pub phone: String,
    pub sector: String,
    pub stage_of_idea: String,
    pub is_registered: bool,
    pub has_patent: bool,
    pub website: Option<String>,
}

// =============================================================================
// HISTORY RECORDS
// =============================================================================

/// A pitch-round evaluation before the selection committee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchRecord {
    /// The round the startup pitched into.
    pub stage: Stage,
    pub date: Timestamp,
    pub panelist: String,
    pub feedback: String,
    pub recorded_by: String,
    pub recorded_at: Timestamp,
}

/// A one-on-one mentorship session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub date: Timestamp,
    pub mentor: String,
    pub feedback: String,
    pub completed: bool,
    pub recorded_by: String,
    pub recorded_at: Timestamp,
}

/// An achievement reported by an onboarded startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub title: String,
    pub description: String,
    pub date: Timestamp,
    pub revenue: Option<Money>,
    pub recorded_by: String,
    pub recorded_at: Timestamp,
}

/// Rejection metadata. Present iff `status = Rejected`, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionRecord {
    pub reason: String,
    /// The stage the startup held immediately before rejection.
    pub stage_at_rejection: Stage,
    pub rejected_by: String,
    pub rejected_at: Timestamp,
}

/// Onboarding metadata. Present iff `status ∈ {Onboarded, Graduated}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingRecord {
    pub description: String,
    pub agreement_date: Timestamp,
    pub engagement_medium: EngagementMedium,
    pub onboarded_by: String,
    pub onboarded_at: Timestamp,
}

// =============================================================================
// LIFECYCLE EVENT LOG
// =============================================================================

/// What a lifecycle operation did, for the per-entity audit log.
///
/// Externally tagged so the same definition round-trips through both JSON
/// and postcard (the redb store's record format).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Registered,
    StageAdvanced { from: Stage, to: Stage },
    SessionRecorded { mentor: String },
    Onboarded { at_stage: Stage },
    Rejected { from_stage: Stage },
    Graduated,
    AchievementRecorded { title: String },
}

/// One entry in the append-only audit log.
///
/// Exactly one event is appended per successful state-changing operation,
/// attributing the change to an actor and a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub action: LifecycleAction,
    pub actor: String,
    pub role: ActorRole,
    pub at: Timestamp,
}

// =============================================================================
// STARTUP
// =============================================================================

/// The central entity: one startup moving through the incubation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Startup {
    /// Immutable unique id.
    pub id: StartupId,
    /// Optimistic-concurrency counter; bumped on every committed write.
    pub version: Version,
    pub created_at: Timestamp,

    pub profile: Profile,

    /// Pipeline position. Meaningful only while `status = Active`; frozen at
    /// its onboarding value otherwise.
    pub stage: Stage,
    pub status: Status,
    pub graduated_date: Option<Timestamp>,

    pub pitch_history: Vec<PitchRecord>,
    pub session_history: Vec<SessionRecord>,
    pub achievements: Vec<AchievementRecord>,
    pub rejection: Option<RejectionRecord>,
    pub onboarding: Option<OnboardingRecord>,

    /// Append-only audit log; the source of truth the denormalized fields
    /// are derived from.
    pub events: Vec<LifecycleEvent>,
}

impl Startup {
    /// Create a new startup at intake: stage S0, status Active, version 1,
    /// with a single `Registered` event attributed to the intake actor.
    #[must_use]
    pub fn register(
        id: StartupId,
        profile: Profile,
        actor_name: impl Into<String>,
        role: ActorRole,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            version: Version::initial(),
            created_at: now,
            profile,
            stage: Stage::S0,
            status: Status::Active,
            graduated_date: None,
            pitch_history: Vec::new(),
            session_history: Vec::new(),
            achievements: Vec::new(),
            rejection: None,
            onboarding: None,
            events: vec![LifecycleEvent {
                action: LifecycleAction::Registered,
                actor: actor_name.into(),
                role,
                at: now,
            }],
        }
    }

    /// Total revenue across achievement records, saturating.
    #[must_use]
    pub fn total_revenue(&self) -> Money {
        self.achievements
            .iter()
            .filter_map(|a| a.revenue)
            .fold(Money::default(), Money::saturating_add)
    }

    /// Whether at least one mentorship session was completed.
    #[must_use]
    pub fn mentorship_completed(&self) -> bool {
        self.session_history.iter().any(|s| s.completed)
    }
}

// =============================================================================
// TESTS
// =============================================================================
