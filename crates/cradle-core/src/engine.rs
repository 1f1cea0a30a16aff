//! # Lifecycle Engine
//!
//! The sole authority for mutating `stage`/`status` and their dependent
//! metadata. Every operation:
//!
//! - takes the current entity snapshot, the acting identity, and a caller
//!   supplied timestamp,
//! - validates the full precondition set before touching anything,
//! - returns a complete updated snapshot or a typed failure, never a
//!   partially applied transition,
//! - appends exactly one audit event attributing the change.
//!
//! Failures are business-rule violations, not transient faults; the engine
//! never retries and callers must not retry without a fresh snapshot.

use crate::limits::{MAX_PROFILE_FIELD_LENGTH, MAX_TEXT_LENGTH};
use crate::model::{
    AchievementRecord, EngagementMedium, LifecycleAction, LifecycleEvent, OnboardingRecord,
    PitchRecord, RejectionRecord, SessionRecord, Startup,
};
use crate::types::{Actor, CradleError, Money, Stage, Status, Timestamp};

// =============================================================================
// OPERATION PAYLOADS
// =============================================================================

/// Evaluation details for a pitch-round advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitchOutcome {
    pub date: Timestamp,
    pub panelist: String,
    pub feedback: String,
}

/// Details for an onboarding agreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingTerms {
    pub description: String,
    pub agreement_date: Timestamp,
    pub engagement_medium: EngagementMedium,
}

/// Details for an achievement report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementReport {
    pub title: String,
    pub description: String,
    pub date: Timestamp,
    pub revenue: Option<Money>,
}

// =============================================================================
// ENGINE
// =============================================================================

/// Stateless transition authority. All rules are hardcoded; the engine holds
/// no configuration and no storage handle.
pub struct LifecycleEngine;

impl LifecycleEngine {
    // =========================================================================
    // PRECONDITION HELPERS
    // =========================================================================

    /// Mutating operations require the admin role.
    fn require_admin(actor: &Actor) -> Result<(), CradleError> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(CradleError::Unauthorized)
        }
    }

    /// Terminal entities admit no further operation of any kind.
    fn require_not_terminal(snapshot: &Startup) -> Result<(), CradleError> {
        if snapshot.status.is_terminal() {
            return Err(CradleError::EntityLocked(format!(
                "startup {} is {} and permits no further changes",
                snapshot.id, snapshot.status
            )));
        }
        Ok(())
    }

    fn validate_text(field: &str, value: &str, max: usize) -> Result<(), CradleError> {
        if value.is_empty() {
            return Err(CradleError::InvalidField(format!("{field} must not be empty")));
        }
        if value.len() > max {
            return Err(CradleError::InvalidField(format!(
                "{field} length {} exceeds maximum {} bytes",
                value.len(),
                max
            )));
        }
        Ok(())
    }

    fn push_event(updated: &mut Startup, action: LifecycleAction, actor: &Actor, now: Timestamp) {
        updated.events.push(LifecycleEvent {
            action,
            actor: actor.name.clone(),
            role: actor.role,
            at: now,
        });
    }

    // =========================================================================
    // STAGE TRANSITIONS
    // =========================================================================

    /// Advance an active startup to the next position in the pipeline.
    ///
    /// `next` must be a valid forward successor of the current stage per the
    /// partial order (next pitch round, or One-on-One from S1–S3). Advancing
    /// into a pitch round appends the round's evaluation record; the pitch
    /// payload is not applicable when entering One-on-One.
    pub fn advance_stage(
        snapshot: &Startup,
        actor: &Actor,
        now: Timestamp,
        next: Stage,
        pitch: Option<PitchOutcome>,
    ) -> Result<Startup, CradleError> {
        Self::require_admin(actor)?;
        Self::require_not_terminal(snapshot)?;
        if snapshot.status != Status::Active {
            return Err(CradleError::EntityLocked(format!(
                "stage transitions require Active status, not {}",
                snapshot.status
            )));
        }
        if !snapshot.stage.permits_advance_to(next) {
            return Err(CradleError::InvalidTransition(format!(
                "{} does not advance to {}",
                snapshot.stage, next
            )));
        }

        let mut updated = snapshot.clone();
        let from = updated.stage;

        if next != Stage::OneOnOne {
            let outcome = pitch.ok_or_else(|| {
                CradleError::InvalidField(format!("pitch outcome required to enter {next}"))
            })?;
            Self::validate_text("panelist", &outcome.panelist, MAX_PROFILE_FIELD_LENGTH)?;
            if outcome.feedback.len() > MAX_TEXT_LENGTH {
                return Err(CradleError::InvalidField(format!(
                    "feedback length {} exceeds maximum {} bytes",
                    outcome.feedback.len(),
                    MAX_TEXT_LENGTH
                )));
            }
            updated.pitch_history.push(PitchRecord {
                stage: next,
                date: outcome.date,
                panelist: outcome.panelist,
                feedback: outcome.feedback,
                recorded_by: actor.name.clone(),
                recorded_at: now,
            });
        }

        updated.stage = next;
        Self::push_event(
            &mut updated,
            LifecycleAction::StageAdvanced { from, to: next },
            actor,
            now,
        );
        Ok(updated)
    }

    /// Move an active startup from a pitch round into One-on-One mentorship.
    pub fn move_to_one_on_one(
        snapshot: &Startup,
        actor: &Actor,
        now: Timestamp,
    ) -> Result<Startup, CradleError> {
        Self::advance_stage(snapshot, actor, now, Stage::OneOnOne, None)
    }

    /// Record a completed mentorship session.
    ///
    /// Only valid while the startup is active in the One-on-One stage.
    pub fn record_mentorship_session(
        snapshot: &Startup,
        actor: &Actor,
        now: Timestamp,
        date: Timestamp,
        mentor: String,
        feedback: String,
    ) -> Result<Startup, CradleError> {
        Self::require_admin(actor)?;
        Self::require_not_terminal(snapshot)?;
        if snapshot.status != Status::Active || snapshot.stage != Stage::OneOnOne {
            return Err(CradleError::EntityLocked(format!(
                "mentorship sessions require an Active startup in One-on-One, found {} / {}",
                snapshot.status, snapshot.stage
            )));
        }
        Self::validate_text("mentor", &mentor, MAX_PROFILE_FIELD_LENGTH)?;
        if feedback.len() > MAX_TEXT_LENGTH {
            return Err(CradleError::InvalidField(format!(
                "feedback length {} exceeds maximum {} bytes",
                feedback.len(),
                MAX_TEXT_LENGTH
            )));
        }

        let mut updated = snapshot.clone();
        updated.session_history.push(SessionRecord {
            date,
            mentor: mentor.clone(),
            feedback,
            completed: true,
            recorded_by: actor.name.clone(),
            recorded_at: now,
        });
        Self::push_event(
            &mut updated,
            LifecycleAction::SessionRecorded { mentor },
            actor,
            now,
        );
        Ok(updated)
    }

    // =========================================================================
    // STATUS TRANSITIONS
    // =========================================================================

    /// Onboard an active startup into the incubation program.
    ///
    /// Allowed from any pitch round or One-on-One, never from intake. The
    /// stage is frozen at its current value from this point on.
    pub fn onboard(
        snapshot: &Startup,
        actor: &Actor,
        now: Timestamp,
        terms: OnboardingTerms,
    ) -> Result<Startup, CradleError> {
        Self::require_admin(actor)?;
        Self::require_not_terminal(snapshot)?;
        if snapshot.status != Status::Active {
            return Err(CradleError::InvalidTransition(format!(
                "onboarding requires Active status, not {}",
                snapshot.status
            )));
        }
        if !snapshot.stage.eligible_for_onboarding() {
            return Err(CradleError::InvalidTransition(format!(
                "onboarding is not offered from {}",
                snapshot.stage
            )));
        }
        Self::validate_text("description", &terms.description, MAX_TEXT_LENGTH)?;

        let mut updated = snapshot.clone();
        let at_stage = updated.stage;
        updated.status = Status::Onboarded;
        updated.onboarding = Some(OnboardingRecord {
            description: terms.description,
            agreement_date: terms.agreement_date,
            engagement_medium: terms.engagement_medium,
            onboarded_by: actor.name.clone(),
            onboarded_at: now,
        });
        Self::push_event(
            &mut updated,
            LifecycleAction::Onboarded { at_stage },
            actor,
            now,
        );
        Ok(updated)
    }

    /// Reject an active startup. Reachable from every non-terminal Active
    /// stage, including intake. Records the stage held immediately before
    /// rejection; the record is immutable thereafter.
    pub fn reject(
        snapshot: &Startup,
        actor: &Actor,
        now: Timestamp,
        reason: String,
    ) -> Result<Startup, CradleError> {
        Self::require_admin(actor)?;
        Self::require_not_terminal(snapshot)?;
        if snapshot.status != Status::Active {
            return Err(CradleError::EntityLocked(format!(
                "rejection requires Active status, not {}",
                snapshot.status
            )));
        }
        Self::validate_text("reason", &reason, MAX_TEXT_LENGTH)?;

        let mut updated = snapshot.clone();
        let from_stage = updated.stage;
        updated.status = Status::Rejected;
        updated.rejection = Some(RejectionRecord {
            reason,
            stage_at_rejection: from_stage,
            rejected_by: actor.name.clone(),
            rejected_at: now,
        });
        Self::push_event(
            &mut updated,
            LifecycleAction::Rejected { from_stage },
            actor,
            now,
        );
        Ok(updated)
    }

    /// Graduate an onboarded startup. The only path to Graduated.
    pub fn graduate(
        snapshot: &Startup,
        actor: &Actor,
        now: Timestamp,
        graduation_date: Option<Timestamp>,
    ) -> Result<Startup, CradleError> {
        Self::require_admin(actor)?;
        Self::require_not_terminal(snapshot)?;
        if snapshot.status != Status::Onboarded {
            return Err(CradleError::InvalidTransition(format!(
                "graduation requires Onboarded status, not {}",
                snapshot.status
            )));
        }

        let mut updated = snapshot.clone();
        updated.status = Status::Graduated;
        updated.graduated_date = Some(graduation_date.unwrap_or(now));
        Self::push_event(&mut updated, LifecycleAction::Graduated, actor, now);
        Ok(updated)
    }

    /// Record an achievement for an onboarded startup.
    pub fn record_achievement(
        snapshot: &Startup,
        actor: &Actor,
        now: Timestamp,
        report: AchievementReport,
    ) -> Result<Startup, CradleError> {
        Self::require_admin(actor)?;
        Self::require_not_terminal(snapshot)?;
        if snapshot.status != Status::Onboarded {
            return Err(CradleError::EntityLocked(format!(
                "achievements require Onboarded status, not {}",
                snapshot.status
            )));
        }
        Self::validate_text("title", &report.title, MAX_PROFILE_FIELD_LENGTH)?;
        if report.description.len() > MAX_TEXT_LENGTH {
            return Err(CradleError::InvalidField(format!(
                "description length {} exceeds maximum {} bytes",
                report.description.len(),
                MAX_TEXT_LENGTH
            )));
        }

        let mut updated = snapshot.clone();
        updated.achievements.push(AchievementRecord {
            title: report.title.clone(),
            description: report.description,
            date: report.date,
            revenue: report.revenue,
            recorded_by: actor.name.clone(),
            recorded_at: now,
        });
        Self::push_event(
            &mut updated,
            LifecycleAction::AchievementRecorded {
                title: report.title,
            },
            actor,
            now,
        );
        Ok(updated)
    }
}

// =============================================================================
// TESTS
// =============================================================================
