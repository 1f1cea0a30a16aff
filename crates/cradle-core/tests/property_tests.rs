//! # Property-Based Tests
//!
//! Invariant checks over random operation sequences:
//! - stage never decreases along any sequence of successful operations
//! - terminal statuses absorb every subsequent operation
//! - a failed operation never changes the snapshot
//! - exactly one audit event is appended per successful operation

#![allow(clippy::unwrap_used, clippy::panic)]

use cradle_core::{
    AchievementReport, Actor, ActorRole, CradleError, EngagementMedium, LifecycleEngine,
    OnboardingTerms, PitchOutcome, Profile, Stage, Startup, StartupId, Status, Timestamp,
};
use proptest::collection::vec;
use proptest::prelude::*;

// =============================================================================
// OPERATION GENERATOR
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    Advance(Stage),
    MoveToOneOnOne,
    Session,
    Onboard,
    Reject,
    Graduate,
    Achievement,
}

fn any_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop_oneof![
            Just(Stage::S1),
            Just(Stage::S2),
            Just(Stage::S3),
            Just(Stage::OneOnOne)
        ]
        .prop_map(Op::Advance),
        Just(Op::MoveToOneOnOne),
        Just(Op::Session),
        Just(Op::Onboard),
        Just(Op::Reject),
        Just(Op::Graduate),
        Just(Op::Achievement),
    ]
}

fn fresh_startup() -> Startup {
    Startup::register(
        StartupId(1),
        Profile {
            name: "Propco".to_string(),
            founder: "F".to_string(),
            email: "f@example.com".to_string(),
            phone: String::new(),
            sector: "Any".to_string(),
            stage_of_idea: "Idea".to_string(),
            is_registered: false,
            has_patent: false,
            website: None,
        },
        "ops",
        ActorRole::Admin,
        Timestamp(0),
    )
}

fn apply(state: &Startup, actor: &Actor, now: Timestamp, op: &Op) -> Result<Startup, CradleError> {
    match op {
        Op::Advance(next) => LifecycleEngine::advance_stage(
            state,
            actor,
            now,
            *next,
            Some(PitchOutcome {
                date: now,
                panelist: "P".to_string(),
                feedback: "fb".to_string(),
            }),
        ),
        Op::MoveToOneOnOne => LifecycleEngine::move_to_one_on_one(state, actor, now),
        Op::Session => LifecycleEngine::record_mentorship_session(
            state,
            actor,
            now,
            now,
            "M".to_string(),
            "fb".to_string(),
        ),
        Op::Onboard => LifecycleEngine::onboard(
            state,
            actor,
            now,
            OnboardingTerms {
                description: "terms".to_string(),
                agreement_date: now,
                engagement_medium: EngagementMedium::Virtual,
            },
        ),
        Op::Reject => LifecycleEngine::reject(state, actor, now, "reason".to_string()),
        Op::Graduate => LifecycleEngine::graduate(state, actor, now, None),
        Op::Achievement => LifecycleEngine::record_achievement(
            state,
            actor,
            now,
            AchievementReport {
                title: "T".to_string(),
                description: "D".to_string(),
                date: now,
                revenue: None,
            },
        ),
    }
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Stage never decreases across any sequence of successful operations.
    /// The derived Ord on Stage matches the pipeline order
    /// (S0 < S1 < S2 < S3 < One-on-One).
    #[test]
    fn stage_is_monotonic(ops in vec(any_op(), 1..40)) {
        let actor = Actor::admin("ops");
        let mut state = fresh_startup();

        for (i, op) in ops.iter().enumerate() {
            let now = Timestamp(i as i64 + 1);
            if let Ok(next) = apply(&state, &actor, now, op) {
                prop_assert!(next.stage >= state.stage,
                    "stage decreased: {} -> {}", state.stage, next.stage);
                state = next;
            }
        }
    }

    /// Once terminal, every operation fails with EntityLocked and the
    /// snapshot is never replaced.
    #[test]
    fn terminal_states_are_absorbing(ops in vec(any_op(), 1..40)) {
        let actor = Actor::admin("ops");
        let mut state = fresh_startup();
        let mut terminal_since: Option<usize> = None;

        for (i, op) in ops.iter().enumerate() {
            let now = Timestamp(i as i64 + 1);
            match apply(&state, &actor, now, op) {
                Ok(next) => {
                    prop_assert!(terminal_since.is_none(),
                        "operation succeeded after terminal state");
                    if next.status.is_terminal() {
                        terminal_since = Some(i);
                    }
                    state = next;
                }
                Err(e) => {
                    if terminal_since.is_some() {
                        prop_assert!(matches!(e, CradleError::EntityLocked(_)),
                            "terminal state produced {:?} instead of EntityLocked", e);
                    }
                }
            }
        }
    }

    /// Onboarding freezes the stage for the rest of the lifecycle.
    #[test]
    fn onboarded_stage_is_frozen(ops in vec(any_op(), 1..40)) {
        let actor = Actor::admin("ops");
        let mut state = fresh_startup();
        let mut frozen_at: Option<Stage> = None;

        for (i, op) in ops.iter().enumerate() {
            let now = Timestamp(i as i64 + 1);
            if let Ok(next) = apply(&state, &actor, now, op) {
                if let Some(stage) = frozen_at {
                    prop_assert_eq!(next.stage, stage, "stage changed after onboarding");
                }
                if next.status == Status::Onboarded && frozen_at.is_none() {
                    frozen_at = Some(next.stage);
                }
                state = next;
            }
        }
    }

    /// Each successful operation appends exactly one audit event; failures
    /// append none (the snapshot is untouched).
    #[test]
    fn audit_log_grows_one_event_per_success(ops in vec(any_op(), 1..40)) {
        let actor = Actor::admin("ops");
        let mut state = fresh_startup();

        for (i, op) in ops.iter().enumerate() {
            let now = Timestamp(i as i64 + 1);
            let before = state.events.len();
            match apply(&state, &actor, now, op) {
                Ok(next) => {
                    prop_assert_eq!(next.events.len(), before + 1);
                    state = next;
                }
                Err(_) => {
                    prop_assert_eq!(state.events.len(), before);
                }
            }
        }
    }

    /// Rejection metadata always carries the stage held immediately before
    /// the rejection, wherever it happens in the sequence.
    #[test]
    fn rejection_captures_prior_stage(ops in vec(any_op(), 1..40)) {
        let actor = Actor::admin("ops");
        let mut state = fresh_startup();

        for (i, op) in ops.iter().enumerate() {
            let now = Timestamp(i as i64 + 1);
            let stage_before = state.stage;
            if let Ok(next) = apply(&state, &actor, now, op) {
                if next.status == Status::Rejected && state.status != Status::Rejected {
                    let record = next.rejection.as_ref().expect("rejection record");
                    prop_assert_eq!(record.stage_at_rejection, stage_before);
                }
                state = next;
            }
        }
    }

    /// A guest actor can never mutate anything, whatever the operation.
    #[test]
    fn guest_is_always_unauthorized(ops in vec(any_op(), 1..20)) {
        let guest = Actor::guest("viewer");
        let state = fresh_startup();

        for (i, op) in ops.iter().enumerate() {
            let now = Timestamp(i as i64 + 1);
            let result = apply(&state, &guest, now, op);
            prop_assert!(matches!(result, Err(CradleError::Unauthorized)));
        }
    }
}
