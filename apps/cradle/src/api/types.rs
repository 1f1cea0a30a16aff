//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API and the mapping
//! from core errors to the wire error envelope.

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use cradle_core::{
    AchievementReport, CradleError, EngagementMedium, LifecycleOp, ListFilter, Money,
    OnboardingTerms, PitchOutcome, Stage, Status, Timestamp,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR ENVELOPE
// =============================================================================

/// Structured error body: `{kind, message}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

/// A core failure mapped to an HTTP status plus the wire envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl From<CradleError> for ApiError {
    fn from(err: CradleError) -> Self {
        let status = match &err {
            CradleError::NotFound(_) => StatusCode::NOT_FOUND,
            CradleError::Unauthorized => StatusCode::FORBIDDEN,
            CradleError::InvalidTransition(_) | CradleError::InvalidField(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            CradleError::EntityLocked(_) | CradleError::ConcurrentModification { .. } => {
                StatusCode::CONFLICT
            }
            CradleError::SerializationError(_)
            | CradleError::DeserializationError(_)
            | CradleError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            body: ErrorBody {
                kind: err.kind().to_string(),
                message: err.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// =============================================================================
// LIST QUERY
// =============================================================================

/// Query parameters for `GET /startups`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub stage: Option<Stage>,
    pub status: Option<Status>,
    pub search: Option<String>,
}

impl ListQuery {
    /// Convert to the core read-side filter.
    #[must_use]
    pub fn into_filter(self) -> ListFilter {
        ListFilter {
            stage: self.stage,
            status: self.status,
            search: self.search,
        }
    }
}

// =============================================================================
// OPERATION REQUESTS
// =============================================================================

/// Body for `POST /startups/{id}/advance`.
///
/// The pitch fields describe the evaluation that moved the startup into the
/// requested round; they are not applicable when advancing into One-on-One.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceRequest {
    pub next_stage: Stage,
    /// Unix seconds; defaults to the request time.
    pub date: Option<i64>,
    pub panelist: Option<String>,
    pub feedback: Option<String>,
}

impl AdvanceRequest {
    /// Build the lifecycle operation, defaulting the pitch date to `now`.
    #[must_use]
    pub fn into_op(self, now: Timestamp) -> LifecycleOp {
        let pitch = if self.next_stage == Stage::OneOnOne {
            None
        } else {
            Some(PitchOutcome {
                date: self.date.map_or(now, Timestamp::from_unix),
                panelist: self.panelist.unwrap_or_default(),
                feedback: self.feedback.unwrap_or_default(),
            })
        };
        LifecycleOp::AdvanceStage {
            next: self.next_stage,
            pitch,
        }
    }
}

/// Body for `POST /startups/{id}/sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub date: Option<i64>,
    pub mentor: String,
    pub feedback: Option<String>,
}

impl SessionRequest {
    #[must_use]
    pub fn into_op(self, now: Timestamp) -> LifecycleOp {
        LifecycleOp::RecordSession {
            date: self.date.map_or(now, Timestamp::from_unix),
            mentor: self.mentor,
            feedback: self.feedback.unwrap_or_default(),
        }
    }
}

/// Body for `POST /startups/{id}/onboard`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardRequest {
    pub description: String,
    pub agreement_date: Option<i64>,
    pub engagement_medium: EngagementMedium,
}

impl OnboardRequest {
    #[must_use]
    pub fn into_op(self, now: Timestamp) -> LifecycleOp {
        LifecycleOp::Onboard(OnboardingTerms {
            description: self.description,
            agreement_date: self.agreement_date.map_or(now, Timestamp::from_unix),
            engagement_medium: self.engagement_medium,
        })
    }
}

/// Body for `POST /startups/{id}/reject`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

/// Body for `POST /startups/{id}/graduate`. The body is optional; an absent
/// date defaults to the request time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraduateRequest {
    pub graduation_date: Option<i64>,
}

/// Body for `POST /startups/{id}/achievements`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementRequest {
    pub title: String,
    pub description: Option<String>,
    pub date: Option<i64>,
    /// Revenue in minor currency units.
    pub revenue: Option<i64>,
}

impl AchievementRequest {
    #[must_use]
    pub fn into_op(self, now: Timestamp) -> LifecycleOp {
        LifecycleOp::RecordAchievement(AchievementReport {
            title: self.title,
            description: self.description.unwrap_or_default(),
            date: self.date.map_or(now, Timestamp::from_unix),
            revenue: self.revenue.map(Money::new),
        })
    }
}

// =============================================================================
// DELETE RESPONSE
// =============================================================================

/// Response for `DELETE /startups/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}
