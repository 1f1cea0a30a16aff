//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every mutating endpoint maps to exactly one lifecycle operation; there is
//! no generic update endpoint. Handlers resolve "now" once per request and
//! pass it down, so the core stays clock-free.

use super::{
    AppState,
    types::{
        AchievementRequest, AdvanceRequest, ApiError, DeleteResponse, GraduateRequest,
        HealthResponse, ListQuery, OnboardRequest, RejectRequest, SessionRequest,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use cradle_core::{
    Actor, CradleError, IntakeForm, LifecycleOp, PortfolioStats, Startup, StartupId, Timestamp,
};

/// Resolve the request's wall-clock time as unix seconds.
fn request_time() -> Timestamp {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    Timestamp::from_unix(secs)
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// READ HANDLERS
// =============================================================================

/// List startups, optionally filtered by stage, status, or search text.
pub async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Startup>>, ApiError> {
    let directory = state.directory.read().await;
    let startups = directory.search(&query.into_filter())?;
    Ok(Json(startups))
}

/// Fetch a single startup with its full history.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Startup>, ApiError> {
    let directory = state.directory.read().await;
    let startup = directory.get(StartupId(id))?;
    Ok(Json(startup))
}

/// Portfolio statistics overview.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<PortfolioStats>, ApiError> {
    let directory = state.directory.read().await;
    let stats = PortfolioStats::from_directory(&directory)?;
    Ok(Json(stats))
}

// =============================================================================
// INTAKE & DELETE HANDLERS
// =============================================================================

/// Register a new startup from an intake form.
pub async fn intake_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(form): Json<IntakeForm>,
) -> Result<impl IntoResponse, ApiError> {
    let mut directory = state.directory.write().await;
    let startup = directory.intake(form, &actor, request_time())?;
    Ok((StatusCode::CREATED, Json(startup)))
}

/// Hard delete a startup. Administrative action, not a lifecycle transition.
pub async fn delete_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut directory = state.directory.write().await;
    let deleted = directory.delete(StartupId(id), &actor)?;
    if !deleted {
        return Err(ApiError::from(CradleError::NotFound(StartupId(id))));
    }
    Ok(Json(DeleteResponse { deleted }))
}

// =============================================================================
// LIFECYCLE OPERATION HANDLERS
// =============================================================================

async fn apply_op(
    state: &AppState,
    actor: &Actor,
    id: u64,
    op: LifecycleOp,
) -> Result<Json<Startup>, ApiError> {
    let mut directory = state.directory.write().await;
    let updated = directory.apply(StartupId(id), actor, request_time(), op)?;
    Ok(Json(updated))
}

/// Advance an active startup to the next pipeline position.
pub async fn advance_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<u64>,
    Json(request): Json<AdvanceRequest>,
) -> Result<Json<Startup>, ApiError> {
    let op = request.into_op(request_time());
    apply_op(&state, &actor, id, op).await
}

/// Move an active startup into One-on-One mentorship.
pub async fn one_on_one_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<u64>,
) -> Result<Json<Startup>, ApiError> {
    apply_op(&state, &actor, id, LifecycleOp::MoveToOneOnOne).await
}

/// Record a completed mentorship session.
pub async fn session_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<u64>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<Startup>, ApiError> {
    let op = request.into_op(request_time());
    apply_op(&state, &actor, id, op).await
}

/// Onboard an active startup into the program.
pub async fn onboard_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<u64>,
    Json(request): Json<OnboardRequest>,
) -> Result<Json<Startup>, ApiError> {
    let op = request.into_op(request_time());
    apply_op(&state, &actor, id, op).await
}

/// Reject an active startup.
pub async fn reject_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<u64>,
    Json(request): Json<RejectRequest>,
) -> Result<Json<Startup>, ApiError> {
    apply_op(
        &state,
        &actor,
        id,
        LifecycleOp::Reject {
            reason: request.reason,
        },
    )
    .await
}

/// Graduate an onboarded startup. The body is optional.
pub async fn graduate_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<u64>,
    request: Option<Json<GraduateRequest>>,
) -> Result<Json<Startup>, ApiError> {
    let graduation_date = request
        .map(|Json(r)| r.graduation_date)
        .unwrap_or_default()
        .map(Timestamp::from_unix);
    apply_op(
        &state,
        &actor,
        id,
        LifecycleOp::Graduate { graduation_date },
    )
    .await
}

/// Record an achievement for an onboarded startup.
pub async fn achievement_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<u64>,
    Json(request): Json<AchievementRequest>,
) -> Result<Json<Startup>, ApiError> {
    let op = request.into_op(request_time());
    apply_op(&state, &actor, id, op).await
}
