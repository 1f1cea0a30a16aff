//! # Cradle HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! One endpoint per lifecycle operation; there is deliberately no generic
//! "update startup" route:
//!
//! - `GET    /health` - Health check
//! - `GET    /startups` - List startups (filter by stage/status/search)
//! - `POST   /startups` - Intake a new startup
//! - `GET    /startups/{id}` - Fetch one startup with full history
//! - `DELETE /startups/{id}` - Hard delete (administrative)
//! - `POST   /startups/{id}/advance` - Advance to the next pipeline position
//! - `POST   /startups/{id}/one-on-one` - Move into One-on-One mentorship
//! - `POST   /startups/{id}/sessions` - Record a mentorship session
//! - `POST   /startups/{id}/onboard` - Onboard into the program
//! - `POST   /startups/{id}/reject` - Reject
//! - `POST   /startups/{id}/graduate` - Graduate
//! - `POST   /startups/{id}/achievements` - Record an achievement
//! - `GET    /stats` - Portfolio statistics
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `CRADLE_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `CRADLE_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `CRADLE_RATE_BURST`: Burst allowance above the steady rate (default: equal to the rate)
//! - `CRADLE_ADMIN_KEY`: Bearer key granting the admin role
//! - `CRADLE_GUEST_KEY`: Bearer key granting the read-only guest role

mod auth;
mod handlers;
mod middleware;
mod types;

// Re-exports for external use
pub use auth::{get_admin_key_from_env, get_guest_key_from_env};
pub use middleware::{RateLimitConfig, create_rate_limiter};
// Re-export handlers and types for integration tests (via `cradle::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    achievement_handler, advance_handler, delete_handler, get_handler, graduate_handler,
    health_handler, intake_handler, list_handler, one_on_one_handler, onboard_handler,
    reject_handler, session_handler, stats_handler,
};
#[allow(unused_imports)]
pub use types::{
    AchievementRequest, AdvanceRequest, ApiError, DeleteResponse, ErrorBody, GraduateRequest,
    HealthResponse, ListQuery, OnboardRequest, RejectRequest, SessionRequest,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use cradle_core::{CradleError, Directory};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the startup directory.
#[derive(Clone)]
pub struct AppState {
    /// The directory containing the store backend.
    pub directory: Arc<RwLock<Directory>>,
}

impl AppState {
    /// Create new app state with a directory.
    #[must_use]
    pub fn new(directory: Directory) -> Self {
        Self {
            directory: Arc::new(RwLock::new(directory)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `CRADLE_CORS_ORIGINS` environment variable:
/// - If "*": allows all origins (development mode - use with caution!)
/// - If not set: defaults to localhost only (restrictive default)
/// - Otherwise: parses comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("CRADLE_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (CRADLE_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in CRADLE_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No CRADLE_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. CORS - handles preflight requests
/// 2. Tracing - logs all requests
/// 3. Rate Limiting - protects against DoS (if enabled)
/// 4. Role resolution - resolves admin/guest from the bearer key
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    // Check if rate limiting is enabled
    let rate_config = RateLimitConfig::from_env();
    let rate_limiter = if rate_config.enabled() {
        tracing::info!(
            "Rate limiting enabled: {} requests/second, burst {}",
            rate_config.per_second,
            rate_config.burst
        );
        Some(create_rate_limiter(rate_config))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    if get_admin_key_from_env().is_some() {
        tracing::info!("Bearer-key role authentication enabled");
    } else {
        tracing::warn!(
            "⚠️  Role authentication DISABLED - every request runs as admin! \
             Set CRADLE_ADMIN_KEY (and optionally CRADLE_GUEST_KEY) to enable authentication."
        );
    }

    // Build base router with routes
    let router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/startups",
            get(handlers::list_handler).post(handlers::intake_handler),
        )
        .route(
            "/startups/{id}",
            get(handlers::get_handler).delete(handlers::delete_handler),
        )
        .route("/startups/{id}/advance", post(handlers::advance_handler))
        .route(
            "/startups/{id}/one-on-one",
            post(handlers::one_on_one_handler),
        )
        .route("/startups/{id}/sessions", post(handlers::session_handler))
        .route("/startups/{id}/onboard", post(handlers::onboard_handler))
        .route("/startups/{id}/reject", post(handlers::reject_handler))
        .route("/startups/{id}/graduate", post(handlers::graduate_handler))
        .route(
            "/startups/{id}/achievements",
            post(handlers::achievement_handler),
        )
        .route("/stats", get(handlers::stats_handler));

    // Role resolution runs on every request (innermost - runs last on request)
    let mut router = router.layer(axum_middleware::from_fn(auth::role_auth_middleware));

    // Apply rate limiting middleware
    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    // Apply CORS, body limit, and tracing (outermost layers)
    router
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, directory: Directory) -> Result<(), CradleError> {
    let state = AppState::new(directory);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CradleError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Cradle HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| CradleError::IoError(format!("Server error: {}", e)))
}
