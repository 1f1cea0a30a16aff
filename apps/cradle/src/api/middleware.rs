//! # Middleware Module
//!
//! Rate limiting middleware for the Cradle HTTP API.
//!
//! ## Configuration
//!
//! Rate limiting is configured via environment variables:
//! - `CRADLE_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `CRADLE_RATE_BURST`: Burst allowance above the steady rate (default:
//!   equal to the rate). Spreadsheet-import clients tend to fire intake
//!   requests in bursts, so the burst bucket is sized independently.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Default steady rate: 100 requests per second.
const DEFAULT_RPS: NonZeroU32 = NonZeroU32::new(100).unwrap();

// =============================================================================
// RATE LIMITER
// =============================================================================

/// Global rate limiter type alias.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Rate limiter settings resolved from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Steady requests per second. Zero disables rate limiting entirely.
    pub per_second: u32,
    /// Burst allowance; requests beyond the steady rate that may be served
    /// from the bucket before throttling kicks in.
    pub burst: u32,
}

impl RateLimitConfig {
    /// Read `CRADLE_RATE_LIMIT` and `CRADLE_RATE_BURST`.
    ///
    /// An unset or unparseable rate falls back to 100 rps; an unset burst
    /// defaults to the steady rate (bucket holds one second of traffic).
    #[must_use]
    pub fn from_env() -> Self {
        let per_second = std::env::var("CRADLE_RATE_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RPS.get());
        let burst = std::env::var("CRADLE_RATE_BURST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(per_second);
        Self { per_second, burst }
    }

    /// Whether rate limiting is enabled at all.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.per_second > 0
    }
}

/// Create a global rate limiter from the resolved configuration.
///
/// A zero burst collapses to the steady rate, so the limiter always admits
/// at least `per_second` requests per second.
#[must_use]
pub fn create_rate_limiter(config: RateLimitConfig) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(config.per_second).unwrap_or(DEFAULT_RPS);
    let burst = NonZeroU32::new(config.burst).unwrap_or(rps);
    let quota = Quota::per_second(rps).allow_burst(burst);
    Arc::new(RateLimiter::direct(quota))
}

/// Rate limiting middleware.
///
/// Checks the global rate limiter before allowing requests through.
/// Returns 429 Too Many Requests if the limit is exceeded.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    match limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!(
                path = %request.uri().path(),
                "Rate limit exceeded"
            );
            Err((StatusCode::TOO_MANY_REQUESTS, "Too Many Requests"))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
