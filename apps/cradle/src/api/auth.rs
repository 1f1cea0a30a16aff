//! # Authentication Module
//!
//! Bearer-key role resolution for the Cradle HTTP API.
//!
//! ## Configuration
//!
//! Roles are configured via environment variables:
//! - `CRADLE_ADMIN_KEY`: key granting the admin role (all operations)
//! - `CRADLE_GUEST_KEY`: key granting the guest role (read-only)
//!
//! If `CRADLE_ADMIN_KEY` is unset, authentication is disabled and every
//! request runs as a local admin. A warning is logged at startup.
//!
//! ## Usage
//!
//! Send the key in the Authorization header:
//! ```text
//! Authorization: Bearer <your-key>
//! ```

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use cradle_core::Actor;
use subtle::ConstantTimeEq;

// =============================================================================
// KEY CONFIGURATION
// =============================================================================

/// Get the admin key from the environment.
///
/// Returns `Some(key)` if `CRADLE_ADMIN_KEY` is set and non-empty,
/// `None` otherwise (disabling authentication).
pub fn get_admin_key_from_env() -> Option<String> {
    std::env::var("CRADLE_ADMIN_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

/// Get the guest key from the environment.
pub fn get_guest_key_from_env() -> Option<String> {
    std::env::var("CRADLE_GUEST_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}

/// Constant-time key comparison.
///
/// Pad both keys to the same length so ct_eq always runs over the same
/// number of bytes, preventing length-leaking side channels.
fn keys_match(provided: &str, expected: &str) -> bool {
    let provided_bytes = provided.as_bytes();
    let expected_bytes = expected.as_bytes();

    let max_len = provided_bytes.len().max(expected_bytes.len());
    let mut padded_provided = vec![0u8; max_len];
    let mut padded_expected = vec![0u8; max_len];
    padded_provided[..provided_bytes.len()].copy_from_slice(provided_bytes);
    padded_expected[..expected_bytes.len()].copy_from_slice(expected_bytes);

    let bytes_match: bool = padded_provided.ct_eq(&padded_expected).into();
    bytes_match && provided_bytes.len() == expected_bytes.len()
}

// =============================================================================
// ROLE RESOLUTION MIDDLEWARE
// =============================================================================

/// Resolve the caller's role before any handler runs.
///
/// - `/health` is always allowed (for load balancer health checks)
/// - With no admin key configured, every request runs as a local admin
/// - Otherwise the bearer key selects the role; an unknown or missing key
///   is rejected with 401
///
/// The resolved [`Actor`] is inserted into request extensions for handlers.
pub async fn role_auth_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    // Always allow health endpoint (for load balancer checks)
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let Some(admin_key) = get_admin_key_from_env() else {
        // Auth disabled: open access with full rights.
        request.extensions_mut().insert(Actor::admin("local-admin"));
        return Ok(next.run(request).await);
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(header_value) = auth_header else {
        tracing::warn!(
            event = "auth_failure",
            reason = "missing_authorization_header",
            "Missing Authorization header"
        );
        return Err((StatusCode::UNAUTHORIZED, "Unauthorized"));
    };

    // Support both "Bearer <key>" and raw "<key>" formats
    let provided_key = header_value.strip_prefix("Bearer ").unwrap_or(header_value);

    if keys_match(provided_key, &admin_key) {
        request.extensions_mut().insert(Actor::admin("admin"));
        return Ok(next.run(request).await);
    }

    if let Some(guest_key) = get_guest_key_from_env() {
        if keys_match(provided_key, &guest_key) {
            request.extensions_mut().insert(Actor::guest("guest"));
            return Ok(next.run(request).await);
        }
    }

    tracing::warn!(
        event = "auth_failure",
        reason = "invalid_key",
        "Authentication failed: key matches no configured role"
    );
    Err((StatusCode::UNAUTHORIZED, "Unauthorized"))
}

// =============================================================================
// TESTS
// =============================================================================
