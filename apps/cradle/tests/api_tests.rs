//! Integration tests for the Cradle HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Allow unwrap and panic in tests - these are standard for test code
// Allow holding MutexGuard across await in auth tests - tests are serialized
// intentionally to avoid env var conflicts
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use axum::http::HeaderValue;
use axum_test::TestServer;
use cradle::api::{AppState, HealthResponse, create_router};
use cradle_core::Directory;
use serde_json::json;
use std::sync::Mutex;

/// Mutex to serialize tests since the auth middleware reads env vars.
static AUTH_TEST_MUTEX: Mutex<()> = Mutex::new(());

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Guard wrapper that holds the mutex and ensures cleanup on drop.
struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
        unsafe {
            std::env::remove_var("CRADLE_ADMIN_KEY");
            std::env::remove_var("CRADLE_GUEST_KEY");
        }
    }
}

/// Create a test server with a fresh in-memory directory and auth disabled.
/// Returns a guard that must be kept alive during the test.
fn create_test_server() -> (TestServer, TestGuard) {
    let guard = AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
    unsafe {
        std::env::remove_var("CRADLE_ADMIN_KEY");
        std::env::remove_var("CRADLE_GUEST_KEY");
    }
    let directory = Directory::new();
    let state = AppState::new(directory);
    let router = create_router(state);
    (
        TestServer::new(router).unwrap(),
        TestGuard { _guard: guard },
    )
}

/// Create a test server with admin and guest keys configured.
fn create_auth_test_server(admin_key: &str, guest_key: &str) -> (TestServer, TestGuard) {
    let guard = AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
    unsafe {
        std::env::set_var("CRADLE_ADMIN_KEY", admin_key);
        std::env::set_var("CRADLE_GUEST_KEY", guest_key);
    }
    let directory = Directory::new();
    let state = AppState::new(directory);
    let router = create_router(state);
    (
        TestServer::new(router).unwrap(),
        TestGuard { _guard: guard },
    )
}

fn intake_body(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "founder": "Dana Mehta",
        "email": "dana@acme.example",
        "sector": "DeepTech"
    })
}

/// Intake a startup and return its id.
async fn intake(server: &TestServer, name: &str) -> u64 {
    let response = server.post("/startups").json(&intake_body(name)).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    body["id"].as_u64().expect("id")
}

async fn advance(server: &TestServer, id: u64, next: &str) -> serde_json::Value {
    let response = server
        .post(&format!("/startups/{id}/advance"))
        .json(&json!({
            "next_stage": next,
            "panelist": "Panel A",
            "feedback": "reviewed"
        }))
        .await;
    response.assert_status_ok();
    response.json()
}

// =============================================================================
// HEALTH ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _guard) = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// INTAKE & READ TESTS
// =============================================================================

#[tokio::test]
async fn test_intake_creates_startup_at_s0() {
    let (server, _guard) = create_test_server();

    let response = server.post("/startups").json(&intake_body("Acme")).await;

    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["stage"], "S0");
    assert_eq!(body["status"], "Active");
    assert_eq!(body["profile"]["name"], "Acme");
    assert_eq!(body["version"], 1);
    assert_eq!(body["events"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_intake_accepts_aliased_field_names() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/startups")
        .json(&json!({
            "companyName": "Nimbus Labs",
            "founderName": "Ira Shah",
            "founder_email": "ira@nimbus.example"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["profile"]["name"], "Nimbus Labs");
    assert_eq!(body["profile"]["founder"], "Ira Shah");
}

#[tokio::test]
async fn test_intake_rejects_missing_name() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/startups")
        .json(&json!({"founder": "F", "email": "f@x.example"}))
        .await;

    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "invalid_field");
}

#[tokio::test]
async fn test_get_unknown_id_is_404() {
    let (server, _guard) = create_test_server();

    let response = server.get("/startups/42").await;

    response.assert_status(axum::http::StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn test_list_filters_by_stage() {
    let (server, _guard) = create_test_server();

    let a = intake(&server, "Acme").await;
    let _b = intake(&server, "Nimbus").await;
    advance(&server, a, "S1").await;

    let all: serde_json::Value = server.get("/startups").await.json();
    assert_eq!(all.as_array().unwrap().len(), 2);

    let s1: serde_json::Value = server.get("/startups?stage=S1").await.json();
    let s1 = s1.as_array().unwrap();
    assert_eq!(s1.len(), 1);
    assert_eq!(s1[0]["profile"]["name"], "Acme");

    let searched: serde_json::Value = server.get("/startups?search=nimbus").await.json();
    assert_eq!(searched.as_array().unwrap().len(), 1);
}

// =============================================================================
// LIFECYCLE OPERATION TESTS
// =============================================================================

#[tokio::test]
async fn test_advance_records_pitch() {
    let (server, _guard) = create_test_server();
    let id = intake(&server, "Acme").await;

    let body = advance(&server, id, "S1").await;

    assert_eq!(body["stage"], "S1");
    assert_eq!(body["version"], 2);
    let pitches = body["pitch_history"].as_array().unwrap();
    assert_eq!(pitches.len(), 1);
    assert_eq!(pitches[0]["panelist"], "Panel A");
    assert_eq!(pitches[0]["stage"], "S1");
}

#[tokio::test]
async fn test_advance_skipping_round_fails() {
    let (server, _guard) = create_test_server();
    let id = intake(&server, "Acme").await;

    let response = server
        .post(&format!("/startups/{id}/advance"))
        .json(&json!({"next_stage": "S2", "panelist": "P"}))
        .await;

    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "invalid_transition");
}

#[tokio::test]
async fn test_onboard_from_intake_fails() {
    let (server, _guard) = create_test_server();
    let id = intake(&server, "Acme").await;

    let response = server
        .post(&format!("/startups/{id}/onboard"))
        .json(&json!({
            "description": "agreement",
            "engagement_medium": "virtual"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "invalid_transition");
}

#[tokio::test]
async fn test_reject_records_stage() {
    let (server, _guard) = create_test_server();
    let id = intake(&server, "Acme").await;
    advance(&server, id, "S1").await;

    let response = server
        .post(&format!("/startups/{id}/reject"))
        .json(&json!({"reason": "low traction"}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "Rejected");
    assert_eq!(body["rejection"]["stage_at_rejection"], "S1");
    assert_eq!(body["rejection"]["reason"], "low traction");
}

#[tokio::test]
async fn test_terminal_entity_locks_out_operations() {
    let (server, _guard) = create_test_server();
    let id = intake(&server, "Acme").await;

    server
        .post(&format!("/startups/{id}/reject"))
        .json(&json!({"reason": "closing"}))
        .await
        .assert_status_ok();

    let response = server
        .post(&format!("/startups/{id}/advance"))
        .json(&json!({"next_stage": "S1", "panelist": "P"}))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "entity_locked");
}

#[tokio::test]
async fn test_full_pipeline_walk() {
    let (server, _guard) = create_test_server();
    let id = intake(&server, "Meridian Bio").await;

    advance(&server, id, "S1").await;
    advance(&server, id, "S2").await;
    advance(&server, id, "S3").await;

    let moved: serde_json::Value = {
        let response = server.post(&format!("/startups/{id}/one-on-one")).await;
        response.assert_status_ok();
        response.json()
    };
    assert_eq!(moved["stage"], "One-on-One");

    server
        .post(&format!("/startups/{id}/sessions"))
        .json(&json!({"mentor": "Mentor M", "feedback": "strong"}))
        .await
        .assert_status_ok();

    let onboarded: serde_json::Value = {
        let response = server
            .post(&format!("/startups/{id}/onboard"))
            .json(&json!({
                "description": "12-month agreement",
                "engagement_medium": "hybrid"
            }))
            .await;
        response.assert_status_ok();
        response.json()
    };
    assert_eq!(onboarded["status"], "Onboarded");
    assert_eq!(onboarded["stage"], "One-on-One");

    server
        .post(&format!("/startups/{id}/achievements"))
        .json(&json!({
            "title": "Seed round",
            "description": "Closed seed funding",
            "revenue": 1_000_000
        }))
        .await
        .assert_status_ok();

    let graduated: serde_json::Value = {
        let response = server
            .post(&format!("/startups/{id}/graduate"))
            .json(&json!({"graduation_date": 1_800_000_000}))
            .await;
        response.assert_status_ok();
        response.json()
    };
    assert_eq!(graduated["status"], "Graduated");
    assert_eq!(graduated["graduated_date"], 1_800_000_000);

    // Achievements lock after graduation.
    let late = server
        .post(&format!("/startups/{id}/achievements"))
        .json(&json!({"title": "Too late"}))
        .await;
    late.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_then_404() {
    let (server, _guard) = create_test_server();
    let id = intake(&server, "Acme").await;

    let response = server.delete(&format!("/startups/{id}")).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["deleted"], true);

    server
        .get(&format!("/startups/{id}"))
        .await
        .assert_status(axum::http::StatusCode::NOT_FOUND);
}

// =============================================================================
// STATS ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_stats_reflect_pipeline() {
    let (server, _guard) = create_test_server();

    let a = intake(&server, "Acme").await;
    let b = intake(&server, "Nimbus").await;
    let _c = intake(&server, "Meridian").await;

    advance(&server, a, "S1").await;
    server
        .post(&format!("/startups/{b}/reject"))
        .json(&json!({"reason": "out of scope"}))
        .await
        .assert_status_ok();

    let stats: serde_json::Value = server.get("/stats").await.json();
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["active"], 2);
    assert_eq!(stats["rejected"], 1);
    assert_eq!(stats["by_stage"]["S0"], 1);
    assert_eq!(stats["by_stage"]["S1"], 1);
}

// =============================================================================
// AUTH TESTS
// =============================================================================

#[tokio::test]
async fn test_auth_missing_header_rejected() {
    let (server, _guard) = create_auth_test_server("admin-key", "guest-key");

    let response = server.get("/startups").await;
    assert_eq!(response.status_code().as_u16(), 401);

    // Health stays open for load balancer checks.
    server.get("/health").await.assert_status_ok();
}

#[tokio::test]
async fn test_auth_wrong_key_rejected() {
    let (server, _guard) = create_auth_test_server("admin-key", "guest-key");

    let response = server
        .get("/startups")
        .add_header(
            axum::http::header::AUTHORIZATION,
            "Bearer wrong-key".parse::<HeaderValue>().unwrap(),
        )
        .await;

    assert_eq!(response.status_code().as_u16(), 401);
}

#[tokio::test]
async fn test_auth_admin_key_grants_mutation() {
    let (server, _guard) = create_auth_test_server("admin-key", "guest-key");

    let response = server
        .post("/startups")
        .add_header(
            axum::http::header::AUTHORIZATION,
            "Bearer admin-key".parse::<HeaderValue>().unwrap(),
        )
        .json(&intake_body("Acme"))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
}

#[tokio::test]
async fn test_auth_guest_key_is_read_only() {
    let (server, _guard) = create_auth_test_server("admin-key", "guest-key");
    let guest_auth = "Bearer guest-key".parse::<HeaderValue>().unwrap();

    // Reads are allowed.
    let response = server
        .get("/startups")
        .add_header(axum::http::header::AUTHORIZATION, guest_auth.clone())
        .await;
    response.assert_status_ok();

    // Mutations are forbidden.
    let response = server
        .post("/startups")
        .add_header(axum::http::header::AUTHORIZATION, guest_auth)
        .json(&intake_body("Acme"))
        .await;
    assert_eq!(response.status_code().as_u16(), 403);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "unauthorized");
}

#[tokio::test]
async fn test_auth_raw_key_format_accepted() {
    let (server, _guard) = create_auth_test_server("admin-key", "guest-key");

    // Test raw token format (without "Bearer " prefix)
    let response = server
        .get("/startups")
        .add_header(
            axum::http::header::AUTHORIZATION,
            "admin-key".parse::<HeaderValue>().unwrap(),
        )
        .await;

    response.assert_status_ok();
}
