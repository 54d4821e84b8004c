//! HTTP ingress tests
//!
//! Each test serves the real router on a loopback port, backed by in-memory
//! stores and the recording platform.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::*;
use modbot_core::Actor;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn body(actor: Actor, command: Value) -> Value {
    json!({ "actor": actor, "command": command })
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let server = TestServer::start().await.unwrap();

    let health: Value = assert_json(server.get("/health").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");

    let ready: Value = assert_json(server.get("/health/ready").await.unwrap(), StatusCode::OK)
        .await
        .unwrap();
    assert!(ready["checks"].is_object());
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_command_without_token_is_unauthorized() {
    let server = TestServer::start().await.unwrap();
    let request = body(moderator(), json!({ "command": "warn", "subject_id": U1 }));

    let response = server
        .post_command(&COMMUNITY.to_string(), None, &request)
        .await
        .unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "MISSING_AUTHORIZATION")
        .await
        .unwrap();
    assert!(server.harness.actions.snapshot().is_empty());
}

#[tokio::test]
async fn test_command_with_wrong_token_is_unauthorized() {
    let server = TestServer::start().await.unwrap();
    let request = body(moderator(), json!({ "command": "warn", "subject_id": U1 }));

    let response = server
        .post_command(&COMMUNITY.to_string(), Some("not-the-token"), &request)
        .await
        .unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED, "INVALID_TOKEN")
        .await
        .unwrap();
    assert!(server.harness.actions.snapshot().is_empty());
}

// ============================================================================
// Dispatch
// ============================================================================

#[tokio::test]
async fn test_warn_over_http() {
    let server = TestServer::start().await.unwrap();
    let request = body(
        moderator(),
        json!({ "command": "warn", "subject_id": U1, "reason": "spam" }),
    );

    let response = server.command(COMMUNITY, &request).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));

    let outcome: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(outcome["payload"]["type"], "action");
    assert_eq!(outcome["payload"]["kind"], "warn");
    assert_eq!(outcome["payload"]["reason"], "spam");
    assert_eq!(outcome["payload"]["subject_id"], U1.to_string());
    assert_eq!(outcome["notifications"][0]["title"], "User Warned");

    assert_eq!(server.harness.actions.snapshot().len(), 1);
    server.harness.settle().await;
    assert_eq!(server.harness.sink.titled("User Warned").len(), 1);
}

#[tokio::test]
async fn test_numeric_ids_accepted() {
    let server = TestServer::start().await.unwrap();
    let request = json!({
        "actor": { "user_id": 10, "permissions": 2 },
        "command": { "command": "kick", "subject_id": 21 }
    });

    let outcome: Value = assert_json(
        server.command(COMMUNITY, &request).await.unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(outcome["payload"]["kind"], "kick");
}

#[tokio::test]
async fn test_invalid_community_path() {
    let server = TestServer::start().await.unwrap();
    let request = body(moderator(), json!({ "command": "warn", "subject_id": U1 }));

    let response = server
        .post_command("not-a-number", Some(DISPATCH_TOKEN), &request)
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_PATH_PARAMETER")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unknown_command_is_invalid_body() {
    let server = TestServer::start().await.unwrap();
    let request = body(moderator(), json!({ "command": "nuke", "subject_id": U1 }));

    let response = server.command(COMMUNITY, &request).await.unwrap();
    assert_error(response, StatusCode::BAD_REQUEST, "INVALID_BODY")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_field_validation_reports_details() {
    let server = TestServer::start().await.unwrap();
    let request = body(
        moderator(),
        json!({ "command": "warn", "subject_id": U1, "reason": "x".repeat(600) }),
    );

    let response = server.command(COMMUNITY, &request).await.unwrap();
    let error: Value = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
    assert!(error["error"]["details"].get("reason").is_some());
    assert!(server.harness.actions.snapshot().is_empty());
}

#[tokio::test]
async fn test_missing_permission_is_forbidden() {
    let server = TestServer::start().await.unwrap();
    let request = body(member(U2), json!({ "command": "ban", "subject_id": U1 }));

    let response = server.command(COMMUNITY, &request).await.unwrap();
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN")
        .await
        .unwrap();
    assert!(server.harness.platform.calls().is_empty());
}

#[tokio::test]
async fn test_unmute_of_unmuted_member_conflicts() {
    let server = TestServer::start().await.unwrap();
    let request = body(moderator(), json!({ "command": "unmute", "subject_id": U1 }));

    let response = server.command(COMMUNITY, &request).await.unwrap();
    assert_error(response, StatusCode::CONFLICT, "NOT_MUTED")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let server = TestServer::start().await.unwrap();
    let request = body(
        member(U1),
        json!({ "command": "enter-giveaway", "session_id": "987654321" }),
    );

    let response = server.command(COMMUNITY, &request).await.unwrap();
    assert_error(response, StatusCode::NOT_FOUND, "UNKNOWN_SESSION")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_platform_failure_is_bad_gateway() {
    let server = TestServer::start().await.unwrap();
    server.harness.platform.fail(Op::Kick);
    let request = body(moderator(), json!({ "command": "kick", "subject_id": U1 }));

    let response = server.command(COMMUNITY, &request).await.unwrap();
    let error: Value = assert_json(response, StatusCode::BAD_GATEWAY).await.unwrap();
    assert!(error["error"]["message"].is_string());
    assert!(server.harness.actions.snapshot().is_empty());
}

#[tokio::test]
async fn test_poll_round_trip_over_http() {
    let server = TestServer::start().await.unwrap();

    let started: Value = assert_json(
        server
            .command(
                COMMUNITY,
                &body(
                    moderator(),
                    json!({
                        "command": "start-poll",
                        "channel_id": GENERAL,
                        "question": "Tabs or spaces?",
                        "options": "Tabs|Spaces"
                    }),
                ),
            )
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    let session = started["payload"]["session_id"].clone();

    let voted: Value = assert_json(
        server
            .command(
                COMMUNITY,
                &body(
                    member(U1),
                    json!({ "command": "toggle-vote", "session_id": session, "option": "Spaces" }),
                ),
            )
            .await
            .unwrap(),
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_eq!(voted["payload"]["type"], "session");
    assert_eq!(voted["payload"]["options"][1]["votes"], 1);

    // Another community cannot reach the session
    let response = server
        .command(
            OTHER_COMMUNITY,
            &body(
                member(U1),
                json!({ "command": "toggle-vote", "session_id": session, "option": "Tabs" }),
            ),
        )
        .await
        .unwrap();
    assert_error(response, StatusCode::NOT_FOUND, "UNKNOWN_SESSION")
        .await
        .unwrap();
}
