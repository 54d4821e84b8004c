//! Quote store, community settings, suggestion and announcement tests
//!
//! Run with: cargo test -p integration-tests --test quote_tests

use std::time::Duration;

use integration_tests::*;
use modbot_core::{DomainError, Severity};
use serde_json::{json, Value};

async fn add(h: &TestHarness, text: &str) -> Value {
    h.run(
        member(U2),
        json!({ "command": "add-quote", "subject_id": U1, "text": text }),
    )
    .await
}

async fn list(h: &TestHarness, subject: modbot_core::Snowflake) -> Vec<Value> {
    let payload = h
        .run(member(U3), json!({ "command": "list-quotes", "subject_id": subject }))
        .await;
    assert_eq!(payload["type"], "quotes");
    payload["quotes"].as_array().cloned().unwrap_or_default()
}

fn texts(quotes: &[Value]) -> Vec<&str> {
    quotes.iter().filter_map(|q| q["text"].as_str()).collect()
}

// ============================================================================
// Quotes
// ============================================================================

#[tokio::test]
async fn test_positions_follow_insertion_order() {
    let h = TestHarness::new();

    let first = add(&h, "hello").await;
    assert_eq!(first["type"], "quote");
    assert_eq!(first["position"], 1);
    assert_eq!(first["added_by"], U2.to_string());
    let second = add(&h, "  world  ").await;
    assert_eq!(second["position"], 2);
    assert_eq!(second["text"], "world");

    let quotes = list(&h, U1).await;
    assert_eq!(texts(&quotes), vec!["hello", "world"]);
    assert_eq!(quotes[0]["position"], 1);
    assert_eq!(quotes[1]["position"], 2);
    h.settle().await;
    assert_eq!(h.sink.titled("Quote Added").len(), 2);
}

#[tokio::test]
async fn test_remove_by_position_renumbers() {
    let h = TestHarness::new();
    add(&h, "hello").await;
    add(&h, "world").await;

    let removed = h
        .run(
            moderator(),
            json!({ "command": "remove-quote-by-position", "subject_id": U1, "position": 1 }),
        )
        .await;
    assert_eq!(removed["text"], "hello");
    assert_eq!(removed["position"], 1);

    let quotes = list(&h, U1).await;
    assert_eq!(texts(&quotes), vec!["world"]);
    assert_eq!(quotes[0]["position"], 1);

    h.settle().await;
    let removed = h.sink.titled("Quote Removed");
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].severity, Severity::Warning);
}

#[tokio::test]
async fn test_remove_out_of_range_position() {
    let h = TestHarness::new();
    add(&h, "hello").await;
    add(&h, "world").await;

    for position in [5, 0, -1] {
        let err = h
            .dispatch(
                moderator(),
                json!({ "command": "remove-quote-by-position", "subject_id": U1, "position": position }),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.as_domain(),
            Some(&DomainError::InvalidIndex { position, count: 2 })
        );
        assert_eq!(err.status_code(), 400);
    }
    assert_eq!(list(&h, U1).await.len(), 2);
}

#[tokio::test]
async fn test_remove_requires_manage_messages() {
    let h = TestHarness::new();
    add(&h, "hello").await;

    let err = h
        .dispatch(
            member(U1),
            json!({ "command": "remove-quote-by-position", "subject_id": U1, "position": 1 }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::Forbidden(_))));
    assert_eq!(list(&h, U1).await.len(), 1);
}

#[tokio::test]
async fn test_quotes_scoped_by_subject_and_community() {
    let h = TestHarness::new();
    add(&h, "hello").await;

    assert!(list(&h, U2).await.is_empty());

    let other = h
        .dispatch_in(
            OTHER_COMMUNITY,
            member(U3),
            json!({ "command": "list-quotes", "subject_id": U1 }),
        )
        .await
        .unwrap();
    let payload = serde_json::to_value(&other.payload).unwrap();
    assert_eq!(payload["quotes"], json!([]));
}

#[tokio::test]
async fn test_blank_quote_rejected() {
    let h = TestHarness::new();
    let err = h
        .dispatch(
            member(U2),
            json!({ "command": "add-quote", "subject_id": U1, "text": "   " }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::InvalidArgument(_))));
    assert!(list(&h, U1).await.is_empty());
}

// ============================================================================
// Settings and suggestions
// ============================================================================

#[tokio::test]
async fn test_suggest_without_channel_is_not_configured() {
    let h = TestHarness::new();
    let err = h
        .dispatch(member(U1), json!({ "command": "suggest", "text": "More emoji" }))
        .await
        .unwrap_err();
    assert_eq!(
        err.as_domain(),
        Some(&DomainError::SettingNotConfigured("suggestion channel"))
    );
    assert!(h.platform.calls().is_empty());
}

#[tokio::test]
async fn test_suggestion_posted_to_configured_channel() {
    let h = TestHarness::new();

    let updated = h
        .run(
            admin(),
            json!({ "command": "set-suggestion-channel", "channel_id": ANNOUNCEMENTS }),
        )
        .await;
    assert_eq!(updated["type"], "setting_updated");
    assert_eq!(updated["setting"], "suggestion_channel");

    let posted = h
        .run(member(U1), json!({ "command": "suggest", "text": "More emoji" }))
        .await;
    assert_eq!(posted["type"], "suggestion_posted");
    assert_eq!(posted["channel_id"], ANNOUNCEMENTS.to_string());

    let messages = h.platform.messages_to(ANNOUNCEMENTS);
    assert_eq!(messages.len(), 1);
    let embed = messages[0].embed.as_ref().unwrap();
    assert_eq!(embed.title, "New Suggestion");
    assert_eq!(
        embed.description,
        format!("More emoji\n\nSuggested by <@{U1}>")
    );
}

#[tokio::test]
async fn test_announcement_is_signed_and_logged() {
    let h = TestHarness::new();

    let posted = h
        .run(
            admin(),
            json!({
                "command": "announce",
                "channel_id": ANNOUNCEMENTS,
                "title": "Maintenance",
                "message": "Down at noon"
            }),
        )
        .await;
    assert_eq!(posted["type"], "announcement_posted");
    assert_eq!(posted["channel_id"], ANNOUNCEMENTS.to_string());

    let messages = h.platform.messages_to(ANNOUNCEMENTS);
    assert_eq!(messages.len(), 1);
    let embed = messages[0].embed.as_ref().unwrap();
    assert_eq!(embed.title, "Maintenance");
    assert_eq!(embed.description, "Down at noon");
    assert_eq!(
        embed.footer.as_ref().map(|f| f.text.as_str()),
        Some(format!("Announcement by <@{ADMIN}>").as_str())
    );

    h.settle().await;
    let logged = h.sink.titled("Announcement Made");
    assert_eq!(logged.len(), 1);
    assert!(logged[0].body.ends_with("**Title:** Maintenance"));
}

#[tokio::test]
async fn test_announce_requires_administrator() {
    let h = TestHarness::new();
    let err = h
        .dispatch(
            moderator(),
            json!({
                "command": "announce",
                "channel_id": ANNOUNCEMENTS,
                "title": "Hi",
                "message": "there"
            }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
    assert!(h.platform.calls().is_empty());
}

#[tokio::test]
async fn test_blank_announcement_rejected() {
    let h = TestHarness::new();
    let err = h
        .dispatch(
            admin(),
            json!({
                "command": "announce",
                "channel_id": ANNOUNCEMENTS,
                "title": "Hi",
                "message": "   "
            }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::InvalidArgument(_))));
    assert!(h.platform.calls().is_empty());
}

#[tokio::test]
async fn test_settings_require_administrator() {
    let h = TestHarness::new();
    let err = h
        .dispatch(
            moderator(),
            json!({ "command": "set-modlog-channel", "channel_id": GENERAL }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_modlog_notifier_posts_to_configured_channel() {
    let h = TestHarness::with_modlog();

    // Nothing is delivered before a modlog channel is set
    h.run(moderator(), json!({ "command": "warn", "subject_id": U1 }))
        .await;
    h.settle().await;
    assert!(h.platform.calls().is_empty());

    h.run(
        admin(),
        json!({ "command": "set-modlog-channel", "channel_id": ANNOUNCEMENTS }),
    )
    .await;
    h.run(
        moderator(),
        json!({ "command": "warn", "subject_id": U1, "reason": "spam" }),
    )
    .await;
    h.settle().await;

    let messages = h.platform.messages_to(ANNOUNCEMENTS);
    assert_eq!(messages.len(), 1);
    let embed = messages[0].embed.as_ref().unwrap();
    assert_eq!(embed.title, "User Warned");
    assert!(embed.description.contains("spam"));
    assert_eq!(embed.color, Severity::Warning.color());
}

#[tokio::test]
async fn test_modlog_delivery_failure_does_not_fail_command() {
    let h = TestHarness::with_modlog();
    h.run(
        admin(),
        json!({ "command": "set-modlog-channel", "channel_id": ANNOUNCEMENTS }),
    )
    .await;
    h.platform.fail(Op::SendMessage);

    let payload = h
        .run(moderator(), json!({ "command": "warn", "subject_id": U1 }))
        .await;
    assert_eq!(payload["kind"], "warn");
    assert_eq!(h.actions.snapshot().len(), 1);

    h.settle().await;
    assert!(h.platform.messages_to(ANNOUNCEMENTS).is_empty());
}

#[tokio::test]
async fn test_stalled_modlog_does_not_delay_reply() {
    let h = TestHarness::with_modlog();
    h.run(
        admin(),
        json!({ "command": "set-modlog-channel", "channel_id": ANNOUNCEMENTS }),
    )
    .await;
    h.platform.stall(Op::SendMessage);

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        h.dispatch(moderator(), json!({ "command": "warn", "subject_id": U1 })),
    )
    .await
    .expect("reply without waiting for the modlog")
    .unwrap();
    assert_eq!(outcome.notifications.len(), 1);
    assert_eq!(outcome.notifications[0].title, "User Warned");
    assert_eq!(h.actions.snapshot().len(), 1);
}
