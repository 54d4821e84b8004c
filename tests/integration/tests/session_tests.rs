//! Interactive session tests: polls, giveaways, tickets and role pickers
//!
//! Run with: cargo test -p integration-tests --test session_tests

use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use integration_tests::*;
use modbot_core::{DomainError, OverwriteTarget, Permissions, SessionPhase, Snowflake};
use modbot_service::{CommandOutcome, ServiceResult};
use serde_json::{json, Value};

async fn start_poll(h: &TestHarness) -> Value {
    let payload = h
        .run(
            moderator(),
            json!({
                "command": "start-poll",
                "channel_id": GENERAL,
                "question": "Lunch?",
                "options": "Pizza | Tacos | Sushi"
            }),
        )
        .await;
    assert_eq!(payload["type"], "poll_started");
    payload["session_id"].clone()
}

async fn vote(h: &TestHarness, voter: Snowflake, session: &Value, option: &str) -> Value {
    h.run(
        member(voter),
        json!({ "command": "toggle-vote", "session_id": session, "option": option }),
    )
    .await
}

fn votes(tally: &Value, label: &str) -> u64 {
    tally["options"]
        .as_array()
        .and_then(|options| options.iter().find(|o| o["label"] == label))
        .and_then(|o| o["votes"].as_u64())
        .unwrap_or_else(|| panic!("no option {label} in {tally}"))
}

fn domain(result: ServiceResult<CommandOutcome>) -> DomainError {
    result
        .err()
        .and_then(|e| e.as_domain().cloned())
        .expect("command should fail with a domain error")
}

// ============================================================================
// Polls
// ============================================================================

#[tokio::test]
async fn test_poll_posts_embed_with_empty_tally() {
    let h = TestHarness::new();
    start_poll(&h).await;

    let messages = h.platform.messages_to(GENERAL);
    assert_eq!(messages.len(), 1);
    let embed = messages[0].embed.as_ref().unwrap();
    assert_eq!(embed.title, "Lunch?");
    assert_eq!(
        embed.description,
        "**Pizza** - 0 votes\n**Tacos** - 0 votes\n**Sushi** - 0 votes"
    );
}

#[tokio::test]
async fn test_vote_toggle_pair_restores_tally() {
    let h = TestHarness::new();
    let session = start_poll(&h).await;

    let tally = vote(&h, U1, &session, "Pizza").await;
    assert_eq!(tally["outcome"], "tally");
    assert_eq!(votes(&tally, "Pizza"), 1);

    let tally = vote(&h, U1, &session, "Pizza").await;
    assert_eq!(votes(&tally, "Pizza"), 0);
    assert_eq!(votes(&tally, "Tacos"), 0);
}

#[tokio::test]
async fn test_voter_may_back_several_options() {
    let h = TestHarness::new();
    let session = start_poll(&h).await;

    vote(&h, U1, &session, "Pizza").await;
    vote(&h, U2, &session, "Pizza").await;
    let tally = vote(&h, U1, &session, "Tacos").await;

    assert_eq!(votes(&tally, "Pizza"), 2);
    assert_eq!(votes(&tally, "Tacos"), 1);
    assert_eq!(votes(&tally, "Sushi"), 0);
}

#[tokio::test]
async fn test_unknown_option_rejected() {
    let h = TestHarness::new();
    let session = start_poll(&h).await;

    let err = domain(
        h.dispatch(
            member(U1),
            json!({ "command": "toggle-vote", "session_id": session, "option": "Curry" }),
        )
        .await,
    );
    assert_eq!(err, DomainError::UnknownOption("Curry".into()));
}

#[tokio::test]
async fn test_end_poll_requires_moderator_then_closes() {
    let h = TestHarness::new();
    let session = start_poll(&h).await;
    vote(&h, U1, &session, "Sushi").await;

    let err = h
        .dispatch(member(U2), json!({ "command": "end-poll", "session_id": session }))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(DomainError::Forbidden(_))));
    assert_eq!(err.status_code(), 403);

    let ended = h
        .run(moderator(), json!({ "command": "end-poll", "session_id": session }))
        .await;
    assert_eq!(ended["outcome"], "poll_ended");
    assert_eq!(votes(&ended, "Sushi"), 1);

    let results = h.platform.messages_to(GENERAL);
    let last = results.last().and_then(|m| m.embed.as_ref()).unwrap();
    assert_eq!(last.title, "Lunch? (Final Results)");

    let err = domain(
        h.dispatch(
            member(U1),
            json!({ "command": "toggle-vote", "session_id": session, "option": "Pizza" }),
        )
        .await,
    );
    assert_eq!(err, DomainError::SessionClosed);
}

#[tokio::test]
async fn test_poll_needs_two_options() {
    let h = TestHarness::new();
    let err = domain(
        h.dispatch(
            moderator(),
            json!({
                "command": "start-poll",
                "channel_id": GENERAL,
                "question": "Only one?",
                "options": "Yes"
            }),
        )
        .await,
    );
    assert!(matches!(err, DomainError::InvalidArgument(_)));
    assert!(h.ctx.sessions().is_empty());
}

#[tokio::test]
async fn test_failed_post_registers_nothing() {
    let h = TestHarness::new();
    h.platform.fail(Op::SendMessage);

    let err = domain(
        h.dispatch(
            moderator(),
            json!({
                "command": "start-poll",
                "channel_id": GENERAL,
                "question": "Lunch?",
                "options": "Pizza|Tacos"
            }),
        )
        .await,
    );
    assert!(matches!(err, DomainError::Platform(_)));
    assert!(h.ctx.sessions().is_empty());
}

#[tokio::test]
async fn test_session_unreachable_from_other_community() {
    let h = TestHarness::new();
    let session = start_poll(&h).await;

    let err = domain(
        h.dispatch_in(
            OTHER_COMMUNITY,
            member(U1),
            json!({ "command": "toggle-vote", "session_id": session, "option": "Pizza" }),
        )
        .await,
    );
    assert!(matches!(err, DomainError::SessionNotFound(_)));
}

#[tokio::test]
async fn test_sweep_prunes_closed_sessions() {
    let h = TestHarness::new();
    let session = start_poll(&h).await;
    h.run(moderator(), json!({ "command": "end-poll", "session_id": session }))
        .await;

    let report = h
        .ctx
        .sessions()
        .sweep(Duration::from_secs(3600), Utc::now())
        .await;
    assert_eq!(report.pruned, 0);
    assert_eq!(h.ctx.sessions().len(), 1);

    let report = h.ctx.sessions().sweep(Duration::ZERO, Utc::now()).await;
    assert_eq!(report.pruned, 1);
    assert!(h.ctx.sessions().is_empty());

    let err = domain(
        h.dispatch(moderator(), json!({ "command": "end-poll", "session_id": session }))
            .await,
    );
    assert!(matches!(err, DomainError::SessionNotFound(_)));
}

// ============================================================================
// Giveaways
// ============================================================================

async fn start_giveaway(h: &TestHarness, duration_seconds: u64) -> Value {
    let payload = h
        .run(
            admin(),
            json!({
                "command": "start-giveaway",
                "channel_id": GENERAL,
                "prize": "Nitro",
                "duration_seconds": duration_seconds
            }),
        )
        .await;
    assert_eq!(payload["type"], "giveaway_started");
    payload["session_id"].clone()
}

async fn enter(h: &TestHarness, user: Snowflake, session: &Value) -> ServiceResult<CommandOutcome> {
    h.dispatch(
        member(user),
        json!({ "command": "enter-giveaway", "session_id": session }),
    )
    .await
}

fn announcements(h: &TestHarness) -> Vec<String> {
    h.platform
        .messages_to(GENERAL)
        .into_iter()
        .filter_map(|m| m.content)
        .collect()
}

#[tokio::test]
async fn test_giveaway_requires_administrator() {
    let h = TestHarness::new();
    let err = h
        .dispatch(
            moderator(),
            json!({
                "command": "start-giveaway",
                "channel_id": GENERAL,
                "prize": "Nitro",
                "duration_seconds": 60
            }),
        )
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
    assert!(h.platform.calls().is_empty());
}

#[tokio::test]
async fn test_entering_twice_counts_once() {
    let h = TestHarness::new();
    let session = start_giveaway(&h, 3600).await;

    let first = serde_json::to_value(enter(&h, U1, &session).await.unwrap().payload).unwrap();
    assert_eq!(first["outcome"], "entry");
    assert_eq!(first["joined"], true);

    let second = serde_json::to_value(enter(&h, U1, &session).await.unwrap().payload).unwrap();
    assert_eq!(second["joined"], false);
    assert_eq!(second["entrants"], 1);
}

#[tokio::test(start_paused = true)]
async fn test_immediate_giveaway_concludes_once() {
    let h = TestHarness::new();
    let session = start_giveaway(&h, 0).await;
    let entrants = [U1, U2, U3];
    // The timer task cannot run before the test yields
    for user in entrants {
        enter(&h, user, &session).await.unwrap();
    }

    tokio::time::sleep(Duration::from_millis(50)).await;

    let results = announcements(&h);
    assert_eq!(results.len(), 1, "exactly one result: {results:?}");
    let result = &results[0];
    assert!(
        entrants
            .iter()
            .any(|u| result == &format!("Congratulations <@{u}>! You won **Nitro**!")),
        "unexpected announcement {result}"
    );

    assert_eq!(domain(enter(&h, U1, &session).await), DomainError::SessionClosed);
    let id: Snowflake = serde_json::from_value(session).unwrap();
    let again = h.ctx.sessions().conclude_giveaway(id).await.unwrap_err();
    assert_eq!(again.as_domain(), Some(&DomainError::SessionClosed));
}

#[tokio::test(start_paused = true)]
async fn test_timer_draws_from_entrants() {
    let h = TestHarness::new();
    let session = start_giveaway(&h, 60).await;
    enter(&h, U1, &session).await.unwrap();
    enter(&h, U2, &session).await.unwrap();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(announcements(&h).is_empty());

    tokio::time::sleep(Duration::from_secs(31)).await;
    let results = announcements(&h);
    assert_eq!(results.len(), 1);
    assert!(
        results[0] == format!("Congratulations <@{U1}>! You won **Nitro**!")
            || results[0] == format!("Congratulations <@{U2}>! You won **Nitro**!")
    );

    let id: Snowflake = serde_json::from_value(session).unwrap();
    let snapshot = h.ctx.sessions().get(id).await.unwrap();
    assert_eq!(snapshot.phase(), SessionPhase::Terminal);
}

#[tokio::test]
async fn test_concurrent_conclusion_succeeds_once() {
    let h = TestHarness::new();
    let session = start_giveaway(&h, 3600).await;
    enter(&h, U1, &session).await.unwrap();
    let id: Snowflake = serde_json::from_value(session).unwrap();

    let engine = h.ctx.sessions().clone();
    let attempts = (0..8).map(|_| {
        let engine = engine.clone();
        tokio::spawn(async move { engine.conclude_giveaway(id).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].winner, Some(U1));
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| e.as_domain() == Some(&DomainError::SessionClosed)));
    assert_eq!(announcements(&h).len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_finished_timers_are_released() {
    let h = TestHarness::new();
    for _ in 0..20 {
        start_giveaway(&h, 0).await;
    }

    let drained = tokio::time::timeout(Duration::from_secs(5), async {
        while h.ctx.sessions().pending_timers() > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(
        drained.is_ok(),
        "{} timers still registered",
        h.ctx.sessions().pending_timers()
    );
    let empty = announcements(&h)
        .iter()
        .filter(|a| *a == "No entries for the giveaway.")
        .count();
    assert_eq!(empty, 20);
}

#[tokio::test]
async fn test_sweep_concludes_overdue_giveaways() {
    let h = TestHarness::new();
    let session = start_giveaway(&h, 60).await;
    h.ctx.shutdown();

    let later = Utc::now() + chrono::Duration::seconds(120);
    let report = h
        .ctx
        .sessions()
        .sweep(Duration::from_secs(3600), later)
        .await;
    assert_eq!(report.concluded, 1);
    assert_eq!(announcements(&h), vec!["No entries for the giveaway.".to_string()]);
    assert_eq!(domain(enter(&h, U1, &session).await), DomainError::SessionClosed);
}

// ============================================================================
// Tickets
// ============================================================================

async fn open_ticket(h: &TestHarness, requester: Snowflake, name: Option<&str>) -> Value {
    let payload = h
        .run(member(requester), json!({ "command": "open-ticket", "name": name }))
        .await;
    assert_eq!(payload["type"], "ticket_opened");
    payload
}

#[tokio::test]
async fn test_ticket_channel_is_private() {
    let h = TestHarness::new();
    let opened = open_ticket(&h, U1, Some("Alice")).await;
    assert_eq!(opened["channel_name"], "ticket-alice");

    let spec = h
        .platform
        .calls()
        .into_iter()
        .find_map(|call| match call {
            PlatformCall::CreateChannel { spec, .. } => Some(spec),
            _ => None,
        })
        .unwrap();
    assert_eq!(spec.topic.as_deref(), Some(format!("Ticket for <@{U1}>").as_str()));

    let everyone = &spec.overwrites[0];
    assert_eq!(everyone.target, OverwriteTarget::everyone(COMMUNITY));
    assert_eq!(everyone.deny, Permissions::VIEW_CHANNEL);

    let allowed: Vec<_> = spec.overwrites[1..].iter().map(|o| o.target).collect();
    assert_eq!(
        allowed,
        vec![
            OverwriteTarget::Member(U1),
            OverwriteTarget::Member(BOT),
            OverwriteTarget::Role(STAFF_ROLE),
        ]
    );
    assert!(spec.overwrites[1..]
        .iter()
        .all(|o| o.allow == Permissions::TICKET_ACCESS));

    let channel: Snowflake = serde_json::from_value(opened["channel_id"].clone()).unwrap();
    let greeting = &h.platform.messages_to(channel)[0];
    assert_eq!(
        greeting.content.as_deref(),
        Some(format!("<@{U1}> support will be with you shortly.").as_str())
    );
}

#[tokio::test]
async fn test_ticket_names_are_deduplicated() {
    let h = TestHarness::new();
    let first = open_ticket(&h, U1, Some("Alice")).await;
    let second = open_ticket(&h, U2, Some("alice")).await;
    let third = open_ticket(&h, U3, None).await;

    assert_eq!(first["channel_name"], "ticket-alice");
    assert_eq!(second["channel_name"], "ticket-alice-1");
    assert_eq!(third["channel_name"], format!("ticket-{U3}"));
}

#[tokio::test]
async fn test_ticket_close_authority() {
    let h = TestHarness::new();
    let opened = open_ticket(&h, U1, None).await;
    let session = opened["session_id"].clone();

    let err = h
        .dispatch(member(U2), json!({ "command": "close-ticket", "session_id": session }))
        .await
        .unwrap_err();
    assert_eq!(err.as_domain(), Some(&DomainError::NotTicketOwner));
    assert_eq!(err.status_code(), 403);

    let closed = h
        .run(member(U1), json!({ "command": "close-ticket", "session_id": session }))
        .await;
    assert_eq!(closed["outcome"], "ticket_closed");
    assert_eq!(closed["channel_id"], opened["channel_id"]);
    assert!(h.platform.channels(COMMUNITY).iter().all(|c| c.name != format!("ticket-{U1}")));

    let err = domain(
        h.dispatch(moderator(), json!({ "command": "close-ticket", "session_id": session }))
            .await,
    );
    assert_eq!(err, DomainError::SessionClosed);
}

#[tokio::test]
async fn test_moderator_may_close_any_ticket() {
    let h = TestHarness::new();
    let opened = open_ticket(&h, U1, None).await;

    let closed = h
        .run(
            moderator(),
            json!({ "command": "close-ticket", "session_id": opened["session_id"] }),
        )
        .await;
    assert_eq!(closed["outcome"], "ticket_closed");
}

#[tokio::test]
async fn test_failed_delete_keeps_ticket_open() {
    let h = TestHarness::new();
    let opened = open_ticket(&h, U1, None).await;
    let session = opened["session_id"].clone();
    h.platform.fail(Op::DeleteChannel);

    let err = domain(
        h.dispatch(member(U1), json!({ "command": "close-ticket", "session_id": session }))
            .await,
    );
    assert!(matches!(err, DomainError::Platform(_)));

    let id: Snowflake = serde_json::from_value(session.clone()).unwrap();
    assert_eq!(h.ctx.sessions().get(id).await.unwrap().phase(), SessionPhase::Active);

    h.platform.recover(Op::DeleteChannel);
    let closed = h
        .run(member(U1), json!({ "command": "close-ticket", "session_id": session }))
        .await;
    assert_eq!(closed["outcome"], "ticket_closed");
}

#[tokio::test]
async fn test_ticket_rejects_poll_actions() {
    let h = TestHarness::new();
    let opened = open_ticket(&h, U1, None).await;

    let err = domain(
        h.dispatch(
            member(U1),
            json!({ "command": "toggle-vote", "session_id": opened["session_id"], "option": "x" }),
        )
        .await,
    );
    assert!(matches!(err, DomainError::UnsupportedAction { kind: "ticket", .. }));
}

#[tokio::test]
async fn test_ticket_panel_posts_embed() {
    let h = TestHarness::new();

    let err = domain(
        h.dispatch(
            moderator(),
            json!({ "command": "post-ticket-panel", "channel_id": GENERAL }),
        )
        .await,
    );
    assert!(err.is_authorization());

    let posted = h
        .run(
            admin(),
            json!({ "command": "post-ticket-panel", "channel_id": GENERAL }),
        )
        .await;
    assert_eq!(posted["type"], "ticket_panel_posted");
    assert_eq!(posted["channel_id"], GENERAL.to_string());

    let messages = h.platform.messages_to(GENERAL);
    assert_eq!(messages.len(), 1);
    let embed = messages[0].embed.as_ref().unwrap();
    assert_eq!(embed.title, "Support Tickets");
    assert!(h.ctx.sessions().is_empty());
}

// ============================================================================
// Role pickers
// ============================================================================

const RED: Snowflake = Snowflake::new(61);
const BLUE: Snowflake = Snowflake::new(62);

async fn start_picker(h: &TestHarness) -> Value {
    let started = h
        .run(
            moderator(),
            json!({
                "command": "create-role-picker",
                "channel_id": GENERAL,
                "title": "Colors",
                "description": "Pick your colors",
                "roles": format!("<@&{RED}>, {BLUE}, not-a-role")
            }),
        )
        .await;
    assert_eq!(started["type"], "role_picker_started");
    started
}

async fn pick(
    h: &TestHarness,
    user: Snowflake,
    session: &Value,
    role: Snowflake,
) -> ServiceResult<CommandOutcome> {
    h.dispatch(
        member(user),
        json!({ "command": "pick-role", "session_id": session, "role_id": role }),
    )
    .await
}

#[tokio::test]
async fn test_role_picker_lists_parsed_roles() {
    let h = TestHarness::new();
    let started = start_picker(&h).await;

    let roles = started["roles"].as_array().unwrap();
    assert_eq!(roles.len(), 2);
    assert_eq!(roles[0]["role_id"], RED.to_string());
    assert_eq!(roles[0]["marker"], "🔹");
    assert_eq!(roles[1]["marker"], "🔸");

    let messages = h.platform.messages_to(GENERAL);
    let embed = messages[0].embed.as_ref().unwrap();
    assert_eq!(embed.title, "Colors");
    assert_eq!(
        embed.description,
        "Pick your colors\n\n🔹 - <@&61>\n🔸 - <@&62>"
    );
}

#[tokio::test]
async fn test_pick_role_toggles_on_the_picker() {
    let h = TestHarness::new();
    let session = start_picker(&h).await["session_id"].clone();

    let outcome = pick(&h, U1, &session, RED).await.unwrap();
    let first = serde_json::to_value(&outcome.payload).unwrap();
    assert_eq!(first["outcome"], "role_toggled");
    assert_eq!(first["added"], true);
    assert!(h.platform.has_role(COMMUNITY, U1, RED));
    assert!(outcome.notifications.is_empty());

    let outcome = pick(&h, U1, &session, RED).await.unwrap();
    let second = serde_json::to_value(&outcome.payload).unwrap();
    assert_eq!(second["added"], false);
    assert!(!h.platform.has_role(COMMUNITY, U1, RED));

    // Another member's pick is independent
    pick(&h, U2, &session, BLUE).await.unwrap();
    assert!(h.platform.has_role(COMMUNITY, U2, BLUE));
    assert!(!h.platform.has_role(COMMUNITY, U1, BLUE));
}

#[tokio::test]
async fn test_pick_role_rejects_roles_not_offered() {
    let h = TestHarness::new();
    let session = start_picker(&h).await["session_id"].clone();

    let err = domain(pick(&h, U1, &session, STAFF_ROLE).await);
    assert!(matches!(err, DomainError::UnknownOption(_)));
    assert!(!h.platform.has_role(COMMUNITY, U1, STAFF_ROLE));

    let poll = start_poll(&h).await;
    let err = domain(pick(&h, U1, &poll, RED).await);
    assert!(matches!(err, DomainError::UnsupportedAction { kind: "poll", .. }));
}

#[tokio::test]
async fn test_role_picker_needs_a_valid_role() {
    let h = TestHarness::new();

    let err = domain(
        h.dispatch(
            moderator(),
            json!({
                "command": "create-role-picker",
                "channel_id": GENERAL,
                "title": "Colors",
                "roles": "red, blue"
            }),
        )
        .await,
    );
    assert!(matches!(err, DomainError::InvalidArgument(_)));
    assert!(h.platform.messages_to(GENERAL).is_empty());

    let err = domain(
        h.dispatch(
            member(U1),
            json!({
                "command": "create-role-picker",
                "channel_id": GENERAL,
                "title": "Colors",
                "roles": "61"
            }),
        )
        .await,
    );
    assert!(err.is_authorization());
}

#[tokio::test]
async fn test_role_picker_scoped_to_community() {
    let h = TestHarness::new();
    let session = start_picker(&h).await["session_id"].clone();

    let err = domain(
        h.dispatch_in(
            OTHER_COMMUNITY,
            member(U1),
            json!({ "command": "pick-role", "session_id": session, "role_id": RED }),
        )
        .await,
    );
    assert!(matches!(err, DomainError::SessionNotFound(_)));
}
