//! Test fixtures
//!
//! Well-known ids, actors with typical permission sets, and a harness that
//! wires the service context to in-memory stores and recording fakes.

use std::sync::Arc;

use modbot_common::ModerationConfig;
use modbot_core::{Actor, ExpiryRepository, Permissions, Snowflake, SnowflakeGenerator};
use modbot_db::{
    InMemoryActionRepository, InMemoryExpiryRepository, InMemoryQuoteRepository,
    InMemorySettingsRepository,
};
use modbot_service::{
    Command, CommandDispatcher, CommandOutcome, Invocation, ServiceContext, ServiceResult,
};
use serde_json::Value;

use crate::fakes::{RecordingPlatform, RecordingSink};

pub const COMMUNITY: Snowflake = Snowflake::new(100);
pub const OTHER_COMMUNITY: Snowflake = Snowflake::new(200);
pub const BOT: Snowflake = Snowflake::new(1);
pub const STAFF_ROLE: Snowflake = Snowflake::new(50);
pub const GENERAL: Snowflake = Snowflake::new(300);
pub const ANNOUNCEMENTS: Snowflake = Snowflake::new(301);
pub const MUTE_ROLE: &str = "Muted";

pub const MODERATOR: Snowflake = Snowflake::new(10);
pub const ADMIN: Snowflake = Snowflake::new(11);
pub const U1: Snowflake = Snowflake::new(21);
pub const U2: Snowflake = Snowflake::new(22);
pub const U3: Snowflake = Snowflake::new(23);

/// Everything a moderator holds short of administrator
pub fn moderator() -> Actor {
    Actor::new(
        MODERATOR,
        Permissions::KICK_MEMBERS
            | Permissions::BAN_MEMBERS
            | Permissions::MANAGE_ROLES
            | Permissions::MANAGE_CHANNELS
            | Permissions::MANAGE_MESSAGES,
    )
}

pub fn admin() -> Actor {
    Actor::new(ADMIN, Permissions::ADMINISTRATOR)
}

/// A member with no special permissions
pub fn member(user_id: Snowflake) -> Actor {
    Actor::new(user_id, Permissions::empty())
}

pub fn moderation_config() -> ModerationConfig {
    ModerationConfig {
        bot_user_id: BOT,
        staff_role_id: Some(STAFF_ROLE),
        mute_role_name: MUTE_ROLE.to_string(),
    }
}

/// Service context over in-memory stores and recording fakes
pub struct TestHarness {
    pub ctx: ServiceContext,
    pub platform: Arc<RecordingPlatform>,
    pub sink: Arc<RecordingSink>,
    pub actions: Arc<InMemoryActionRepository>,
    pub quotes: Arc<InMemoryQuoteRepository>,
    pub settings: Arc<InMemorySettingsRepository>,
    pub expiries: Arc<InMemoryExpiryRepository>,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Harness with the recording sink as notifier
    pub fn new() -> Self {
        let expiries = Arc::new(InMemoryExpiryRepository::new());
        Self::build(expiries.clone(), expiries, true)
    }

    /// Harness whose notifier posts to the modlog channel through the platform
    pub fn with_modlog() -> Self {
        let expiries = Arc::new(InMemoryExpiryRepository::new());
        Self::build(expiries.clone(), expiries, false)
    }

    /// Harness sharing an existing expiry store, as after a restart
    pub fn with_expiries(expiries: Arc<InMemoryExpiryRepository>) -> Self {
        Self::build(expiries.clone(), expiries, true)
    }

    /// Harness whose scheduler persists through `store`; `expiries` is the
    /// in-memory store it ultimately writes to
    pub fn with_expiry_store(
        store: Arc<dyn ExpiryRepository>,
        expiries: Arc<InMemoryExpiryRepository>,
    ) -> Self {
        Self::build(store, expiries, true)
    }

    fn build(
        store: Arc<dyn ExpiryRepository>,
        expiries: Arc<InMemoryExpiryRepository>,
        recording_sink: bool,
    ) -> Self {
        let platform = Arc::new(RecordingPlatform::new());
        platform.add_channel(COMMUNITY, GENERAL, "general");
        platform.add_channel(COMMUNITY, ANNOUNCEMENTS, "announcements");

        let sink = Arc::new(RecordingSink::new());
        let actions = Arc::new(InMemoryActionRepository::new());
        let quotes = Arc::new(InMemoryQuoteRepository::new());
        let settings = Arc::new(InMemorySettingsRepository::new());

        let mut builder = ServiceContext::builder()
            .action_repo(actions.clone())
            .quote_repo(quotes.clone())
            .settings_repo(settings.clone())
            .expiry_repo(store)
            .platform(platform.clone())
            .moderation(moderation_config())
            .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)));
        if recording_sink {
            builder = builder.notifier(sink.clone());
        }
        let ctx = builder.build().expect("complete service context");

        Self {
            ctx,
            platform,
            sink,
            actions,
            quotes,
            settings,
            expiries,
        }
    }

    /// Let detached notification delivery run
    pub async fn settle(&self) {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    /// Dispatch a JSON command in the default community
    pub async fn dispatch(&self, actor: Actor, command: Value) -> ServiceResult<CommandOutcome> {
        self.dispatch_in(COMMUNITY, actor, command).await
    }

    pub async fn dispatch_in(
        &self,
        community_id: Snowflake,
        actor: Actor,
        command: Value,
    ) -> ServiceResult<CommandOutcome> {
        let command: Command = serde_json::from_value(command).expect("well-formed command");
        CommandDispatcher::new(&self.ctx)
            .dispatch(Invocation::new(community_id, actor), command)
            .await
    }

    /// Dispatch and return the payload as JSON, panicking on failure
    pub async fn run(&self, actor: Actor, command: Value) -> Value {
        let outcome = self
            .dispatch(actor, command)
            .await
            .unwrap_or_else(|e| panic!("command failed: {e}"));
        serde_json::to_value(&outcome.payload).expect("serializable payload")
    }
}
