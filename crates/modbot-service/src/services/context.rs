//! Service context - dependency container for services
//!
//! Holds the repositories, the platform client, the notification sink and
//! the two long-lived engines (expiry scheduler, session engine).

use std::sync::Arc;

use modbot_common::ModerationConfig;
use modbot_core::traits::{
    ActionRepository, ExpiryRepository, NotificationSink, PlatformClient, QuoteRepository,
    SettingsRepository,
};
use modbot_core::SnowflakeGenerator;

use super::error::{ServiceError, ServiceResult};
use super::notifier::ModlogNotifier;
use super::scheduler::ExpiryScheduler;
use super::session::{SessionEngine, TicketAccess};

/// Service context containing all dependencies
///
/// Cheap to clone: every field is reference counted.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    action_repo: Arc<dyn ActionRepository>,
    quote_repo: Arc<dyn QuoteRepository>,
    settings_repo: Arc<dyn SettingsRepository>,

    // Collaborators
    platform: Arc<dyn PlatformClient>,
    notifier: Arc<dyn NotificationSink>,

    // Engines
    scheduler: ExpiryScheduler,
    sessions: SessionEngine,

    moderation: Arc<ModerationConfig>,
    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    /// Get the action ledger repository
    pub fn action_repo(&self) -> &dyn ActionRepository {
        self.action_repo.as_ref()
    }

    /// Get the quote repository
    pub fn quote_repo(&self) -> &dyn QuoteRepository {
        self.quote_repo.as_ref()
    }

    /// Get the settings repository
    pub fn settings_repo(&self) -> &dyn SettingsRepository {
        self.settings_repo.as_ref()
    }

    // === Collaborators ===

    pub fn platform(&self) -> &dyn PlatformClient {
        self.platform.as_ref()
    }

    pub fn notifier(&self) -> Arc<dyn NotificationSink> {
        Arc::clone(&self.notifier)
    }

    // === Engines ===

    pub fn scheduler(&self) -> &ExpiryScheduler {
        &self.scheduler
    }

    pub fn sessions(&self) -> &SessionEngine {
        &self.sessions
    }

    pub fn moderation(&self) -> &ModerationConfig {
        &self.moderation
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> modbot_core::Snowflake {
        self.snowflake_generator.generate()
    }

    /// Abort every outstanding timer
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
        self.sessions.shutdown();
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("scheduler", &self.scheduler)
            .field("sessions", &self.sessions)
            .field("moderation", &self.moderation)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    action_repo: Option<Arc<dyn ActionRepository>>,
    quote_repo: Option<Arc<dyn QuoteRepository>>,
    settings_repo: Option<Arc<dyn SettingsRepository>>,
    expiry_repo: Option<Arc<dyn ExpiryRepository>>,
    platform: Option<Arc<dyn PlatformClient>>,
    notifier: Option<Arc<dyn NotificationSink>>,
    moderation: Option<ModerationConfig>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action_repo(mut self, repo: Arc<dyn ActionRepository>) -> Self {
        self.action_repo = Some(repo);
        self
    }

    pub fn quote_repo(mut self, repo: Arc<dyn QuoteRepository>) -> Self {
        self.quote_repo = Some(repo);
        self
    }

    pub fn settings_repo(mut self, repo: Arc<dyn SettingsRepository>) -> Self {
        self.settings_repo = Some(repo);
        self
    }

    pub fn expiry_repo(mut self, repo: Arc<dyn ExpiryRepository>) -> Self {
        self.expiry_repo = Some(repo);
        self
    }

    pub fn platform(mut self, platform: Arc<dyn PlatformClient>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Override the notification sink (defaults to the modlog notifier)
    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn moderation(mut self, config: ModerationConfig) -> Self {
        self.moderation = Some(config);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let action_repo = required(self.action_repo, "action_repo")?;
        let quote_repo = required(self.quote_repo, "quote_repo")?;
        let settings_repo = required(self.settings_repo, "settings_repo")?;
        let expiry_repo = required(self.expiry_repo, "expiry_repo")?;
        let platform = required(self.platform, "platform")?;
        let moderation = required(self.moderation, "moderation")?;
        let snowflake_generator = self.snowflake_generator.unwrap_or_default();

        let notifier = self.notifier.unwrap_or_else(|| {
            Arc::new(ModlogNotifier::new(
                Arc::clone(&settings_repo),
                Arc::clone(&platform),
            ))
        });

        let scheduler =
            ExpiryScheduler::new(Arc::clone(&platform), Arc::clone(&notifier), expiry_repo);
        let sessions = SessionEngine::new(
            Arc::clone(&platform),
            Arc::clone(&snowflake_generator),
            TicketAccess {
                bot_user_id: moderation.bot_user_id,
                staff_role_id: moderation.staff_role_id,
            },
        );

        Ok(ServiceContext {
            action_repo,
            quote_repo,
            settings_repo,
            platform,
            notifier,
            scheduler,
            sessions,
            moderation: Arc::new(moderation),
            snowflake_generator,
        })
    }
}

fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
}
