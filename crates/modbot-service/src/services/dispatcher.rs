//! Command dispatcher
//!
//! The single entry point for the command surface. A command is validated,
//! checked against the invoker's permissions and routed to the owning
//! service. Modlog notifications it produced are handed to the sink in a
//! detached task; the outcome is returned without waiting for delivery.

use serde::Deserialize;
use tracing::{debug, instrument};

use modbot_core::{Actor, Snowflake};

use crate::dto::{Command, CommandOutcome, CommandPayload};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::ledger::LedgerService;
use super::moderation::ModerationService;
use super::outcome::Outcome;
use super::quote::QuoteService;
use super::settings::SettingsService;

/// Where and by whom a command was invoked
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Invocation {
    pub community_id: Snowflake,
    pub actor: Actor,
}

impl Invocation {
    pub fn new(community_id: Snowflake, actor: Actor) -> Self {
        Self {
            community_id,
            actor,
        }
    }
}

pub struct CommandDispatcher<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommandDispatcher<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Run a command on behalf of `invocation.actor`
    ///
    /// # Errors
    /// Validation failures, a missing permission, or any error of the
    /// underlying operation. Nothing is notified when the command fails.
    #[instrument(
        skip(self, invocation, command),
        fields(
            command = command.name(),
            community_id = %invocation.community_id,
            actor_id = %invocation.actor.user_id,
        )
    )]
    pub async fn dispatch(
        &self,
        invocation: Invocation,
        command: Command,
    ) -> ServiceResult<CommandOutcome> {
        command.validate()?;
        if let Some(required) = command.required_permission() {
            invocation.actor.require(required)?;
        }

        let outcome = self.route(invocation, command).await?;

        if !outcome.notifications.is_empty() {
            // Delivery runs detached so a slow modlog never delays the reply
            let notifier = self.ctx.notifier();
            let notifications = outcome.notifications.clone();
            tokio::spawn(async move {
                for notification in &notifications {
                    notifier.notify(notification).await;
                }
            });
        }
        debug!(notifications = outcome.notifications.len(), "Command completed");

        Ok(CommandOutcome {
            payload: outcome.value,
            notifications: outcome.notifications,
        })
    }

    async fn route(
        &self,
        invocation: Invocation,
        command: Command,
    ) -> ServiceResult<Outcome<CommandPayload>> {
        let Invocation {
            community_id: community,
            actor,
        } = invocation;
        let moderator = actor.user_id;

        let moderation = ModerationService::new(self.ctx);
        let ledger = LedgerService::new(self.ctx);
        let quotes = QuoteService::new(self.ctx);
        let settings = SettingsService::new(self.ctx);
        let sessions = self.ctx.sessions();

        let outcome = match command {
            // Ledger and sanctions
            Command::Warn(r) => moderation
                .warn(community, r.subject_id, r.reason, moderator)
                .await?
                .map(CommandPayload::Action),
            Command::Kick(r) => moderation
                .kick(community, r.subject_id, r.reason, moderator)
                .await?
                .map(CommandPayload::Action),
            Command::Ban(r) => moderation
                .ban(community, r.subject_id, r.reason, moderator)
                .await?
                .map(CommandPayload::Action),
            Command::Mute(r) => moderation
                .mute(community, r.subject_id, r.duration_minutes, r.reason, moderator)
                .await?
                .map(CommandPayload::Mute),
            Command::Unmute(r) => moderation
                .unmute(community, r.subject_id, moderator)
                .await?
                .map(CommandPayload::Action),
            Command::RecordGenericAction(r) => moderation
                .record_generic(community, r.subject_id, r.action, r.reason, moderator)
                .await?
                .map(CommandPayload::Action),
            Command::ListWarnings(r) => {
                let actions = ledger.list_warnings(community, r.subject_id).await?;
                Outcome::quiet(CommandPayload::Actions { actions })
            }
            Command::ClearWarnings(r) => ledger
                .clear_warnings(community, r.subject_id, moderator)
                .await?
                .map(|removed| CommandPayload::WarningsCleared { removed }),
            Command::RecentActions(r) => {
                let actions = ledger.recent_actions(community, r.limit).await?;
                Outcome::quiet(CommandPayload::Actions { actions })
            }

            // Roles and channels
            Command::ToggleRole(r) => moderation
                .toggle_role(community, r.subject_id, r.role_id, moderator)
                .await?
                .map(CommandPayload::RoleToggled),
            Command::AddRole(r) => moderation
                .set_role(community, r.subject_id, r.role_id, true, moderator)
                .await?
                .map(CommandPayload::RoleToggled),
            Command::RemoveRole(r) => moderation
                .set_role(community, r.subject_id, r.role_id, false, moderator)
                .await?
                .map(CommandPayload::RoleToggled),
            Command::LockChannel(r) => moderation
                .set_channel_lock(community, r.channel_id, true, moderator)
                .await?
                .map(CommandPayload::ChannelLock),
            Command::UnlockChannel(r) => moderation
                .set_channel_lock(community, r.channel_id, false, moderator)
                .await?
                .map(CommandPayload::ChannelLock),
            Command::Slowmode(r) => moderation
                .set_slowmode(community, r.channel_id, r.seconds, moderator)
                .await?
                .map(CommandPayload::Slowmode),

            // Sessions
            Command::StartPoll(r) => {
                let started = sessions
                    .start_poll(community, r.channel_id, &actor, &r.question, &r.options)
                    .await?;
                Outcome::quiet(CommandPayload::PollStarted(started))
            }
            Command::ToggleVote(r) => {
                let result = sessions
                    .toggle_vote(community, r.session_id, &actor, &r.option)
                    .await?;
                Outcome::quiet(CommandPayload::Session(result))
            }
            Command::EndPoll(r) => {
                let result = sessions.end_poll(community, r.session_id, &actor).await?;
                Outcome::quiet(CommandPayload::Session(result))
            }
            Command::StartGiveaway(r) => {
                let started = sessions
                    .start_giveaway(community, r.channel_id, &actor, &r.prize, r.duration_seconds)
                    .await?;
                Outcome::quiet(CommandPayload::GiveawayStarted(started))
            }
            Command::EnterGiveaway(r) => {
                let result = sessions
                    .enter_giveaway(community, r.session_id, &actor)
                    .await?;
                Outcome::quiet(CommandPayload::Session(result))
            }
            Command::OpenTicket(r) => {
                let opened = sessions
                    .open_ticket(community, &actor, r.name.as_deref())
                    .await?;
                Outcome::quiet(CommandPayload::TicketOpened(opened))
            }
            Command::CloseTicket(r) => {
                let result = sessions
                    .close_ticket_by_id(community, r.session_id, &actor)
                    .await?;
                Outcome::quiet(CommandPayload::Session(result))
            }
            Command::PostTicketPanel(r) => {
                let posted = sessions.post_ticket_panel(community, r.channel_id).await?;
                Outcome::quiet(CommandPayload::TicketPanelPosted(posted))
            }
            Command::CreateRolePicker(r) => {
                let started = sessions
                    .start_role_picker(
                        community,
                        r.channel_id,
                        &actor,
                        &r.title,
                        &r.description,
                        &r.roles,
                    )
                    .await?;
                Outcome::quiet(CommandPayload::RolePickerStarted(started))
            }
            Command::PickRole(r) => {
                let result = sessions
                    .pick_role(community, r.session_id, &actor, r.role_id)
                    .await?;
                Outcome::quiet(CommandPayload::Session(result))
            }

            // Quotes
            Command::AddQuote(r) => quotes
                .add(community, r.subject_id, &r.text, moderator)
                .await?
                .map(CommandPayload::Quote),
            Command::ListQuotes(r) => {
                let listed = quotes.list(community, r.subject_id).await?;
                Outcome::quiet(CommandPayload::Quotes { quotes: listed })
            }
            Command::RemoveQuoteByPosition(r) => quotes
                .remove_by_position(community, r.subject_id, r.position, moderator)
                .await?
                .map(CommandPayload::Quote),

            // Community settings
            Command::SetModlogChannel(r) => {
                let updated = settings.set_modlog_channel(community, r.channel_id).await?;
                Outcome::quiet(CommandPayload::SettingUpdated(updated))
            }
            Command::SetSuggestionChannel(r) => {
                let updated = settings
                    .set_suggestion_channel(community, r.channel_id)
                    .await?;
                Outcome::quiet(CommandPayload::SettingUpdated(updated))
            }
            Command::Suggest(r) => {
                let posted = settings.suggest(community, moderator, &r.text).await?;
                Outcome::quiet(CommandPayload::SuggestionPosted(posted))
            }
            Command::Announce(r) => settings
                .announce(community, r.channel_id, &r.title, &r.message, moderator)
                .await?
                .map(CommandPayload::AnnouncementPosted),
        };

        Ok(outcome)
    }
}
