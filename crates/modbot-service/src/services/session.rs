//! Interactive session engine
//!
//! Owns every poll, giveaway, ticket and role picker session for the
//! lifetime of the process. Each session sits behind its own async mutex, so calls on one
//! session are serialized while unrelated sessions proceed concurrently.
//!
//! A session is registered only once it is visible on the platform (the
//! poll or giveaway message was posted, the ticket channel exists), so the
//! `Open` phase is never observable from outside. Terminal sessions stay
//! registered as tombstones until `sweep` prunes them, so late calls get
//! `SessionClosed` rather than `SessionNotFound`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use modbot_core::{
    Actor, ChannelSpec, DomainError, Giveaway, GiveawayResult, OptionTally, OutgoingMessage,
    OverwriteTarget, PermissionOverwrite, Permissions, PlatformClient, Poll, RolePicker, Session,
    SessionAction, SessionId, SessionOutcome, SessionState, Severity, Snowflake,
    SnowflakeGenerator, Ticket,
};

use crate::dto::{
    GiveawayStartedResponse, MessagePostedResponse, PollStartedResponse,
    RolePickerStartedResponse, TicketOpenedResponse,
};

use super::error::ServiceResult;

const GIVEAWAY_COLOR: u32 = 0xF1_C4_0F;
const PICKER_COLOR: u32 = 0x58_65_F2;
const PANEL_COLOR: u32 = 0x34_98_DB;

/// Who besides the requester can see a ticket channel
#[derive(Debug, Clone, Copy)]
pub struct TicketAccess {
    pub bot_user_id: Snowflake,
    pub staff_role_id: Option<Snowflake>,
}

/// What a sweep did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub concluded: usize,
    pub pruned: usize,
}

type SessionSlot = Arc<Mutex<Session>>;

/// A registered session and the community it belongs to
struct Registered {
    community_id: Snowflake,
    slot: SessionSlot,
}

struct Inner {
    platform: Arc<dyn PlatformClient>,
    ids: Arc<SnowflakeGenerator>,
    tickets: TicketAccess,
    sessions: DashMap<SessionId, Registered>,
    timers: DashMap<SessionId, JoinHandle<()>>,
}

#[derive(Clone)]
pub struct SessionEngine {
    inner: Arc<Inner>,
}

impl SessionEngine {
    pub fn new(
        platform: Arc<dyn PlatformClient>,
        ids: Arc<SnowflakeGenerator>,
        tickets: TicketAccess,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                platform,
                ids,
                tickets,
                sessions: DashMap::new(),
                timers: DashMap::new(),
            }),
        }
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Post a poll into `channel_id` and start accepting votes
    #[instrument(skip(self, question, options))]
    pub async fn start_poll(
        &self,
        community_id: Snowflake,
        channel_id: Snowflake,
        creator: &Actor,
        question: &str,
        options: &str,
    ) -> ServiceResult<PollStartedResponse> {
        let poll = Poll::new(question, Poll::parse_options(options))?;
        let tally = poll.tally();
        let question = poll.question().to_string();

        let message = OutgoingMessage::embed(
            question.clone(),
            render_tally(&tally),
            Severity::Success.color(),
        );
        self.inner
            .platform
            .send_message(channel_id, &message)
            .await
            .map_err(DomainError::from)?;

        let session_id = self.register(Session::new(
            self.inner.ids.generate(),
            community_id,
            channel_id,
            creator.user_id,
            SessionState::Poll(poll),
            Utc::now(),
        ));
        info!(session_id = %session_id, community_id = %community_id, "Poll started");

        Ok(PollStartedResponse {
            session_id,
            channel_id,
            question,
            options: tally,
        })
    }

    /// Announce a giveaway and arm its conclusion timer
    #[instrument(skip(self, prize))]
    pub async fn start_giveaway(
        &self,
        community_id: Snowflake,
        channel_id: Snowflake,
        creator: &Actor,
        prize: &str,
        duration_seconds: u64,
    ) -> ServiceResult<GiveawayStartedResponse> {
        let now = Utc::now();
        let giveaway = Giveaway::new(prize, duration_seconds, now);
        if giveaway.prize().is_empty() {
            return Err(DomainError::InvalidArgument("prize must not be empty".into()).into());
        }
        let prize = giveaway.prize().to_string();
        let ends_at = giveaway.deadline();

        let message = OutgoingMessage::embed(
            "Giveaway!",
            format!("Prize: **{prize}**\nDuration: {duration_seconds}s"),
            GIVEAWAY_COLOR,
        );
        self.inner
            .platform
            .send_message(channel_id, &message)
            .await
            .map_err(DomainError::from)?;

        let session_id = self.register(Session::new(
            self.inner.ids.generate(),
            community_id,
            channel_id,
            creator.user_id,
            SessionState::Giveaway(giveaway),
            now,
        ));
        self.arm_conclusion(session_id, Duration::from_secs(duration_seconds));
        info!(session_id = %session_id, community_id = %community_id, duration_seconds, "Giveaway started");

        Ok(GiveawayStartedResponse {
            session_id,
            channel_id,
            prize,
            ends_at,
        })
    }

    /// Create a private ticket channel for the requester
    #[instrument(skip(self, requester_name))]
    pub async fn open_ticket(
        &self,
        community_id: Snowflake,
        requester: &Actor,
        requester_name: Option<&str>,
    ) -> ServiceResult<TicketOpenedResponse> {
        let platform = &self.inner.platform;
        let requester_id = requester.user_id;

        let requested = match requester_name {
            Some(name) => Ticket::requested_name(name),
            None => Ticket::requested_name(&requester_id.to_string()),
        };
        let existing = platform
            .list_channels(community_id)
            .await
            .map_err(DomainError::from)?;
        let name = Ticket::unique_name(&requested, existing.iter().map(|c| c.name.as_str()));

        let spec = ChannelSpec {
            name,
            topic: Some(format!("Ticket for <@{requester_id}>")),
            overwrites: self.ticket_overwrites(community_id, requester_id),
        };
        let channel = platform
            .create_channel(community_id, &spec)
            .await
            .map_err(DomainError::from)?;

        let greeting =
            OutgoingMessage::text(format!("<@{requester_id}> support will be with you shortly."));
        if let Err(e) = platform.send_message(channel.id, &greeting).await {
            warn!(channel_id = %channel.id, error = %e, "Failed to post ticket greeting");
        }

        let session_id = self.register(Session::new(
            self.inner.ids.generate(),
            community_id,
            channel.id,
            requester_id,
            SessionState::Ticket(Ticket::new(requester_id, channel.id, channel.name.clone())),
            Utc::now(),
        ));
        info!(session_id = %session_id, channel_id = %channel.id, "Ticket opened");

        Ok(TicketOpenedResponse {
            session_id,
            channel_id: channel.id,
            channel_name: channel.name,
        })
    }

    /// Post the standing "open a ticket" panel. The panel is a plain message;
    /// tickets are still opened one by one through `open_ticket`.
    #[instrument(skip(self))]
    pub async fn post_ticket_panel(
        &self,
        community_id: Snowflake,
        channel_id: Snowflake,
    ) -> ServiceResult<MessagePostedResponse> {
        let panel = OutgoingMessage::embed(
            "Support Tickets",
            "Click the button below to open a support ticket.",
            PANEL_COLOR,
        );
        let message_id = self
            .inner
            .platform
            .send_message(channel_id, &panel)
            .await
            .map_err(DomainError::from)?;
        info!(community_id = %community_id, channel_id = %channel_id, "Ticket panel posted");

        Ok(MessagePostedResponse {
            channel_id,
            message_id,
        })
    }

    /// Post a role picker listing `roles` (ids or mentions, comma separated)
    #[instrument(skip(self, title, description, roles))]
    pub async fn start_role_picker(
        &self,
        community_id: Snowflake,
        channel_id: Snowflake,
        creator: &Actor,
        title: &str,
        description: &str,
        roles: &str,
    ) -> ServiceResult<RolePickerStartedResponse> {
        let picker = RolePicker::new(title, description, RolePicker::parse_roles(roles))?;
        let title = picker.title().to_string();
        let entries = picker.entries().to_vec();

        let message = OutgoingMessage::embed(title.clone(), picker.render(), PICKER_COLOR);
        self.inner
            .platform
            .send_message(channel_id, &message)
            .await
            .map_err(DomainError::from)?;

        let session_id = self.register(Session::new(
            self.inner.ids.generate(),
            community_id,
            channel_id,
            creator.user_id,
            SessionState::RolePicker(picker),
            Utc::now(),
        ));
        info!(session_id = %session_id, community_id = %community_id, roles = entries.len(), "Role picker started");

        Ok(RolePickerStartedResponse {
            session_id,
            channel_id,
            title,
            roles: entries,
        })
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Single entry point for every session mutation
    #[instrument(skip(self, actor, action), fields(action = action.as_str()))]
    pub async fn act(
        &self,
        community_id: Snowflake,
        session_id: SessionId,
        actor: &Actor,
        action: SessionAction,
    ) -> ServiceResult<SessionOutcome> {
        let slot = self.slot(community_id, session_id)?;
        let mut session = slot.lock().await;

        match action {
            SessionAction::Close => self.close_ticket(&mut session, actor).await,
            action => {
                let outcome = session.apply(actor, action, Utc::now())?;
                if let SessionOutcome::PollEnded { options } = &outcome {
                    self.announce_poll_result(&session, options).await;
                    info!(session_id = %session_id, "Poll ended");
                }
                Ok(outcome)
            }
        }
    }

    pub async fn toggle_vote(
        &self,
        community_id: Snowflake,
        session_id: SessionId,
        voter: &Actor,
        option: &str,
    ) -> ServiceResult<SessionOutcome> {
        let action = SessionAction::ToggleVote {
            option: option.to_string(),
        };
        self.act(community_id, session_id, voter, action).await
    }

    pub async fn end_poll(
        &self,
        community_id: Snowflake,
        session_id: SessionId,
        actor: &Actor,
    ) -> ServiceResult<SessionOutcome> {
        self.act(community_id, session_id, actor, SessionAction::End)
            .await
    }

    pub async fn enter_giveaway(
        &self,
        community_id: Snowflake,
        session_id: SessionId,
        entrant: &Actor,
    ) -> ServiceResult<SessionOutcome> {
        self.act(community_id, session_id, entrant, SessionAction::Enter)
            .await
    }

    pub async fn close_ticket_by_id(
        &self,
        community_id: Snowflake,
        session_id: SessionId,
        actor: &Actor,
    ) -> ServiceResult<SessionOutcome> {
        self.act(community_id, session_id, actor, SessionAction::Close)
            .await
    }

    /// Toggle one of a picker's roles on the member who picked it
    #[instrument(skip(self, member))]
    pub async fn pick_role(
        &self,
        community_id: Snowflake,
        session_id: SessionId,
        member: &Actor,
        role_id: Snowflake,
    ) -> ServiceResult<SessionOutcome> {
        let slot = self.slot(community_id, session_id)?;
        let session = slot.lock().await;
        session.authorize_pick(role_id)?;

        let platform = &self.inner.platform;
        let user_id = member.user_id;
        let holds = platform
            .member_has_role(community_id, user_id, role_id)
            .await
            .map_err(DomainError::from)?;

        let result = if holds {
            platform
                .revoke_role(community_id, user_id, role_id, "role picker")
                .await
        } else {
            platform
                .grant_role(community_id, user_id, role_id, "role picker")
                .await
        };
        result.map_err(|e| match e.status {
            Some(404) => DomainError::RoleNotFound(role_id.to_string()),
            _ => e.into(),
        })?;

        debug!(session_id = %session_id, user_id = %user_id, role_id = %role_id, added = !holds, "Role picked");
        Ok(SessionOutcome::RoleToggled {
            role_id,
            added: !holds,
        })
    }

    /// Draw the winner of a giveaway. Exactly one call succeeds; every
    /// other (timer, sweep, repeated call) sees `SessionClosed`.
    #[instrument(skip(self))]
    pub async fn conclude_giveaway(&self, session_id: SessionId) -> ServiceResult<GiveawayResult> {
        let slot = self.lookup(session_id)?;
        let mut session = slot.lock().await;

        let result = {
            let mut rng = rand::thread_rng();
            session.conclude(&mut rng, Utc::now())?
        };
        // Not aborted: this may be the timer task itself
        self.inner.timers.remove(&session_id);

        info!(
            session_id = %session_id,
            entrants = result.entrants,
            winner = ?result.winner,
            "Giveaway concluded"
        );

        let text = match result.winner {
            Some(winner) => format!("Congratulations <@{winner}>! You won **{}**!", result.prize),
            None => "No entries for the giveaway.".to_string(),
        };
        let channel_id = session.channel_id();
        if let Err(e) = self
            .inner
            .platform
            .send_message(channel_id, &OutgoingMessage::text(text))
            .await
        {
            warn!(session_id = %session_id, error = %e, "Failed to announce giveaway result");
        }

        Ok(result)
    }

    // ========================================================================
    // Housekeeping
    // ========================================================================

    /// Conclude overdue giveaways and drop tombstones older than `retention`
    pub async fn sweep(&self, retention: Duration, now: DateTime<Utc>) -> SweepReport {
        let slots: Vec<(SessionId, SessionSlot)> = self
            .inner
            .sessions
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(&entry.value().slot)))
            .collect();

        let retention = chrono::Duration::from_std(retention)
            .unwrap_or_else(|_| chrono::Duration::days(365_000));
        let mut report = SweepReport::default();

        for (session_id, slot) in slots {
            let (due, expired) = {
                let session = slot.lock().await;
                let expired = session.closed_at().is_some_and(|closed| {
                    closed
                        .checked_add_signed(retention)
                        .is_some_and(|until| until <= now)
                });
                (session.is_due(now), expired)
            };

            if due && self.conclude_giveaway(session_id).await.is_ok() {
                report.concluded += 1;
            }
            if expired {
                self.inner.sessions.remove(&session_id);
                if let Some((_, handle)) = self.inner.timers.remove(&session_id) {
                    handle.abort();
                }
                report.pruned += 1;
            }
        }

        if report != SweepReport::default() {
            debug!(concluded = report.concluded, pruned = report.pruned, "Session sweep");
        }
        report
    }

    /// Abort every giveaway timer. Sessions are not concluded.
    pub fn shutdown(&self) {
        self.inner.timers.retain(|_, handle| {
            handle.abort();
            false
        });
    }

    /// Snapshot of a session, tombstones included
    pub async fn get(&self, session_id: SessionId) -> Option<Session> {
        let slot = self.lookup(session_id).ok()?;
        let session = slot.lock().await;
        Some(session.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.sessions.len()
    }

    /// Giveaway timers that have not finished yet
    pub fn pending_timers(&self) -> usize {
        self.inner.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.sessions.is_empty()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn register(&self, mut session: Session) -> SessionId {
        session.activate();
        let id = session.id();
        let community_id = session.community_id();
        self.inner.sessions.insert(
            id,
            Registered {
                community_id,
                slot: Arc::new(Mutex::new(session)),
            },
        );
        id
    }

    fn lookup(&self, session_id: SessionId) -> ServiceResult<SessionSlot> {
        self.inner
            .sessions
            .get(&session_id)
            .map(|entry| Arc::clone(&entry.value().slot))
            .ok_or_else(|| DomainError::SessionNotFound(session_id).into())
    }

    /// Sessions are only reachable from their own community
    fn slot(&self, community_id: Snowflake, session_id: SessionId) -> ServiceResult<SessionSlot> {
        self.inner
            .sessions
            .get(&session_id)
            .filter(|entry| entry.value().community_id == community_id)
            .map(|entry| Arc::clone(&entry.value().slot))
            .ok_or_else(|| DomainError::SessionNotFound(session_id).into())
    }

    fn arm_conclusion(&self, session_id: SessionId, delay: Duration) {
        // Spawned while the entry is held, so even a zero-delay timer finds
        // its handle registered when it clears it.
        let Entry::Vacant(slot) = self.inner.timers.entry(session_id) else {
            return;
        };
        let engine = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = engine.conclude_giveaway(session_id).await {
                debug!(session_id = %session_id, error = %e, "Giveaway already concluded");
            }
            engine.inner.timers.remove(&session_id);
        });
        slot.insert(handle);
    }

    /// The ticket channel is deleted before the session turns terminal; if
    /// deletion fails the ticket stays open.
    async fn close_ticket(&self, session: &mut Session, actor: &Actor) -> ServiceResult<SessionOutcome> {
        let channel_id = session.authorize_close(actor)?;
        self.inner
            .platform
            .delete_channel(channel_id, &format!("ticket closed by {}", actor.user_id))
            .await
            .map_err(DomainError::from)?;

        let outcome = session.apply(actor, SessionAction::Close, Utc::now())?;
        info!(session_id = %session.id(), channel_id = %channel_id, "Ticket closed");
        Ok(outcome)
    }

    async fn announce_poll_result(&self, session: &Session, options: &[OptionTally]) {
        let SessionState::Poll(poll) = session.state() else {
            return;
        };
        let message = OutgoingMessage::embed(
            format!("{} (Final Results)", poll.question()),
            render_tally(options),
            Severity::Danger.color(),
        );
        if let Err(e) = self
            .inner
            .platform
            .send_message(session.channel_id(), &message)
            .await
        {
            warn!(session_id = %session.id(), error = %e, "Failed to post final poll results");
        }
    }

    fn ticket_overwrites(
        &self,
        community_id: Snowflake,
        requester_id: Snowflake,
    ) -> Vec<PermissionOverwrite> {
        let access = self.inner.tickets;
        let mut overwrites = vec![
            PermissionOverwrite::deny(
                OverwriteTarget::everyone(community_id),
                Permissions::VIEW_CHANNEL,
            ),
            PermissionOverwrite::allow(
                OverwriteTarget::Member(requester_id),
                Permissions::TICKET_ACCESS,
            ),
            PermissionOverwrite::allow(
                OverwriteTarget::Member(access.bot_user_id),
                Permissions::TICKET_ACCESS,
            ),
        ];
        if let Some(staff_role_id) = access.staff_role_id {
            overwrites.push(PermissionOverwrite::allow(
                OverwriteTarget::Role(staff_role_id),
                Permissions::TICKET_ACCESS,
            ));
        }
        overwrites
    }
}

fn render_tally(options: &[OptionTally]) -> String {
    options
        .iter()
        .map(|o| format!("**{}** - {} votes", o.label, o.votes))
        .collect::<Vec<_>>()
        .join("\n")
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("sessions", &self.inner.sessions.len())
            .field("timers", &self.inner.timers.len())
            .finish()
    }
}
