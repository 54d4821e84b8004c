//! Interactive session - a tagged variant per widget kind with one
//! dispatch entry point keyed by the action tag.
//!
//! Lifecycle: `Open -> Active -> Terminal`. A session is `Open` between
//! construction and the moment its message/channel exists on the platform;
//! only `Active` sessions accept mutations.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::giveaway::Giveaway;
use super::poll::{OptionTally, Poll};
use super::role_picker::RolePicker;
use super::ticket::Ticket;
use crate::error::DomainError;
use crate::value_objects::{Actor, Snowflake};

pub type SessionId = Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Poll,
    Giveaway,
    Ticket,
    RolePicker,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Poll => "poll",
            Self::Giveaway => "giveaway",
            Self::Ticket => "ticket",
            Self::RolePicker => "role_picker",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Open,
    Active,
    Terminal,
}

/// Kind-specific state
#[derive(Debug, Clone)]
pub enum SessionState {
    Poll(Poll),
    Giveaway(Giveaway),
    Ticket(Ticket),
    RolePicker(RolePicker),
}

/// Mutating operations, tagged by kind of action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionAction {
    ToggleVote { option: String },
    Enter,
    End,
    Close,
}

impl SessionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToggleVote { .. } => "toggle_vote",
            Self::Enter => "enter",
            Self::End => "end",
            Self::Close => "close",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SessionOutcome {
    Tally { options: Vec<OptionTally> },
    Entry { joined: bool, entrants: usize },
    PollEnded { options: Vec<OptionTally> },
    TicketClosed { channel_id: Snowflake },
    RoleToggled { role_id: Snowflake, added: bool },
}

/// Final result of a giveaway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiveawayResult {
    pub prize: String,
    pub winner: Option<Snowflake>,
    pub entrants: usize,
}

#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    community_id: Snowflake,
    /// Channel the session renders into (for tickets, the ticket channel itself)
    channel_id: Snowflake,
    created_by: Snowflake,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    phase: SessionPhase,
    state: SessionState,
}

impl Session {
    pub fn new(
        id: SessionId,
        community_id: Snowflake,
        channel_id: Snowflake,
        created_by: Snowflake,
        state: SessionState,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            community_id,
            channel_id,
            created_by,
            created_at: now,
            closed_at: None,
            phase: SessionPhase::Open,
            state,
        }
    }

    /// Open -> Active, once the session is visible on the platform
    pub fn activate(&mut self) {
        if self.phase == SessionPhase::Open {
            self.phase = SessionPhase::Active;
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn community_id(&self) -> Snowflake {
        self.community_id
    }

    pub fn channel_id(&self) -> Snowflake {
        self.channel_id
    }

    pub fn created_by(&self) -> Snowflake {
        self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == SessionPhase::Terminal
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn kind(&self) -> SessionKind {
        match self.state {
            SessionState::Poll(_) => SessionKind::Poll,
            SessionState::Giveaway(_) => SessionKind::Giveaway,
            SessionState::Ticket(_) => SessionKind::Ticket,
            SessionState::RolePicker(_) => SessionKind::RolePicker,
        }
    }

    /// Single dispatch for every mutating operation
    pub fn apply(
        &mut self,
        actor: &Actor,
        action: SessionAction,
        now: DateTime<Utc>,
    ) -> Result<SessionOutcome, DomainError> {
        self.ensure_active()?;
        let unsupported = DomainError::UnsupportedAction {
            kind: self.kind().as_str(),
            action: action.as_str(),
        };

        match action {
            SessionAction::ToggleVote { option } => {
                let SessionState::Poll(poll) = &mut self.state else {
                    return Err(unsupported);
                };
                poll.toggle_vote(actor.user_id, &option)?;
                Ok(SessionOutcome::Tally {
                    options: poll.tally(),
                })
            }
            SessionAction::End => {
                let SessionState::Poll(poll) = &self.state else {
                    return Err(unsupported);
                };
                if !actor.is_moderator() {
                    return Err(DomainError::Forbidden("MANAGE_MESSAGES".into()));
                }
                let options = poll.tally();
                self.finish(now);
                Ok(SessionOutcome::PollEnded { options })
            }
            SessionAction::Enter => {
                let SessionState::Giveaway(giveaway) = &mut self.state else {
                    return Err(unsupported);
                };
                // Entries stay open until the conclusion runs, even past the deadline
                let joined = giveaway.enter(actor.user_id);
                Ok(SessionOutcome::Entry {
                    joined,
                    entrants: giveaway.entrant_count(),
                })
            }
            SessionAction::Close => {
                let channel_id = self.authorize_close(actor)?;
                self.finish(now);
                Ok(SessionOutcome::TicketClosed { channel_id })
            }
        }
    }

    /// Check a close request without changing state; returns the ticket channel
    pub fn authorize_close(&self, actor: &Actor) -> Result<Snowflake, DomainError> {
        self.ensure_active()?;
        match &self.state {
            SessionState::Ticket(ticket) if ticket.may_close(actor) => Ok(ticket.channel_id),
            SessionState::Ticket(_) => Err(DomainError::NotTicketOwner),
            _ => Err(DomainError::UnsupportedAction {
                kind: self.kind().as_str(),
                action: SessionAction::Close.as_str(),
            }),
        }
    }

    /// Check that a role picker is live and offers `role_id`. The toggle
    /// itself happens on the platform, so state is left unchanged.
    pub fn authorize_pick(&self, role_id: Snowflake) -> Result<(), DomainError> {
        self.ensure_active()?;
        match &self.state {
            SessionState::RolePicker(picker) if picker.offers(role_id) => Ok(()),
            SessionState::RolePicker(_) => Err(DomainError::UnknownOption(role_id.to_string())),
            _ => Err(DomainError::UnsupportedAction {
                kind: self.kind().as_str(),
                action: "pick_role",
            }),
        }
    }

    /// Conclude a giveaway. Succeeds once; later calls see `SessionClosed`.
    pub fn conclude<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<GiveawayResult, DomainError> {
        self.ensure_active()?;
        let result = match &self.state {
            SessionState::Giveaway(giveaway) => GiveawayResult {
                prize: giveaway.prize().to_string(),
                winner: giveaway.draw(rng),
                entrants: giveaway.entrant_count(),
            },
            _ => {
                return Err(DomainError::UnsupportedAction {
                    kind: self.kind().as_str(),
                    action: "conclude",
                })
            }
        };
        self.finish(now);
        Ok(result)
    }

    /// Due giveaways are the only sessions that end on their own
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match &self.state {
            SessionState::Giveaway(giveaway) => {
                self.phase == SessionPhase::Active && giveaway.is_due(now)
            }
            _ => false,
        }
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        match self.phase {
            SessionPhase::Active => Ok(()),
            // An unpublished session cannot be interacted with either
            SessionPhase::Open | SessionPhase::Terminal => Err(DomainError::SessionClosed),
        }
    }

    fn finish(&mut self, now: DateTime<Utc>) {
        self.phase = SessionPhase::Terminal;
        self.closed_at = Some(now);
    }
}
