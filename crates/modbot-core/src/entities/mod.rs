//! Domain entities - moderation records, quotes, expiries and sessions

mod action;
mod expiry;
mod giveaway;
mod poll;
mod quote;
mod role_picker;
mod session;
mod ticket;

pub use action::{ActionKind, ModerationAction, NewModerationAction, DEFAULT_REASON};
pub use expiry::{ExpiryKey, PendingExpiry};
pub use giveaway::Giveaway;
pub use poll::{OptionTally, Poll};
pub use quote::{NewQuote, Quote};
pub use role_picker::{PickerEntry, RolePicker};
pub use session::{
    GiveawayResult, Session, SessionAction, SessionId, SessionKind, SessionOutcome,
    SessionPhase, SessionState,
};
pub use ticket::Ticket;
