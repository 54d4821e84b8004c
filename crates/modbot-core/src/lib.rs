//! # modbot-core
//!
//! Domain layer for the moderation bot: ledger records, quotes, pending
//! expiries, interactive session state machines, and the ports the
//! infrastructure crates implement.
//! This crate has zero dependencies on infrastructure (database, HTTP, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    ActionKind, ExpiryKey, Giveaway, GiveawayResult, ModerationAction, NewModerationAction,
    NewQuote, OptionTally, PendingExpiry, PickerEntry, Poll, Quote, RolePicker, Session,
    SessionAction, SessionId, SessionKind, SessionOutcome, SessionPhase, SessionState, Ticket,
    DEFAULT_REASON,
};
pub use error::DomainError;
pub use events::{Notification, Severity};
pub use traits::{
    ActionRepository, ChannelHandle, ChannelSpec, Embed, EmbedFooter, EnsuredRole,
    ExpiryRepository, NotificationSink, OutgoingMessage, OverwriteTarget, PermissionOverwrite,
    PlatformClient, PlatformError, PlatformResult, QuoteRepository, RepoResult, RoleHandle,
    SettingsRepository,
};
pub use value_objects::{Actor, Permissions, Snowflake, SnowflakeGenerator, SnowflakeParseError};
