//! Ports - the interfaces the domain needs from infrastructure

mod notifier;
mod platform;
mod repositories;

pub use notifier::NotificationSink;
pub use platform::{
    ChannelHandle, ChannelSpec, Embed, EmbedFooter, EnsuredRole, OutgoingMessage,
    OverwriteTarget, PermissionOverwrite, PlatformClient, PlatformError, PlatformResult,
    RoleHandle,
};
pub use repositories::{
    ActionRepository, ExpiryRepository, QuoteRepository, RepoResult, SettingsRepository,
};
