//! Database models - SQLx-compatible structs for PostgreSQL tables

mod action;
mod expiry;
mod quote;
mod settings;

pub use action::ModerationActionModel;
pub use expiry::PendingExpiryModel;
pub use quote::QuoteModel;
pub use settings::CommunitySettingsModel;
