//! # modbot-platform
//!
//! REST adapter for the chat platform. Implements
//! [`modbot_core::PlatformClient`] on top of `reqwest`.
//!
//! Every request carries the bot token; requests that change moderation
//! state also carry an audit-log reason header. Non-2xx answers become
//! [`modbot_core::PlatformError`] with the HTTP status and the platform's
//! own error message. Nothing is retried.

mod client;
mod routes;
mod wire;

pub use client::{HttpPlatformClient, HttpPlatformConfig};
