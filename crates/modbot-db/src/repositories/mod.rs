//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in modbot-core.

mod action;
mod error;
mod expiry;
mod quote;
mod settings;

pub use action::PgActionRepository;
pub use expiry::PgExpiryRepository;
pub use quote::PgQuoteRepository;
pub use settings::PgSettingsRepository;
