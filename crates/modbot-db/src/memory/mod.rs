//! In-memory repositories
//!
//! Same contracts as the PostgreSQL repositories, backed by
//! `parking_lot::Mutex`-guarded collections. Each mutating call holds the
//! lock for its whole read-validate-write sequence, which gives the same
//! per-call atomicity the SQL implementations get from transactions.

mod action;
mod expiry;
mod quote;
mod settings;

pub use action::InMemoryActionRepository;
pub use expiry::InMemoryExpiryRepository;
pub use quote::InMemoryQuoteRepository;
pub use settings::InMemorySettingsRepository;
