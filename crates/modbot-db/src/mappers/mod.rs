//! Model -> entity mappers
//!
//! - `From<Model> for Entity` where every row maps cleanly
//! - `TryFrom<Model>` where a stored value may be unrecognised
//! - `*Insert` structs: prepare entity data for binding

mod action;
mod expiry;
mod quote;

pub use action::ActionInsert;
pub use expiry::ExpiryInsert;
pub use quote::QuoteInsert;
