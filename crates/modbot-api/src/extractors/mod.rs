//! Axum extractors for request handling
//!
//! Dispatcher authentication, path parsing and validated JSON bodies.

mod dispatch;
mod path;
mod validated;

pub use dispatch::DispatchAuth;
pub use path::CommunityPath;
pub use validated::ValidatedJson;
