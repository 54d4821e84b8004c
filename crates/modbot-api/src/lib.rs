//! # modbot-api
//!
//! HTTP ingress for dispatched commands, built with Axum.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run, spawn_session_sweep};
pub use state::AppState;
