//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! the dispatch token, and the database pool used by the readiness probe.

use std::sync::Arc;

use modbot_db::PgPool;
use modbot_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service context containing all dependencies
    service_context: Arc<ServiceContext>,
    /// Bearer token the command dispatcher must present
    dispatch_token: Arc<str>,
    /// Absent when the stores are in memory
    pool: Option<PgPool>,
}

impl AppState {
    pub fn new(service_context: ServiceContext, dispatch_token: impl Into<Arc<str>>) -> Self {
        Self {
            service_context: Arc::new(service_context),
            dispatch_token: dispatch_token.into(),
            pool: None,
        }
    }

    /// Attach the pool the readiness probe pings
    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn dispatch_token(&self) -> &str {
        &self.dispatch_token
    }

    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("dispatch_token", &"<redacted>")
            .field("pool", &self.pool.is_some())
            .finish()
    }
}
