//! # modbot-db
//!
//! Storage layer implementing the repository traits from `modbot-core`.
//!
//! ## Overview
//!
//! - Connection pool management and schema installation
//! - Database models with SQLx `FromRow` derives
//! - Model -> entity mappers
//! - PostgreSQL repositories (`Pg*Repository`)
//! - In-memory repositories (`InMemory*Repository`) with identical semantics,
//!   used by tests and local runs without a database
//!
//! ## Usage
//!
//! ```rust,ignore
//! use modbot_db::pool::{create_pool, install_schema, DatabaseConfig};
//! use modbot_db::PgActionRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from_env()).await?;
//!     install_schema(&pool).await?;
//!     let ledger = PgActionRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{
    InMemoryActionRepository, InMemoryExpiryRepository, InMemoryQuoteRepository,
    InMemorySettingsRepository,
};
pub use pool::{create_pool, create_pool_from_env, install_schema, DatabaseConfig, PgPool};
pub use repositories::{
    PgActionRepository, PgExpiryRepository, PgQuoteRepository, PgSettingsRepository,
};
