//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, DispatchConfig, Environment,
    ModerationConfig, PlatformConfig, ServerConfig, SessionConfig, SnowflakeConfig,
};
