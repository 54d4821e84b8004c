//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use modbot_core::Snowflake;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub dispatch: DispatchConfig,
    pub platform: PlatformConfig,
    pub moderation: ModerationConfig,
    pub sessions: SessionConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" | "prod" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" | "dev" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Command ingress bind address
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Shared secret the external command dispatcher presents as a bearer token
#[derive(Clone)]
pub struct DispatchConfig {
    pub token: String,
}

impl std::fmt::Debug for DispatchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchConfig").field("token", &"<redacted>").finish()
    }
}

/// Platform REST API access
#[derive(Clone)]
pub struct PlatformConfig {
    pub api_url: String,
    pub token: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Moderation behaviour knobs
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// The bot's own user id; always granted access to ticket channels
    pub bot_user_id: Snowflake,
    /// Optional staff role granted access to ticket channels
    pub staff_role_id: Option<Snowflake>,
    pub mute_role_name: String,
}

/// Interactive session housekeeping
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long terminal sessions stay around as tombstones
    pub retention: Duration,
    /// How often the sweep prunes tombstones and concludes overdue giveaways
    pub sweep_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct SnowflakeConfig {
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "modbot".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_platform_url() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_platform_timeout_secs() -> u64 {
    10
}

fn default_mute_role_name() -> String {
    "Muted".to_string()
}

fn default_retention_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        Ok(Self {
            app: AppSettings {
                name: vars.get("APP_NAME").unwrap_or_else(default_app_name),
                env: vars
                    .get("ENVIRONMENT")
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            server: ServerConfig {
                host: vars.get("SERVER_HOST").unwrap_or_else(default_host),
                port: vars.parse("SERVER_PORT")?.unwrap_or_else(default_port),
            },
            database: DatabaseConfig {
                url: vars.require("DATABASE_URL")?,
                max_connections: vars
                    .parse("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: vars
                    .parse("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
            },
            dispatch: DispatchConfig {
                token: vars.require("DISPATCH_TOKEN")?,
            },
            platform: PlatformConfig {
                api_url: vars
                    .get("PLATFORM_API_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(default_platform_url),
                token: vars.require("PLATFORM_TOKEN")?,
                timeout: Duration::from_secs(
                    vars.parse("PLATFORM_TIMEOUT_SECS")?
                        .unwrap_or_else(default_platform_timeout_secs),
                ),
            },
            moderation: ModerationConfig {
                bot_user_id: vars
                    .parse("BOT_USER_ID")?
                    .ok_or(ConfigError::MissingVar("BOT_USER_ID"))?,
                staff_role_id: vars.parse("TICKET_STAFF_ROLE_ID")?,
                mute_role_name: vars
                    .get("MUTE_ROLE_NAME")
                    .unwrap_or_else(default_mute_role_name),
            },
            sessions: SessionConfig {
                retention: Duration::from_secs(
                    vars.parse("SESSION_RETENTION_SECS")?
                        .unwrap_or_else(default_retention_secs),
                ),
                sweep_interval: Duration::from_secs(
                    vars.parse("SESSION_SWEEP_INTERVAL_SECS")?
                        .unwrap_or_else(default_sweep_interval_secs),
                ),
            },
            snowflake: SnowflakeConfig {
                worker_id: vars.parse("WORKER_ID")?.unwrap_or(0),
            },
        })
    }
}

/// Typed access over a variable lookup; blank values count as unset
struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn require(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::MissingVar(key))
    }

    fn parse<T: FromStr>(&self, key: &'static str) -> Result<Option<T>, ConfigError> {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| ConfigError::InvalidValue(key, raw))
            })
            .transpose()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
