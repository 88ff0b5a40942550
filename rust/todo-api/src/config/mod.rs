//! Configuration management for the task scheduler.
//!
//! Configuration is loaded from, in increasing priority:
//! 1. Built-in defaults
//! 2. An optional config file (`config/todo-api.{toml,yaml,json}` or `--config`)
//! 3. `TODO__SECTION__KEY` environment variables (e.g. `TODO__SERVER__PORT`)
//! 4. The short variables `TODO_PORT`, `TODO_DBFILE`, `TODO_PASSWORD`, `TODO_JWT_SECRET`
//!
//! A `.env` file in the working directory is read first, so any of the
//! variables above may live there.
//!
//! # Validation
//!
//! [`AppConfig::load`] runs [`ConfigValidator`] before returning, and
//! reports every failed rule at once:
//!
//! ```rust,ignore
//! use todo_api::config::AppConfig;
//!
//! let config = AppConfig::load(Some("todo.toml"))?;
//! println!("listening on {}", config.bind_address());
//! ```

pub mod error;
pub mod validator;

pub use error::{ConfigResult, ConfigurationError};
pub use validator::ConfigValidator;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Default config file, looked up relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config/todo-api";

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Sign-in and token configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Task store configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Task listing configuration.
    #[serde(default)]
    pub tasks: TasksConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration and validate it.
    ///
    /// `file` overrides the default config file location.
    pub fn load(file: Option<&str>) -> anyhow::Result<Self> {
        let config = Self::load_unchecked(file)?;

        ConfigValidator::validate(&config)
            .map_err(|e| anyhow::anyhow!("Configuration validation failed:\n\n{e}"))?;

        Ok(config)
    }

    fn load_unchecked(file: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let file_source = match file {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = config::Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("server.timeout_secs", 30)?
            .set_default("server.web_dir", "web")?
            .set_default("auth.token_ttl_hours", 8)?
            .set_default("database.driver", DatabaseDriver::Sqlite.to_string())?
            .set_default("database.path", "scheduler.db")?
            .set_default("tasks.page_size", 50)?
            .set_default("logging.level", default_log_level())?
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix("TODO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to assemble configuration sources")?;

        let mut app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to parse configuration")?;

        app_config.apply_env_overrides()?;

        Ok(app_config)
    }

    /// Apply the short single-purpose environment variables.
    fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(port) = std::env::var("TODO_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("TODO_PORT is not a valid port: '{port}'"))?;
        }
        if let Ok(path) = std::env::var("TODO_DBFILE") {
            if !path.is_empty() {
                self.database.path = PathBuf::from(path);
            }
        }
        if let Ok(password) = std::env::var("TODO_PASSWORD") {
            self.auth.password = Some(password);
        }
        if let Ok(secret) = std::env::var("TODO_JWT_SECRET") {
            self.auth.jwt_secret = Some(secret);
        }
        Ok(())
    }

    /// Socket address string the server binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Listening port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Directory of static front-end files served at `/`.
    #[serde(default = "default_web_dir")]
    pub web_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7540
}

fn default_timeout() -> u64 {
    30
}

fn default_web_dir() -> PathBuf {
    PathBuf::from("web")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout(),
            web_dir: default_web_dir(),
        }
    }
}

/// Sign-in configuration.
///
/// Authentication is enabled only when a non-empty password is set.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared sign-in password.
    pub password: Option<String>,
    /// HMAC secret for session tokens; generated per process when unset.
    pub jwt_secret: Option<String>,
    /// Session token lifetime in hours.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,
}

fn default_token_ttl() -> u64 {
    8
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password: None,
            jwt_secret: None,
            token_ttl_hours: default_token_ttl(),
        }
    }
}

impl AuthConfig {
    /// The configured password, if sign-in is enabled.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Whether task endpoints require a session token.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.password().is_some()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

/// Task store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseDriver {
    /// `SQLite` file on disk.
    Sqlite,
    /// Process-local map; contents are lost on exit.
    Memory,
}

impl fmt::Display for DatabaseDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for DatabaseDriver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(format!("unknown database driver: {other}")),
        }
    }
}

/// Task store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Backend name: `sqlite` or `memory`.
    #[serde(default = "default_driver")]
    pub driver: String,
    /// `SQLite` database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_driver() -> String {
    DatabaseDriver::Sqlite.to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("scheduler.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    /// Parsed backend kind.
    pub fn driver(&self) -> Result<DatabaseDriver, String> {
        self.driver.parse()
    }
}

/// Task listing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Maximum number of tasks returned by one listing.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    50
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to emit JSON lines.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
