//! # Unified Application Configuration
//!
//! This module provides a centralized configuration system that consolidates
//! all application settings into a single, structured configuration object.
//! Values are read from environment variables (optionally seeded from a `.env`
//! file by the binary) and validated before the bot connects anywhere.

use crate::errors::{AppError, AppResult};
use crate::observability_config::ObservabilityConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Bot-specific configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Telegram bot token
    pub token: String,
    /// HTTP client timeout in seconds
    pub http_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            http_timeout_secs: 30,
        }
    }
}

impl BotConfig {
    /// Validate bot configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.token.trim().is_empty() {
            return Err(AppError::Config("Bot token cannot be empty".to_string()));
        }

        let parts: Vec<&str> = self.token.split(':').collect();
        if parts.len() != 2 {
            return Err(AppError::Config(
                "Bot token format is invalid. Expected format: 'bot_id:bot_token'".to_string(),
            ));
        }

        if parts[0].parse::<u64>().is_err() {
            return Err(AppError::Config(
                "Bot token bot ID must be numeric".to_string(),
            ));
        }

        if parts[1].len() < 20 {
            return Err(AppError::Config(
                "Bot token appears to be too short. Please verify it's a valid token".to_string(),
            ));
        }

        if self.http_timeout_secs == 0 || self.http_timeout_secs > 300 {
            return Err(AppError::Config(
                "HTTP timeout must be between 1 and 300 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

/// Database configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
        }
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.url.trim().is_empty() {
            return Err(AppError::Config("Database URL cannot be empty".to_string()));
        }

        let Some((scheme, connection_part)) = self.url.split_once("://") else {
            return Err(AppError::Config(
                "Database URL format is invalid".to_string(),
            ));
        };

        if scheme != "postgresql" && scheme != "postgres" {
            return Err(AppError::Config(
                "Database URL must start with 'postgresql://' or 'postgres://'".to_string(),
            ));
        }

        if !connection_part.contains('@') {
            return Err(AppError::Config(
                "Database URL must contain authentication information".to_string(),
            ));
        }

        if self.max_connections == 0 || self.max_connections > 100 {
            return Err(AppError::Config(
                "Max connections must be between 1 and 100".to_string(),
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(AppError::Config(
                "Min connections cannot be greater than max connections".to_string(),
            ));
        }

        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 300 {
            return Err(AppError::Config(
                "Connect timeout must be between 1 and 300 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

/// Server configuration for health checks and metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Metrics and health endpoint port
    pub metrics_port: u16,
    /// Whether to allow privileged ports (< 1024)
    pub allow_privileged_ports: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            metrics_port: 9090,
            allow_privileged_ports: false,
        }
    }
}

impl ServerConfig {
    /// Validate server configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.metrics_port == 0 {
            return Err(AppError::Config("Metrics port cannot be 0".to_string()));
        }

        if !self.allow_privileged_ports && self.metrics_port < 1024 {
            return Err(AppError::Config(format!(
                "Metrics port {} is privileged. Set allow_privileged_ports=true or use port >= 1024",
                self.metrics_port
            )));
        }

        Ok(())
    }
}

/// Quiz and dictionary behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Seed dictionary imported into the shared dictionary
    pub seed_dictionary_path: Option<String>,
    /// External id of the user that owns the shared dictionary
    pub seed_user_id: i64,
    /// Failed attempts before the round is abandoned
    pub max_attempts: u32,
    /// Idle quiz sessions are evicted after this many seconds
    pub session_idle_timeout_secs: u64,
    /// Pending add/delete continuations expire after this many seconds
    pub continuation_timeout_secs: u64,
    /// Sticker file ids sent after a correct answer
    pub success_stickers: Vec<String>,
    /// Sticker file ids sent after a wrong answer
    pub failure_stickers: Vec<String>,
}

/// Upper bound for session and continuation timeouts (one week)
pub const MAX_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            seed_dictionary_path: None,
            seed_user_id: 0,
            max_attempts: 3,
            session_idle_timeout_secs: 3600,
            continuation_timeout_secs: 300,
            success_stickers: Vec::new(),
            failure_stickers: Vec::new(),
        }
    }
}

impl QuizConfig {
    /// Validate quiz configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err(AppError::Config(
                "Max attempts must be between 1 and 10".to_string(),
            ));
        }

        if self.session_idle_timeout_secs == 0 || self.session_idle_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(AppError::Config(format!(
                "Session idle timeout must be between 1 and {} seconds",
                MAX_TIMEOUT_SECS
            )));
        }

        if self.continuation_timeout_secs == 0 || self.continuation_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(AppError::Config(format!(
                "Continuation timeout must be between 1 and {} seconds",
                MAX_TIMEOUT_SECS
            )));
        }

        if let Some(path) = &self.seed_dictionary_path {
            if path.trim().is_empty() {
                return Err(AppError::Config(
                    "Seed dictionary path cannot be blank".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// How long an add/delete continuation stays open, clamped to the allowed range
    pub fn continuation_timeout(&self) -> chrono::Duration {
        let secs = self.continuation_timeout_secs.clamp(1, MAX_TIMEOUT_SECS);
        chrono::Duration::seconds(secs as i64)
    }
}

/// Unified application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Bot configuration
    pub bot: BotConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Server configuration
    pub server: ServerConfig,
    /// Quiz configuration
    pub quiz: QuizConfig,
    /// Observability configuration
    pub observability: ObservabilityConfig,
}

/// Read an optional variable, falling back to `default` when unset
fn env_or<T: FromStr>(key: &str, default: &str) -> AppResult<T> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} must be a valid number", key)))
}

/// Split a comma-separated list, dropping blank entries
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        config.bot.token = env::var("TELEGRAM_BOT_TOKEN").map_err(|_| {
            AppError::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
        })?;
        config.bot.http_timeout_secs = env_or("HTTP_CLIENT_TIMEOUT_SECS", "30")?;

        config.database.url = env::var("DATABASE_URL").map_err(|_| {
            AppError::Config("DATABASE_URL environment variable is required".to_string())
        })?;
        config.database.max_connections = env_or("DATABASE_MAX_CONNECTIONS", "10")?;
        config.database.min_connections = env_or("DATABASE_MIN_CONNECTIONS", "1")?;
        config.database.connect_timeout_secs = env_or("DATABASE_CONNECT_TIMEOUT_SECS", "30")?;

        config.server.metrics_port = env_or("METRICS_PORT", "9090")?;
        config.server.allow_privileged_ports = env::var("ALLOW_PRIVILEGED_PORTS")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        config.quiz.seed_dictionary_path = env::var("SEED_DICTIONARY_PATH").ok();
        config.quiz.seed_user_id = env_or("SEED_USER_ID", "0")?;
        config.quiz.max_attempts = env_or("QUIZ_MAX_ATTEMPTS", "3")?;
        config.quiz.session_idle_timeout_secs = env_or("SESSION_IDLE_TIMEOUT_SECS", "3600")?;
        config.quiz.continuation_timeout_secs = env_or("CONTINUATION_TIMEOUT_SECS", "300")?;
        config.quiz.success_stickers =
            parse_list(&env::var("QUIZ_SUCCESS_STICKERS").unwrap_or_default());
        config.quiz.failure_stickers =
            parse_list(&env::var("QUIZ_FAILURE_STICKERS").unwrap_or_default());

        config.observability = ObservabilityConfig::from_env();
        config.observability.metrics_port = config.server.metrics_port;

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        self.bot.validate()?;
        self.database.validate()?;
        self.server.validate()?;
        self.quiz.validate()?;
        self.observability
            .validate()
            .map_err(AppError::Config)?;
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: bot_token=[REDACTED], db_url=[REDACTED], metrics_port={}, seed_dictionary={}, max_attempts={}, environment={}",
            self.server.metrics_port,
            self.quiz.seed_dictionary_path.as_deref().unwrap_or("none"),
            self.quiz.max_attempts,
            self.observability.environment
        )
    }
}
