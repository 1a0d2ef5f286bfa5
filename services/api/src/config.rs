//! services/api/src/config.rs
//!
//! Defines the service configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use recruit_core::assessment::{AssessmentConfig, DEFAULT_PASS_PERCENT, DEFAULT_TIME_LIMIT_SECS};
use recruit_core::wizard::GatingPolicy;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

pub const DEFAULT_NOTIFY_ENDPOINT: &str = "http://localhost:8787/api/send-email";
pub const DEFAULT_MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub questions_path: Option<PathBuf>,
    pub notify_endpoint: String,
    pub assessment: AssessmentConfig,
    pub gating_policy: GatingPolicy,
    pub cors_origin: String,
    pub max_resume_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Wizard and Quiz Settings ---
        let questions_path = lookup("QUESTIONS_PATH").map(PathBuf::from);
        let notify_endpoint =
            lookup("NOTIFY_ENDPOINT").unwrap_or_else(|| DEFAULT_NOTIFY_ENDPOINT.to_string());

        let time_limit_secs = parse_or("QUIZ_TIME_LIMIT_SECS", &lookup, DEFAULT_TIME_LIMIT_SECS)?;
        if time_limit_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "QUIZ_TIME_LIMIT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let pass_percent = parse_or("QUIZ_PASS_PERCENT", &lookup, DEFAULT_PASS_PERCENT)?;
        if pass_percent > 100 {
            return Err(ConfigError::InvalidValue(
                "QUIZ_PASS_PERCENT".to_string(),
                format!("{} is above 100", pass_percent),
            ));
        }

        let gating_policy = match lookup("WIZARD_GATING") {
            Some(value) => value
                .parse::<GatingPolicy>()
                .map_err(|e| ConfigError::InvalidValue("WIZARD_GATING".to_string(), e))?,
            None => GatingPolicy::default(),
        };

        let max_resume_bytes =
            parse_or("MAX_RESUME_BYTES", &lookup, DEFAULT_MAX_RESUME_BYTES)?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            questions_path,
            notify_endpoint,
            assessment: AssessmentConfig {
                time_limit_secs,
                pass_percent,
            },
            gating_policy,
            cors_origin,
            max_resume_bytes,
        })
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
