//! Process configuration, read once from the environment at startup.

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;

use crate::{db::DbConfig, mail::MailConfig, secret::DeleteSecret};

/// Local frontend dev server (Vite) origins allowed when nothing is configured.
const DEV_ORIGINS: &[&str] = &["http://localhost:5173", "http://127.0.0.1:5173"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub database: DbConfig,
    pub upload_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    pub mail: MailConfig,
    pub delete_secret: Option<DeleteSecret>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_env("PORT", 5000)?,
            database: DbConfig {
                max_connections: parse_env("DB_POOL_MAX", 5)?,
                connect_timeout_secs: parse_env("DB_CONNECT_TIMEOUT", 10)?,
                busy_timeout_secs: parse_env("DB_BUSY_TIMEOUT", 5)?,
                ..DbConfig::default()
            },
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            allowed_origins: allowed_origins_from_env(),
            mail: MailConfig {
                smtp_port: parse_env("SMTP_PORT", 465)?,
                timeout: Duration::from_secs(parse_env("MAIL_TIMEOUT_SECS", 10)?),
                ..MailConfig::default()
            },
            delete_secret: DeleteSecret::from_env(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Invalid {
            key: "HOST",
            value: raw,
        })
    }
}

/// Unset means `default`; set but unparsable is an error rather than a silent fallback.
fn parse_env<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

/// ALLOWED_ORIGINS (comma-separated) wins; otherwise FRONTEND_URL plus the
/// local dev origins.
fn allowed_origins_from_env() -> Vec<String> {
    let explicit = std::env::var("ALLOWED_ORIGINS").ok().map(|s| split_origins(&s));
    if let Some(origins) = explicit.filter(|o| !o.is_empty()) {
        return origins;
    }

    let mut origins: Vec<String> = DEV_ORIGINS.iter().map(|s| s.to_string()).collect();
    if let Ok(frontend) = std::env::var("FRONTEND_URL") {
        let frontend = frontend.trim().trim_end_matches('/').to_string();
        if !frontend.is_empty() && !origins.contains(&frontend) {
            origins.push(frontend);
        }
    }
    origins
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
