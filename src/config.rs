// src/config.rs

use std::{env, fmt, net::SocketAddr};

use dotenvy::dotenv;

use crate::services::ranking::RankingKind;

/// Default lifetime of a session token: one day.
pub const DEFAULT_JWT_EXPIRATION: u64 = 86_400;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub ranking: RankingKind,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

/// Raised when the environment cannot produce a usable `Config`.
#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has an invalid value: {}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let jwt_expiration = match env::var("JWT_EXPIRATION") {
            Ok(value) => value.parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "JWT_EXPIRATION",
                value,
            })?,
            Err(_) => DEFAULT_JWT_EXPIRATION,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid {
                key: "BIND_ADDR",
                value: bind_addr.clone(),
            })?;

        let ranking = match env::var("RANKING_STRATEGY") {
            Ok(value) => value.parse::<RankingKind>().map_err(|_| ConfigError::Invalid {
                key: "RANKING_STRATEGY",
                value,
            })?,
            Err(_) => RankingKind::default(),
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            ranking,
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}
