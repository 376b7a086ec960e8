use std::env;
use std::str::FromStr;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::admin::{EntityKind, parse_entity_list};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackend {
    MySql,
    Memory,
}

/// Everything the application needs at startup. Built once and handed to
/// the server; nothing reads the environment after this.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    /// Entity kinds exposed through the admin registry.
    pub admin_entities: Vec<EntityKind>,
    pub log_dir: String,
    pub bootstrap_admin: Option<(String, String)>,
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let storage = parsed("STORAGE_BACKEND", StorageBackend::MySql)?;
        let database_url = var("DATABASE_URL");
        if storage == StorageBackend::MySql && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let admin_entities = match var("ADMIN_ENTITIES") {
            Some(raw) => parse_entity_list(&raw).map_err(|reason| ConfigError::Invalid {
                key: "ADMIN_ENTITIES",
                reason,
            })?,
            None => EntityKind::iter().collect(),
        };

        let bootstrap_admin = match (var("BOOTSTRAP_ADMIN_EMAIL"), var("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some((email, password)),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "BOOTSTRAP_ADMIN_EMAIL",
                    reason: "email and password must be set together".into(),
                });
            }
        };

        Ok(Self {
            server_addr: var("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            storage,
            database_url,
            jwt_secret: var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            access_token_ttl: parsed("ACCESS_TOKEN_TTL", 900)?, // default 15 min
            rate_login_per_min: parsed("RATE_LOGIN_PER_MIN", 60)?,
            rate_protected_per_min: parsed("RATE_PROTECTED_PER_MIN", 1000)?,
            api_prefix: var("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            admin_entities,
            log_dir: var("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            bootstrap_admin,
        })
    }

    /// In-memory configuration with every entity registered.
    pub fn for_memory(jwt_secret: &str) -> Self {
        Self {
            server_addr: "127.0.0.1:8080".to_string(),
            storage: StorageBackend::Memory,
            database_url: None,
            jwt_secret: jwt_secret.to_string(),
            access_token_ttl: 900,
            rate_login_per_min: 600,
            rate_protected_per_min: 6000,
            api_prefix: "/api".to_string(),
            admin_entities: EntityKind::iter().collect(),
            log_dir: "logs".to_string(),
            bootstrap_admin: None,
        }
    }
}
