//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables once at startup and
//! handed to constructors as an immutable value. Numeric settings fall back to
//! their defaults when unset or unparsable.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Cache lifetimes, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// `max-age` for conversation lists
    pub convo_list_max_age: u32,
    /// `max-age` for a single conversation
    pub convo_max_age: u32,
    /// `max-age` for message lists
    pub message_list_max_age: u32,
    /// `max-age` for a single message
    pub message_max_age: u32,
    /// Server-side response cache time-to-live
    pub response_ttl: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            convo_list_max_age: 15,
            convo_max_age: 3600,
            message_list_max_age: 15,
            message_max_age: 3600,
            response_ttl: 3600,
        }
    }
}

/// Paging defaults for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingConfig {
    pub default_size: i32,
    pub default_index: i32,
    pub max_size: i32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_size: 10,
            default_index: 0,
            max_size: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL; the in-memory store is used when absent
    pub database_url: Option<String>,

    /// Base URI prefixed to every link the API emits
    pub base_uri: String,

    pub cache: CacheConfig,
    pub paging: PagingConfig,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            base_uri: String::new(),
            cache: CacheConfig::default(),
            paging: PagingConfig::default(),
            rust_log: "info,convos_conversations=debug,tower_http=debug".to_string(),
            port: 3000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Ok(Self::from_vars(|key| env::var(key).ok()))
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let cache = CacheConfig::default();
        let paging = PagingConfig::default();

        Self {
            database_url: var("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            base_uri: var("BASE_URI")
                .map(|uri| uri.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_uri),
            cache: CacheConfig {
                convo_list_max_age: parse_or(&var, "CONVO_LIST_MAX_AGE", cache.convo_list_max_age),
                convo_max_age: parse_or(&var, "CONVO_MAX_AGE", cache.convo_max_age),
                message_list_max_age: parse_or(
                    &var,
                    "MESSAGE_LIST_MAX_AGE",
                    cache.message_list_max_age,
                ),
                message_max_age: parse_or(&var, "MESSAGE_MAX_AGE", cache.message_max_age),
                response_ttl: parse_or(&var, "RESPONSE_CACHE_TTL", cache.response_ttl),
            },
            paging: PagingConfig {
                default_size: parse_or(&var, "DEFAULT_PAGE_SIZE", paging.default_size),
                default_index: parse_or(&var, "DEFAULT_PAGE_INDEX", paging.default_index),
                max_size: parse_or(&var, "MAX_PAGE_SIZE", paging.max_size),
            },
            rust_log: var("RUST_LOG").unwrap_or(defaults.rust_log),
            port: parse_or(&var, "PORT", defaults.port),
        }
    }
}

fn parse_or<F, T>(var: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    var(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
