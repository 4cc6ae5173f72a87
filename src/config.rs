use chrono::FixedOffset;
use chrono_tz::Tz;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::{PageLimits, Zone};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} and {1} are mutually exclusive")]
    Conflict(&'static str, &'static str),
}

/// Ranking query settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingConfig {
    /// Zone for DAILY/WEEKLY boundaries
    pub zone: Zone,
    pub limits: PageLimits,
    pub ledger_max_retries: u8,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            zone: Zone::Local,
            limits: PageLimits::default(),
            ledger_max_retries: 3,
        }
    }
}

impl RankingConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any `name -> value` source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let limits = PageLimits {
            default_page_size: parse_or(&lookup, "RANKING_DEFAULT_PAGE_SIZE", defaults.limits.default_page_size)?,
            max_page_size: parse_or(&lookup, "RANKING_MAX_PAGE_SIZE", defaults.limits.max_page_size)?,
        };
        if limits.default_page_size > limits.max_page_size {
            return Err(ConfigError::Invalid {
                name: "RANKING_DEFAULT_PAGE_SIZE",
                value: limits.default_page_size.to_string(),
            });
        }

        let time_zone: Option<Tz> = optional(&lookup, "RANKING_TIME_ZONE")?;
        let utc_offset: Option<FixedOffset> = optional(&lookup, "RANKING_UTC_OFFSET")?;
        let zone = match (time_zone, utc_offset) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Conflict("RANKING_TIME_ZONE", "RANKING_UTC_OFFSET"))
            }
            (Some(tz), None) => Zone::Named(tz),
            (None, Some(offset)) => Zone::Fixed(offset),
            (None, None) => Zone::Local,
        };

        Ok(Self {
            zone,
            limits,
            ledger_max_retries: parse_or(&lookup, "LEDGER_MAX_RETRIES", defaults.ledger_max_retries)?,
        })
    }
}

/// Process configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub ranking: RankingConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        // JWT_SECRET, falling back to SECRET_KEY
        let jwt_secret = lookup("JWT_SECRET")
            .or_else(|| lookup("SECRET_KEY"))
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            database_url,
            jwt_secret,
            port: parse_or(&lookup, "PORT", 3000)?,
            ranking: RankingConfig::from_lookup(&lookup)?,
        })
    }
}

fn optional<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
        _ => Ok(None),
    }
}

fn parse_or<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    Ok(optional(lookup, name)?.unwrap_or(default))
}
