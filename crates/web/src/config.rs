use std::time::Duration;

use anyhow::{Context, Result};
use storage::services::scoring::RulesetVersion;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub api_keys: String,
    pub rapidapi_key: String,
    pub leaderboard_base_url: Option<String>,
    pub ruleset: RulesetVersion,
    pub finalize_interval: Duration,
    pub provider_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            rapidapi_key: std::env::var("RAPIDAPI_KEY").unwrap_or_default(),
            leaderboard_base_url: std::env::var("LEADERBOARD_BASE_URL").ok(),
            ruleset: match std::env::var("SCORING_RULESET") {
                Ok(value) => value.parse().map_err(anyhow::Error::msg)?,
                Err(_) => RulesetVersion::default(),
            },
            finalize_interval: Duration::from_secs(secs_from_env("FINALIZE_INTERVAL_SECS", 300)?),
            provider_timeout: Duration::from_secs(secs_from_env("PROVIDER_TIMEOUT_SECS", 15)?),
        })
    }
}

fn secs_from_env(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} must be a number of seconds", name)),
        Err(_) => Ok(default),
    }
}
