use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use storage::models::{PlayerStanding, Tournament};
use tracing::{debug, info};

use super::ProviderRef;
use super::normalize::parse_leaderboard;
use crate::error::ProviderError;
use crate::traits::LeaderboardProvider;

pub const DEFAULT_BASE_URL: &str = "https://live-golf-data.p.rapidapi.com";
pub const DEFAULT_HOST: &str = "live-golf-data.p.rapidapi.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct LeaderboardConfig {
    pub api_key: String,
    pub base_url: String,
    pub host: String,
    pub timeout: Duration,
}

impl LeaderboardConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for the live golf data leaderboard API
pub struct LeaderboardClient {
    config: LeaderboardConfig,
    client: reqwest::Client,
}

impl LeaderboardClient {
    pub fn new(config: LeaderboardConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pickem-finalizer/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(ProviderError::RequestError)?;

        Ok(Self { config, client })
    }

    pub async fn fetch_leaderboard_body(&self, reference: &ProviderRef) -> Result<String, ProviderError> {
        let url = format!("{}/leaderboard", self.config.base_url);
        debug!(
            "GET {} orgId={} tournId={} year={}",
            url, reference.org_id, reference.tournament_id, reference.year
        );

        let response = self
            .client
            .get(&url)
            .header("x-rapidapi-key", &self.config.api_key)
            .header("x-rapidapi-host", &self.config.host)
            .query(&reference.query())
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_request_error(e))?;

        if !status.is_success() {
            return Err(ProviderError::StatusError {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(body)
    }

    fn map_request_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout(self.config.timeout.as_secs())
        } else {
            ProviderError::RequestError(error)
        }
    }
}

#[async_trait]
impl LeaderboardProvider for LeaderboardClient {
    async fn fetch(&self, tournament: &Tournament) -> Result<Vec<PlayerStanding>, ProviderError> {
        let reference = ProviderRef::from(tournament);
        let body = self.fetch_leaderboard_body(&reference).await?;
        let standings = parse_leaderboard(&tournament.tournament_id, &body, Utc::now())?;

        info!(
            "Fetched {} leaderboard rows for {}",
            standings.len(),
            tournament.tournament_id
        );

        Ok(standings)
    }
}
