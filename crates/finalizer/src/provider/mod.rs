mod client;
mod models;
mod normalize;

pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, LeaderboardClient, LeaderboardConfig};
pub use models::{LeaderboardResponse, LeaderboardRow};
pub use normalize::{normalize_status, parse_leaderboard, parse_score};

use storage::models::Tournament;

/// Identifies a tournament on the provider side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRef {
    pub org_id: String,
    pub tournament_id: String,
    pub year: String,
}

impl ProviderRef {
    pub fn query(&self) -> [(&'static str, &str); 3] {
        [
            ("orgId", self.org_id.as_str()),
            ("tournId", self.tournament_id.as_str()),
            ("year", self.year.as_str()),
        ]
    }
}

impl From<&Tournament> for ProviderRef {
    fn from(tournament: &Tournament) -> Self {
        Self {
            org_id: tournament.org_id.clone(),
            tournament_id: tournament.provider_tournament_id.clone(),
            year: tournament.season_year.to_string(),
        }
    }
}
