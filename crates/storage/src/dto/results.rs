use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::{PickResult, PlayerStanding, Tournament, TournamentScore};

/// One cell of the past-results grid
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PickResultView {
    pub username: String,
    pub display_name: String,
    pub tier_number: i16,
    pub player_id: String,
    pub player_name: String,
    pub player_score: String,
    pub tier_winner: bool,
    pub missed_cut: bool,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TournamentResultsResponse {
    pub tournament: Tournament,
    pub picks: Vec<PickResultView>,
    pub scores: Vec<TournamentScore>,
}

/// Unofficial scores computed from the live leaderboard
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LiveResultsResponse {
    pub tournament_id: String,
    /// False before the start time, when picks and scores are withheld
    pub revealed: bool,
    pub standings: Vec<PlayerStanding>,
    pub picks: Vec<PickResult>,
    pub scores: Vec<TournamentScore>,
    /// Picks left out because they do not match the tier assignments
    pub skipped: Vec<String>,
}
