use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Scored outcome of a single pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PickResult {
    pub pick_score_id: String,
    pub tournament_id: String,
    pub username: String,
    pub tier_number: i16,
    pub player_id: String,
    pub player_score: String,
    pub tier_winner: bool,
    pub missed_cut: bool,
    pub points: i32,
}

// Escapes the key separator so distinct field tuples never share a key.
fn key_part(field: &str) -> String {
    field.replace('%', "%25").replace('_', "%5F")
}

impl PickResult {
    pub fn key(tournament_id: &str, username: &str, tier_number: i16) -> String {
        format!("{}_{}_{}", key_part(tournament_id), key_part(username), tier_number)
    }
}

/// A user's total for one tournament: pick points plus the team bonus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TournamentScore {
    pub tournament_score_id: String,
    pub tournament_id: String,
    pub username: String,
    pub team_total: Option<i32>,
    pub team_bonus: bool,
    pub points: i32,
}

impl TournamentScore {
    pub fn key(tournament_id: &str, username: &str) -> String {
        format!("{}_{}", key_part(tournament_id), key_part(username))
    }
}
