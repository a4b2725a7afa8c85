use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

pub const MISSED_CUT_STATUS: &str = "cut";

/// Cached leaderboard row for one player in one tournament.
///
/// `score_to_par` is `None` when the provider had no usable score (not started,
/// withdrawn before teeing off, unparseable text). Such rows never win a tier and
/// never contribute to a team total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PlayerStanding {
    pub tournament_id: String,
    pub player_id: String,
    pub player_name: String,
    pub position: Option<String>,
    /// Score as shown by the provider, e.g. `-5`, `E`, `+2`
    pub score_text: String,
    pub score_to_par: Option<i32>,
    /// Lower-cased provider status
    pub status: String,
    pub fetched_at: DateTime<Utc>,
}

impl PlayerStanding {
    pub fn missed_cut(&self) -> bool {
        self.status == MISSED_CUT_STATUS
    }
}
