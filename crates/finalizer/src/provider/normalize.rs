use chrono::{DateTime, Utc};
use serde_json::Value;
use storage::models::PlayerStanding;
use tracing::debug;

use super::models::{LeaderboardResponse, LeaderboardRow, value_text};
use crate::error::ProviderError;

const DEFAULT_STATUS: &str = "active";

/// Canonical score to par.
///
/// Only string scores are understood: `"E"` is even par, `"+3"`, `"-5"` and
/// `"2"` are signed integers. Everything else (`"-"`, `"WD"`, numbers, nulls)
/// means the player has no valid score.
pub fn parse_score(total: Option<&Value>) -> Option<i32> {
    let Some(Value::String(raw)) = total else {
        return None;
    };

    let raw = raw.trim();
    if raw == "E" {
        return Some(0);
    }

    raw.strip_prefix('+').unwrap_or(raw).parse::<i32>().ok()
}

pub fn normalize_status(status: Option<&str>) -> String {
    status
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_STATUS)
        .to_lowercase()
}

pub fn to_standing(
    tournament_id: &str,
    row: &LeaderboardRow,
    fetched_at: DateTime<Utc>,
) -> Option<PlayerStanding> {
    let Some(player_id) = value_text(row.player_id.as_ref()) else {
        debug!("Skipping leaderboard row without playerId: {:?}", row);
        return None;
    };

    Some(PlayerStanding {
        tournament_id: tournament_id.to_string(),
        player_id,
        player_name: row.player_name(),
        position: value_text(row.position.as_ref()),
        score_text: value_text(row.total.as_ref()).unwrap_or_else(|| "-".to_string()),
        score_to_par: parse_score(row.total.as_ref()),
        status: normalize_status(row.status.as_deref()),
        fetched_at,
    })
}

/// Turn a raw `/leaderboard` body into snapshot rows for `tournament_id`.
pub fn parse_leaderboard(
    tournament_id: &str,
    body: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<PlayerStanding>, ProviderError> {
    let response: LeaderboardResponse = serde_json::from_str(body)?;
    let rows = response
        .leaderboard_rows
        .ok_or(ProviderError::MissingField("leaderboardRows"))?;

    Ok(rows
        .iter()
        .filter_map(|row| to_standing(tournament_id, row, fetched_at))
        .collect())
}
