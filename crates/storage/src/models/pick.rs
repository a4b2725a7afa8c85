use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One user's choice for one tier of one tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Pick {
    pub username: String,
    pub tournament_id: String,
    pub tier_number: i16,
    pub player_id: String,
    pub picked_at: DateTime<Utc>,
}
