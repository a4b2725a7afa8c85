use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A player eligible to be picked in one tier of one tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TierAssignment {
    pub tournament_id: String,
    pub tier_number: i16,
    pub player_id: String,
}
