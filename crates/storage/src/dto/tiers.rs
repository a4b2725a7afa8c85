use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TierPlayer {
    pub tier_number: i16,
    pub player_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TierRoster {
    #[validate(range(min = 1, max = 6, message = "tier_number must be between 1 and 6"))]
    pub tier_number: i16,
    #[validate(length(min = 1, message = "a tier needs at least one player"))]
    pub player_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetTiersRequest {
    #[validate(length(min = 1, max = 6, message = "between 1 and 6 tiers are required"), nested)]
    pub tiers: Vec<TierRoster>,
}
