use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Pick;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct PickSelection {
    #[validate(range(min = 1, max = 6, message = "tier_number must be between 1 and 6"))]
    pub tier_number: i16,
    #[validate(length(min = 1, message = "player_id is required"))]
    pub player_id: String,
}

/// Full set of picks for one user, one per tier
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitPicksRequest {
    #[validate(length(min = 1, max = 64, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, max = 6, message = "between 1 and 6 picks are required"), nested)]
    pub picks: Vec<PickSelection>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PicksResponse {
    pub tournament_id: String,
    /// False while the tournament has not started and other users' picks are hidden
    pub revealed: bool,
    pub picks: Vec<Pick>,
}
