use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SeasonStanding {
    pub rank: i64,
    pub username: String,
    pub display_name: String,
    pub total_points: i64,
    pub tournaments_scored: i64,
}
