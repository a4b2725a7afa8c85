use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Tournament {
    pub tournament_id: String,
    pub name: String,
    pub start_time: DateTime<Utc>,
    /// Provider organisation id (1 = PGA Tour)
    pub org_id: String,
    pub provider_tournament_id: String,
    pub season_year: i32,
    pub is_finalized: bool,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Picks are locked from the start time onwards.
    pub fn picks_locked(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_time
    }

    pub fn finalization_due_at(&self, window: TimeDelta) -> DateTime<Utc> {
        self.start_time + window
    }

    pub fn is_due_for_finalization(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        !self.is_finalized && now >= self.finalization_due_at(window)
    }
}
