use sqlx::PgPool;
use storage::{dto::season::SeasonStanding, error::Result, services::season};

/// Season leaderboard over all finalized tournaments
pub async fn season_standings(pool: &PgPool) -> Result<Vec<SeasonStanding>> {
    season::load_season_standings(pool).await
}
