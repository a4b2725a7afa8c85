use sqlx::{PgPool, QueryBuilder};

use crate::error::Result;
use crate::models::PlayerStanding;

/// Leaderboard snapshot cache. Rows are only ever inserted, never updated.
pub struct StandingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StandingsRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_tournament(&self, tournament_id: &str) -> Result<Vec<PlayerStanding>> {
        let rows = sqlx::query_as::<_, PlayerStanding>(
            r#"
            SELECT tournament_id, player_id, player_name, position, score_text,
                   score_to_par, status, fetched_at
            FROM leaderboard_cache
            WHERE tournament_id = $1
            ORDER BY score_to_par ASC NULLS LAST, player_name
            "#,
        )
        .bind(tournament_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Insert rows that are not cached yet; existing (tournament, player) rows win.
    /// Returns how many rows were actually written.
    pub async fn insert_missing(&self, rows: &[PlayerStanding]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut query = QueryBuilder::new(
            r#"
            INSERT INTO leaderboard_cache (
                tournament_id, player_id, player_name, position, score_text,
                score_to_par, status, fetched_at
            )
            "#,
        );

        query.push_values(rows, |mut b, row| {
            b.push_bind(&row.tournament_id)
                .push_bind(&row.player_id)
                .push_bind(&row.player_name)
                .push_bind(&row.position)
                .push_bind(&row.score_text)
                .push_bind(row.score_to_par)
                .push_bind(&row.status)
                .push_bind(row.fetched_at);
        });
        query.push(" ON CONFLICT (tournament_id, player_id) DO NOTHING");

        let result = query.build().execute(self.pool).await?;

        Ok(result.rows_affected())
    }
}
