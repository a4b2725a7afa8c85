use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::dto::picks::PickSelection;
use crate::error::Result;
use crate::models::Pick;

pub struct PickRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PickRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_tournament(&self, tournament_id: &str) -> Result<Vec<Pick>> {
        let picks = sqlx::query_as::<_, Pick>(
            r#"
            SELECT username, tournament_id, tier_number, player_id, picked_at
            FROM user_picks
            WHERE tournament_id = $1
            ORDER BY tier_number, username
            "#,
        )
        .bind(tournament_id)
        .fetch_all(self.pool)
        .await?;

        Ok(picks)
    }

    pub async fn list_for_user(&self, tournament_id: &str, username: &str) -> Result<Vec<Pick>> {
        let picks = sqlx::query_as::<_, Pick>(
            r#"
            SELECT username, tournament_id, tier_number, player_id, picked_at
            FROM user_picks
            WHERE tournament_id = $1 AND username = $2
            ORDER BY tier_number
            "#,
        )
        .bind(tournament_id)
        .bind(username)
        .fetch_all(self.pool)
        .await?;

        Ok(picks)
    }

    pub async fn count_for_tournament(
        tx: &mut Transaction<'_, Postgres>,
        tournament_id: &str,
    ) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_picks WHERE tournament_id = $1",
        )
        .bind(tournament_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(count)
    }

    /// Replace every pick the user has for the tournament
    pub async fn replace_for_user(
        tx: &mut Transaction<'_, Postgres>,
        tournament_id: &str,
        username: &str,
        selections: &[PickSelection],
        picked_at: DateTime<Utc>,
    ) -> Result<Vec<Pick>> {
        sqlx::query("DELETE FROM user_picks WHERE tournament_id = $1 AND username = $2")
            .bind(tournament_id)
            .bind(username)
            .execute(&mut **tx)
            .await?;

        let mut picks = Vec::with_capacity(selections.len());
        for selection in selections {
            let pick = sqlx::query_as::<_, Pick>(
                r#"
                INSERT INTO user_picks (username, tournament_id, tier_number, player_id, picked_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING username, tournament_id, tier_number, player_id, picked_at
                "#,
            )
            .bind(username)
            .bind(tournament_id)
            .bind(selection.tier_number)
            .bind(&selection.player_id)
            .bind(picked_at)
            .fetch_one(&mut **tx)
            .await?;
            picks.push(pick);
        }

        Ok(picks)
    }
}
