use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{Result, StorageError};
use crate::models::Tournament;

const TOURNAMENT_COLUMNS: &str = r#"
    tournament_id, name, start_time, org_id, provider_tournament_id,
    season_year, is_finalized, finalized_at
"#;

/// Repository for Tournament database operations
pub struct TournamentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TournamentRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all tournaments, earliest first
    pub async fn list(&self) -> Result<Vec<Tournament>> {
        let tournaments = sqlx::query_as::<_, Tournament>(&format!(
            "SELECT {} FROM tournaments ORDER BY start_time ASC",
            TOURNAMENT_COLUMNS
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(tournaments)
    }

    pub async fn find_by_id(&self, tournament_id: &str) -> Result<Tournament> {
        sqlx::query_as::<_, Tournament>(&format!(
            "SELECT {} FROM tournaments WHERE tournament_id = $1",
            TOURNAMENT_COLUMNS
        ))
        .bind(tournament_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Row-lock a tournament for the rest of the transaction, so tier edits and
    /// pick submissions for it run one after the other.
    pub async fn lock_for_update(
        tx: &mut Transaction<'_, Postgres>,
        tournament_id: &str,
    ) -> Result<Tournament> {
        sqlx::query_as::<_, Tournament>(&format!(
            "SELECT {} FROM tournaments WHERE tournament_id = $1 FOR UPDATE",
            TOURNAMENT_COLUMNS
        ))
        .bind(tournament_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// The tournament shown on the "this week" page: the latest one starting
    /// within `[now - lookback, now + lookahead]`.
    pub async fn find_current(
        &self,
        now: DateTime<Utc>,
        lookback: chrono::TimeDelta,
        lookahead: chrono::TimeDelta,
    ) -> Result<Tournament> {
        sqlx::query_as::<_, Tournament>(&format!(
            r#"
            SELECT {}
            FROM tournaments
            WHERE start_time <= $1 AND start_time >= $2
            ORDER BY start_time DESC
            LIMIT 1
            "#,
            TOURNAMENT_COLUMNS
        ))
        .bind(now + lookahead)
        .bind(now - lookback)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Unfinalized tournaments that started at or before `cutoff`, earliest first
    pub async fn list_unfinalized_started_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Tournament>> {
        let tournaments = sqlx::query_as::<_, Tournament>(&format!(
            r#"
            SELECT {}
            FROM tournaments
            WHERE is_finalized = FALSE AND start_time <= $1
            ORDER BY start_time ASC
            "#,
            TOURNAMENT_COLUMNS
        ))
        .bind(cutoff)
        .fetch_all(self.pool)
        .await?;

        Ok(tournaments)
    }

    pub async fn mark_finalized(
        tx: &mut Transaction<'_, Postgres>,
        tournament_id: &str,
        finalized_at: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE tournaments
            SET is_finalized = TRUE, finalized_at = $2
            WHERE tournament_id = $1
            "#,
        )
        .bind(tournament_id)
        .bind(finalized_at)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
