use sqlx::{PgPool, Postgres, Transaction};

use crate::dto::tiers::TierPlayer;
use crate::error::Result;
use crate::models::TierAssignment;

const SELECT_ASSIGNMENTS: &str = r#"
    SELECT tournament_id, tier_number, player_id
    FROM tournament_tiers
    WHERE tournament_id = $1
    ORDER BY tier_number, player_id
"#;

pub struct TierRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TierRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_tournament(&self, tournament_id: &str) -> Result<Vec<TierAssignment>> {
        let tiers = sqlx::query_as::<_, TierAssignment>(SELECT_ASSIGNMENTS)
            .bind(tournament_id)
            .fetch_all(self.pool)
            .await?;

        Ok(tiers)
    }

    pub async fn list_for_tournament_tx(
        tx: &mut Transaction<'_, Postgres>,
        tournament_id: &str,
    ) -> Result<Vec<TierAssignment>> {
        let tiers = sqlx::query_as::<_, TierAssignment>(SELECT_ASSIGNMENTS)
            .bind(tournament_id)
            .fetch_all(&mut **tx)
            .await?;

        Ok(tiers)
    }

    /// Tier rosters with player display names, for the pick form
    pub async fn list_players_for_tournament(&self, tournament_id: &str) -> Result<Vec<TierPlayer>> {
        let players = sqlx::query_as::<_, TierPlayer>(
            r#"
            SELECT t.tier_number, t.player_id, COALESCE(p.name, t.player_id) AS name
            FROM tournament_tiers t
            LEFT JOIN players p ON p.player_id = t.player_id
            WHERE t.tournament_id = $1
            ORDER BY t.tier_number, name
            "#,
        )
        .bind(tournament_id)
        .fetch_all(self.pool)
        .await?;

        Ok(players)
    }

    pub async fn replace_for_tournament(
        tx: &mut Transaction<'_, Postgres>,
        tournament_id: &str,
        assignments: &[TierAssignment],
    ) -> Result<()> {
        sqlx::query("DELETE FROM tournament_tiers WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut **tx)
            .await?;

        for assignment in assignments {
            sqlx::query(
                r#"
                INSERT INTO tournament_tiers (tournament_id, tier_number, player_id)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(tournament_id)
            .bind(assignment.tier_number)
            .bind(&assignment.player_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}
