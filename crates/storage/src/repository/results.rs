use sqlx::{PgPool, Postgres, Transaction};

use crate::dto::results::PickResultView;
use crate::error::Result;
use crate::models::{PickResult, TournamentScore};

pub struct ResultRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ResultRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert_pick_result(
        tx: &mut Transaction<'_, Postgres>,
        result: &PickResult,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pick_scores (
                pick_score_id, tournament_id, username, tier_number, player_id,
                player_score, tier_winner, missed_cut, points
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (tournament_id, username, tier_number)
            DO UPDATE SET
                player_id = EXCLUDED.player_id,
                player_score = EXCLUDED.player_score,
                tier_winner = EXCLUDED.tier_winner,
                missed_cut = EXCLUDED.missed_cut,
                points = EXCLUDED.points,
                computed_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&result.pick_score_id)
        .bind(&result.tournament_id)
        .bind(&result.username)
        .bind(result.tier_number)
        .bind(&result.player_id)
        .bind(&result.player_score)
        .bind(result.tier_winner)
        .bind(result.missed_cut)
        .bind(result.points)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn upsert_tournament_score(
        tx: &mut Transaction<'_, Postgres>,
        score: &TournamentScore,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tournament_scores (
                tournament_score_id, tournament_id, username, team_total, team_bonus, points
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (tournament_id, username)
            DO UPDATE SET
                team_total = EXCLUDED.team_total,
                team_bonus = EXCLUDED.team_bonus,
                points = EXCLUDED.points,
                computed_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&score.tournament_score_id)
        .bind(&score.tournament_id)
        .bind(&score.username)
        .bind(score.team_total)
        .bind(score.team_bonus)
        .bind(score.points)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn list_pick_results(&self, tournament_id: &str) -> Result<Vec<PickResultView>> {
        let rows = sqlx::query_as::<_, PickResultView>(
            r#"
            SELECT ps.username, u.display_name, ps.tier_number, ps.player_id,
                   COALESCE(p.name, lc.player_name, ps.player_id) AS player_name,
                   ps.player_score, ps.tier_winner, ps.missed_cut, ps.points
            FROM pick_scores ps
            INNER JOIN users u ON u.username = ps.username
            LEFT JOIN players p ON p.player_id = ps.player_id
            LEFT JOIN leaderboard_cache lc
                ON lc.tournament_id = ps.tournament_id AND lc.player_id = ps.player_id
            WHERE ps.tournament_id = $1
            ORDER BY ps.tier_number, u.display_name
            "#,
        )
        .bind(tournament_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_scores_for_tournament(
        &self,
        tournament_id: &str,
    ) -> Result<Vec<TournamentScore>> {
        let scores = sqlx::query_as::<_, TournamentScore>(
            r#"
            SELECT tournament_score_id, tournament_id, username, team_total, team_bonus, points
            FROM tournament_scores
            WHERE tournament_id = $1
            ORDER BY points DESC, username
            "#,
        )
        .bind(tournament_id)
        .fetch_all(self.pool)
        .await?;

        Ok(scores)
    }

    /// Scores of every finalized tournament, for season totals
    pub async fn list_finalized_scores(&self) -> Result<Vec<TournamentScore>> {
        let scores = sqlx::query_as::<_, TournamentScore>(
            r#"
            SELECT s.tournament_score_id, s.tournament_id, s.username,
                   s.team_total, s.team_bonus, s.points
            FROM tournament_scores s
            INNER JOIN tournaments t ON t.tournament_id = s.tournament_id
            WHERE t.is_finalized = TRUE
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(scores)
    }
}
