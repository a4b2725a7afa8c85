use async_trait::async_trait;
use chrono::{DateTime, Utc};
use storage::Database;
use storage::error::Result as StorageResult;
use storage::models::{Pick, PlayerStanding, TierAssignment, Tournament};
use storage::repository::pick::PickRepository;
use storage::repository::results::ResultRepository;
use storage::repository::standings::StandingsRepository;
use storage::repository::tier::TierRepository;
use storage::repository::tournament::TournamentRepository;
use storage::services::scoring::ScoringOutcome;
use tracing::debug;

use crate::traits::{FinalizationStore, ScoreCache};

/// Postgres-backed cache and store.
#[derive(Clone)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScoreCache for PgStore {
    async fn get(&self, tournament_id: &str) -> StorageResult<Vec<PlayerStanding>> {
        StandingsRepository::new(self.db.pool())
            .list_for_tournament(tournament_id)
            .await
    }

    async fn put(&self, tournament_id: &str, rows: &[PlayerStanding]) -> StorageResult<u64> {
        let inserted = StandingsRepository::new(self.db.pool())
            .insert_missing(rows)
            .await?;
        debug!("Cached {} of {} standings for {}", inserted, rows.len(), tournament_id);
        Ok(inserted)
    }
}

#[async_trait]
impl FinalizationStore for PgStore {
    async fn find_tournament(&self, tournament_id: &str) -> StorageResult<Tournament> {
        TournamentRepository::new(self.db.pool())
            .find_by_id(tournament_id)
            .await
    }

    async fn unfinalized_started_before(&self, cutoff: DateTime<Utc>) -> StorageResult<Vec<Tournament>> {
        TournamentRepository::new(self.db.pool())
            .list_unfinalized_started_before(cutoff)
            .await
    }

    async fn tier_assignments(&self, tournament_id: &str) -> StorageResult<Vec<TierAssignment>> {
        TierRepository::new(self.db.pool())
            .list_for_tournament(tournament_id)
            .await
    }

    async fn picks(&self, tournament_id: &str) -> StorageResult<Vec<Pick>> {
        PickRepository::new(self.db.pool())
            .list_for_tournament(tournament_id)
            .await
    }

    async fn commit_finalization(
        &self,
        tournament_id: &str,
        outcome: &ScoringOutcome,
        finalized_at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let mut tx = self.db.pool().begin().await?;

        for result in &outcome.pick_results {
            ResultRepository::upsert_pick_result(&mut tx, result).await?;
        }
        for score in &outcome.tournament_scores {
            ResultRepository::upsert_tournament_score(&mut tx, score).await?;
        }
        TournamentRepository::mark_finalized(&mut tx, tournament_id, finalized_at).await?;

        tx.commit().await?;
        Ok(())
    }
}
