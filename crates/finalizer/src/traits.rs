use async_trait::async_trait;
use chrono::{DateTime, Utc};
use storage::error::Result as StorageResult;
use storage::models::{Pick, PlayerStanding, TierAssignment, Tournament};
use storage::services::scoring::ScoringOutcome;

use crate::error::ProviderError;

/// Source of live tournament standings.
#[async_trait]
pub trait LeaderboardProvider: Send + Sync {
    async fn fetch(&self, tournament: &Tournament) -> Result<Vec<PlayerStanding>, ProviderError>;
}

/// Per-tournament snapshot of provider standings.
///
/// `put` must never overwrite rows that are already cached, so the first
/// snapshot written for a tournament is the one every later pass scores.
#[async_trait]
pub trait ScoreCache: Send + Sync {
    async fn get(&self, tournament_id: &str) -> StorageResult<Vec<PlayerStanding>>;
    async fn put(&self, tournament_id: &str, rows: &[PlayerStanding]) -> StorageResult<u64>;
}

#[async_trait]
pub trait FinalizationStore: Send + Sync {
    async fn find_tournament(&self, tournament_id: &str) -> StorageResult<Tournament>;

    /// Unfinalized tournaments that started at or before `cutoff`, oldest first.
    async fn unfinalized_started_before(&self, cutoff: DateTime<Utc>) -> StorageResult<Vec<Tournament>>;

    async fn tier_assignments(&self, tournament_id: &str) -> StorageResult<Vec<TierAssignment>>;

    async fn picks(&self, tournament_id: &str) -> StorageResult<Vec<Pick>>;

    /// Writes every result and sets the finalized flag atomically.
    async fn commit_finalization(
        &self,
        tournament_id: &str,
        outcome: &ScoringOutcome,
        finalized_at: DateTime<Utc>,
    ) -> StorageResult<()>;
}
