use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use storage::error::StorageError;
use storage::models::{Pick, PlayerStanding, TierAssignment, Tournament};
use storage::services::scoring::{self, ScoringOutcome, ScoringRules};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::error::{DataIntegrityError, FinalizeError, ProviderError, Result};
use crate::traits::{FinalizationStore, LeaderboardProvider, ScoreCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinalizeMode {
    /// Skip tournaments that are already finalized
    #[default]
    Normal,
    /// Recompute and rewrite results even if the tournament is finalized
    Force,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeReport {
    pub tournament_id: String,
    pub already_finalized: bool,
    pub standings: usize,
    pub picks_scored: usize,
    pub users_scored: usize,
    pub skipped: Vec<DataIntegrityError>,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl FinalizeReport {
    fn unchanged(tournament: &Tournament) -> Self {
        Self {
            tournament_id: tournament.tournament_id.clone(),
            already_finalized: true,
            standings: 0,
            picks_scored: 0,
            users_scored: 0,
            skipped: Vec::new(),
            finalized_at: tournament.finalized_at,
        }
    }

    pub fn message(&self) -> String {
        if self.already_finalized {
            return format!("Tournament {} is already finalized", self.tournament_id);
        }

        let mut message = format!(
            "Finalized {}: {} picks scored for {} users",
            self.tournament_id, self.picks_scored, self.users_scored
        );
        if !self.skipped.is_empty() {
            message.push_str(&format!(" ({} picks skipped)", self.skipped.len()));
        }
        message
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub tournament_id: String,
    pub error: String,
    /// The provider had nothing usable yet; the next pass retries.
    pub not_ready: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub finalized: Vec<FinalizeReport>,
    pub failed: Vec<BatchFailure>,
}

impl BatchSummary {
    pub fn is_empty(&self) -> bool {
        self.finalized.is_empty() && self.failed.is_empty()
    }
}

/// Scores computed from live standings without persisting anything.
#[derive(Debug, Clone)]
pub struct Preview {
    pub tournament_id: String,
    /// False until the tournament starts; picks and scores stay empty until then.
    pub revealed: bool,
    pub standings: Vec<PlayerStanding>,
    pub outcome: ScoringOutcome,
    pub skipped: Vec<DataIntegrityError>,
}

/// Splits picks into the ones that can be scored and the integrity issues
/// found in the rest.
///
/// When a tournament has no tier assignments recorded, only the tier range
/// is checked.
pub fn validate_picks(
    picks: Vec<Pick>,
    assignments: &[TierAssignment],
    rules: &ScoringRules,
) -> (Vec<Pick>, Vec<DataIntegrityError>) {
    let assigned: HashSet<(i16, &str)> = assignments
        .iter()
        .map(|a| (a.tier_number, a.player_id.as_str()))
        .collect();

    let mut valid = Vec::with_capacity(picks.len());
    let mut skipped = Vec::new();

    for pick in picks {
        if !rules.has_tier(pick.tier_number) {
            skipped.push(DataIntegrityError::TierOutOfRange {
                username: pick.username,
                tier_number: pick.tier_number,
            });
            continue;
        }

        if !assigned.is_empty() && !assigned.contains(&(pick.tier_number, pick.player_id.as_str())) {
            skipped.push(DataIntegrityError::UnassignedPlayer {
                username: pick.username,
                tier_number: pick.tier_number,
                player_id: pick.player_id,
            });
            continue;
        }

        valid.push(pick);
    }

    (valid, skipped)
}

/// Drives finalization: cache-or-fetch standings, score, commit atomically.
pub struct FinalizationCoordinator<P, S> {
    provider: P,
    store: S,
    rules: ScoringRules,
    // One finalization at a time, whether triggered by the scheduler or an admin.
    write_lock: Mutex<()>,
}

impl<P, S> FinalizationCoordinator<P, S>
where
    P: LeaderboardProvider,
    S: ScoreCache + FinalizationStore,
{
    pub fn new(provider: P, store: S, rules: ScoringRules) -> Self {
        Self {
            provider,
            store,
            rules,
            write_lock: Mutex::new(()),
        }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn finalize(
        &self,
        tournament: &Tournament,
        mode: FinalizeMode,
        now: DateTime<Utc>,
    ) -> Result<FinalizeReport> {
        let _guard = self.write_lock.lock().await;
        let tournament_id = tournament.tournament_id.as_str();

        // Re-read under the lock, another pass may have finished meanwhile.
        let current = self.find_tournament(tournament_id).await?;
        if current.is_finalized && mode == FinalizeMode::Normal {
            debug!("{} already finalized, nothing to do", tournament_id);
            return Ok(FinalizeReport::unchanged(&current));
        }

        let standings = self.load_standings(&current).await?;
        let assignments = self.store.tier_assignments(tournament_id).await?;
        let picks = self.store.picks(tournament_id).await?;

        let (valid, skipped) = validate_picks(picks, &assignments, &self.rules);
        for issue in &skipped {
            warn!("Skipping pick in {}: {}", tournament_id, issue);
        }

        let index = scoring::index_standings(standings.iter().cloned());
        let outcome = scoring::compute(tournament_id, &valid, &index, &self.rules);

        self.store
            .commit_finalization(tournament_id, &outcome, now)
            .await?;

        let report = FinalizeReport {
            tournament_id: tournament_id.to_string(),
            already_finalized: false,
            standings: standings.len(),
            picks_scored: outcome.pick_results.len(),
            users_scored: outcome.tournament_scores.len(),
            skipped,
            finalized_at: Some(now),
        };
        info!("{}", report.message());

        Ok(report)
    }

    pub async fn finalize_by_id(
        &self,
        tournament_id: &str,
        mode: FinalizeMode,
        now: DateTime<Utc>,
    ) -> Result<FinalizeReport> {
        let tournament = self.find_tournament(tournament_id).await?;
        self.finalize(&tournament, mode, now).await
    }

    /// Finalizes the most recent tournament whose finalization window has passed.
    pub async fn finalize_latest(&self, now: DateTime<Utc>) -> Result<FinalizeReport> {
        let due = self.due_tournaments(now).await?;
        let latest = due.last().ok_or(FinalizeError::NothingToFinalize)?;
        self.finalize(latest, FinalizeMode::Normal, now).await
    }

    /// Finalizes every due tournament in start order. A failure is logged and
    /// recorded, and the remaining tournaments are still attempted.
    pub async fn finalize_due(&self, now: DateTime<Utc>) -> Result<BatchSummary> {
        let due = self.due_tournaments(now).await?;
        let mut summary = BatchSummary::default();

        for tournament in &due {
            match self.finalize(tournament, FinalizeMode::Normal, now).await {
                Ok(report) => summary.finalized.push(report),
                Err(FinalizeError::Provider(e)) => {
                    info!("{} not ready yet: {}", tournament.tournament_id, e);
                    summary.failed.push(BatchFailure {
                        tournament_id: tournament.tournament_id.clone(),
                        error: e.to_string(),
                        not_ready: true,
                    });
                }
                Err(e) => {
                    error!("Failed to finalize {}: {}", tournament.tournament_id, e);
                    summary.failed.push(BatchFailure {
                        tournament_id: tournament.tournament_id.clone(),
                        error: e.to_string(),
                        not_ready: false,
                    });
                }
            }
        }

        Ok(summary)
    }

    /// Scores a tournament from live standings without writing anything.
    ///
    /// Before the start time only the standings are returned, so nobody's
    /// picks leak while they can still be changed.
    pub async fn preview(&self, tournament: &Tournament, now: DateTime<Utc>) -> Result<Preview> {
        let tournament_id = tournament.tournament_id.as_str();
        let standings = self.provider.fetch(tournament).await?;
        if standings.is_empty() {
            return Err(ProviderError::EmptyLeaderboard.into());
        }

        if !tournament.picks_locked(now) {
            debug!("{} has not started, hiding picks from the preview", tournament_id);
            return Ok(Preview {
                tournament_id: tournament_id.to_string(),
                revealed: false,
                standings,
                outcome: ScoringOutcome::default(),
                skipped: Vec::new(),
            });
        }

        let assignments = self.store.tier_assignments(tournament_id).await?;
        let picks = self.store.picks(tournament_id).await?;
        let (valid, skipped) = validate_picks(picks, &assignments, &self.rules);

        let index = scoring::index_standings(standings.iter().cloned());
        let outcome = scoring::compute(tournament_id, &valid, &index, &self.rules);

        Ok(Preview {
            tournament_id: tournament_id.to_string(),
            revealed: true,
            standings,
            outcome,
            skipped,
        })
    }

    async fn due_tournaments(&self, now: DateTime<Utc>) -> Result<Vec<Tournament>> {
        let cutoff = now - self.rules.finalization_window;
        Ok(self.store.unfinalized_started_before(cutoff).await?)
    }

    async fn find_tournament(&self, tournament_id: &str) -> Result<Tournament> {
        self.store
            .find_tournament(tournament_id)
            .await
            .map_err(|e| match e {
                StorageError::NotFound => FinalizeError::TournamentNotFound(tournament_id.to_string()),
                other => FinalizeError::Persistence(other),
            })
    }

    /// Cached standings if any exist; otherwise one provider fetch, written
    /// to the cache and read back so the persisted snapshot is what gets scored.
    async fn load_standings(&self, tournament: &Tournament) -> Result<Vec<PlayerStanding>> {
        let tournament_id = tournament.tournament_id.as_str();

        let cached = self.store.get(tournament_id).await?;
        if !cached.is_empty() {
            debug!("Using {} cached standings for {}", cached.len(), tournament_id);
            return Ok(cached);
        }

        let fetched = self.provider.fetch(tournament).await?;
        if fetched.is_empty() {
            return Err(ProviderError::EmptyLeaderboard.into());
        }

        self.store.put(tournament_id, &fetched).await?;
        Ok(self.store.get(tournament_id).await?)
    }
}

/// Runs `finalize_due` every `period` until the task is aborted.
pub fn spawn_scheduler<P, S>(
    coordinator: Arc<FinalizationCoordinator<P, S>>,
    period: Duration,
) -> JoinHandle<()>
where
    P: LeaderboardProvider + 'static,
    S: ScoreCache + FinalizationStore + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            match coordinator.finalize_due(Utc::now()).await {
                Ok(summary) if summary.is_empty() => debug!("No tournaments due for finalization"),
                Ok(summary) => info!(
                    "Finalization pass: {} finalized, {} pending",
                    summary.finalized.len(),
                    summary.failed.len()
                ),
                Err(e) => error!("Finalization pass failed: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeDelta, TimeZone};
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use storage::error::Result as StorageResult;
    use storage::models::{PickResult, TournamentScore};
    use storage::services::scoring::RulesetVersion;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 9, 12, 0, 0).unwrap()
    }

    fn after_window() -> DateTime<Utc> {
        start() + TimeDelta::days(6)
    }

    fn tournament(id: &str, start_time: DateTime<Utc>) -> Tournament {
        Tournament {
            tournament_id: id.to_string(),
            name: format!("Tournament {}", id),
            start_time,
            org_id: "1".to_string(),
            provider_tournament_id: id.to_string(),
            season_year: 2026,
            is_finalized: false,
            finalized_at: None,
        }
    }

    fn standing(tournament_id: &str, player_id: &str, score: i32, status: &str) -> PlayerStanding {
        PlayerStanding {
            tournament_id: tournament_id.to_string(),
            player_id: player_id.to_string(),
            player_name: format!("Player {}", player_id),
            position: None,
            score_text: score.to_string(),
            score_to_par: Some(score),
            status: status.to_string(),
            fetched_at: start(),
        }
    }

    fn pick(tournament_id: &str, username: &str, tier: i16, player_id: &str) -> Pick {
        Pick {
            username: username.to_string(),
            tournament_id: tournament_id.to_string(),
            tier_number: tier,
            player_id: player_id.to_string(),
            picked_at: start() - TimeDelta::days(1),
        }
    }

    fn assignment(tournament_id: &str, tier: i16, player_id: &str) -> TierAssignment {
        TierAssignment {
            tournament_id: tournament_id.to_string(),
            tier_number: tier,
            player_id: player_id.to_string(),
        }
    }

    struct FakeProvider {
        rows: HashMap<String, Vec<PlayerStanding>>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(rows: Vec<PlayerStanding>) -> Self {
            let mut by_tournament: HashMap<String, Vec<PlayerStanding>> = HashMap::new();
            for row in rows {
                by_tournament
                    .entry(row.tournament_id.clone())
                    .or_default()
                    .push(row);
            }
            Self {
                rows: by_tournament,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LeaderboardProvider for FakeProvider {
        async fn fetch(&self, tournament: &Tournament) -> std::result::Result<Vec<PlayerStanding>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.rows.get(&tournament.tournament_id) {
                Some(rows) => Ok(rows.clone()),
                None => Err(ProviderError::EmptyLeaderboard),
            }
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        tournaments: StdMutex<HashMap<String, Tournament>>,
        assignments: Vec<TierAssignment>,
        picks: Vec<Pick>,
        cache: StdMutex<HashMap<String, Vec<PlayerStanding>>>,
        pick_results: StdMutex<HashMap<String, PickResult>>,
        scores: StdMutex<HashMap<String, TournamentScore>>,
        fail_commit: AtomicBool,
    }

    impl MemoryStore {
        fn with_tournaments(tournaments: Vec<Tournament>) -> Self {
            let store = Self::default();
            {
                let mut map = store.tournaments.lock().unwrap();
                for t in tournaments {
                    map.insert(t.tournament_id.clone(), t);
                }
            }
            store
        }

        fn tournament(&self, id: &str) -> Tournament {
            self.tournaments.lock().unwrap()[id].clone()
        }

        fn score(&self, tournament_id: &str, username: &str) -> Option<TournamentScore> {
            self.scores
                .lock()
                .unwrap()
                .get(&TournamentScore::key(tournament_id, username))
                .cloned()
        }

        fn pick_result(&self, tournament_id: &str, username: &str, tier: i16) -> Option<PickResult> {
            self.pick_results
                .lock()
                .unwrap()
                .get(&PickResult::key(tournament_id, username, tier))
                .cloned()
        }
    }

    #[async_trait]
    impl ScoreCache for MemoryStore {
        async fn get(&self, tournament_id: &str) -> StorageResult<Vec<PlayerStanding>> {
            Ok(self
                .cache
                .lock()
                .unwrap()
                .get(tournament_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn put(&self, tournament_id: &str, rows: &[PlayerStanding]) -> StorageResult<u64> {
            let mut cache = self.cache.lock().unwrap();
            let cached = cache.entry(tournament_id.to_string()).or_default();
            let mut inserted = 0;
            for row in rows {
                if !cached.iter().any(|c| c.player_id == row.player_id) {
                    cached.push(row.clone());
                    inserted += 1;
                }
            }
            Ok(inserted)
        }
    }

    #[async_trait]
    impl FinalizationStore for MemoryStore {
        async fn find_tournament(&self, tournament_id: &str) -> StorageResult<Tournament> {
            self.tournaments
                .lock()
                .unwrap()
                .get(tournament_id)
                .cloned()
                .ok_or(StorageError::NotFound)
        }

        async fn unfinalized_started_before(&self, cutoff: DateTime<Utc>) -> StorageResult<Vec<Tournament>> {
            let mut due: Vec<Tournament> = self
                .tournaments
                .lock()
                .unwrap()
                .values()
                .filter(|t| !t.is_finalized && t.start_time <= cutoff)
                .cloned()
                .collect();
            due.sort_by_key(|t| t.start_time);
            Ok(due)
        }

        async fn tier_assignments(&self, tournament_id: &str) -> StorageResult<Vec<TierAssignment>> {
            Ok(self
                .assignments
                .iter()
                .filter(|a| a.tournament_id == tournament_id)
                .cloned()
                .collect())
        }

        async fn picks(&self, tournament_id: &str) -> StorageResult<Vec<Pick>> {
            Ok(self
                .picks
                .iter()
                .filter(|p| p.tournament_id == tournament_id)
                .cloned()
                .collect())
        }

        async fn commit_finalization(
            &self,
            tournament_id: &str,
            outcome: &ScoringOutcome,
            finalized_at: DateTime<Utc>,
        ) -> StorageResult<()> {
            if self.fail_commit.load(Ordering::SeqCst) {
                return Err(StorageError::ConstraintViolation("commit failed".to_string()));
            }

            let mut pick_results = self.pick_results.lock().unwrap();
            for r in &outcome.pick_results {
                pick_results.insert(r.pick_score_id.clone(), r.clone());
            }
            let mut scores = self.scores.lock().unwrap();
            for s in &outcome.tournament_scores {
                scores.insert(s.tournament_score_id.clone(), s.clone());
            }
            let mut tournaments = self.tournaments.lock().unwrap();
            let tournament = tournaments
                .get_mut(tournament_id)
                .ok_or(StorageError::NotFound)?;
            tournament.is_finalized = true;
            tournament.finalized_at = Some(finalized_at);
            Ok(())
        }
    }

    /// Tournament "T" where alice and bob both pick a -5 player in tier 1,
    /// bob's player having missed the cut.
    fn alice_and_bob() -> (FakeProvider, MemoryStore) {
        let provider = FakeProvider::new(vec![
            standing("T", "P1", -5, "active"),
            standing("T", "P2", -5, "cut"),
            standing("T", "P3", 2, "active"),
        ]);
        let mut store = MemoryStore::with_tournaments(vec![tournament("T", start())]);
        store.assignments = vec![
            assignment("T", 1, "P1"),
            assignment("T", 1, "P2"),
            assignment("T", 2, "P3"),
        ];
        store.picks = vec![pick("T", "alice", 1, "P1"), pick("T", "bob", 1, "P2")];
        (provider, store)
    }

    fn coordinator(provider: FakeProvider, store: MemoryStore) -> FinalizationCoordinator<FakeProvider, MemoryStore> {
        FinalizationCoordinator::new(provider, store, ScoringRules::default())
    }

    #[tokio::test]
    async fn test_end_to_end_tie_with_missed_cut() {
        let (provider, store) = alice_and_bob();
        let coordinator = coordinator(provider, store);

        let report = coordinator
            .finalize_by_id("T", FinalizeMode::Normal, after_window())
            .await
            .unwrap();

        assert_eq!(report.picks_scored, 2);
        assert_eq!(report.users_scored, 2);

        let store = coordinator.store();
        let alice = store.pick_result("T", "alice", 1).unwrap();
        let bob = store.pick_result("T", "bob", 1).unwrap();
        assert!(alice.tier_winner && bob.tier_winner);
        assert_eq!(alice.points, 1);
        assert!(bob.missed_cut);
        assert_eq!(bob.points, 0);

        // Equal team totals of -5, so both take the bonus.
        assert_eq!(store.score("T", "alice").unwrap().points, 2);
        assert_eq!(store.score("T", "bob").unwrap().points, 1);

        let t = store.tournament("T");
        assert!(t.is_finalized);
        assert_eq!(t.finalized_at, Some(after_window()));
    }

    #[tokio::test]
    async fn test_finalize_twice_is_a_no_op() {
        let (provider, store) = alice_and_bob();
        let coordinator = coordinator(provider, store);

        coordinator
            .finalize_by_id("T", FinalizeMode::Normal, after_window())
            .await
            .unwrap();
        let first = coordinator.store().score("T", "alice");

        let second = coordinator
            .finalize_by_id("T", FinalizeMode::Normal, after_window() + TimeDelta::hours(1))
            .await
            .unwrap();

        assert!(second.already_finalized);
        assert_eq!(second.message(), "Tournament T is already finalized");
        assert_eq!(coordinator.store().score("T", "alice"), first);
        assert_eq!(coordinator.store().pick_results.lock().unwrap().len(), 2);
        assert_eq!(
            coordinator.store().tournament("T").finalized_at,
            Some(after_window())
        );
    }

    #[tokio::test]
    async fn test_force_rewrites_same_rows() {
        let (provider, store) = alice_and_bob();
        let coordinator = coordinator(provider, store);

        coordinator
            .finalize_by_id("T", FinalizeMode::Normal, after_window())
            .await
            .unwrap();
        let first_picks = coordinator.store().pick_results.lock().unwrap().clone();
        let first_scores = coordinator.store().scores.lock().unwrap().clone();

        let report = coordinator
            .finalize_by_id("T", FinalizeMode::Force, after_window() + TimeDelta::hours(1))
            .await
            .unwrap();

        assert!(!report.already_finalized);
        assert_eq!(*coordinator.store().pick_results.lock().unwrap(), first_picks);
        assert_eq!(*coordinator.store().scores.lock().unwrap(), first_scores);
        assert_eq!(coordinator.store().score("T", "alice").unwrap().points, 2);
    }

    #[tokio::test]
    async fn test_retry_after_failed_commit_matches_clean_run() {
        let (provider, store) = alice_and_bob();
        let clean = coordinator(provider, store);
        clean
            .finalize_by_id("T", FinalizeMode::Normal, after_window())
            .await
            .unwrap();

        let (provider, store) = alice_and_bob();
        store.fail_commit.store(true, Ordering::SeqCst);
        let retried = coordinator(provider, store);
        retried
            .finalize_by_id("T", FinalizeMode::Normal, after_window())
            .await
            .unwrap_err();
        retried.store().fail_commit.store(false, Ordering::SeqCst);
        retried
            .finalize_by_id("T", FinalizeMode::Normal, after_window())
            .await
            .unwrap();

        assert_eq!(
            *retried.store().pick_results.lock().unwrap(),
            *clean.store().pick_results.lock().unwrap()
        );
        assert_eq!(
            *retried.store().scores.lock().unwrap(),
            *clean.store().scores.lock().unwrap()
        );
        // The snapshot cached by the failed pass is reused on retry.
        assert_eq!(retried.provider.calls(), 1);
        assert!(retried.store().tournament("T").is_finalized);
    }

    #[tokio::test]
    async fn test_provider_called_once_when_cache_populated() {
        let (provider, store) = alice_and_bob();
        let coordinator = coordinator(provider, store);

        coordinator
            .finalize_by_id("T", FinalizeMode::Normal, after_window())
            .await
            .unwrap();
        coordinator
            .finalize_by_id("T", FinalizeMode::Force, after_window())
            .await
            .unwrap();

        assert_eq!(coordinator.provider.calls(), 1);
        assert_eq!(coordinator.store().cache.lock().unwrap()["T"].len(), 3);
    }

    #[tokio::test]
    async fn test_cached_snapshot_wins_over_live_data() {
        let (provider, store) = alice_and_bob();
        // An earlier pass cached P2 at -7 before the leaderboard moved.
        store
            .cache
            .lock()
            .unwrap()
            .insert("T".to_string(), vec![standing("T", "P1", -5, "active"), standing("T", "P2", -7, "active")]);
        let coordinator = coordinator(provider, store);

        coordinator
            .finalize_by_id("T", FinalizeMode::Normal, after_window())
            .await
            .unwrap();

        assert_eq!(coordinator.provider.calls(), 0);
        let store = coordinator.store();
        assert!(!store.pick_result("T", "alice", 1).unwrap().tier_winner);
        assert!(store.pick_result("T", "bob", 1).unwrap().tier_winner);
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_tournament_unfinalized() {
        let (provider, store) = alice_and_bob();
        store.fail_commit.store(true, Ordering::SeqCst);
        let coordinator = coordinator(provider, store);

        let err = coordinator
            .finalize_by_id("T", FinalizeMode::Normal, after_window())
            .await
            .unwrap_err();

        assert!(matches!(err, FinalizeError::Persistence(_)));
        let store = coordinator.store();
        assert!(!store.tournament("T").is_finalized);
        assert!(store.pick_results.lock().unwrap().is_empty());
        assert!(store.scores.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_leaderboard_is_not_ready() {
        let store = MemoryStore::with_tournaments(vec![tournament("T", start())]);
        let coordinator = coordinator(FakeProvider::new(Vec::new()), store);

        let err = coordinator
            .finalize_by_id("T", FinalizeMode::Normal, after_window())
            .await
            .unwrap_err();

        match err {
            FinalizeError::Provider(e) => assert!(e.is_not_ready()),
            other => panic!("expected provider error, got {:?}", other),
        }
        assert!(!coordinator.store().tournament("T").is_finalized);
        assert!(coordinator.store().cache.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tournament() {
        let coordinator = coordinator(FakeProvider::new(Vec::new()), MemoryStore::default());

        let err = coordinator
            .finalize_by_id("missing", FinalizeMode::Normal, after_window())
            .await
            .unwrap_err();

        assert!(matches!(err, FinalizeError::TournamentNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_batch_continues_past_failures() {
        let early = start() - TimeDelta::days(14);
        let provider = FakeProvider::new(vec![standing("B", "P1", -3, "active")]);
        let mut store = MemoryStore::with_tournaments(vec![
            tournament("A", early),
            tournament("B", start()),
            tournament("C", after_window()),
        ]);
        store.picks = vec![pick("B", "alice", 1, "P1")];
        let coordinator = coordinator(provider, store);

        let summary = coordinator.finalize_due(after_window()).await.unwrap();

        assert_eq!(summary.finalized.len(), 1);
        assert_eq!(summary.finalized[0].tournament_id, "B");
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].tournament_id, "A");
        assert!(summary.failed[0].not_ready);

        let store = coordinator.store();
        assert!(store.tournament("B").is_finalized);
        assert!(!store.tournament("A").is_finalized);
        // C has not reached its window yet.
        assert!(!store.tournament("C").is_finalized);
    }

    #[tokio::test]
    async fn test_finalize_latest_picks_most_recent_due() {
        let early = start() - TimeDelta::days(14);
        let provider = FakeProvider::new(vec![
            standing("A", "P1", -1, "active"),
            standing("B", "P1", -3, "active"),
        ]);
        let store = MemoryStore::with_tournaments(vec![tournament("A", early), tournament("B", start())]);
        let coordinator = coordinator(provider, store);

        let report = coordinator.finalize_latest(after_window()).await.unwrap();

        assert_eq!(report.tournament_id, "B");
        assert!(!coordinator.store().tournament("A").is_finalized);
    }

    #[tokio::test]
    async fn test_finalize_latest_with_nothing_due() {
        let store = MemoryStore::with_tournaments(vec![tournament("T", start())]);
        let coordinator = coordinator(FakeProvider::new(Vec::new()), store);

        let err = coordinator.finalize_latest(start()).await.unwrap_err();

        assert!(matches!(err, FinalizeError::NothingToFinalize));
    }

    #[tokio::test]
    async fn test_invalid_picks_are_skipped_and_reported() {
        let (provider, mut store) = alice_and_bob();
        store.picks.push(pick("T", "carol", 2, "P1"));
        store.picks.push(pick("T", "dave", 9, "P3"));
        let coordinator = coordinator(provider, store);

        let report = coordinator
            .finalize_by_id("T", FinalizeMode::Normal, after_window())
            .await
            .unwrap();

        assert_eq!(report.picks_scored, 2);
        assert_eq!(
            report.skipped,
            vec![
                DataIntegrityError::UnassignedPlayer {
                    username: "carol".to_string(),
                    tier_number: 2,
                    player_id: "P1".to_string(),
                },
                DataIntegrityError::TierOutOfRange {
                    username: "dave".to_string(),
                    tier_number: 9,
                },
            ]
        );
        assert!(report.message().ends_with("(2 picks skipped)"));
        assert!(coordinator.store().score("T", "carol").is_none());
    }

    #[tokio::test]
    async fn test_preview_does_not_persist() {
        let (provider, store) = alice_and_bob();
        let coordinator = coordinator(provider, store);
        let t = coordinator.store().tournament("T");

        let preview = coordinator.preview(&t, after_window()).await.unwrap();

        assert!(preview.revealed);
        assert_eq!(preview.outcome.pick_results.len(), 2);
        assert_eq!(preview.standings.len(), 3);
        let store = coordinator.store();
        assert!(store.cache.lock().unwrap().is_empty());
        assert!(store.pick_results.lock().unwrap().is_empty());
        assert!(!store.tournament("T").is_finalized);
    }

    #[tokio::test]
    async fn test_preview_hides_picks_before_start() {
        let (provider, mut store) = alice_and_bob();
        store.picks.push(pick("T", "carol", 9, "P3"));
        let coordinator = coordinator(provider, store);
        let t = coordinator.store().tournament("T");

        let preview = coordinator
            .preview(&t, start() - TimeDelta::hours(2))
            .await
            .unwrap();

        assert!(!preview.revealed);
        assert_eq!(preview.standings.len(), 3);
        assert!(preview.outcome.pick_results.is_empty());
        assert!(preview.outcome.tournament_scores.is_empty());
        assert!(preview.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_preview_reveals_picks_at_start() {
        let (provider, store) = alice_and_bob();
        let coordinator = coordinator(provider, store);
        let t = coordinator.store().tournament("T");

        let preview = coordinator.preview(&t, start()).await.unwrap();

        assert!(preview.revealed);
        assert_eq!(preview.outcome.tournament_scores.len(), 2);
    }

    #[test]
    fn test_validate_without_assignments_checks_range_only() {
        let rules = RulesetVersion::V1.rules();
        let picks = vec![pick("T", "alice", 5, "P1"), pick("T", "alice", 6, "P2")];

        let (valid, skipped) = validate_picks(picks, &[], &rules);

        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].tier_number, 5);
        assert_eq!(
            skipped,
            vec![DataIntegrityError::TierOutOfRange {
                username: "alice".to_string(),
                tier_number: 6,
            }]
        );
    }
}
