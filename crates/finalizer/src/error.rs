use storage::error::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FinalizeError>;

/// Failures talking to the leaderboard provider. All of them are recoverable:
/// the next scheduled pass simply tries again.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[source] reqwest::Error),

    #[error("Leaderboard request timed out after {0}s")]
    Timeout(u64),

    #[error("Leaderboard API returned {status}: {body}")]
    StatusError { status: u16, body: String },

    #[error("Failed to parse leaderboard JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Leaderboard response is missing '{0}'")]
    MissingField(&'static str),

    #[error("Leaderboard is empty")]
    EmptyLeaderboard,
}

impl ProviderError {
    /// Errors that only mean "the tournament has no standings yet"
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::EmptyLeaderboard | Self::MissingField(_))
    }
}

/// A pick that cannot be scored. The pick is skipped; the rest of the
/// tournament is still finalized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    #[error("{username} picked tier {tier_number}, which the ruleset does not have")]
    TierOutOfRange { username: String, tier_number: i16 },

    #[error("{username} picked player {player_id} in tier {tier_number}, but that player is not assigned to it")]
    UnassignedPlayer {
        username: String,
        tier_number: i16,
        player_id: String,
    },
}

#[derive(Error, Debug)]
pub enum FinalizeError {
    #[error("Leaderboard not available: {0}")]
    Provider(#[from] ProviderError),

    #[error("Persistence failed: {0}")]
    Persistence(#[from] StorageError),

    #[error("Tournament {0} not found")]
    TournamentNotFound(String),

    #[error("No tournament is due for finalization")]
    NothingToFinalize,
}
