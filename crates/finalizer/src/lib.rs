pub mod coordinator;
pub mod error;
pub mod postgres;
pub mod provider;
pub mod traits;

pub use coordinator::{
    BatchFailure, BatchSummary, FinalizationCoordinator, FinalizeMode, FinalizeReport, Preview,
    spawn_scheduler, validate_picks,
};
pub use error::{DataIntegrityError, FinalizeError, ProviderError, Result};
pub use postgres::PgStore;
pub use provider::{LeaderboardClient, LeaderboardConfig};
pub use traits::{FinalizationStore, LeaderboardProvider, ScoreCache};

/// Coordinator wired to the live provider and Postgres.
pub type PgCoordinator = FinalizationCoordinator<LeaderboardClient, PgStore>;
