use std::sync::Arc;

use finalizer::PgCoordinator;
use storage::Database;
use storage::services::scoring::ScoringRules;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub coordinator: Arc<PgCoordinator>,
}

impl AppState {
    pub fn new(db: Database, coordinator: Arc<PgCoordinator>) -> Self {
        Self { db, coordinator }
    }

    pub fn rules(&self) -> &ScoringRules {
        self.coordinator.rules()
    }
}
