use axum::{Router, routing::get};

use super::handlers::get_season_standings;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/standings", get(get_season_standings))
}
