use axum::{
    Router, middleware,
    routing::{get, put},
};

use super::handlers::{
    get_current_tournament, get_live_results, get_picks, get_results, get_user_picks,
    list_tiers, list_tournaments, submit_picks,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/:id/picks", put(submit_picks))
        .route("/:id/picks/:username", get(get_user_picks))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_tournaments))
        .route("/current", get(get_current_tournament))
        .route("/:id/tiers", get(list_tiers))
        .route("/:id/picks", get(get_picks))
        .route("/:id/results", get(get_results))
        .route("/:id/live", get(get_live_results))
        .merge(protected)
}
