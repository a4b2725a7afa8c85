use axum::{
    Router, middleware,
    routing::{post, put},
};

use super::handlers::{finalize_latest, finalize_tournament, set_tiers};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

/// Every admin route requires an API key.
pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/finalize", post(finalize_latest))
        .route("/tournaments/:id/finalize", post(finalize_tournament))
        .route("/tournaments/:id/tiers", put(set_tiers))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
