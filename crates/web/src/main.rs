use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use finalizer::{
    FinalizationCoordinator, LeaderboardClient, LeaderboardConfig, PgCoordinator, PgStore,
    spawn_scheduler,
};
use storage::Database;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;
mod state;

use config::Config;
use middleware::auth::ApiKeys;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::tournaments::handlers::list_tournaments,
        features::tournaments::handlers::get_current_tournament,
        features::tournaments::handlers::list_tiers,
        features::tournaments::handlers::get_picks,
        features::tournaments::handlers::get_user_picks,
        features::tournaments::handlers::submit_picks,
        features::tournaments::handlers::get_results,
        features::tournaments::handlers::get_live_results,
        features::season::handlers::get_season_standings,
        features::admin::handlers::finalize_latest,
        features::admin::handlers::finalize_tournament,
        features::admin::handlers::set_tiers,
    ),
    components(
        schemas(
            storage::models::Tournament,
            storage::models::Pick,
            storage::models::PickResult,
            storage::models::TournamentScore,
            storage::models::PlayerStanding,
            storage::models::TierAssignment,
            storage::dto::tiers::TierPlayer,
            storage::dto::tiers::TierRoster,
            storage::dto::tiers::SetTiersRequest,
            storage::dto::picks::PickSelection,
            storage::dto::picks::SubmitPicksRequest,
            storage::dto::picks::PicksResponse,
            storage::dto::results::PickResultView,
            storage::dto::results::TournamentResultsResponse,
            storage::dto::results::LiveResultsResponse,
            storage::dto::season::SeasonStanding,
            features::admin::handlers::FinalizeResponse,
        )
    ),
    tags(
        (name = "tournaments", description = "Tournament schedule and tiers"),
        (name = "picks", description = "Submitting and viewing picks"),
        (name = "results", description = "Final and live tournament results"),
        (name = "season", description = "Season standings"),
        (name = "admin", description = "Finalization and tier management"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

fn app(state: AppState, api_keys: ApiKeys) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    let api = Router::new()
        .nest(
            "/tournaments",
            features::tournaments::routes::routes(api_keys.clone()),
        )
        .nest("/season", features::season::routes::routes())
        .nest("/admin", features::admin::routes::routes(api_keys));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        .layer(cors)
        .with_state(state)
}

fn build_coordinator(config: &Config, db: Database) -> anyhow::Result<PgCoordinator> {
    let mut provider_config =
        LeaderboardConfig::new(config.rapidapi_key.clone()).with_timeout(config.provider_timeout);
    if let Some(base_url) = &config.leaderboard_base_url {
        provider_config = provider_config.with_base_url(base_url.clone());
    }
    let client =
        LeaderboardClient::new(provider_config).context("Failed to build leaderboard client")?;

    Ok(FinalizationCoordinator::new(
        client,
        PgStore::new(db),
        config.ruleset.rules(),
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting golf pick'em API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded, scoring ruleset {}", config.ruleset);

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    if api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty, protected endpoints will reject every request");
    }

    let coordinator = Arc::new(build_coordinator(&config, db.clone())?);

    if config.rapidapi_key.is_empty() {
        tracing::warn!("RAPIDAPI_KEY is not set, automatic finalization is disabled");
    } else if config.finalize_interval.is_zero() {
        tracing::warn!("FINALIZE_INTERVAL_SECS is 0, automatic finalization is disabled");
    } else {
        tracing::info!(
            "Automatic finalization every {}s",
            config.finalize_interval.as_secs()
        );
        spawn_scheduler(coordinator.clone(), config.finalize_interval);
    }

    let state = AppState::new(db, coordinator);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app(state, api_keys))
        .await
        .context("Server error")?;

    Ok(())
}
