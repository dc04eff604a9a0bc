mod api;
mod auth;
mod config;
mod db;
mod error;
mod models;
mod recipes;
mod schema;
mod slug;
mod store;
mod telemetry;
#[cfg(test)]
mod test_support;
mod views;

use anyhow::Context as _;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware;
use axum::Router;
use config::Config;
use recipes::RecipeService;
use std::sync::Arc;
use store::{PgStore, SharedStore};
use tower_http::trace::TraceLayer;
use tracing::Span;
use views::Views;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub config: Arc<Config>,
    pub views: Arc<Views>,
    pub recipes: Arc<RecipeService>,
}

impl AppState {
    pub fn new(store: SharedStore, config: Config) -> Result<Self, tera::Error> {
        let recipes = RecipeService::new(store.clone(), config.page_size);
        Ok(Self {
            store,
            config: Arc::new(config),
            views: Arc::new(Views::new()?),
            recipes: Arc::new(recipes),
        })
    }
}

/// The router plus request tracing and query counting.
fn app(state: AppState) -> Router {
    let track_db_query_count = state.config.track_db_query_count;

    let router = api::router(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str)
                    .unwrap_or(request.uri().path());

                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %matched_path,
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::http::Response<_>,
                 latency: std::time::Duration,
                 _span: &Span| {
                    let status = response.status().as_u16();
                    if status >= 500 {
                        tracing::error!(
                            status = %status,
                            latency_ms = %latency.as_millis(),
                            "request failed with server error"
                        );
                    } else {
                        tracing::info!(
                            status = %status,
                            latency_ms = %latency.as_millis(),
                            db_queries = telemetry::get_query_count().unwrap_or(0),
                            "request completed"
                        );
                    }
                },
            )
            .on_failure(
                |error: tower_http::classify::ServerErrorsFailureClass,
                 latency: std::time::Duration,
                 _span: &Span| {
                    tracing::error!(
                        error = %error,
                        latency_ms = %latency.as_millis(),
                        "request failed"
                    );
                },
            ),
    );

    let router = if track_db_query_count {
        router.layer(middleware::from_fn(
            telemetry::db_query_count_header_middleware,
        ))
    } else {
        router
    };

    router.layer(middleware::from_fn(telemetry::query_counting_middleware))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry();

    let config = Config::from_env().context("invalid configuration")?;

    let pool = db::create_pool(&config.database_url).context("failed to set up database")?;
    let store: SharedStore = Arc::new(PgStore::new(pool));

    // A broken seed leaves the site usable for everything but admin login.
    match auth::seed::seed_roles_and_admin(
        store.as_ref(),
        config.seed_admin.as_ref(),
        config.password_hashing(),
    ) {
        Ok(report) => tracing::info!(
            roles_created = ?report.roles_created,
            admin_created = report.admin_created,
            admin_role_granted = report.admin_role_granted,
            "seeding finished"
        ),
        Err(e) => tracing::error!("An error occurred seeding the DB: {}", e),
    }

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(store, config).context("failed to load templates")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
