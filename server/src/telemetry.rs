//! Logging setup and per-request database query counting.

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use tracing::{span::Id, Subscriber};
use tracing_subscriber::{
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Span name opened around every store query.
pub const DB_QUERY_SPAN: &str = "db.query";

tokio::task_local! {
    /// Queries issued by the current request. Follows the request's task
    /// across await points and worker threads.
    static DB_QUERY_COUNTER: Arc<AtomicU32>;
}

/// Console logging filtered by `RUST_LOG`, plus query counting.
pub fn init_telemetry() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(DbQueryCountingLayer)
        .init();
}

pub fn get_query_count() -> Option<u32> {
    DB_QUERY_COUNTER
        .try_with(|counter| counter.load(Ordering::Relaxed))
        .ok()
}

/// Counts `db.query` spans into the task-local counter set up by
/// [`query_counting_middleware`]. Store calls are synchronous inside the
/// handler's task, so the counter is always the one for the right request.
pub struct DbQueryCountingLayer;

impl<S> Layer<S> for DbQueryCountingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, _attrs: &tracing::span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        if span.name() == DB_QUERY_SPAN {
            let _ = DB_QUERY_COUNTER.try_with(|counter| {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }
    }
}

/// Installs a fresh counter for the request. Must wrap the TraceLayer so the
/// whole request runs inside the scope.
pub async fn query_counting_middleware(request: Request<Body>, next: Next) -> Response {
    let counter = Arc::new(AtomicU32::new(0));
    DB_QUERY_COUNTER.scope(counter, next.run(request)).await
}

/// Adds `X-DB-Query-Count`. Only layered when the config enables it.
pub async fn db_query_count_header_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    if let Some(count) = get_query_count() {
        if let Ok(value) = HeaderValue::from_str(&count.to_string()) {
            response.headers_mut().insert("X-DB-Query-Count", value);
        }
    }

    response
}
