use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use vietpdf::broker::JobQueue;
use vietpdf::config::HttpConfig;
use vietpdf::store::JobStore;

use crate::handlers;
use crate::state::AppState;

pub fn router<S, Q>(state: AppState<S, Q>, http: &HttpConfig) -> Router
where
    S: JobStore + Clone + Send + Sync + 'static,
    Q: JobQueue + Send + Sync + 'static,
{
    Router::new()
        .route("/api/upload", post(handlers::upload::<S, Q>))
        .route("/api/status/{job_id}", get(handlers::status::<S, Q>))
        .route("/api/download/{job_id}", get(handlers::download::<S, Q>))
        .layer(DefaultBodyLimit::max(http.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(http))
        .with_state(state)
}

/// Permissive CORS when no origins are configured (development); otherwise
/// restricted to the configured frontend origins. Misconfigured origins
/// fail at startup rather than serving a broken policy.
fn build_cors_layer(http: &HttpConfig) -> CorsLayer {
    if http.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = http
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{origin}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}
