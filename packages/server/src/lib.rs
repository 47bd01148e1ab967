pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod search;
pub mod state;
pub mod sync;

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AOJ Submission Mirror API",
        version = "1.0.0",
        description = "Mirrors Aizu Online Judge submissions and serves ranked, paginated searches over them"
    ),
    tags(
        (name = "Submissions", description = "Ranked submission search"),
        (name = "Health", description = "Service liveness"),
    ),
)]
struct ApiDoc;

/// Cross-origin policy for the browser front end. Only `POST` with a
/// `Content-Type` header is allowed from the configured origins.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(config.max_age));

    // `AllowOrigin::list` rejects the wildcard.
    if config.allow_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(routes::api_routes())
        .split_for_parts();

    router
        .with_state(state)
        .merge(Scalar::with_url("/scalar", api))
        .layer(cors)
}
