//! Main [axum::Router] interface for webserver.

use crate::{
    app_state::AppState,
    middleware::logging::{log_request_response, DebugOnlyLogger, Logger},
    routes::{fallback::notfound_404, health, index, ping},
    setups::ServerSetup,
};
use axum::{routing::get, Router};

/// Setup main router for application.
pub fn setup_app_router<S: ServerSetup>(app_state: AppState<S>) -> Router {
    let mut router = Router::new()
        .route("/", get(index::get).post(index::post::<S>))
        .route("/ping", get(ping::get))
        .fallback(notfound_404)
        .with_state(app_state.clone());

    // Logging layer
    router = router.layer(axum::middleware::from_fn(log_request_response::<Logger>));

    // Healthcheck layer
    let mut healthcheck_router = Router::new()
        .route("/healthcheck", get(health::healthcheck::<S>))
        .with_state(app_state);

    healthcheck_router = healthcheck_router.layer(axum::middleware::from_fn(
        log_request_response::<DebugOnlyLogger>,
    ));

    Router::merge(router, healthcheck_router)
}
