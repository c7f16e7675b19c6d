//! Axum router wiring.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport::http};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/metrics", get(ops::metrics))
        .route("/v1/identities", get(http::list_identities))
        .route("/v1/attributes", get(http::list_attributes))
        .route("/v1/attribute", get(http::read_attribute))
        .route("/v1/samples", post(http::ingest))
        .with_state(state)
}
