//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: which store and cache back the façades
//! - `routes/`: HTTP routes + handlers (one file per entity)
//! - `dto.rs`: query/body shapes and their mapping to domain input
//! - `errors.rs`: the JSON error body every failure renders as
//! - `extract.rs`: extractors that reject with that body
//! - `seed.rs`: optional sample catalog

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod seed;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(services: AppServices) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", routes::router())
        .fallback(routes::system::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_context))
                .layer(Extension(Arc::new(services))),
        )
}
