//! HTTP API server for the bookstore.
//!
//! Serves the catalog, per-item order creation and purchase history,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use checkout::InMemoryOrderGateway;
use metrics_exporter_prometheus::PrometheusHandle;
use purchase_store::PurchaseStore;
use storefront::StaticCatalog;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{Config, LogFormat};
pub use error::ApiError;
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<P: PurchaseStore + 'static>(
    state: Arc<AppState<P>>,
    metrics_handle: PrometheusHandle,
    cors_origin: &str,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/books", get(routes::books::list::<P>))
        .route("/api/books/{id}", get(routes::books::get::<P>))
        .route("/api/orders", post(routes::orders::create::<P>))
        .route(
            "/api/users/{uid}/purchases",
            get(routes::purchases::list::<P>).post(routes::purchases::create::<P>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match HeaderValue::from_str(origin) {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            tracing::warn!(%origin, "invalid CORS origin, allowing any");
            AllowOrigin::any()
        }
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Creates the default application state: bundled catalog and in-memory orders.
pub fn create_default_state<P: PurchaseStore + 'static>(purchases: P) -> Arc<AppState<P>> {
    Arc::new(AppState::new(
        StaticCatalog::bundled(),
        InMemoryOrderGateway::new(),
        purchases,
    ))
}
