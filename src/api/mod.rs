//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::routing::get;
use axum::{BoxError, Router};
use tower::timeout::{error::Elapsed, TimeoutLayer};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::ledger::LedgerStore;

pub use routes::create_router;

/// Shared handler state: the injected ledger store
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }
}

/// Build the full application: health probe, `/api` routes and layers.
///
/// A request exceeding `request_timeout` is answered with a 408 error envelope
/// and its handler future dropped, which rolls back any open database
/// transaction.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    // Axum layers are applied in reverse order (last added = first executed)
    let api_routes =
        create_router().layer(axum::middleware::from_fn(middleware::logging_middleware));

    Router::new()
        .route("/health", get(routes::health_check))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout_error))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

async fn handle_timeout_error(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        AppError::RequestTimeout
    } else {
        AppError::Internal(err.to_string())
    }
}
