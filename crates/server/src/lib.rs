//! HTTP API for the sidechain ledger.
//!
//! The router is assembled by [`app`]; handlers run ledger work on the
//! blocking pool and convert ledger errors to status codes in [`error`].

pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::blocks::router())
        .merge(routes::transactions::router())
        .merge(routes::slots::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
