// crates/server/src/lib.rs
//! Wikidex index server library.
//!
//! An Axum-based HTTP surface over the index store: document upsert and
//! delete, multi-predicate search, and a liveness probe. The owning wiki
//! application pushes document state here after each authoritative commit
//! and queries `/search` for id filtering; it never shares a database or a
//! transaction scope with this service.

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::api_routes;
pub use state::AppState;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use wikidex_index::Store;

/// Create the Axum application with all routes and middleware.
///
/// This sets up:
/// - API routes (health, index, search)
/// - CORS for development (allows any origin)
/// - Request tracing
pub fn create_app(store: Store) -> Router {
    let state = AppState::new(store);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api_routes(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================
