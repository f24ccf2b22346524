// crates/server/src/routes/mod.rs
//! HTTP route handlers, one module per endpoint group.

pub mod health;
pub mod index;
pub mod search;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Assemble every API route with the shared application state.
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router())
        .merge(index::router())
        .merge(search::router())
        .with_state(state)
}
