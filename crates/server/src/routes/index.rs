// crates/server/src/routes/index.rs
//! Index mutation endpoints.
//!
//! - POST /index — upsert a document (replace any prior entry wholesale)
//! - DELETE /index/{id} — remove a document; idempotent

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, post},
    Json, Router,
};
use wikidex_types::{IndexRequest, StatusResponse};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Build the index sub-router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/index", post(index_document))
        .route("/index/{id}", delete(delete_document))
}

/// POST /index — Upsert a document into every sub-store.
///
/// `id` is required; everything else is optional. A location is recorded
/// only when both `lat` and `lon` are present. Malformed JSON and a
/// missing `id` are client errors (400).
async fn index_document(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IndexRequest>, JsonRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let Json(request) =
        payload.map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {}", e.body_text())))?;

    let doc = request
        .into_document()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state.store.upsert(&doc).await?;
    Ok(Json(StatusResponse::indexed()))
}

/// DELETE /index/{id} — Remove a document from every sub-store.
///
/// Always succeeds: deleting an id that was never indexed is a no-op.
async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<StatusResponse>> {
    state.store.delete(id).await?;
    Ok(Json(StatusResponse::deleted()))
}
