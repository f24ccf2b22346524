// crates/server/src/routes/search.rs
//! Search endpoint.
//!
//! - GET /search?q=...&metadata.<key>=<value>&lat=...&lon=...&radius=...
//!
//! Every predicate is optional; applied predicates are intersected by the
//! query planner. `metadata.<key>` pairs repeat freely and are ANDed. The
//! three geo parameters travel together — a partial triple is a client
//! error rather than a silently dropped filter.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use wikidex_index::QueryPlan;
use wikidex_types::GeoFilter;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const METADATA_PREFIX: &str = "metadata.";

/// Build the search sub-router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/search", get(search_handler))
}

/// GET /search — Execute a multi-predicate search, returning matching ids.
///
/// The result is a JSON array of ids, sorted ascending; the order carries
/// no ranking meaning. With no predicates at all, every indexed id is
/// returned.
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<i64>>> {
    let plan = parse_query(params)?;
    let ids = state.store.search(&plan).await?;
    Ok(Json(ids))
}

/// Turn raw query pairs into a `QueryPlan`.
fn parse_query(params: Vec<(String, String)>) -> Result<QueryPlan, ApiError> {
    let mut plan = QueryPlan::default();
    let mut lat = None;
    let mut lon = None;
    let mut radius = None;

    for (key, value) in params {
        match key.as_str() {
            "q" => plan.text = Some(value),
            "lat" => lat = Some(parse_coord("lat", &value)?),
            "lon" => lon = Some(parse_coord("lon", &value)?),
            "radius" => radius = Some(parse_coord("radius", &value)?),
            _ if key.starts_with(METADATA_PREFIX) => {
                plan.metadata
                    .push((key[METADATA_PREFIX.len()..].to_string(), value));
            }
            // Unknown parameters are ignored, not rejected
            _ => {}
        }
    }

    plan.geo = match (lat, lon, radius) {
        (None, None, None) => None,
        (Some(lat), Some(lon), Some(radius_km)) => Some(GeoFilter { lat, lon, radius_km }),
        _ => {
            return Err(ApiError::BadRequest(
                "lat, lon and radius must be supplied together".to_string(),
            ))
        }
    };

    Ok(plan)
}

fn parse_coord(name: &str, value: &str) -> Result<f64, ApiError> {
    value
        .parse::<f64>()
        .map_err(|_| ApiError::BadRequest(format!("invalid {} value: {}", name, value)))
}
