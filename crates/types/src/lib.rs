// crates/types/src/lib.rs
//! Shared wire and domain types for the wikidex index service.
//!
//! Both the index server and the sync client embedded in the owning
//! application speak the same JSON shapes, so they live here rather than in
//! either side's crate.

pub mod geo;

pub use geo::{haversine_km, BoundingBox, GeoFilter, GeoPoint};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A document as held by the index: the owning system's stable id plus the
/// searchable and filterable projections of its content.
///
/// At most one `IndexDocument` exists per id; re-indexing an id replaces
/// every field wholesale (delete-then-insert, never a merge).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Stable identifier assigned by the owning system, never generated here.
    pub id: i64,
    /// Informational title, full-text searchable alongside the body.
    #[serde(default)]
    pub title: String,
    /// Primary searchable content.
    #[serde(default)]
    pub body: String,
    /// String-keyed scalar metadata, stored for exact-match filtering only.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Tag labels. Stored alongside the document; not consulted by the
    /// query planner.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Present only when the owning document has geocoded coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

impl IndexDocument {
    pub fn new(id: i64, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.location = Some(GeoPoint::new(lat, lon));
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Build the `POST /index` wire payload for this document.
    pub fn to_request(&self) -> IndexRequest {
        IndexRequest {
            id: Some(self.id),
            title: Some(self.title.clone()),
            body: Some(self.body.clone()),
            metadata: if self.metadata.is_empty() {
                None
            } else {
                Some(
                    self.metadata
                        .iter()
                        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                        .collect(),
                )
            },
            tags: if self.tags.is_empty() {
                None
            } else {
                Some(self.tags.iter().cloned().collect())
            },
            lat: self.location.map(|p| p.lat),
            lon: self.location.map(|p| p.lon),
        }
    }
}

/// The `id` field was absent from an index request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("id is required")]
pub struct MissingId;

/// The `POST /index` request body.
///
/// Everything except `id` is optional; metadata values may be any JSON
/// scalar and are coerced to strings for storage and comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl IndexRequest {
    /// Validate the payload into a storable document.
    ///
    /// A location is recorded only when both `lat` and `lon` are present;
    /// `null` metadata values are dropped.
    pub fn into_document(self) -> Result<IndexDocument, MissingId> {
        let id = self.id.ok_or(MissingId)?;

        let metadata = self
            .metadata
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(k, v)| scalar_to_string(&v).map(|s| (k, s)))
            .collect();

        let location = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        };

        Ok(IndexDocument {
            id,
            title: self.title.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            metadata,
            tags: self.tags.unwrap_or_default().into_iter().collect(),
            location,
        })
    }
}

/// Coerce a JSON scalar to its string form for equality filtering.
///
/// Strings are taken verbatim; numbers and booleans use their JSON text.
/// `null` and structured values yield `None` and are not stored.
fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            None
        }
    }
}

/// Acknowledgment body for index mutations and liveness probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn indexed() -> Self {
        Self { status: "indexed".to_string() }
    }

    pub fn deleted() -> Self {
        Self { status: "deleted".to_string() }
    }

    pub fn ok() -> Self {
        Self { status: "ok".to_string() }
    }
}

/// A `GET /search` query as the client builds it: every predicate optional,
/// applied predicates intersected by the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    /// Full-text query against title and body.
    pub q: Option<String>,
    /// Metadata equality predicates, ANDed.
    pub metadata: Vec<(String, String)>,
    /// Radius filter; all three components travel together.
    pub geo: Option<GeoFilter>,
}

impl SearchParams {
    pub fn text(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    pub fn with_geo(mut self, lat: f64, lon: f64, radius_km: f64) -> Self {
        self.geo = Some(GeoFilter { lat, lon, radius_km });
        self
    }

    /// Flatten into URL query pairs: `q`, `metadata.<key>`, `lat`/`lon`/`radius`.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(q) = &self.q {
            pairs.push(("q".to_string(), q.clone()));
        }
        for (key, value) in &self.metadata {
            pairs.push((format!("metadata.{}", key), value.clone()));
        }
        if let Some(geo) = &self.geo {
            pairs.push(("lat".to_string(), geo.lat.to_string()));
            pairs.push(("lon".to_string(), geo.lon.to_string()));
            pairs.push(("radius".to_string(), geo.radius_km.to_string()));
        }
        pairs
    }
}
