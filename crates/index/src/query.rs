// crates/index/src/query.rs
//! The query planner: combine optional text, metadata, and spatial
//! predicates into one id set by intersection.

use std::collections::HashSet;

use wikidex_types::GeoFilter;

use crate::{Store, StoreResult};

/// A parsed search request. Each predicate is independent and optional;
/// the planner applies only the predicates that are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPlan {
    /// Full-text query. `None` or blank means the text predicate is not
    /// applied — never "matches nothing".
    pub text: Option<String>,
    /// Metadata equality predicates, ANDed together.
    pub metadata: Vec<(String, String)>,
    /// Radius filter. Applied only when fully supplied; a query with no
    /// geo parameters is never constrained by the spatial index.
    pub geo: Option<GeoFilter>,
}

impl QueryPlan {
    /// The effective text predicate: blank queries count as absent.
    fn text_predicate(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// True when no predicate at all is applied.
    pub fn is_unconstrained(&self) -> bool {
        self.text_predicate().is_none() && self.metadata.is_empty() && self.geo.is_none()
    }
}

impl Store {
    /// Execute a query plan: intersect every applied predicate's id set.
    ///
    /// With zero applied predicates the full indexed id set is returned —
    /// the documented behavior, chosen over an error so that callers can
    /// browse "everything indexed".
    ///
    /// Ids come back sorted ascending for a deterministic wire shape; the
    /// order carries no ranking meaning. Callers needing ranked results
    /// re-rank against their own authoritative store.
    pub async fn search(&self, plan: &QueryPlan) -> StoreResult<Vec<i64>> {
        let mut result: Option<HashSet<i64>> = None;

        if let Some(q) = plan.text_predicate() {
            intersect(&mut result, self.search_text(q).await?);
        }

        for (key, value) in &plan.metadata {
            if matches!(&result, Some(ids) if ids.is_empty()) {
                break;
            }
            intersect(&mut result, self.search_metadata(key, value).await?);
        }

        if let Some(geo) = &plan.geo {
            if !matches!(&result, Some(ids) if ids.is_empty()) {
                intersect(&mut result, self.search_bbox(geo).await?);
            }
        }

        let ids = match result {
            Some(ids) => ids,
            None => self.all_ids().await?,
        };

        let mut ids: Vec<i64> = ids.into_iter().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

/// Intersect the accumulator with the next predicate's id set. The first
/// applied predicate seeds the accumulator.
fn intersect(acc: &mut Option<HashSet<i64>>, ids: HashSet<i64>) {
    match acc {
        Some(existing) => existing.retain(|id| ids.contains(id)),
        None => *acc = Some(ids),
    }
}
