//! Handler for `GET /dashboard`.
//!
//! A client-style reduce done server-side: fetch the scoped complaint rows,
//! group by status bucket and by sector name. Nothing is persisted; the
//! summary is recomputed on every request.

use std::collections::HashMap;

use axum::{
  Json,
  extract::{Query, State},
  http::HeaderMap,
};
use nivaran_core::{
  dashboard::{DashboardSummary, summarize},
  store::{ComplaintQuery, ComplaintScope, PortalStore},
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::authenticate,
  complaints::Scope,
  error::ApiError,
};

// Aggregation must see every row in scope, not the listing default page.
const AGGREGATION_LIMIT: usize = 10_000;

#[derive(Debug, Deserialize)]
pub struct Params {
  #[serde(default)]
  pub scope: Scope,
}

/// `GET /dashboard[?scope=mine]`
///
/// Reads at most `AGGREGATION_LIMIT` of the newest rows in scope; past
/// that the summary is a truncated approximation of the full corpus.
pub async fn summary<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Query(params): Query<Params>,
) -> Result<Json<DashboardSummary>, ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let scope = match params.scope {
    Scope::Public => ComplaintScope::Public,
    Scope::Mine => {
      let profile = authenticate(state.store.as_ref(), &headers).await?;
      ComplaintScope::Mine(profile.profile_id)
    }
  };

  let query = ComplaintQuery {
    scope,
    limit: Some(AGGREGATION_LIMIT),
    ..ComplaintQuery::public()
  };
  let complaints = state
    .store
    .list_complaints(&query)
    .await
    .map_err(ApiError::store)?;

  let sector_names: HashMap<_, _> = state
    .store
    .list_sectors()
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|s| (s.sector_id, s.name))
    .collect();

  Ok(Json(summarize(&complaints, &sector_names)))
}
