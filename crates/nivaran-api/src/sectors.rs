//! Handlers for `/sectors` endpoints. Sector rows (with their parsed
//! sub-category questionnaires) are read-only reference data.

use axum::{
  Json,
  extract::{Path, State},
};
use nivaran_core::{sector::Sector, store::PortalStore};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `GET /sectors`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Sector>>, ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let sectors = state.store.list_sectors().await.map_err(ApiError::store)?;
  Ok(Json(sectors))
}

/// `GET /sectors/:id` — sub-categories arrive already filtered and
/// de-duplicated; a malformed definition never surfaces here.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Sector>, ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let sector = state
    .store
    .get_sector(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("sector {id} not found")))?;
  Ok(Json(sector))
}
