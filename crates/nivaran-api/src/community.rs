//! Handlers for `/community` endpoints.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
};
use nivaran_core::{
  community::{CommunityPost, NewPost, PostType},
  store::{PortalStore, PostQuery},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::authenticate, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub post_type: Option<PostType>,
  pub sector_id: Option<Uuid>,
  /// Free-text filter over title and content.
  pub search:    Option<String>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

/// `GET /community[?post_type=...][&search=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<CommunityPost>>, ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = PostQuery {
    post_type: params.post_type,
    sector_id: params.sector_id,
    text:      params.search,
    limit:     params.limit,
    offset:    params.offset,
  };
  let posts = state
    .store
    .list_posts(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(posts))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:     String,
  pub content:   String,
  pub post_type: PostType,
  pub sector_id: Option<Uuid>,
}

/// `POST /community`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<CommunityPost>), ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let author = authenticate(state.store.as_ref(), &headers).await?;
  if body.title.trim().is_empty() || body.content.trim().is_empty() {
    return Err(ApiError::BadRequest("title and content are required".into()));
  }

  let post = state
    .store
    .create_post(NewPost {
      title:     body.title,
      content:   body.content,
      post_type: body.post_type,
      sector_id: body.sector_id,
      author_id: Some(author.profile_id),
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(post)))
}

/// `GET /community/:id` — viewing a post bumps its view counter.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CommunityPost>, ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if state
    .store
    .get_post(id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::NotFound(format!("post {id} not found")));
  }
  let post = state.store.record_view(id).await.map_err(ApiError::store)?;
  Ok(Json(post))
}

/// `POST /community/:id/upvote`
pub async fn upvote<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CommunityPost>, ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  match state.store.upvote_post(id).await {
    Ok(post) => Ok(Json(post)),
    Err(e) => Err(ApiError::NotFound(format!("post {id} not found: {e}"))),
  }
}
