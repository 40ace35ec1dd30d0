//! JSON REST API for the Nivaran portal.
//!
//! Exposes an axum [`Router`] backed by any
//! [`nivaran_core::store::PortalStore`]. TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", nivaran_api::api_router(state))
//! ```

pub mod assistant;
pub mod auth;
pub mod blobs;
pub mod community;
pub mod complaints;
pub mod dashboard;
pub mod error;
pub mod sectors;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post, put},
};
use nivaran_core::store::PortalStore;

pub use blobs::BlobStore;
pub use error::ApiError;

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store: Arc<S>,
  pub blobs: Arc<BlobStore>,
}

// Derived `Clone` would require `S: Clone`.
impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      blobs: Arc::clone(&self.blobs),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: PortalStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Auth & profile
    .route("/auth/signup", post(auth::signup::<S>))
    .route("/auth/login", post(auth::login::<S>))
    .route("/me", get(auth::me::<S>))
    .route("/me/language", put(auth::set_language::<S>))
    // Sectors
    .route("/sectors", get(sectors::list::<S>))
    .route("/sectors/{id}", get(sectors::get_one::<S>))
    // Complaints
    .route(
      "/complaints",
      get(complaints::list::<S>).post(complaints::create::<S>),
    )
    .route("/complaints/preflight", post(complaints::preflight))
    .route("/complaints/{id}", get(complaints::get_one::<S>))
    .route("/complaints/{id}/status", post(complaints::set_status::<S>))
    .route(
      "/complaints/{id}/updates",
      get(complaints::list_updates::<S>).post(complaints::add_update::<S>),
    )
    // Dashboard
    .route("/dashboard", get(dashboard::summary::<S>))
    // Community
    .route(
      "/community",
      get(community::list::<S>).post(community::create::<S>),
    )
    .route("/community/{id}", get(community::get_one::<S>))
    .route("/community/{id}/upvote", post(community::upvote::<S>))
    // Assistant
    .route("/assistant", post(assistant::message))
    // Inline base64 attachments overflow axum's default 2 MB body cap.
    .layer(DefaultBodyLimit::max(32 * 1024 * 1024))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::{Path, PathBuf};

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use nivaran_core::submission::MAX_ATTACHMENT_BYTES;
  use nivaran_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  async fn make_state() -> (AppState<SqliteStore>, PathBuf) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let dir =
      std::env::temp_dir().join(format!("nivaran-api-{}", Uuid::new_v4()));
    let blobs = BlobStore::new(&dir);
    blobs.ensure_dir().await.unwrap();

    let state = AppState {
      store: Arc::new(store),
      blobs: Arc::new(blobs),
    };
    (state, dir)
  }

  async fn oneshot_json(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder =
        builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let resp = api_router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  /// Sign up a fresh user and return their bearer token.
  async fn signup(state: &AppState<SqliteStore>, email: &str) -> String {
    let (status, body) = oneshot_json(
      state.clone(),
      "POST",
      "/auth/signup",
      None,
      Some(json!({
        "name": "Asha Rao",
        "email": email,
        "password": "correct horse battery",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_owned()
  }

  fn upload(name: &str, media_type: &str, bytes: &[u8]) -> Value {
    json!({
      "name": name,
      "media_type": media_type,
      "data_base64": B64.encode(bytes),
    })
  }

  fn blob_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
  }

  // ── Updates ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_thread_requires_auth() {
    let (state, dir) = make_state().await;
    let token = signup(&state, "asha@example.org").await;

    let (status, created) = oneshot_json(
      state.clone(),
      "POST",
      "/complaints",
      Some(&token),
      Some(json!({
        "title": "Leaking main",
        "description": "Water pooling since Monday.",
        "submission_type": "complaint",
        "is_public": false,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["complaint"]["complaint_id"].as_str().unwrap().to_owned();

    // The thread of a private complaint is not readable anonymously.
    let (status, _) = oneshot_json(
      state.clone(),
      "GET",
      &format!("/complaints/{id}/updates"),
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, updates) = oneshot_json(
      state.clone(),
      "GET",
      &format!("/complaints/{id}/updates"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updates.as_array().unwrap().len(), 0);

    tokio::fs::remove_dir_all(&dir).await.ok();
  }

  // ── Submission pipeline ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn submission_stores_accepted_blobs_and_reports_rejected() {
    let (state, dir) = make_state().await;
    let token = signup(&state, "asha@example.org").await;

    let oversize = vec![0u8; MAX_ATTACHMENT_BYTES as usize + 1];
    let (status, body) = oneshot_json(
      state.clone(),
      "POST",
      "/complaints",
      Some(&token),
      Some(json!({
        "title": "Streetlight out",
        "description": "Dark corner at the school gate.",
        "submission_type": "complaint",
        "attachments": [
          upload("corner.png", "image/png", b"not really a png"),
          upload("survey.pdf", "application/pdf", &oversize),
        ],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {body}");

    let rejected = body["rejected_files"].as_array().unwrap();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0]["name"], "survey.pdf");

    let attachments = body["complaint"]["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0]["name"], "corner.png");

    // The accepted blob is on disk, and nothing else is.
    let path = attachments[0]["path"].as_str().unwrap();
    assert!(dir.join(path).exists());
    assert_eq!(blob_count(&dir), 1);

    tokio::fs::remove_dir_all(&dir).await.ok();
  }

  #[tokio::test]
  async fn failed_insert_leaves_no_blobs_behind() {
    let (state, dir) = make_state().await;

    // A sector id that satisfies the questionnaire check (no answers to
    // validate) but violates the foreign key on insert, after the blob
    // has already been written.
    let (status, _) = oneshot_json(
      state.clone(),
      "POST",
      "/complaints",
      None,
      Some(json!({
        "title": "Pothole",
        "description": "Axle-deep near the market.",
        "submission_type": "complaint",
        "sector_id": Uuid::new_v4(),
        "attachments": [
          upload("pothole.jpg", "image/jpeg", b"jpeg-ish bytes"),
        ],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(blob_count(&dir), 0);

    tokio::fs::remove_dir_all(&dir).await.ok();
  }
}
