//! Bearer-token authentication and profile endpoints.
//!
//! Signup stores an argon2 PHC hash; login verifies it and issues a random
//! token whose SHA-256 digest is persisted. Only the digest is ever stored
//! — a leaked database does not leak live tokens.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};
use nivaran_core::{
  profile::{Profile, Role},
  store::{NewProfile, PortalStore},
};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AppState, error::ApiError};

// ─── Token helpers ────────────────────────────────────────────────────────────

fn generate_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

pub fn token_digest(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::BadRequest(format!("unhashable password: {e}")))
}

fn verify_password(stored_hash: &str, password: &str) -> bool {
  PasswordHash::new(stored_hash)
    .map(|parsed| {
      Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
    })
    .unwrap_or(false)
}

// ─── Request authentication ──────────────────────────────────────────────────

/// Resolve the `Authorization: Bearer` header to a profile, or 401.
pub async fn authenticate<S>(
  store: &S,
  headers: &HeaderMap,
) -> Result<Profile, ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let token = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;

  store
    .profile_by_session(&token_digest(token))
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::Unauthorized("invalid or expired token".into()))
}

/// Like [`authenticate`], but absence of credentials is not an error.
/// A present-but-invalid token still fails.
pub async fn maybe_authenticate<S>(
  store: &S,
  headers: &HeaderMap,
) -> Result<Option<Profile>, ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if !headers.contains_key(axum::http::header::AUTHORIZATION) {
    return Ok(None);
  }
  authenticate(store, headers).await.map(Some)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// A profile plus the freshly issued session token.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
  pub profile: Profile,
  pub token:   String,
}

#[derive(Debug, Deserialize)]
pub struct SignupBody {
  pub name:               String,
  pub email:              String,
  pub password:           String,
  #[serde(default)]
  pub preferred_language: Option<String>,
}

/// `POST /auth/signup` — create a profile and start a session.
/// Always creates a `user` role; admins are promoted out of band.
pub async fn signup<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<SignupBody>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.password.len() < 8 {
    return Err(ApiError::BadRequest(
      "password must be at least 8 characters".into(),
    ));
  }

  let profile = state
    .store
    .create_profile(NewProfile {
      name:               body.name,
      email:              body.email,
      password_hash:      hash_password(&body.password)?,
      role:               Role::User,
      preferred_language: body.preferred_language.unwrap_or_else(|| "en".into()),
    })
    .await
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let token = generate_token();
  state
    .store
    .create_session(profile.profile_id, token_digest(&token))
    .await
    .map_err(ApiError::store)?;

  Ok((StatusCode::CREATED, Json(SessionResponse { profile, token })))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<SessionResponse>, ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Some((profile, stored_hash)) = state
    .store
    .profile_by_email(&body.email)
    .await
    .map_err(ApiError::store)?
  else {
    return Err(ApiError::Unauthorized("unknown email or password".into()));
  };

  if !verify_password(&stored_hash, &body.password) {
    return Err(ApiError::Unauthorized("unknown email or password".into()));
  }

  let token = generate_token();
  state
    .store
    .create_session(profile.profile_id, token_digest(&token))
    .await
    .map_err(ApiError::store)?;

  Ok(Json(SessionResponse { profile, token }))
}

/// `GET /me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Json<Profile>, ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let profile = authenticate(state.store.as_ref(), &headers).await?;
  Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct LanguageBody {
  pub language: String,
}

/// `PUT /me/language` — the server-side home of the original's
/// "preferred language" local-state key: written on every change, read back
/// with the profile at startup.
pub async fn set_language<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Json(body): Json<LanguageBody>,
) -> Result<Json<Profile>, ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let profile = authenticate(state.store.as_ref(), &headers).await?;
  let updated = state
    .store
    .set_language(profile.profile_id, body.language)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn password_round_trip() {
    let hash = hash_password("correct horse battery").unwrap();
    assert!(verify_password(&hash, "correct horse battery"));
    assert!(!verify_password(&hash, "wrong"));
  }

  #[test]
  fn garbage_hash_never_verifies() {
    assert!(!verify_password("not-a-phc-string", "anything"));
  }

  #[test]
  fn tokens_are_unique_and_digested() {
    let a = generate_token();
    let b = generate_token();
    assert_ne!(a, b);
    assert_eq!(a.len(), 64);
    assert_ne!(token_digest(&a), a);
    assert_eq!(token_digest(&a), token_digest(&a));
  }
}
