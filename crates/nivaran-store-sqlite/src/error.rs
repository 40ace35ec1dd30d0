//! Error type for `nivaran-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] nivaran_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("email already registered: {0}")]
  EmailTaken(String),

  #[error("profile not found: {0}")]
  ProfileNotFound(Uuid),

  #[error("sector not found: {0}")]
  SectorNotFound(Uuid),

  #[error("complaint not found: {0}")]
  ComplaintNotFound(Uuid),

  #[error("post not found: {0}")]
  PostNotFound(Uuid),

  /// The acting profile is neither the complaint owner nor an admin.
  #[error("profile {actor} may not change the status of complaint {complaint}")]
  StatusForbidden { actor: Uuid, complaint: Uuid },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
