//! Error types for `nivaran-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("sector not found: {0}")]
  SectorNotFound(Uuid),

  #[error("complaint not found: {0}")]
  ComplaintNotFound(Uuid),

  #[error("post not found: {0}")]
  PostNotFound(Uuid),

  #[error("profile not found: {0}")]
  ProfileNotFound(Uuid),

  /// The acting profile is neither the complaint owner nor an admin.
  #[error("profile {actor} may not change the status of complaint {complaint}")]
  StatusForbidden { actor: Uuid, complaint: Uuid },

  #[error("question {question_id} expects a {expected} answer, got {got}")]
  AnswerKindMismatch {
    question_id: String,
    expected:    &'static str,
    got:         &'static str,
  },

  #[error("unknown question id: {0:?}")]
  UnknownQuestion(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
