//! Profile — the authenticated identity behind submissions and updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::complaint::Complaint;

/// The authorization tier of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  User,
  Admin,
}

/// A registered portal user. Credential material (password hash, session
/// tokens) never leaves the store layer and is not part of this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub profile_id:         Uuid,
  pub name:               String,
  pub email:              String,
  pub role:               Role,
  /// BCP 47 language code the user last picked; loaded at startup,
  /// written on every change.
  pub preferred_language: String,
  pub created_at:         DateTime<Utc>,
}

impl Profile {
  pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}

/// Whether `actor` may change the status of `complaint`: the complaint's
/// owner or any admin. This is the single authorization rule of the portal;
/// the store enforces it on every status write, the API layer only surfaces
/// the refusal.
pub fn can_set_status(actor: &Profile, complaint: &Complaint) -> bool {
  actor.is_admin() || complaint.user_id == Some(actor.profile_id)
}
