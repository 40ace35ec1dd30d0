//! The `PortalStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `nivaran-store-sqlite`). Higher layers (`nivaran-api`,
//! `nivaran-server`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  community::{CommunityPost, NewPost, PostType},
  complaint::{Complaint, ComplaintUpdate, NewComplaint, Status},
  profile::{Profile, Role},
  sector::Sector,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Which complaints a listing covers: everyone's public submissions, or
/// the given profile's own (public and private alike).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplaintScope {
  Public,
  Mine(Uuid),
}

/// Parameters for [`PortalStore::list_complaints`].
#[derive(Debug, Clone)]
pub struct ComplaintQuery {
  pub scope:     ComplaintScope,
  pub sector_id: Option<Uuid>,
  pub status:    Option<Status>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

impl ComplaintQuery {
  pub fn public() -> Self {
    Self {
      scope:     ComplaintScope::Public,
      sector_id: None,
      status:    None,
      limit:     None,
      offset:    None,
    }
  }

  pub fn mine(profile_id: Uuid) -> Self {
    Self {
      scope: ComplaintScope::Mine(profile_id),
      ..Self::public()
    }
  }
}

/// Parameters for [`PortalStore::list_posts`]. `text` is a free-text
/// filter over title and content.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
  pub post_type: Option<PostType>,
  pub sector_id: Option<Uuid>,
  pub text:      Option<String>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

// ─── Profile inputs ──────────────────────────────────────────────────────────

/// Input to [`PortalStore::create_profile`]. The password hash is produced
/// by the caller (API layer); the store never sees a plaintext password.
#[derive(Debug, Clone)]
pub struct NewProfile {
  pub name:               String,
  pub email:              String,
  pub password_hash:      String,
  pub role:               Role,
  pub preferred_language: String,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a portal storage backend.
///
/// Complaints and posts are created once and never deleted; mutation is
/// limited to status changes, appended updates, upvotes, and view counts.
/// The owner-or-admin rule for status changes is enforced here, at the
/// data-access boundary — the API layer only reports the refusal.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PortalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Profiles & sessions ───────────────────────────────────────────────

  /// Create a profile. Fails if the email is already registered.
  fn create_profile(
    &self,
    input: NewProfile,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  /// Fetch a profile together with its stored password hash, for login
  /// verification.
  fn profile_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<(Profile, String)>, Self::Error>> + Send + 'a;

  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Persist a session token digest for a profile.
  fn create_session(
    &self,
    profile_id: Uuid,
    token_hash: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Resolve a session token digest back to its profile.
  fn profile_by_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + 'a;

  /// Set the profile's preferred language and return the updated profile.
  fn set_language(
    &self,
    profile_id: Uuid,
    language: String,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  // ── Sectors ───────────────────────────────────────────────────────────

  /// Insert a sector with its embedded sub-category JSON. The payload is
  /// parsed leniently on read; see [`crate::sector::parse_sub_categories`].
  fn add_sector(
    &self,
    name: String,
    sub_categories: serde_json::Value,
  ) -> impl Future<Output = Result<Sector, Self::Error>> + Send + '_;

  fn list_sectors(
    &self,
  ) -> impl Future<Output = Result<Vec<Sector>, Self::Error>> + Send + '_;

  fn get_sector(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Sector>, Self::Error>> + Send + '_;

  // ── Complaints ────────────────────────────────────────────────────────

  /// Insert a complaint row. `status` starts null (read as pending);
  /// timestamps are assigned by the store.
  fn create_complaint(
    &self,
    input: NewComplaint,
  ) -> impl Future<Output = Result<Complaint, Self::Error>> + Send + '_;

  fn get_complaint(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Complaint>, Self::Error>> + Send + '_;

  /// List complaints newest-first within the query's scope and filters.
  fn list_complaints<'a>(
    &'a self,
    query: &'a ComplaintQuery,
  ) -> impl Future<Output = Result<Vec<Complaint>, Self::Error>> + Send + 'a;

  /// Set a complaint's status. Any of the four values may be set — there
  /// is no transition graph. Fails unless `actor` is the complaint owner
  /// or an admin.
  fn set_status<'a>(
    &'a self,
    complaint_id: Uuid,
    status: Status,
    actor: &'a Profile,
  ) -> impl Future<Output = Result<Complaint, Self::Error>> + Send + 'a;

  /// Append a timestamped, author-attributed update note.
  fn add_update(
    &self,
    complaint_id: Uuid,
    author_id: Uuid,
    content: String,
  ) -> impl Future<Output = Result<ComplaintUpdate, Self::Error>> + Send + '_;

  /// All updates for a complaint, newest first (ordered by the query, not
  /// at render time).
  fn list_updates(
    &self,
    complaint_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ComplaintUpdate>, Self::Error>> + Send + '_;

  // ── Community ─────────────────────────────────────────────────────────

  fn create_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<CommunityPost, Self::Error>> + Send + '_;

  /// List posts newest-first, filtered per the query.
  fn list_posts<'a>(
    &'a self,
    query: &'a PostQuery,
  ) -> impl Future<Output = Result<Vec<CommunityPost>, Self::Error>> + Send + 'a;

  fn get_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<CommunityPost>, Self::Error>> + Send + '_;

  /// Increment the view counter and return the updated post.
  fn record_view(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<CommunityPost, Self::Error>> + Send + '_;

  /// Increment the upvote counter and return the updated post.
  fn upvote_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<CommunityPost, Self::Error>> + Send + '_;
}
