//! Community forum types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The flavour of a community post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
  Discussion,
  SuccessStory,
  Resource,
  PeerSupport,
  QaSession,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityPost {
  pub post_id:    Uuid,
  pub title:      String,
  pub content:    String,
  pub post_type:  PostType,
  pub sector_id:  Option<Uuid>,
  pub upvotes:    u64,
  pub views:      u64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub author_id:  Option<Uuid>,
}

/// Input to [`crate::store::PortalStore::create_post`]. Counts start at
/// zero; id and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub title:     String,
  pub content:   String,
  pub post_type: PostType,
  pub sector_id: Option<Uuid>,
  pub author_id: Option<Uuid>,
}
