//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD`. Structured fields (attachments, answers, sub-category
//! definitions) are stored as compact JSON. UUIDs are stored as hyphenated
//! lowercase strings.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use nivaran_core::{
  community::{CommunityPost, PostType},
  complaint::{Attachment, Complaint, ComplaintUpdate, Status, SubmissionType},
  profile::{Profile, Role},
  questionnaire::AnswerValue,
  sector::{Sector, parse_sub_categories},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

// ─── Timestamps & dates ──────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Discriminants ───────────────────────────────────────────────────────────

pub fn encode_submission_type(t: SubmissionType) -> &'static str {
  match t {
    SubmissionType::Complaint => "complaint",
    SubmissionType::Feedback => "feedback",
    SubmissionType::Compliment => "compliment",
  }
}

pub fn decode_submission_type(s: &str) -> Result<SubmissionType> {
  match s {
    "complaint" => Ok(SubmissionType::Complaint),
    "feedback" => Ok(SubmissionType::Feedback),
    "compliment" => Ok(SubmissionType::Compliment),
    other => Err(Error::DateParse(format!("unknown submission type: {other:?}"))),
  }
}

pub fn encode_status(s: Status) -> &'static str {
  match s {
    Status::Pending => "pending",
    Status::InProgress => "in_progress",
    Status::Resolved => "resolved",
    Status::Rejected => "rejected",
  }
}

pub fn decode_status(s: &str) -> Result<Status> {
  match s {
    "pending" => Ok(Status::Pending),
    "in_progress" => Ok(Status::InProgress),
    "resolved" => Ok(Status::Resolved),
    "rejected" => Ok(Status::Rejected),
    other => Err(Error::DateParse(format!("unknown status: {other:?}"))),
  }
}

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::User => "user",
    Role::Admin => "admin",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "user" => Ok(Role::User),
    "admin" => Ok(Role::Admin),
    other => Err(Error::DateParse(format!("unknown role: {other:?}"))),
  }
}

pub fn encode_post_type(t: PostType) -> &'static str {
  match t {
    PostType::Discussion => "discussion",
    PostType::SuccessStory => "success_story",
    PostType::Resource => "resource",
    PostType::PeerSupport => "peer_support",
    PostType::QaSession => "qa_session",
  }
}

pub fn decode_post_type(s: &str) -> Result<PostType> {
  match s {
    "discussion" => Ok(PostType::Discussion),
    "success_story" => Ok(PostType::SuccessStory),
    "resource" => Ok(PostType::Resource),
    "peer_support" => Ok(PostType::PeerSupport),
    "qa_session" => Ok(PostType::QaSession),
    other => Err(Error::DateParse(format!("unknown post type: {other:?}"))),
  }
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_attachments(a: &[Attachment]) -> Result<String> {
  Ok(serde_json::to_string(a)?)
}

pub fn decode_attachments(s: &str) -> Result<Vec<Attachment>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_answers(a: &BTreeMap<String, AnswerValue>) -> Result<String> {
  Ok(serde_json::to_string(a)?)
}

pub fn decode_answers(s: &str) -> Result<BTreeMap<String, AnswerValue>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub profile_id:         String,
  pub name:               String,
  pub email:              String,
  pub role:               String,
  pub preferred_language: String,
  pub created_at:         String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      profile_id:         decode_uuid(&self.profile_id)?,
      name:               self.name,
      email:              self.email,
      role:               decode_role(&self.role)?,
      preferred_language: self.preferred_language,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `sectors` row.
pub struct RawSector {
  pub sector_id:      String,
  pub name:           String,
  pub sub_categories: String,
  pub created_at:     String,
}

impl RawSector {
  pub fn into_sector(self) -> Result<Sector> {
    let raw_subs: serde_json::Value = serde_json::from_str(&self.sub_categories)?;
    Ok(Sector {
      sector_id:      decode_uuid(&self.sector_id)?,
      name:           self.name,
      sub_categories: parse_sub_categories(&raw_subs),
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `complaints` row.
pub struct RawComplaint {
  pub complaint_id:         String,
  pub title:                String,
  pub description:          String,
  pub submission_type:      String,
  pub sector_id:            Option<String>,
  pub status:               Option<String>,
  pub language:             String,
  pub is_public:            bool,
  pub attachments:          String,
  pub feedback_category:    Option<String>,
  pub compliment_recipient: Option<String>,
  pub submitter_name:       Option<String>,
  pub submitter_email:      Option<String>,
  pub state:                Option<String>,
  pub district:             Option<String>,
  pub incident_date:        Option<String>,
  pub sub_category:         Option<String>,
  pub answers:              String,
  pub created_at:           String,
  pub updated_at:           String,
  pub user_id:              Option<String>,
}

impl RawComplaint {
  pub fn into_complaint(self) -> Result<Complaint> {
    Ok(Complaint {
      complaint_id:         decode_uuid(&self.complaint_id)?,
      title:                self.title,
      description:          self.description,
      submission_type:      decode_submission_type(&self.submission_type)?,
      sector_id:            decode_opt_uuid(self.sector_id.as_deref())?,
      status:               self.status.as_deref().map(decode_status).transpose()?,
      language:             self.language,
      is_public:            self.is_public,
      attachments:          decode_attachments(&self.attachments)?,
      feedback_category:    self.feedback_category,
      compliment_recipient: self.compliment_recipient,
      submitter_name:       self.submitter_name,
      submitter_email:      self.submitter_email,
      state:                self.state,
      district:             self.district,
      incident_date:        self.incident_date.as_deref().map(decode_date).transpose()?,
      sub_category:         self.sub_category,
      answers:              decode_answers(&self.answers)?,
      created_at:           decode_dt(&self.created_at)?,
      updated_at:           decode_dt(&self.updated_at)?,
      user_id:              decode_opt_uuid(self.user_id.as_deref())?,
    })
  }
}

/// Raw strings read directly from a `complaint_updates` row.
pub struct RawUpdate {
  pub update_id:    String,
  pub complaint_id: String,
  pub author_id:    String,
  pub content:      String,
  pub created_at:   String,
}

impl RawUpdate {
  pub fn into_update(self) -> Result<ComplaintUpdate> {
    Ok(ComplaintUpdate {
      update_id:    decode_uuid(&self.update_id)?,
      complaint_id: decode_uuid(&self.complaint_id)?,
      author_id:    decode_uuid(&self.author_id)?,
      content:      self.content,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `community_posts` row.
pub struct RawPost {
  pub post_id:    String,
  pub title:      String,
  pub content:    String,
  pub post_type:  String,
  pub sector_id:  Option<String>,
  pub upvotes:    i64,
  pub views:      i64,
  pub created_at: String,
  pub updated_at: String,
  pub author_id:  Option<String>,
}

impl RawPost {
  pub fn into_post(self) -> Result<CommunityPost> {
    Ok(CommunityPost {
      post_id:    decode_uuid(&self.post_id)?,
      title:      self.title,
      content:    self.content,
      post_type:  decode_post_type(&self.post_type)?,
      sector_id:  decode_opt_uuid(self.sector_id.as_deref())?,
      upvotes:    self.upvotes.max(0) as u64,
      views:      self.views.max(0) as u64,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      author_id:  decode_opt_uuid(self.author_id.as_deref())?,
    })
  }
}
