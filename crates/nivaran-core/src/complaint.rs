//! Complaint types — the central record of the portal.
//!
//! A complaint row is created once by a submission and mutated only by
//! status changes and appended updates; it is never deleted.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::questionnaire::AnswerValue;

// ─── Discriminants ───────────────────────────────────────────────────────────

/// What kind of submission this is. Determines which optional fields are
/// semantically required and which display copy the client shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
  Complaint,
  Feedback,
  Compliment,
}

/// Processing status of a complaint. `None` on a freshly inserted row is
/// read as pending everywhere it is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
  Pending,
  InProgress,
  Resolved,
  Rejected,
}

// ─── Attachments ─────────────────────────────────────────────────────────────

/// Metadata for a stored attachment. The blob itself lives on disk under
/// `path`; no binary data is kept in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
  /// Original filename as submitted.
  pub name:       String,
  /// Storage key relative to the configured attachment directory.
  pub path:       String,
  pub media_type: String,
  pub size:       u64,
}

// ─── Complaint ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
  pub complaint_id:         Uuid,
  pub title:                String,
  pub description:          String,
  pub submission_type:      SubmissionType,
  /// Required for `Complaint` submissions, absent otherwise.
  pub sector_id:            Option<Uuid>,
  pub status:               Option<Status>,
  pub language:             String,
  pub is_public:            bool,
  pub attachments:          Vec<Attachment>,
  /// Required for `Feedback` submissions.
  pub feedback_category:    Option<String>,
  /// Required for `Compliment` submissions.
  pub compliment_recipient: Option<String>,
  pub submitter_name:       Option<String>,
  pub submitter_email:      Option<String>,
  pub state:                Option<String>,
  pub district:             Option<String>,
  pub incident_date:        Option<NaiveDate>,
  /// Sub-category id within the sector, if the questionnaire was used.
  pub sub_category:         Option<String>,
  /// Questionnaire answers keyed by question id.
  pub answers:              BTreeMap<String, AnswerValue>,
  pub created_at:           DateTime<Utc>,
  pub updated_at:           DateTime<Utc>,
  /// The submitting profile; `None` for anonymous public submissions.
  pub user_id:              Option<Uuid>,
}

impl Complaint {
  /// An empty row of the given type with a fresh id. Used as a base for
  /// struct-update syntax in tests.
  pub fn blank(submission_type: SubmissionType) -> Self {
    let now = Utc::now();
    Self {
      complaint_id: Uuid::new_v4(),
      title: String::new(),
      description: String::new(),
      submission_type,
      sector_id: None,
      status: None,
      language: "en".into(),
      is_public: true,
      attachments: Vec::new(),
      feedback_category: None,
      compliment_recipient: None,
      submitter_name: None,
      submitter_email: None,
      state: None,
      district: None,
      incident_date: None,
      sub_category: None,
      answers: BTreeMap::new(),
      created_at: now,
      updated_at: now,
      user_id: None,
    }
  }

  /// Status as displayed: a null column reads as pending.
  pub fn effective_status(&self) -> Status {
    self.status.unwrap_or(Status::Pending)
  }
}

// ─── NewComplaint ────────────────────────────────────────────────────────────

/// Input to [`crate::store::PortalStore::create_complaint`].
/// `complaint_id` and both timestamps are assigned by the store; attachment
/// metadata is produced by the blob store before insertion.
#[derive(Debug, Clone)]
pub struct NewComplaint {
  pub title:                String,
  pub description:          String,
  pub submission_type:      SubmissionType,
  pub sector_id:            Option<Uuid>,
  pub language:             String,
  pub is_public:            bool,
  pub attachments:          Vec<Attachment>,
  pub feedback_category:    Option<String>,
  pub compliment_recipient: Option<String>,
  pub submitter_name:       Option<String>,
  pub submitter_email:      Option<String>,
  pub state:                Option<String>,
  pub district:             Option<String>,
  pub incident_date:        Option<NaiveDate>,
  pub sub_category:         Option<String>,
  pub answers:              BTreeMap<String, AnswerValue>,
  pub user_id:              Option<Uuid>,
}

impl NewComplaint {
  /// Convenience constructor with every optional field empty.
  pub fn new(
    submission_type: SubmissionType,
    title: impl Into<String>,
    description: impl Into<String>,
  ) -> Self {
    Self {
      title: title.into(),
      description: description.into(),
      submission_type,
      sector_id: None,
      language: "en".into(),
      is_public: true,
      attachments: Vec::new(),
      feedback_category: None,
      compliment_recipient: None,
      submitter_name: None,
      submitter_email: None,
      state: None,
      district: None,
      incident_date: None,
      sub_category: None,
      answers: BTreeMap::new(),
      user_id: None,
    }
  }
}

// ─── Updates ─────────────────────────────────────────────────────────────────

/// An appended, user-attributed note on a complaint. Append-only; rendered
/// newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintUpdate {
  pub update_id:    Uuid,
  pub complaint_id: Uuid,
  pub author_id:    Uuid,
  pub content:      String,
  pub created_at:   DateTime<Utc>,
}
