//! Submission-form logic: per-type required fields, completion progress,
//! and attachment screening.
//!
//! Progress is a UI affordance only; the submission itself is gated by
//! nothing stronger than the per-file screening below.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::complaint::SubmissionType;

// ─── Draft ───────────────────────────────────────────────────────────────────

/// The fields a user fills before submitting, across all three submission
/// variants. Which subset is required depends on `submission_type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionDraft {
  pub title:                Option<String>,
  pub description:          Option<String>,
  pub sector_id:            Option<Uuid>,
  pub state:                Option<String>,
  pub district:             Option<String>,
  pub incident_date:        Option<NaiveDate>,
  pub feedback_category:    Option<String>,
  pub compliment_recipient: Option<String>,
  pub submitter_name:       Option<String>,
  pub submitter_email:      Option<String>,
}

fn filled(field: &Option<String>) -> bool {
  field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl SubmissionDraft {
  /// How many of the type's required fields are filled, out of how many.
  ///
  /// Complaint counts seven: title, description, sector, state, district,
  /// the name+email pair (one slot, filled only when both are), and the
  /// incident date. Feedback and compliment count five each, with name and
  /// email as separate slots.
  pub fn progress(&self, submission_type: SubmissionType) -> Progress {
    let slots: Vec<bool> = match submission_type {
      SubmissionType::Complaint => vec![
        filled(&self.title),
        filled(&self.description),
        self.sector_id.is_some(),
        filled(&self.state),
        filled(&self.district),
        filled(&self.submitter_name) && filled(&self.submitter_email),
        self.incident_date.is_some(),
      ],
      SubmissionType::Feedback => vec![
        filled(&self.title),
        filled(&self.description),
        filled(&self.feedback_category),
        filled(&self.submitter_name),
        filled(&self.submitter_email),
      ],
      SubmissionType::Compliment => vec![
        filled(&self.title),
        filled(&self.description),
        filled(&self.compliment_recipient),
        filled(&self.submitter_name),
        filled(&self.submitter_email),
      ],
    };

    Progress {
      filled: slots.iter().filter(|f| **f).count(),
      total:  slots.len(),
    }
  }
}

/// Form-completion progress: `filled / total × 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
  pub filled: usize,
  pub total:  usize,
}

impl Progress {
  pub fn percent(&self) -> f64 {
    (self.filled as f64 / self.total as f64) * 100.0
  }
}

// ─── Attachment screening ────────────────────────────────────────────────────

/// Per-file size cap: 5 MB.
pub const MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;

/// Accepted MIME types: jpeg, png, pdf, doc, docx.
pub const ALLOWED_MEDIA_TYPES: &[&str] = &[
  "image/jpeg",
  "image/png",
  "application/pdf",
  "application/msword",
  "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Why a file was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
  /// MIME type is not on [`ALLOWED_MEDIA_TYPES`].
  DisallowedType { media_type: String },
  /// File exceeds [`MAX_ATTACHMENT_BYTES`].
  TooLarge { size: u64, limit: u64 },
}

impl RejectReason {
  /// The user-facing alert line, naming the file and the limit.
  pub fn message(&self, file_name: &str) -> String {
    match self {
      Self::DisallowedType { media_type } => format!(
        "{file_name}: file type {media_type} is not allowed \
         (jpeg, png, pdf, doc, or docx only)"
      ),
      Self::TooLarge { size, .. } => {
        format!("{file_name}: {size} bytes exceeds the 5MB attachment limit")
      }
    }
  }
}

/// A file offered for attachment, before its bytes are stored.
#[derive(Debug, Clone)]
pub struct CandidateFile {
  pub name:       String,
  pub media_type: String,
  pub size:       u64,
}

/// A rejected file and why.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedFile {
  pub name:   String,
  #[serde(flatten)]
  pub reason: RejectReason,
}

/// Validate one candidate against the allow-list and size cap.
pub fn validate_file(file: &CandidateFile) -> Result<(), RejectReason> {
  if !ALLOWED_MEDIA_TYPES.contains(&file.media_type.as_str()) {
    return Err(RejectReason::DisallowedType {
      media_type: file.media_type.clone(),
    });
  }
  if file.size > MAX_ATTACHMENT_BYTES {
    return Err(RejectReason::TooLarge {
      size:  file.size,
      limit: MAX_ATTACHMENT_BYTES,
    });
  }
  Ok(())
}

/// Split candidates into accepted and rejected sets. Each file is judged
/// independently; a rejection never disturbs the files around it.
pub fn screen_files(files: Vec<CandidateFile>) -> (Vec<CandidateFile>, Vec<RejectedFile>) {
  let mut accepted = Vec::new();
  let mut rejected = Vec::new();
  for file in files {
    match validate_file(&file) {
      Ok(()) => accepted.push(file),
      Err(reason) => rejected.push(RejectedFile { name: file.name, reason }),
    }
  }
  (accepted, rejected)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn full_complaint_draft() -> SubmissionDraft {
    SubmissionDraft {
      title:                Some("Pothole on Main St".into()),
      description:          Some("Large pothole causing damage".into()),
      sector_id:            Some(Uuid::new_v4()),
      state:                Some("Maharashtra".into()),
      district:             Some("Pune".into()),
      incident_date:        Some(chrono::Utc::now().date_naive()),
      feedback_category:    None,
      compliment_recipient: None,
      submitter_name:       Some("Asha Rao".into()),
      submitter_email:      Some("asha@example.com".into()),
    }
  }

  #[test]
  fn complaint_progress_counts_seven_slots() {
    let draft = full_complaint_draft();
    let p = draft.progress(SubmissionType::Complaint);
    assert_eq!((p.filled, p.total), (7, 7));
    assert_eq!(p.percent(), 100.0);
  }

  #[test]
  fn name_email_pair_counts_as_one_slot() {
    let mut draft = full_complaint_draft();
    draft.submitter_email = None;
    let p = draft.progress(SubmissionType::Complaint);
    assert_eq!((p.filled, p.total), (6, 7));
  }

  #[test]
  fn empty_draft_is_zero_percent() {
    let draft = SubmissionDraft::default();
    for ty in [
      SubmissionType::Complaint,
      SubmissionType::Feedback,
      SubmissionType::Compliment,
    ] {
      let p = draft.progress(ty);
      assert_eq!(p.filled, 0);
      assert_eq!(p.percent(), 0.0);
    }
  }

  #[test]
  fn feedback_requires_category_not_sector() {
    let draft = SubmissionDraft {
      title:             Some("Great turnaround".into()),
      description:       Some("Resolved within a week".into()),
      feedback_category: Some("service_quality".into()),
      submitter_name:    Some("Asha Rao".into()),
      submitter_email:   Some("asha@example.com".into()),
      ..SubmissionDraft::default()
    };
    let p = draft.progress(SubmissionType::Feedback);
    assert_eq!((p.filled, p.total), (5, 5));
    // The same draft is incomplete as a compliment.
    let p = draft.progress(SubmissionType::Compliment);
    assert_eq!((p.filled, p.total), (4, 5));
    assert!((p.percent() - 80.0).abs() < f64::EPSILON);
  }

  #[test]
  fn whitespace_only_fields_do_not_count() {
    let draft = SubmissionDraft {
      title: Some("   ".into()),
      ..SubmissionDraft::default()
    };
    assert_eq!(draft.progress(SubmissionType::Feedback).filled, 0);
  }

  #[test]
  fn percent_stays_in_bounds() {
    let p = Progress { filled: 3, total: 7 };
    let pct = p.percent();
    assert!(pct > 0.0 && pct < 100.0);
    assert_eq!(pct, 3.0 / 7.0 * 100.0);
  }

  // ── Screening ─────────────────────────────────────────────────────────

  fn file(name: &str, media_type: &str, size: u64) -> CandidateFile {
    CandidateFile {
      name:       name.into(),
      media_type: media_type.into(),
      size,
    }
  }

  #[test]
  fn oversized_file_is_rejected_with_named_limit() {
    let six_mb = 6 * 1024 * 1024;
    let (accepted, rejected) = screen_files(vec![
      file("report.pdf", "application/pdf", six_mb),
      file("photo.jpg", "image/jpeg", 1024),
    ]);

    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].name, "photo.jpg");
    assert_eq!(rejected.len(), 1);
    let alert = rejected[0].reason.message(&rejected[0].name);
    assert!(alert.contains("report.pdf"));
    assert!(alert.contains("5MB"));
  }

  #[test]
  fn disallowed_type_is_rejected() {
    let (accepted, rejected) =
      screen_files(vec![file("virus.exe", "application/x-msdownload", 10)]);
    assert!(accepted.is_empty());
    assert!(matches!(
      rejected[0].reason,
      RejectReason::DisallowedType { .. }
    ));
  }

  #[test]
  fn valid_files_retained_regardless_of_order() {
    let six_mb = 6 * 1024 * 1024;
    let (accepted, rejected) = screen_files(vec![
      file("a.png", "image/png", 500),
      file("big.pdf", "application/pdf", six_mb),
      file("b.pdf", "application/pdf", 900),
      file("c.docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        MAX_ATTACHMENT_BYTES),
    ]);

    let names: Vec<&str> = accepted.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["a.png", "b.pdf", "c.docx"]);
    assert_eq!(rejected.len(), 1);
  }

  #[test]
  fn boundary_size_is_accepted() {
    assert!(validate_file(&file("edge.pdf", "application/pdf", MAX_ATTACHMENT_BYTES)).is_ok());
    assert!(
      validate_file(&file("over.pdf", "application/pdf", MAX_ATTACHMENT_BYTES + 1)).is_err()
    );
  }
}
