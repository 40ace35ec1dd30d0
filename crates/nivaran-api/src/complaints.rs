//! Handlers for `/complaints` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/complaints` | `?scope=public\|mine` (mine needs auth) |
//! | `POST` | `/complaints` | Submission; attachments inline as base64 |
//! | `POST` | `/complaints/preflight` | Progress % and per-file verdicts |
//! | `GET`  | `/complaints/:id` | Auth required |
//! | `POST` | `/complaints/:id/status` | Owner or admin |
//! | `GET`  | `/complaints/:id/updates` | Newest first (auth) |
//! | `POST` | `/complaints/:id/updates` | Append a note (auth) |

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
};
use base64::Engine as _;
use chrono::NaiveDate;
use nivaran_core::{
  complaint::{
    Attachment, Complaint, ComplaintUpdate, NewComplaint, Status, SubmissionType,
  },
  profile::can_set_status,
  questionnaire::{AnswerValue, check_answers},
  store::{ComplaintQuery, PortalStore},
  submission::{
    CandidateFile, Progress, RejectedFile, SubmissionDraft, screen_files,
    validate_file,
  },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{authenticate, maybe_authenticate},
  error::ApiError,
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
  #[default]
  Public,
  Mine,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub scope:     Scope,
  pub sector_id: Option<Uuid>,
  pub status:    Option<Status>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

/// `GET /complaints[?scope=mine][&sector_id=...][&status=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Complaint>>, ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let scope = match params.scope {
    Scope::Public => nivaran_core::store::ComplaintScope::Public,
    Scope::Mine => {
      let profile = authenticate(state.store.as_ref(), &headers).await?;
      nivaran_core::store::ComplaintScope::Mine(profile.profile_id)
    }
  };

  let query = ComplaintQuery {
    scope,
    sector_id: params.sector_id,
    status: params.status,
    limit: params.limit,
    offset: params.offset,
  };

  let complaints = state
    .store
    .list_complaints(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(complaints))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// One attachment offered inline with the submission.
#[derive(Debug, Deserialize)]
pub struct AttachmentUpload {
  pub name:        String,
  pub media_type:  String,
  /// Standard (padded) base64 of the file contents.
  pub data_base64: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:                String,
  pub description:          String,
  pub submission_type:      SubmissionType,
  pub sector_id:            Option<Uuid>,
  #[serde(default = "default_language")]
  pub language:             String,
  #[serde(default = "default_true")]
  pub is_public:            bool,
  pub feedback_category:    Option<String>,
  pub compliment_recipient: Option<String>,
  pub submitter_name:       Option<String>,
  pub submitter_email:      Option<String>,
  pub state:                Option<String>,
  pub district:             Option<String>,
  pub incident_date:        Option<NaiveDate>,
  pub sub_category:         Option<String>,
  #[serde(default)]
  pub answers:              BTreeMap<String, AnswerValue>,
  #[serde(default)]
  pub attachments:          Vec<AttachmentUpload>,
}

fn default_language() -> String { "en".into() }
fn default_true() -> bool { true }

/// The stored complaint plus the files that were screened out. A rejected
/// file never aborts the submission; the caller alerts and moves on.
#[derive(Debug, Serialize)]
pub struct SubmissionOutcome {
  pub complaint:      Complaint,
  pub rejected_files: Vec<RejectedFile>,
}

/// `POST /complaints` — the submission pipeline: screen files, store
/// accepted blobs, insert the row. If the insert fails after blobs were
/// written, they are removed best-effort so no orphan outlives the error.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<SubmissionOutcome>), ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = maybe_authenticate(state.store.as_ref(), &headers).await?;

  check_questionnaire(&state, &body).await?;

  // Decode payloads first so screening sees true byte sizes.
  let mut decoded: Vec<(CandidateFile, Vec<u8>)> = Vec::new();
  for upload in body.attachments {
    let bytes = base64::engine::general_purpose::STANDARD
      .decode(&upload.data_base64)
      .map_err(|e| {
        ApiError::BadRequest(format!("{}: invalid base64 payload: {e}", upload.name))
      })?;
    decoded.push((
      CandidateFile {
        name:       upload.name,
        media_type: upload.media_type,
        size:       bytes.len() as u64,
      },
      bytes,
    ));
  }

  // Screen each file independently; rejected ones are reported, not fatal.
  let mut accepted: Vec<(CandidateFile, Vec<u8>)> = Vec::new();
  let mut rejected: Vec<RejectedFile> = Vec::new();
  for (file, bytes) in decoded {
    match validate_file(&file) {
      Ok(()) => accepted.push((file, bytes)),
      Err(reason) => rejected.push(RejectedFile { name: file.name, reason }),
    }
  }

  let mut stored: Vec<Attachment> = Vec::new();
  for (file, bytes) in &accepted {
    match state.blobs.save(file, bytes).await {
      Ok(meta) => stored.push(meta),
      Err(e) => {
        cleanup_blobs(&state, &stored).await;
        return Err(ApiError::Blob(e));
      }
    }
  }

  let input = NewComplaint {
    title:                body.title,
    description:          body.description,
    submission_type:      body.submission_type,
    sector_id:            body.sector_id,
    language:             body.language,
    is_public:            body.is_public,
    attachments:          stored.clone(),
    feedback_category:    body.feedback_category,
    compliment_recipient: body.compliment_recipient,
    submitter_name:       body.submitter_name,
    submitter_email:      body.submitter_email,
    state:                body.state,
    district:             body.district,
    incident_date:        body.incident_date,
    sub_category:         body.sub_category,
    answers:              body.answers,
    user_id:              user.map(|p| p.profile_id),
  };

  let complaint = match state.store.create_complaint(input).await {
    Ok(c) => c,
    Err(e) => {
      // Upload and insert are not transactional; remove what we wrote so
      // the failure leaves no orphaned blob behind.
      cleanup_blobs(&state, &stored).await;
      return Err(ApiError::store(e));
    }
  };

  tracing::info!(
    complaint_id = %complaint.complaint_id,
    submission_type = ?complaint.submission_type,
    attachments = stored.len(),
    rejected = rejected.len(),
    "complaint submitted"
  );

  Ok((
    StatusCode::CREATED,
    Json(SubmissionOutcome { complaint, rejected_files: rejected }),
  ))
}

async fn cleanup_blobs<S>(state: &AppState<S>, stored: &[Attachment]) {
  for meta in stored {
    state.blobs.remove(&meta.path).await;
  }
}

/// Validate submitted answers against the sector's question definitions.
async fn check_questionnaire<S>(
  state: &AppState<S>,
  body: &CreateBody,
) -> Result<(), ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Some(sub_category) = body.sub_category.as_deref() else {
    if body.answers.is_empty() {
      return Ok(());
    }
    return Err(ApiError::BadRequest(
      "answers were supplied without a sub_category".into(),
    ));
  };

  let Some(sector_id) = body.sector_id else {
    return Err(ApiError::BadRequest(
      "sub_category requires a sector_id".into(),
    ));
  };

  let sector = state
    .store
    .get_sector(sector_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("sector {sector_id} not found")))?;

  let sub = sector.sub_category(sub_category).ok_or_else(|| {
    ApiError::BadRequest(format!(
      "sector {} has no sub-category {sub_category:?}",
      sector.name
    ))
  })?;

  check_answers(&sub.questions, &body.answers)
    .map_err(|e| ApiError::BadRequest(e.to_string()))
}

// ─── Preflight ────────────────────────────────────────────────────────────────

/// A file described (not uploaded) for screening.
#[derive(Debug, Deserialize)]
pub struct FileProbe {
  pub name:       String,
  pub media_type: String,
  pub size:       u64,
}

#[derive(Debug, Deserialize)]
pub struct PreflightBody {
  pub submission_type: SubmissionType,
  #[serde(flatten)]
  pub draft:           SubmissionDraft,
  #[serde(default)]
  pub files:           Vec<FileProbe>,
}

#[derive(Debug, Serialize)]
pub struct PreflightResponse {
  pub progress:       Progress,
  pub percent:        f64,
  pub accepted_files: Vec<String>,
  pub rejected_files: Vec<RejectedFile>,
}

/// `POST /complaints/preflight` — the form-progress affordance: how
/// complete the draft is for its submission type, and which of the offered
/// files would survive screening. Pure computation, no writes.
pub async fn preflight(
  Json(body): Json<PreflightBody>,
) -> Json<PreflightResponse> {
  let progress = body.draft.progress(body.submission_type);

  let candidates = body
    .files
    .into_iter()
    .map(|f| CandidateFile {
      name:       f.name,
      media_type: f.media_type,
      size:       f.size,
    })
    .collect();
  let (accepted, rejected) = screen_files(candidates);

  Json(PreflightResponse {
    progress,
    percent:        progress.percent(),
    accepted_files: accepted.into_iter().map(|f| f.name).collect(),
    rejected_files: rejected,
  })
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /complaints/:id` — auth required, matching the original's gated
/// detail route.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Path(id): Path<Uuid>,
) -> Result<Json<Complaint>, ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  authenticate(state.store.as_ref(), &headers).await?;
  let complaint = state
    .store
    .get_complaint(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("complaint {id} not found")))?;
  Ok(Json(complaint))
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: Status,
}

/// `POST /complaints/:id/status` — owner or admin. The store enforces the
/// same rule independently; this check exists to answer with a clean 403.
pub async fn set_status<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Complaint>, ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor = authenticate(state.store.as_ref(), &headers).await?;

  let complaint = state
    .store
    .get_complaint(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("complaint {id} not found")))?;

  if !can_set_status(&actor, &complaint) {
    return Err(ApiError::Forbidden(
      "only the complaint owner or an admin may change the status".into(),
    ));
  }

  let updated = state
    .store
    .set_status(id, body.status, &actor)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(
    complaint_id = %id,
    status = ?body.status,
    actor = %actor.profile_id,
    "complaint status changed"
  );

  Ok(Json(updated))
}

// ─── Updates ──────────────────────────────────────────────────────────────────

/// `GET /complaints/:id/updates` — newest first, ordered by the store.
/// Auth required, like the detail view the thread belongs to.
pub async fn list_updates<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ComplaintUpdate>>, ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  authenticate(state.store.as_ref(), &headers).await?;
  let updates = state
    .store
    .list_updates(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updates))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub content: String,
}

/// `POST /complaints/:id/updates` — append a timestamped, user-attributed
/// note.
pub async fn add_update<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<(StatusCode, Json<ComplaintUpdate>), ApiError>
where
  S: PortalStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let author = authenticate(state.store.as_ref(), &headers).await?;
  if body.content.trim().is_empty() {
    return Err(ApiError::BadRequest("update content is empty".into()));
  }

  let update = state
    .store
    .add_update(id, author.profile_id, body.content)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(update)))
}
