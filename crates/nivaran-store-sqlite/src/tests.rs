//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use nivaran_core::{
  community::{NewPost, PostType},
  complaint::{NewComplaint, Status, SubmissionType},
  profile::{Profile, Role},
  questionnaire::AnswerValue,
  store::{ComplaintQuery, NewProfile, PortalStore, PostQuery},
};
use serde_json::json;
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_profile(email: &str, role: Role) -> NewProfile {
  NewProfile {
    name:               "Asha Rao".into(),
    email:              email.into(),
    password_hash:      "$argon2id$stub".into(),
    role,
    preferred_language: "en".into(),
  }
}

async fn profile(s: &SqliteStore, email: &str, role: Role) -> Profile {
  s.create_profile(new_profile(email, role)).await.unwrap()
}

// ─── Profiles & sessions ─────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_profile() {
  let s = store().await;
  let p = profile(&s, "asha@example.com", Role::User).await;

  let fetched = s.get_profile(p.profile_id).await.unwrap().unwrap();
  assert_eq!(fetched.email, "asha@example.com");
  assert_eq!(fetched.role, Role::User);
  assert_eq!(fetched.preferred_language, "en");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  profile(&s, "asha@example.com", Role::User).await;

  let err = s
    .create_profile(new_profile("asha@example.com", Role::User))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EmailTaken(_)));
}

#[tokio::test]
async fn session_resolves_to_profile() {
  let s = store().await;
  let p = profile(&s, "asha@example.com", Role::User).await;

  s.create_session(p.profile_id, "digest-1".into()).await.unwrap();

  let resolved = s.profile_by_session("digest-1").await.unwrap().unwrap();
  assert_eq!(resolved.profile_id, p.profile_id);
  assert!(s.profile_by_session("digest-2").await.unwrap().is_none());
}

#[tokio::test]
async fn set_language_persists() {
  let s = store().await;
  let p = profile(&s, "asha@example.com", Role::User).await;

  let updated = s.set_language(p.profile_id, "mr".into()).await.unwrap();
  assert_eq!(updated.preferred_language, "mr");

  let fetched = s.get_profile(p.profile_id).await.unwrap().unwrap();
  assert_eq!(fetched.preferred_language, "mr");
}

// ─── Sectors ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sector_round_trips_parsed_sub_categories() {
  let s = store().await;
  let subs = json!([
    {
      "id": "potholes",
      "name": "Potholes",
      "questions": [
        { "id": "q1", "prompt": "Road name?", "kind": "text", "required": true },
      ],
    },
    { "id": "broken", "name": "Missing name" },  // dropped on read
    { "id": "potholes", "name": "Potholes (roads)", "questions": [] },
  ]);

  let sector = s.add_sector("Roads".into(), subs).await.unwrap();
  assert_eq!(sector.name, "Roads");

  let fetched = s.get_sector(sector.sector_id).await.unwrap().unwrap();
  // Malformed entry dropped, duplicate collapsed last-wins.
  assert_eq!(fetched.sub_categories.len(), 1);
  assert_eq!(fetched.sub_categories[0].name, "Potholes (roads)");
}

#[tokio::test]
async fn list_sectors_ordered_by_name() {
  let s = store().await;
  s.add_sector("Water".into(), json!([])).await.unwrap();
  s.add_sector("Roads".into(), json!([])).await.unwrap();

  let sectors = s.list_sectors().await.unwrap();
  let names: Vec<&str> = sectors.iter().map(|x| x.name.as_str()).collect();
  assert_eq!(names, ["Roads", "Water"]);
}

// ─── Complaints ──────────────────────────────────────────────────────────────

fn pothole_complaint(sector_id: Uuid, user_id: Option<Uuid>) -> NewComplaint {
  NewComplaint {
    sector_id: Some(sector_id),
    state: Some("Maharashtra".into()),
    district: Some("Pune".into()),
    submitter_name: Some("Asha Rao".into()),
    submitter_email: Some("asha@example.com".into()),
    incident_date: Some(Utc::now().date_naive()),
    user_id,
    ..NewComplaint::new(
      SubmissionType::Complaint,
      "Pothole on Main St",
      "Large pothole causing damage",
    )
  }
}

#[tokio::test]
async fn submit_complaint_inserts_pending_public_row() {
  let s = store().await;
  let sector = s.add_sector("Roads".into(), json!([])).await.unwrap();

  let created = s
    .create_complaint(pothole_complaint(sector.sector_id, None))
    .await
    .unwrap();

  let fetched = s.get_complaint(created.complaint_id).await.unwrap().unwrap();
  assert_eq!(fetched.title, "Pothole on Main St");
  assert_eq!(fetched.submission_type, SubmissionType::Complaint);
  assert!(fetched.is_public);
  assert_eq!(fetched.status, None);
  assert_eq!(fetched.effective_status(), Status::Pending);
  assert_eq!(fetched.state.as_deref(), Some("Maharashtra"));
  assert_eq!(fetched.district.as_deref(), Some("Pune"));
  assert!(fetched.attachments.is_empty());
}

#[tokio::test]
async fn answers_round_trip() {
  let s = store().await;
  let sector = s.add_sector("Roads".into(), json!([])).await.unwrap();

  let mut input = pothole_complaint(sector.sector_id, None);
  input.sub_category = Some("potholes".into());
  input.answers.insert("q1".into(), AnswerValue::Text("MG Road".into()));
  input
    .answers
    .insert("q2".into(), AnswerValue::Multi(vec!["Deep".into(), "Wide".into()]));

  let created = s.create_complaint(input).await.unwrap();
  let fetched = s.get_complaint(created.complaint_id).await.unwrap().unwrap();

  assert_eq!(fetched.sub_category.as_deref(), Some("potholes"));
  assert_eq!(
    fetched.answers.get("q1"),
    Some(&AnswerValue::Text("MG Road".into()))
  );
  assert_eq!(
    fetched.answers.get("q2"),
    Some(&AnswerValue::Multi(vec!["Deep".into(), "Wide".into()]))
  );
}

#[tokio::test]
async fn public_scope_excludes_private_rows() {
  let s = store().await;
  let sector = s.add_sector("Roads".into(), json!([])).await.unwrap();
  let p = profile(&s, "asha@example.com", Role::User).await;

  s.create_complaint(pothole_complaint(sector.sector_id, None))
    .await
    .unwrap();
  let mut private = pothole_complaint(sector.sector_id, Some(p.profile_id));
  private.is_public = false;
  s.create_complaint(private).await.unwrap();

  let public = s.list_complaints(&ComplaintQuery::public()).await.unwrap();
  assert_eq!(public.len(), 1);

  let mine = s
    .list_complaints(&ComplaintQuery::mine(p.profile_id))
    .await
    .unwrap();
  assert_eq!(mine.len(), 1);
  assert!(!mine[0].is_public);
}

#[tokio::test]
async fn pending_filter_includes_null_status() {
  let s = store().await;
  let sector = s.add_sector("Roads".into(), json!([])).await.unwrap();
  let admin = profile(&s, "admin@example.com", Role::Admin).await;

  let fresh = s
    .create_complaint(pothole_complaint(sector.sector_id, None))
    .await
    .unwrap();
  let resolved = s
    .create_complaint(pothole_complaint(sector.sector_id, None))
    .await
    .unwrap();
  s.set_status(resolved.complaint_id, Status::Resolved, &admin)
    .await
    .unwrap();

  let query = ComplaintQuery {
    status: Some(Status::Pending),
    ..ComplaintQuery::public()
  };
  let pending = s.list_complaints(&query).await.unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].complaint_id, fresh.complaint_id);
}

// ─── Status changes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_can_set_any_status_and_it_persists() {
  let s = store().await;
  let sector = s.add_sector("Roads".into(), json!([])).await.unwrap();
  let admin = profile(&s, "admin@example.com", Role::Admin).await;

  let c = s
    .create_complaint(pothole_complaint(sector.sector_id, None))
    .await
    .unwrap();

  // No transition graph: pending may jump straight to resolved.
  let updated = s
    .set_status(c.complaint_id, Status::Resolved, &admin)
    .await
    .unwrap();
  assert_eq!(updated.status, Some(Status::Resolved));
  assert!(updated.updated_at >= c.updated_at);

  let fetched = s.get_complaint(c.complaint_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, Some(Status::Resolved));
}

#[tokio::test]
async fn owner_can_set_status() {
  let s = store().await;
  let sector = s.add_sector("Roads".into(), json!([])).await.unwrap();
  let owner = profile(&s, "asha@example.com", Role::User).await;

  let c = s
    .create_complaint(pothole_complaint(sector.sector_id, Some(owner.profile_id)))
    .await
    .unwrap();

  let updated = s
    .set_status(c.complaint_id, Status::InProgress, &owner)
    .await
    .unwrap();
  assert_eq!(updated.status, Some(Status::InProgress));
}

#[tokio::test]
async fn stranger_cannot_set_status() {
  let s = store().await;
  let sector = s.add_sector("Roads".into(), json!([])).await.unwrap();
  let owner = profile(&s, "asha@example.com", Role::User).await;
  let stranger = profile(&s, "ravi@example.com", Role::User).await;

  let c = s
    .create_complaint(pothole_complaint(sector.sector_id, Some(owner.profile_id)))
    .await
    .unwrap();

  let err = s
    .set_status(c.complaint_id, Status::Resolved, &stranger)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::StatusForbidden { .. }));

  // The refusal left the row untouched.
  let fetched = s.get_complaint(c.complaint_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, None);
}

#[tokio::test]
async fn set_status_on_missing_complaint_fails() {
  let s = store().await;
  let admin = profile(&s, "admin@example.com", Role::Admin).await;

  let err = s
    .set_status(Uuid::new_v4(), Status::Resolved, &admin)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ComplaintNotFound(_)));
}

// ─── Updates ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn updates_are_listed_newest_first() {
  let s = store().await;
  let sector = s.add_sector("Roads".into(), json!([])).await.unwrap();
  let admin = profile(&s, "admin@example.com", Role::Admin).await;

  let c = s
    .create_complaint(pothole_complaint(sector.sector_id, None))
    .await
    .unwrap();

  for content in ["Assigned to ward office", "Crew dispatched", "Filled"] {
    s.add_update(c.complaint_id, admin.profile_id, content.into())
      .await
      .unwrap();
    // RFC 3339 ordering needs distinct timestamps.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  }

  let updates = s.list_updates(c.complaint_id).await.unwrap();
  let contents: Vec<&str> = updates.iter().map(|u| u.content.as_str()).collect();
  assert_eq!(contents, ["Filled", "Crew dispatched", "Assigned to ward office"]);
  assert!(updates.iter().all(|u| u.author_id == admin.profile_id));
}

#[tokio::test]
async fn update_on_missing_complaint_fails() {
  let s = store().await;
  let admin = profile(&s, "admin@example.com", Role::Admin).await;

  let err = s
    .add_update(Uuid::new_v4(), admin.profile_id, "note".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ComplaintNotFound(_)));
}

// ─── Community ───────────────────────────────────────────────────────────────

fn post(title: &str, post_type: PostType) -> NewPost {
  NewPost {
    title:     title.into(),
    content:   format!("{title} content"),
    post_type,
    sector_id: None,
    author_id: None,
  }
}

#[tokio::test]
async fn posts_filter_by_type_and_text() {
  let s = store().await;
  s.create_post(post("Pothole fixed in a week", PostType::SuccessStory))
    .await
    .unwrap();
  s.create_post(post("RTI filing guide", PostType::Resource))
    .await
    .unwrap();
  s.create_post(post("Streetlight outage thread", PostType::Discussion))
    .await
    .unwrap();

  let stories = s
    .list_posts(&PostQuery {
      post_type: Some(PostType::SuccessStory),
      ..PostQuery::default()
    })
    .await
    .unwrap();
  assert_eq!(stories.len(), 1);

  let guides = s
    .list_posts(&PostQuery {
      text: Some("guide".into()),
      ..PostQuery::default()
    })
    .await
    .unwrap();
  assert_eq!(guides.len(), 1);
  assert_eq!(guides[0].title, "RTI filing guide");

  let all = s.list_posts(&PostQuery::default()).await.unwrap();
  assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn view_and_upvote_counters_increment() {
  let s = store().await;
  let p = s
    .create_post(post("Water supply schedule", PostType::Resource))
    .await
    .unwrap();
  assert_eq!((p.upvotes, p.views), (0, 0));

  s.record_view(p.post_id).await.unwrap();
  let viewed = s.record_view(p.post_id).await.unwrap();
  assert_eq!(viewed.views, 2);

  let upvoted = s.upvote_post(p.post_id).await.unwrap();
  assert_eq!(upvoted.upvotes, 1);
  assert_eq!(upvoted.views, 2);
}

#[tokio::test]
async fn counter_on_missing_post_fails() {
  let s = store().await;
  let err = s.upvote_post(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::PostNotFound(_)));
}
