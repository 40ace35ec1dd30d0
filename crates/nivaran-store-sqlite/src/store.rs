//! [`SqliteStore`] — the SQLite implementation of [`PortalStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use nivaran_core::{
  community::{CommunityPost, NewPost},
  complaint::{Complaint, ComplaintUpdate, NewComplaint, Status},
  profile::{Profile, can_set_status},
  sector::Sector,
  store::{ComplaintQuery, ComplaintScope, NewProfile, PortalStore, PostQuery},
};

use crate::{
  Error, Result,
  encode::{
    RawComplaint, RawPost, RawProfile, RawSector, RawUpdate, encode_answers,
    encode_attachments, encode_date, encode_dt, encode_post_type, encode_role,
    encode_status, encode_submission_type, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Row mapping ─────────────────────────────────────────────────────────────

const COMPLAINT_COLUMNS: &str = "complaint_id, title, description, \
   submission_type, sector_id, status, language, is_public, attachments, \
   feedback_category, compliment_recipient, submitter_name, submitter_email, \
   state, district, incident_date, sub_category, answers, created_at, \
   updated_at, user_id";

fn read_complaint_row(row: &rusqlite::Row) -> rusqlite::Result<RawComplaint> {
  Ok(RawComplaint {
    complaint_id:         row.get(0)?,
    title:                row.get(1)?,
    description:          row.get(2)?,
    submission_type:      row.get(3)?,
    sector_id:            row.get(4)?,
    status:               row.get(5)?,
    language:             row.get(6)?,
    is_public:            row.get(7)?,
    attachments:          row.get(8)?,
    feedback_category:    row.get(9)?,
    compliment_recipient: row.get(10)?,
    submitter_name:       row.get(11)?,
    submitter_email:      row.get(12)?,
    state:                row.get(13)?,
    district:             row.get(14)?,
    incident_date:        row.get(15)?,
    sub_category:         row.get(16)?,
    answers:              row.get(17)?,
    created_at:           row.get(18)?,
    updated_at:           row.get(19)?,
    user_id:              row.get(20)?,
  })
}

const PROFILE_COLUMNS: &str =
  "profile_id, name, email, role, preferred_language, created_at";

fn read_profile_row(row: &rusqlite::Row) -> rusqlite::Result<RawProfile> {
  Ok(RawProfile {
    profile_id:         row.get(0)?,
    name:               row.get(1)?,
    email:              row.get(2)?,
    role:               row.get(3)?,
    preferred_language: row.get(4)?,
    created_at:         row.get(5)?,
  })
}

const POST_COLUMNS: &str = "post_id, title, content, post_type, sector_id, \
   upvotes, views, created_at, updated_at, author_id";

fn read_post_row(row: &rusqlite::Row) -> rusqlite::Result<RawPost> {
  Ok(RawPost {
    post_id:    row.get(0)?,
    title:      row.get(1)?,
    content:    row.get(2)?,
    post_type:  row.get(3)?,
    sector_id:  row.get(4)?,
    upvotes:    row.get(5)?,
    views:      row.get(6)?,
    created_at: row.get(7)?,
    updated_at: row.get(8)?,
    author_id:  row.get(9)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A portal store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_post(&self, id: Uuid) -> Result<Option<CommunityPost>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {POST_COLUMNS} FROM community_posts WHERE post_id = ?1"),
              rusqlite::params![id_str],
              read_post_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawPost::into_post).transpose()
  }

  /// Increment one of the post counters and return the updated row.
  async fn bump_post_counter(&self, id: Uuid, column: &'static str) -> Result<CommunityPost> {
    let id_str = encode_uuid(id);
    let affected = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          &format!(
            "UPDATE community_posts SET {column} = {column} + 1 WHERE post_id = ?1"
          ),
          rusqlite::params![id_str],
        )?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(Error::PostNotFound(id));
    }
    self.fetch_post(id).await?.ok_or(Error::PostNotFound(id))
  }
}

// ─── PortalStore impl ────────────────────────────────────────────────────────

impl PortalStore for SqliteStore {
  type Error = Error;

  // ── Profiles & sessions ───────────────────────────────────────────────────

  async fn create_profile(&self, input: NewProfile) -> Result<Profile> {
    let email_check = input.email.clone();
    let taken: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM profiles WHERE email = ?1",
              rusqlite::params![email_check],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    if taken {
      return Err(Error::EmailTaken(input.email));
    }

    let profile = Profile {
      profile_id:         Uuid::new_v4(),
      name:               input.name,
      email:              input.email,
      role:               input.role,
      preferred_language: input.preferred_language,
      created_at:         Utc::now(),
    };

    let id_str   = encode_uuid(profile.profile_id);
    let name     = profile.name.clone();
    let email    = profile.email.clone();
    let hash     = input.password_hash;
    let role_str = encode_role(profile.role).to_owned();
    let lang     = profile.preferred_language.clone();
    let at_str   = encode_dt(profile.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (
             profile_id, name, email, password_hash, role,
             preferred_language, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, name, email, hash, role_str, lang, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(profile)
  }

  async fn profile_by_email(&self, email: &str) -> Result<Option<(Profile, String)>> {
    let email = email.to_owned();
    let raw: Option<(RawProfile, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PROFILE_COLUMNS}, password_hash FROM profiles WHERE email = ?1"
              ),
              rusqlite::params![email],
              |row| Ok((read_profile_row(row)?, row.get(6)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(p, hash)| Ok((p.into_profile()?, hash)))
      .transpose()
  }

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE profile_id = ?1"),
              rusqlite::params![id_str],
              read_profile_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawProfile::into_profile).transpose()
  }

  async fn create_session(&self, profile_id: Uuid, token_hash: String) -> Result<()> {
    let id_str = encode_uuid(profile_id);
    let at_str = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, profile_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![token_hash, id_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn profile_by_session(&self, token_hash: &str) -> Result<Option<Profile>> {
    let token_hash = token_hash.to_owned();
    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT p.profile_id, p.name, p.email, p.role,
                      p.preferred_language, p.created_at
               FROM sessions s
               JOIN profiles p ON p.profile_id = s.profile_id
               WHERE s.token_hash = ?1",
              rusqlite::params![token_hash],
              read_profile_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawProfile::into_profile).transpose()
  }

  async fn set_language(&self, profile_id: Uuid, language: String) -> Result<Profile> {
    let id_str = encode_uuid(profile_id);
    let affected = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE profiles SET preferred_language = ?2 WHERE profile_id = ?1",
          rusqlite::params![id_str, language],
        )?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(Error::ProfileNotFound(profile_id));
    }
    self
      .get_profile(profile_id)
      .await?
      .ok_or(Error::ProfileNotFound(profile_id))
  }

  // ── Sectors ───────────────────────────────────────────────────────────────

  async fn add_sector(
    &self,
    name: String,
    sub_categories: serde_json::Value,
  ) -> Result<Sector> {
    let sector_id  = Uuid::new_v4();
    let created_at = Utc::now();

    let id_str   = encode_uuid(sector_id);
    let name_ins = name.clone();
    let subs_str = sub_categories.to_string();
    let at_str   = encode_dt(created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sectors (sector_id, name, sub_categories, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name_ins, subs_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(Sector {
      sector_id,
      name,
      sub_categories: nivaran_core::sector::parse_sub_categories(&sub_categories),
      created_at,
    })
  }

  async fn list_sectors(&self) -> Result<Vec<Sector>> {
    let raws: Vec<RawSector> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT sector_id, name, sub_categories, created_at
           FROM sectors ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSector {
              sector_id:      row.get(0)?,
              name:           row.get(1)?,
              sub_categories: row.get(2)?,
              created_at:     row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSector::into_sector).collect()
  }

  async fn get_sector(&self, id: Uuid) -> Result<Option<Sector>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawSector> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT sector_id, name, sub_categories, created_at
               FROM sectors WHERE sector_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawSector {
                  sector_id:      row.get(0)?,
                  name:           row.get(1)?,
                  sub_categories: row.get(2)?,
                  created_at:     row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawSector::into_sector).transpose()
  }

  // ── Complaints ────────────────────────────────────────────────────────────

  async fn create_complaint(&self, input: NewComplaint) -> Result<Complaint> {
    let now = Utc::now();
    let complaint = Complaint {
      complaint_id:         Uuid::new_v4(),
      title:                input.title,
      description:          input.description,
      submission_type:      input.submission_type,
      sector_id:            input.sector_id,
      status:               None,
      language:             input.language,
      is_public:            input.is_public,
      attachments:          input.attachments,
      feedback_category:    input.feedback_category,
      compliment_recipient: input.compliment_recipient,
      submitter_name:       input.submitter_name,
      submitter_email:      input.submitter_email,
      state:                input.state,
      district:             input.district,
      incident_date:        input.incident_date,
      sub_category:         input.sub_category,
      answers:              input.answers,
      created_at:           now,
      updated_at:           now,
      user_id:              input.user_id,
    };

    let id_str        = encode_uuid(complaint.complaint_id);
    let title         = complaint.title.clone();
    let description   = complaint.description.clone();
    let type_str      = encode_submission_type(complaint.submission_type).to_owned();
    let sector_str    = complaint.sector_id.map(encode_uuid);
    let language      = complaint.language.clone();
    let is_public     = complaint.is_public;
    let attach_str    = encode_attachments(&complaint.attachments)?;
    let category      = complaint.feedback_category.clone();
    let recipient     = complaint.compliment_recipient.clone();
    let name          = complaint.submitter_name.clone();
    let email         = complaint.submitter_email.clone();
    let state         = complaint.state.clone();
    let district      = complaint.district.clone();
    let incident_str  = complaint.incident_date.map(encode_date);
    let sub_category  = complaint.sub_category.clone();
    let answers_str   = encode_answers(&complaint.answers)?;
    let created_str   = encode_dt(complaint.created_at);
    let updated_str   = encode_dt(complaint.updated_at);
    let user_str      = complaint.user_id.map(encode_uuid);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO complaints (
             complaint_id, title, description, submission_type, sector_id,
             status, language, is_public, attachments, feedback_category,
             compliment_recipient, submitter_name, submitter_email, state,
             district, incident_date, sub_category, answers, created_at,
             updated_at, user_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?7, ?8, ?9, ?10, ?11,
                     ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
          rusqlite::params![
            id_str,
            title,
            description,
            type_str,
            sector_str,
            language,
            is_public,
            attach_str,
            category,
            recipient,
            name,
            email,
            state,
            district,
            incident_str,
            sub_category,
            answers_str,
            created_str,
            updated_str,
            user_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(complaint)
  }

  async fn get_complaint(&self, id: Uuid) -> Result<Option<Complaint>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawComplaint> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE complaint_id = ?1"
              ),
              rusqlite::params![id_str],
              read_complaint_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawComplaint::into_complaint).transpose()
  }

  async fn list_complaints(&self, query: &ComplaintQuery) -> Result<Vec<Complaint>> {
    let user_str = match query.scope {
      ComplaintScope::Public => None,
      ComplaintScope::Mine(id) => Some(encode_uuid(id)),
    };
    let sector_str = query.sector_id.map(encode_uuid);
    let status_enc = query.status.map(|s| encode_status(s).to_owned());
    let pending    = query.status == Some(Status::Pending);
    let limit_val  = query.limit.unwrap_or(100) as i64;
    let offset_val = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawComplaint> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically; placeholder indices are fixed.
        let mut conds: Vec<&'static str> = vec![];
        if user_str.is_some() {
          conds.push("user_id = ?1");
        } else {
          conds.push("is_public = 1");
        }
        if sector_str.is_some() {
          conds.push("sector_id = ?2");
        }
        if status_enc.is_some() {
          // A null status column reads as pending.
          if pending {
            conds.push("(status = ?3 OR status IS NULL)");
          } else {
            conds.push("status = ?3");
          }
        }

        let sql = format!(
          "SELECT {COMPLAINT_COLUMNS} FROM complaints
           WHERE {}
           ORDER BY created_at DESC
           LIMIT ?4 OFFSET ?5",
          conds.join(" AND ")
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              user_str.as_deref(),
              sector_str.as_deref(),
              status_enc.as_deref(),
              limit_val,
              offset_val,
            ],
            read_complaint_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComplaint::into_complaint).collect()
  }

  async fn set_status(
    &self,
    complaint_id: Uuid,
    status: Status,
    actor: &Profile,
  ) -> Result<Complaint> {
    let complaint = self
      .get_complaint(complaint_id)
      .await?
      .ok_or(Error::ComplaintNotFound(complaint_id))?;

    if !can_set_status(actor, &complaint) {
      return Err(Error::StatusForbidden {
        actor:     actor.profile_id,
        complaint: complaint_id,
      });
    }

    let id_str     = encode_uuid(complaint_id);
    let status_str = encode_status(status).to_owned();
    let at_str     = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE complaints SET status = ?2, updated_at = ?3
           WHERE complaint_id = ?1",
          rusqlite::params![id_str, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    self
      .get_complaint(complaint_id)
      .await?
      .ok_or(Error::ComplaintNotFound(complaint_id))
  }

  async fn add_update(
    &self,
    complaint_id: Uuid,
    author_id: Uuid,
    content: String,
  ) -> Result<ComplaintUpdate> {
    // The update must reference an existing complaint; surface a domain
    // error instead of a foreign-key violation.
    if self.get_complaint(complaint_id).await?.is_none() {
      return Err(Error::ComplaintNotFound(complaint_id));
    }

    let update = ComplaintUpdate {
      update_id:  Uuid::new_v4(),
      complaint_id,
      author_id,
      content,
      created_at: Utc::now(),
    };

    let id_str        = encode_uuid(update.update_id);
    let complaint_str = encode_uuid(complaint_id);
    let author_str    = encode_uuid(author_id);
    let content_ins   = update.content.clone();
    let at_str        = encode_dt(update.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO complaint_updates (
             update_id, complaint_id, author_id, content, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, complaint_str, author_str, content_ins, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(update)
  }

  async fn list_updates(&self, complaint_id: Uuid) -> Result<Vec<ComplaintUpdate>> {
    let id_str = encode_uuid(complaint_id);
    let raws: Vec<RawUpdate> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT update_id, complaint_id, author_id, content, created_at
           FROM complaint_updates
           WHERE complaint_id = ?1
           ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawUpdate {
              update_id:    row.get(0)?,
              complaint_id: row.get(1)?,
              author_id:    row.get(2)?,
              content:      row.get(3)?,
              created_at:   row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUpdate::into_update).collect()
  }

  // ── Community ─────────────────────────────────────────────────────────────

  async fn create_post(&self, input: NewPost) -> Result<CommunityPost> {
    let now = Utc::now();
    let post = CommunityPost {
      post_id:    Uuid::new_v4(),
      title:      input.title,
      content:    input.content,
      post_type:  input.post_type,
      sector_id:  input.sector_id,
      upvotes:    0,
      views:      0,
      created_at: now,
      updated_at: now,
      author_id:  input.author_id,
    };

    let id_str     = encode_uuid(post.post_id);
    let title      = post.title.clone();
    let content    = post.content.clone();
    let type_str   = encode_post_type(post.post_type).to_owned();
    let sector_str = post.sector_id.map(encode_uuid);
    let at_str     = encode_dt(now);
    let author_str = post.author_id.map(encode_uuid);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO community_posts (
             post_id, title, content, post_type, sector_id, upvotes, views,
             created_at, updated_at, author_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6, ?6, ?7)",
          rusqlite::params![
            id_str, title, content, type_str, sector_str, at_str, author_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(post)
  }

  async fn list_posts(&self, query: &PostQuery) -> Result<Vec<CommunityPost>> {
    let type_str     = query.post_type.map(|t| encode_post_type(t).to_owned());
    let sector_str   = query.sector_id.map(encode_uuid);
    let text_pattern = query.text.as_deref().map(|t| format!("%{t}%"));
    let limit_val    = query.limit.unwrap_or(100) as i64;
    let offset_val   = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawPost> = self
      .conn
      .call(move |conn| {
        let mut conds: Vec<&'static str> = vec![];
        if type_str.is_some() {
          conds.push("post_type = ?1");
        }
        if sector_str.is_some() {
          conds.push("sector_id = ?2");
        }
        if text_pattern.is_some() {
          conds.push("(title LIKE ?3 OR content LIKE ?3)");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {POST_COLUMNS} FROM community_posts
           {where_clause}
           ORDER BY created_at DESC
           LIMIT ?4 OFFSET ?5"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              type_str.as_deref(),
              sector_str.as_deref(),
              text_pattern.as_deref(),
              limit_val,
              offset_val,
            ],
            read_post_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  async fn get_post(&self, id: Uuid) -> Result<Option<CommunityPost>> {
    self.fetch_post(id).await
  }

  async fn record_view(&self, id: Uuid) -> Result<CommunityPost> {
    self.bump_post_counter(id, "views").await
  }

  async fn upvote_post(&self, id: Uuid) -> Result<CommunityPost> {
    self.bump_post_counter(id, "upvotes").await
  }
}
