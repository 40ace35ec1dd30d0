//! Sectors and their embedded sub-category questionnaire definitions.
//!
//! A sector row embeds its sub-categories as a JSON array. The payload
//! arrives from outside the type system (seed files, admin tooling), so
//! parsing is lenient: malformed entries are dropped rather than failing
//! the whole sector, and duplicate ids collapse last-wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Questions ───────────────────────────────────────────────────────────────

/// The input widget a question renders as, and therefore the shape of its
/// answer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
  Text,
  Select,
  Radio,
  Checkbox,
  Date,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
  pub id:        String,
  /// The question text shown to the user.
  pub prompt:    String,
  pub kind:      InputKind,
  #[serde(default)]
  pub required:  bool,
  /// Choices for `select`, `radio`, and `checkbox` kinds.
  #[serde(default)]
  pub options:   Vec<String>,
  #[serde(default)]
  pub help_text: Option<String>,
}

// ─── Sub-categories ──────────────────────────────────────────────────────────

/// A sector-specific refinement exposing additional structured questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCategory {
  pub id:        String,
  pub name:      String,
  pub questions: Vec<Question>,
}

/// Parse a sector's embedded sub-category JSON.
///
/// - Entries missing `id`, `name`, or a list-typed `questions` field are
///   dropped.
/// - Individually malformed questions are dropped; the sub-category keeps
///   its remaining questions in order.
/// - Duplicate sub-category ids collapse last-wins: the surviving entry
///   keeps the position of the first occurrence.
///
/// A non-array payload yields an empty list.
pub fn parse_sub_categories(raw: &serde_json::Value) -> Vec<SubCategory> {
  let Some(entries) = raw.as_array() else {
    return Vec::new();
  };

  let mut out: Vec<SubCategory> = Vec::new();
  for entry in entries {
    let Some(parsed) = parse_entry(entry) else {
      continue;
    };
    match out.iter().position(|sc| sc.id == parsed.id) {
      Some(i) => out[i] = parsed,
      None => out.push(parsed),
    }
  }
  out
}

fn parse_entry(entry: &serde_json::Value) -> Option<SubCategory> {
  let id = entry.get("id")?.as_str()?.to_owned();
  let name = entry.get("name")?.as_str()?.to_owned();
  let raw_questions = entry.get("questions")?.as_array()?;

  let questions = raw_questions
    .iter()
    .filter_map(|q| serde_json::from_value(q.clone()).ok())
    .collect();

  Some(SubCategory { id, name, questions })
}

// ─── Sector ──────────────────────────────────────────────────────────────────

/// A government department a complaint is filed against. Sub-category
/// definitions are read-only reference data owned by the sector row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sector {
  pub sector_id:      Uuid,
  pub name:           String,
  pub sub_categories: Vec<SubCategory>,
  pub created_at:     DateTime<Utc>,
}

impl Sector {
  pub fn sub_category(&self, id: &str) -> Option<&SubCategory> {
    self.sub_categories.iter().find(|sc| sc.id == id)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn parses_well_formed_entries() {
    let raw = json!([
      {
        "id": "potholes",
        "name": "Potholes",
        "questions": [
          { "id": "q1", "prompt": "Road name?", "kind": "text", "required": true },
          { "id": "q2", "prompt": "How deep?", "kind": "select",
            "options": ["Shallow", "Deep"] },
        ],
      },
    ]);

    let subs = parse_sub_categories(&raw);
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].id, "potholes");
    assert_eq!(subs[0].questions.len(), 2);
    assert_eq!(subs[0].questions[1].kind, InputKind::Select);
    assert!(!subs[0].questions[1].required);
  }

  #[test]
  fn drops_entries_missing_required_fields() {
    let raw = json!([
      { "name": "No id", "questions": [] },
      { "id": "no-name", "questions": [] },
      { "id": "no-questions", "name": "No questions" },
      { "id": "bad-questions", "name": "Scalar questions", "questions": "nope" },
      { "id": "ok", "name": "Ok", "questions": [] },
    ]);

    let subs = parse_sub_categories(&raw);
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].id, "ok");
  }

  #[test]
  fn duplicate_ids_collapse_last_wins_at_first_position() {
    let raw = json!([
      { "id": "a", "name": "First A", "questions": [] },
      { "id": "b", "name": "B", "questions": [] },
      { "id": "a", "name": "Second A", "questions": [] },
    ]);

    let subs = parse_sub_categories(&raw);
    assert_eq!(subs.len(), 2);
    assert_eq!(subs[0].id, "a");
    assert_eq!(subs[0].name, "Second A");
    assert_eq!(subs[1].id, "b");
  }

  #[test]
  fn malformed_questions_are_dropped_individually() {
    let raw = json!([
      {
        "id": "a",
        "name": "A",
        "questions": [
          { "id": "q1", "prompt": "Fine", "kind": "text" },
          { "prompt": "Missing id", "kind": "text" },
          { "id": "q3", "prompt": "Bad kind", "kind": "slider" },
        ],
      },
    ]);

    let subs = parse_sub_categories(&raw);
    assert_eq!(subs[0].questions.len(), 1);
    assert_eq!(subs[0].questions[0].id, "q1");
  }

  #[test]
  fn non_array_payload_is_empty() {
    assert!(parse_sub_categories(&json!(null)).is_empty());
    assert!(parse_sub_categories(&json!({ "id": "x" })).is_empty());
  }
}
