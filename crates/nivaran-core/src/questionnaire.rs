//! Questionnaire answer state.
//!
//! Tracks the selected sector, selected sub-category, and the answers
//! accumulated so far. The shape of each answer is a tagged union matched
//! exhaustively against the question's declared [`InputKind`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  sector::{InputKind, Question},
};

// ─── Answer values ───────────────────────────────────────────────────────────

/// One answer, shaped by the question's input kind. `Choice` covers both
/// `select` and `radio`; `Multi` is the accumulating checkbox list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
  Text(String),
  Choice(String),
  Multi(Vec<String>),
  Date(NaiveDate),
}

impl AnswerValue {
  pub fn kind_name(&self) -> &'static str {
    match self {
      Self::Text(_) => "text",
      Self::Choice(_) => "choice",
      Self::Multi(_) => "multi",
      Self::Date(_) => "date",
    }
  }

  /// Whether this value is the right shape for a question of `kind`.
  pub fn matches(&self, kind: InputKind) -> bool {
    match kind {
      InputKind::Text => matches!(self, Self::Text(_)),
      InputKind::Select | InputKind::Radio => matches!(self, Self::Choice(_)),
      InputKind::Checkbox => matches!(self, Self::Multi(_)),
      InputKind::Date => matches!(self, Self::Date(_)),
    }
  }

  /// An answer counts as given when it is non-empty.
  pub fn is_answered(&self) -> bool {
    match self {
      Self::Text(s) | Self::Choice(s) => !s.trim().is_empty(),
      Self::Multi(v) => !v.is_empty(),
      Self::Date(_) => true,
    }
  }
}

/// The expected answer shape for a question kind, for error messages.
fn expected_kind_name(kind: InputKind) -> &'static str {
  match kind {
    InputKind::Text => "text",
    InputKind::Select | InputKind::Radio => "choice",
    InputKind::Checkbox => "multi",
    InputKind::Date => "date",
  }
}

/// Check a full answer map against a sub-category's question list:
/// unknown question ids and shape mismatches are rejected.
pub fn check_answers(
  questions: &[Question],
  answers: &BTreeMap<String, AnswerValue>,
) -> Result<()> {
  for (id, value) in answers {
    let question = questions
      .iter()
      .find(|q| &q.id == id)
      .ok_or_else(|| Error::UnknownQuestion(id.clone()))?;
    if !value.matches(question.kind) {
      return Err(Error::AnswerKindMismatch {
        question_id: id.clone(),
        expected:    expected_kind_name(question.kind),
        got:         value.kind_name(),
      });
    }
  }
  Ok(())
}

// ─── Questionnaire state ─────────────────────────────────────────────────────

/// Accumulated questionnaire input for one in-progress submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionnaireState {
  pub sector_id:    Option<Uuid>,
  pub sub_category: Option<String>,
  pub answers:      BTreeMap<String, AnswerValue>,
}

impl QuestionnaireState {
  /// Select a sector. Switching to a different sector clears the selected
  /// sub-category and every stored answer; re-selecting the current sector
  /// is a no-op.
  pub fn select_sector(&mut self, sector_id: Uuid) {
    if self.sector_id == Some(sector_id) {
      return;
    }
    self.sector_id = Some(sector_id);
    self.sub_category = None;
    self.answers.clear();
  }

  /// Select a sub-category within the current sector. Switching clears
  /// answers scoped to the previous sub-category (all of them — answers
  /// only exist within a sub-category).
  pub fn select_sub_category(&mut self, id: impl Into<String>) {
    let id = id.into();
    if self.sub_category.as_deref() == Some(id.as_str()) {
      return;
    }
    self.sub_category = Some(id);
    self.answers.clear();
  }

  /// Store a scalar (or replace any existing) answer.
  pub fn set_answer(&mut self, question_id: impl Into<String>, value: AnswerValue) {
    self.answers.insert(question_id.into(), value);
  }

  /// Toggle one option of a checkbox question: absent options are added,
  /// present ones removed. Toggling twice restores the original list.
  pub fn toggle_option(&mut self, question_id: &str, option: &str) {
    let entry = self
      .answers
      .entry(question_id.to_owned())
      .or_insert_with(|| AnswerValue::Multi(Vec::new()));

    // A scalar under this id is replaced by a fresh list.
    if !matches!(entry, AnswerValue::Multi(_)) {
      *entry = AnswerValue::Multi(Vec::new());
    }
    if let AnswerValue::Multi(selected) = entry {
      match selected.iter().position(|s| s == option) {
        Some(i) => {
          selected.remove(i);
        }
        None => selected.push(option.to_owned()),
      }
    }
  }

  /// Required questions that have no (non-empty) answer yet.
  pub fn missing_required<'q>(&self, questions: &'q [Question]) -> Vec<&'q Question> {
    questions
      .iter()
      .filter(|q| q.required)
      .filter(|q| !self.answers.get(&q.id).is_some_and(AnswerValue::is_answered))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn question(id: &str, kind: InputKind, required: bool) -> Question {
    Question {
      id:        id.into(),
      prompt:    format!("Question {id}"),
      kind,
      required,
      options:   vec!["A".into(), "B".into()],
      help_text: None,
    }
  }

  #[test]
  fn selecting_new_sector_clears_sub_category_and_answers() {
    let mut state = QuestionnaireState::default();
    state.select_sector(Uuid::new_v4());
    state.select_sub_category("drainage");
    state.set_answer("q1", AnswerValue::Text("blocked".into()));

    state.select_sector(Uuid::new_v4());
    assert!(state.sub_category.is_none());
    assert!(state.answers.is_empty());
  }

  #[test]
  fn reselecting_same_sector_keeps_answers() {
    let sector = Uuid::new_v4();
    let mut state = QuestionnaireState::default();
    state.select_sector(sector);
    state.select_sub_category("drainage");
    state.set_answer("q1", AnswerValue::Text("blocked".into()));

    state.select_sector(sector);
    assert_eq!(state.sub_category.as_deref(), Some("drainage"));
    assert_eq!(state.answers.len(), 1);
  }

  #[test]
  fn toggle_twice_is_idempotent() {
    let mut state = QuestionnaireState::default();
    state.toggle_option("q1", "A");
    state.toggle_option("q1", "B");
    state.toggle_option("q1", "A");
    state.toggle_option("q1", "A");

    assert_eq!(
      state.answers.get("q1"),
      Some(&AnswerValue::Multi(vec!["B".into(), "A".into()]))
    );
    state.toggle_option("q1", "A");
    assert_eq!(
      state.answers.get("q1"),
      Some(&AnswerValue::Multi(vec!["B".into()]))
    );
  }

  #[test]
  fn scalar_answers_overwrite() {
    let mut state = QuestionnaireState::default();
    state.set_answer("q1", AnswerValue::Choice("A".into()));
    state.set_answer("q1", AnswerValue::Choice("B".into()));
    assert_eq!(state.answers.get("q1"), Some(&AnswerValue::Choice("B".into())));
  }

  #[test]
  fn missing_required_ignores_empty_answers() {
    let questions = vec![
      question("q1", InputKind::Text, true),
      question("q2", InputKind::Checkbox, true),
      question("q3", InputKind::Text, false),
    ];

    let mut state = QuestionnaireState::default();
    state.set_answer("q1", AnswerValue::Text("  ".into()));
    state.set_answer("q2", AnswerValue::Multi(vec![]));

    let missing = state.missing_required(&questions);
    assert_eq!(missing.len(), 2);

    state.set_answer("q1", AnswerValue::Text("pothole".into()));
    state.toggle_option("q2", "A");
    assert!(state.missing_required(&questions).is_empty());
  }

  #[test]
  fn check_answers_rejects_kind_mismatch() {
    let questions = vec![question("q1", InputKind::Date, true)];
    let mut answers = BTreeMap::new();
    answers.insert("q1".to_owned(), AnswerValue::Text("yesterday".into()));

    let err = check_answers(&questions, &answers).unwrap_err();
    assert!(matches!(err, Error::AnswerKindMismatch { .. }));
  }

  #[test]
  fn check_answers_rejects_unknown_question() {
    let questions = vec![question("q1", InputKind::Text, false)];
    let mut answers = BTreeMap::new();
    answers.insert("q9".to_owned(), AnswerValue::Text("x".into()));

    let err = check_answers(&questions, &answers).unwrap_err();
    assert!(matches!(err, Error::UnknownQuestion(_)));
  }
}
