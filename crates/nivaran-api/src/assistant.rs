//! Handler for `POST /assistant` — the rule-based navigation chatbot.
//!
//! Prior messages are accepted for interface compatibility but ignored:
//! matching is stateless, each message evaluated on its own.

use axum::Json;
use nivaran_core::assistant::{BotReply, respond};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct MessageBody {
  pub message: String,
  /// The visible transcript so far. Unused by matching.
  #[serde(default)]
  pub history: Vec<String>,
}

/// `POST /assistant` — body `{"message": "..."}`.
pub async fn message(Json(body): Json<MessageBody>) -> Json<BotReply> {
  let _ = body.history;
  Json(respond(&body.message))
}
