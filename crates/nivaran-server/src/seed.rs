//! Built-in sector definitions, inserted on first run.
//!
//! Sub-categories are stored as the same embedded JSON an external admin
//! tool would write, so the lenient parser is exercised on every read.

use nivaran_core::store::PortalStore;
use nivaran_store_sqlite::SqliteStore;
use serde_json::{Value, json};

fn default_sectors() -> Vec<(&'static str, Value)> {
  vec![
    (
      "Roads & Transport",
      json!([
        {
          "id": "potholes",
          "name": "Potholes & road damage",
          "questions": [
            { "id": "road_name", "prompt": "Which road or junction?",
              "kind": "text", "required": true },
            { "id": "severity", "prompt": "How severe is the damage?",
              "kind": "radio", "required": true,
              "options": ["Minor", "Moderate", "Dangerous"] },
            { "id": "hazards", "prompt": "Any of these present?",
              "kind": "checkbox",
              "options": ["Standing water", "Exposed rebar", "Near a school"] },
          ],
        },
        {
          "id": "streetlights",
          "name": "Streetlights",
          "questions": [
            { "id": "pole_id", "prompt": "Pole number, if visible",
              "kind": "text",
              "help_text": "Printed on a metal plate near eye level." },
            { "id": "since", "prompt": "Out since when?",
              "kind": "date", "required": true },
          ],
        },
      ]),
    ),
    (
      "Water Supply",
      json!([
        {
          "id": "supply",
          "name": "Supply interruption",
          "questions": [
            { "id": "last_supply", "prompt": "When did you last have water?",
              "kind": "date", "required": true },
            { "id": "pressure", "prompt": "Typical pressure before the outage",
              "kind": "select",
              "options": ["Normal", "Low", "Trickle"] },
          ],
        },
        {
          "id": "quality",
          "name": "Water quality",
          "questions": [
            { "id": "symptoms", "prompt": "What did you observe?",
              "kind": "checkbox", "required": true,
              "options": ["Discolouration", "Odour", "Sediment", "Taste"] },
          ],
        },
      ]),
    ),
    (
      "Electricity",
      json!([
        {
          "id": "outage",
          "name": "Power outage",
          "questions": [
            { "id": "scope", "prompt": "Who is affected?",
              "kind": "radio", "required": true,
              "options": ["Only my home", "My building", "The whole street"] },
          ],
        },
      ]),
    ),
    ("Sanitation", json!([])),
  ]
}

/// Insert the built-in sectors when the table is empty; a non-empty table
/// is left untouched.
pub async fn seed_default_sectors(store: &SqliteStore) -> anyhow::Result<()> {
  if !store.list_sectors().await?.is_empty() {
    return Ok(());
  }
  for (name, sub_categories) in default_sectors() {
    let sector = store.add_sector(name.to_owned(), sub_categories).await?;
    tracing::info!(sector = %sector.name, "seeded sector");
  }
  Ok(())
}
