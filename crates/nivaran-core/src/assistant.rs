//! Rule-based navigation assistant.
//!
//! A finite keyword table over the lowercased message; the first matching
//! intent wins, so complaint-related keywords are checked before dashboard,
//! community, and help. Each message is evaluated on its own — no
//! conversational memory.

use serde::Serialize;

/// How long the client should display the reply before following the
/// redirect, in milliseconds.
pub const REDIRECT_DELAY_MS: u64 = 1500;

/// A scheduled route change accompanying a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
  pub route:    &'static str,
  pub delay_ms: u64,
}

/// The assistant's answer to one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotReply {
  pub reply:    String,
  pub redirect: Option<Redirect>,
}

struct Intent {
  keywords: &'static [&'static str],
  reply:    &'static str,
  route:    Option<&'static str>,
}

// Order matters: earlier intents shadow later ones.
const INTENTS: &[Intent] = &[
  Intent {
    keywords: &["complaint", "complain", "grievance", "report", "file", "submit"],
    reply:    "I can take you to the complaint form, where you can file a \
               grievance against any government sector.",
    route:    Some("/complaints/new"),
  },
  Intent {
    keywords: &["track", "status", "my complaints", "progress"],
    reply:    "You can track all your submissions and their current status \
               on the complaints page. Taking you there now.",
    route:    Some("/complaints"),
  },
  Intent {
    keywords: &["dashboard", "statistics", "stats", "overview", "chart"],
    reply:    "The dashboard shows complaint counts by sector and status. \
               Taking you to the dashboard.",
    route:    Some("/dashboard"),
  },
  Intent {
    keywords: &["community", "forum", "discussion", "post"],
    reply:    "The community forum is where citizens discuss issues, share \
               success stories, and support each other.",
    route:    Some("/community"),
  },
  Intent {
    keywords: &["help", "how", "guide", "what can you do"],
    reply:    "I can guide you around the portal: try asking about filing a \
               complaint, tracking status, the dashboard, or the community \
               forum.",
    route:    Some("/help"),
  },
  Intent {
    keywords: &["hello", "hi", "hey", "namaste"],
    reply:    "Hello! I'm the portal assistant. Ask me about filing a \
               complaint, tracking one, or browsing the community.",
    route:    None,
  },
];

const FALLBACK: &str = "Sorry, I didn't catch that. You can ask me about \
                        filing a complaint, tracking status, the dashboard, \
                        the community forum, or help.";

/// Answer a single user message.
pub fn respond(message: &str) -> BotReply {
  let lowered = message.to_lowercase();
  for intent in INTENTS {
    if intent.keywords.iter().any(|k| lowered.contains(k)) {
      return BotReply {
        reply:    intent.reply.to_owned(),
        redirect: intent.route.map(|route| Redirect {
          route,
          delay_ms: REDIRECT_DELAY_MS,
        }),
      };
    }
  }
  BotReply {
    reply:    FALLBACK.to_owned(),
    redirect: None,
  }
}
