//! Session history and the store trait that owns it.
//!
//! A session is a bounded, append-only list of turns keyed by an opaque id.
//! Every exchange appends exactly two turns (patient, then assistant); when
//! the list grows past its bound the oldest turns are dropped first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{Role, Turn};

/// Label used for patient turns in rendered context.
pub const PATIENT_LABEL: &str = "Patient";

/// One conversation's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub created_at: DateTime<Utc>,
    turns: Vec<Turn>,
}

impl Session {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            turns: Vec::new(),
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Append a patient turn then an assistant turn, both stamped `at`, and
    /// keep only the most recent `max_turns`.
    pub fn push_exchange(
        &mut self,
        user_text: &str,
        assistant_text: &str,
        at: DateTime<Utc>,
        max_turns: usize,
    ) {
        self.turns.push(Turn::user(user_text, at));
        self.turns.push(Turn::assistant(assistant_text, at));

        if self.turns.len() > max_turns {
            let excess = self.turns.len() - max_turns;
            self.turns.drain(..excess);
        }
    }

    /// Render the last `limit` turns, oldest first, one `"<Label>: <content>"`
    /// line each. `None` when there is nothing to render.
    pub fn render_recent(&self, limit: usize, assistant_label: &str) -> Option<String> {
        let start = self.turns.len().saturating_sub(limit);
        let rendered: String = self.turns[start..]
            .iter()
            .map(|turn| {
                let label = match turn.role {
                    Role::User => PATIENT_LABEL,
                    Role::Assistant => assistant_label,
                };
                format!("{label}: {}\n", turn.content)
            })
            .collect();

        if rendered.is_empty() {
            None
        } else {
            Some(rendered)
        }
    }
}

/// The session store — process-wide conversation context.
///
/// `append` must be atomic per call: the two turns of one exchange are never
/// interleaved with another exchange's turns, and the turn bound holds under
/// concurrent appends.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Backend name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Rendered recent context for a session, or `None` if the session is
    /// unknown or empty.
    async fn context(&self, session_id: &str) -> Option<String>;

    /// Record one exchange, creating the session if needed.
    async fn append(&self, session_id: &str, user_text: &str, assistant_text: &str);

    /// Number of stored turns for a session (0 when unknown).
    async fn turn_count(&self, session_id: &str) -> usize;

    /// Number of sessions currently held.
    async fn session_count(&self) -> usize;
}
