//! In-memory session store — conversation context for the process lifetime.
//!
//! Sessions are never expired; only the per-session turn bound limits
//! growth. A restart forgets everything.

use async_trait::async_trait;
use enamai_core::clock::{Clock, SystemClock};
use enamai_core::session::{Session, SessionStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Default number of turns kept per session.
pub const DEFAULT_MAX_TURNS: usize = 20;
/// Default number of turns rendered as prompt context.
pub const DEFAULT_CONTEXT_TURNS: usize = 5;

/// A session store backed by a `HashMap` behind a tokio `RwLock`.
///
/// `append` holds the write lock for the whole create/extend/truncate step,
/// so concurrent exchanges on one session never lose turns.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    assistant_label: String,
    max_turns: usize,
    context_turns: usize,
    clock: Arc<dyn Clock>,
}

impl InMemorySessionStore {
    /// Create a store that labels assistant turns with `assistant_label`.
    pub fn new(assistant_label: impl Into<String>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            assistant_label: assistant_label.into(),
            max_turns: DEFAULT_MAX_TURNS,
            context_turns: DEFAULT_CONTEXT_TURNS,
            clock: Arc::new(SystemClock),
        }
    }

    /// Set how many turns each session keeps.
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set how many recent turns `context` renders.
    pub fn with_context_turns(mut self, context_turns: usize) -> Self {
        self.context_turns = context_turns;
        self
    }

    /// Use a custom time source for session and turn timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Snapshot of a session, if it exists.
    pub async fn session(&self, session_id: &str) -> Option<Session> {
        self.sessions.read().await.get(session_id).cloned()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn context(&self, session_id: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)?
            .render_recent(self.context_turns, &self.assistant_label)
    }

    async fn append(&self, session_id: &str, user_text: &str, assistant_text: &str) {
        let now = self.clock.now();
        let mut sessions = self.sessions.write().await;

        let session = sessions.entry(session_id.to_string()).or_insert_with(|| {
            debug!(session_id = %session_id, "Creating session");
            Session::new(now)
        });
        session.push_exchange(user_text, assistant_text, now, self.max_turns);
    }

    async fn turn_count(&self, session_id: &str) -> usize {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map_or(0, |s| s.turns().len())
    }

    async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
