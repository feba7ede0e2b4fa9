//! Chat request/response and turn types.
//!
//! These are the value objects that flow through the service:
//! Patient sends a [`ChatRequest`] → the chat service answers with a
//! [`ChatResponse`] → the exchange is kept as two [`Turn`]s in the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Longest accepted chat message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The patient talking to the clinic
    User,
    /// The clinic's assistant persona
    Assistant,
}

/// One message within a session. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// A patient turn stamped at `at`.
    pub fn user(content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: at,
        }
    }

    /// An assistant turn stamped at `at`.
    pub fn assistant(content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: at,
        }
    }
}

/// An inbound chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The patient's message (1 to [`MAX_MESSAGE_CHARS`] characters)
    pub message: String,

    /// Session to continue; a new one is issued when absent or empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// The caller-supplied session id, if it is usable.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Check the message length bounds.
    pub fn validate(&self) -> Result<()> {
        if self.message.is_empty() {
            return Err(Error::Validation("message must not be empty".into()));
        }
        let chars = self.message.chars().count();
        if chars > MAX_MESSAGE_CHARS {
            return Err(Error::Validation(format!(
                "message is {chars} characters, limit is {MAX_MESSAGE_CHARS}"
            )));
        }
        Ok(())
    }
}

/// The service's answer to a [`ChatRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}
