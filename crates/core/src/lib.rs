//! # enamAI Core
//!
//! Domain types, traits, and error definitions for the enamAI chat service.
//! This crate has **no framework dependencies**: it defines the model that
//! the store, provider, agent, and gateway crates implement against.
//!
//! ## Seams
//!
//! Everything the chat flow needs from the outside world is a trait here:
//! - [`PredictionProvider`]: the hosted language model
//! - [`SessionStore`]: per-session conversation history
//! - [`Clock`] and [`IdGenerator`]: time and session id sources

pub mod clock;
pub mod error;
pub mod message;
pub mod provider;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use clock::{Clock, IdGenerator, SystemClock, UuidGenerator};
pub use error::{Error, ProviderError, Result};
pub use message::{ChatRequest, ChatResponse, MAX_MESSAGE_CHARS, Role, Turn};
pub use provider::{Prediction, PredictionParameters, PredictionProvider, PredictionRequest};
pub use session::{Session, SessionStore};
