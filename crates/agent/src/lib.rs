//! The chat flow — the heart of enamAI.
//!
//! Every patient message goes through the same steps:
//!
//! 1. **Resolve** the session id (reuse the caller's, or issue a new one)
//! 2. **Build the prompt** from the clinic briefing, recent session turns,
//!    and the new message
//! 3. **Predict** via the configured provider, bounded by a timeout
//! 4. **On success**: record the exchange in the session store
//! 5. **On failure**: answer from the keyword fallback rules instead,
//!    leaving the session untouched
//!
//! Callers always get a response; provider failures never surface as errors.

pub mod fallback;
pub mod prompt;
pub mod service;

pub use fallback::{FallbackRule, FallbackSelector, GENERIC_FALLBACK};
pub use prompt::{DomainBriefing, compose};
pub use service::ChatService;
