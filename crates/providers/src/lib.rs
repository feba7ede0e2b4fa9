//! Prediction provider implementations for enamAI.
//!
//! All providers implement `enamai_core::PredictionProvider`.
//! [`initialize`] builds the configured provider once at startup and reports
//! whether it is usable.

pub mod status;
pub mod unavailable;
pub mod vertex;

pub use status::{ProviderStatus, initialize};
pub use unavailable::UnavailableProvider;
pub use vertex::VertexAiProvider;
