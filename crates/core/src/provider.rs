//! Prediction provider trait — the abstraction over the hosted text model.
//!
//! A provider takes a fully composed prompt plus sampling parameters and
//! returns zero or more candidate texts. The chat service treats it as an
//! opaque async call that may fail for any reason.
//!
//! Implementations: Vertex AI text models, and an always-failing provider
//! used when initialization did not succeed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Sampling parameters sent with every prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionParameters {
    /// Temperature (0.0 = deterministic)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Nucleus sampling cutoff
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Top-k sampling cutoff
    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

fn default_temperature() -> f32 {
    0.3
}
fn default_max_output_tokens() -> u32 {
    256
}
fn default_top_p() -> f32 {
    0.8
}
fn default_top_k() -> u32 {
    40
}

impl Default for PredictionParameters {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            top_p: default_top_p(),
            top_k: default_top_k(),
        }
    }
}

/// A single prediction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub prompt: String,
    pub parameters: PredictionParameters,
}

/// One candidate returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub content: String,
}

impl Prediction {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// The core prediction trait.
#[async_trait]
pub trait PredictionProvider: Send + Sync {
    /// A human-readable name for this provider (e.g., "vertex_ai").
    fn name(&self) -> &str;

    /// The model this provider sends predictions to.
    fn model(&self) -> &str;

    /// Send a prompt and get the model's candidates back, in order.
    async fn predict(
        &self,
        request: PredictionRequest,
    ) -> std::result::Result<Vec<Prediction>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_defaults() {
        let params = PredictionParameters::default();
        assert!((params.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(params.max_output_tokens, 256);
        assert!((params.top_p - 0.8).abs() < f32::EPSILON);
        assert_eq!(params.top_k, 40);
    }

    #[test]
    fn partial_parameters_fill_defaults() {
        let params: PredictionParameters = serde_json::from_str(r#"{"temperature":0.9}"#).unwrap();
        assert!((params.temperature - 0.9).abs() < f32::EPSILON);
        assert_eq!(params.max_output_tokens, 256);
        assert_eq!(params.top_k, 40);
    }
}
