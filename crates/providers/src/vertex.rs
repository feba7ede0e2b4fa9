//! Vertex AI text-model provider.
//!
//! Calls the publisher-model `:predict` REST endpoint:
//!
//! ```text
//! POST {endpoint}/v1/projects/{project}/locations/{location}/publishers/google/models/{model}:predict
//! {"instances":[{"content":"..."}],"parameters":{"temperature":0.3,"maxOutputTokens":256,"topP":0.8,"topK":40}}
//! ```
//!
//! Authentication is a bearer OAuth access token (e.g. from
//! `gcloud auth print-access-token` or the metadata server).

use async_trait::async_trait;
use enamai_config::VertexConfig;
use enamai_core::error::ProviderError;
use enamai_core::provider::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// A Vertex AI text-model provider.
pub struct VertexAiProvider {
    model: String,
    url: String,
    access_token: String,
    client: reqwest::Client,
}

impl VertexAiProvider {
    /// Build a provider from configuration.
    ///
    /// Fails when the project or access token is missing, or the HTTP client
    /// cannot be created.
    pub fn new(config: &VertexConfig) -> Result<Self, ProviderError> {
        if config.project_id.trim().is_empty() {
            return Err(ProviderError::NotConfigured("vertex.project_id is empty".into()));
        }
        let access_token = config
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::NotConfigured(
                    "no access token (set ENAMAI_ACCESS_TOKEN or GOOGLE_ACCESS_TOKEN)".into(),
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            model: config.model.clone(),
            url: Self::predict_url(config),
            access_token,
            client,
        })
    }

    /// The `:predict` URL for the configured project, region, and model.
    fn predict_url(config: &VertexConfig) -> String {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}-aiplatform.googleapis.com", config.location));
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:predict",
            endpoint.trim_end_matches('/'),
            config.project_id,
            config.location,
            config.model,
        )
    }

    /// Convert our request into the Vertex wire format.
    fn to_api_request(request: &PredictionRequest) -> ApiPredictRequest {
        ApiPredictRequest {
            instances: vec![ApiInstance {
                content: request.prompt.clone(),
            }],
            parameters: ApiParameters {
                temperature: request.parameters.temperature,
                max_output_tokens: request.parameters.max_output_tokens,
                top_p: request.parameters.top_p,
                top_k: request.parameters.top_k,
            },
        }
    }
}

#[async_trait]
impl PredictionProvider for VertexAiProvider {
    fn name(&self) -> &str {
        "vertex_ai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn predict(
        &self,
        request: PredictionRequest,
    ) -> std::result::Result<Vec<Prediction>, ProviderError> {
        let body = Self::to_api_request(&request);

        debug!(model = %self.model, prompt_len = request.prompt.len(), "Sending prediction request");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Access token rejected or missing aiplatform permissions".into(),
            ));
        }

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Vertex AI returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiPredictResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(api_response
            .predictions
            .into_iter()
            .map(|p| Prediction::new(p.content.unwrap_or_default()))
            .collect())
    }
}

// --- Vertex AI wire types ---

#[derive(Debug, Serialize)]
struct ApiPredictRequest {
    instances: Vec<ApiInstance>,
    parameters: ApiParameters,
}

#[derive(Debug, Serialize)]
struct ApiInstance {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiParameters {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct ApiPredictResponse {
    #[serde(default)]
    predictions: Vec<ApiPrediction>,
}

#[derive(Debug, Deserialize)]
struct ApiPrediction {
    #[serde(default)]
    content: Option<String>,
}
