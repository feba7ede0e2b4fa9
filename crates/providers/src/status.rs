//! Provider initialization — builds the configured provider once at startup
//! and records whether it is usable.
//!
//! Initialization never aborts the service. A failure yields
//! [`ProviderStatus::Unavailable`], whose provider fails every call so chat
//! requests are answered from the fallback rules, and the health endpoint
//! reports the reason.

use enamai_config::AppConfig;
use enamai_core::provider::PredictionProvider;
use std::sync::Arc;
use tracing::{error, info};

use crate::unavailable::UnavailableProvider;
use crate::vertex::VertexAiProvider;

/// Outcome of provider initialization.
#[derive(Clone)]
pub enum ProviderStatus {
    /// The provider was built and can be called.
    Ready {
        provider: Arc<dyn PredictionProvider>,
    },
    /// The provider could not be built.
    Unavailable { model: String, reason: String },
}

impl ProviderStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// The model name, whether or not it is reachable.
    pub fn model(&self) -> &str {
        match self {
            Self::Ready { provider } => provider.model(),
            Self::Unavailable { model, .. } => model.as_str(),
        }
    }

    /// Why initialization failed, if it did.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Ready { .. } => None,
            Self::Unavailable { reason, .. } => Some(reason.as_str()),
        }
    }

    /// The provider to hand to the chat service. Unavailable status yields a
    /// provider that fails every call.
    pub fn provider(&self) -> Arc<dyn PredictionProvider> {
        match self {
            Self::Ready { provider } => provider.clone(),
            Self::Unavailable { model, reason } => {
                Arc::new(UnavailableProvider::new(model.clone(), reason.clone()))
            }
        }
    }
}

impl std::fmt::Debug for ProviderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready { provider } => f
                .debug_struct("Ready")
                .field("provider", &provider.name())
                .field("model", &provider.model())
                .finish(),
            Self::Unavailable { model, reason } => f
                .debug_struct("Unavailable")
                .field("model", model)
                .field("reason", reason)
                .finish(),
        }
    }
}

/// Build the prediction provider from configuration.
pub fn initialize(config: &AppConfig) -> ProviderStatus {
    match VertexAiProvider::new(&config.vertex) {
        Ok(provider) => {
            info!(
                project = %config.vertex.project_id,
                location = %config.vertex.location,
                model = %config.vertex.model,
                "Initialized Vertex AI provider"
            );
            ProviderStatus::Ready {
                provider: Arc::new(provider),
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize Vertex AI provider, chat will use fallback responses");
            ProviderStatus::Unavailable {
                model: config.vertex.model.clone(),
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_is_unavailable() {
        let status = initialize(&AppConfig::default());
        assert!(!status.is_ready());
        assert!(status.reason().unwrap().contains("access token"));
        assert_eq!(status.model(), "medpalm2-text-bison@001");
        assert_eq!(status.provider().name(), "unavailable");
    }

    #[test]
    fn configured_token_is_ready() {
        let mut config = AppConfig::default();
        config.vertex.access_token = Some("ya29.test".into());

        let status = initialize(&config);
        assert!(status.is_ready());
        assert!(status.reason().is_none());
        assert_eq!(status.provider().name(), "vertex_ai");
        assert_eq!(status.model(), "medpalm2-text-bison@001");
    }
}
