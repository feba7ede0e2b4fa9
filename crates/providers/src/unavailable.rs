//! A provider that always fails — stands in when initialization did not
//! succeed, so every chat request takes the fallback path.

use async_trait::async_trait;
use enamai_core::error::ProviderError;
use enamai_core::provider::*;

/// Fails every prediction with the initialization failure reason.
pub struct UnavailableProvider {
    model: String,
    reason: String,
}

impl UnavailableProvider {
    pub fn new(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl PredictionProvider for UnavailableProvider {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn predict(
        &self,
        _request: PredictionRequest,
    ) -> std::result::Result<Vec<Prediction>, ProviderError> {
        Err(ProviderError::NotConfigured(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_call_fails_with_reason() {
        let provider = UnavailableProvider::new("text-bison", "no access token");
        let result = provider
            .predict(PredictionRequest {
                prompt: "hello".into(),
                parameters: PredictionParameters::default(),
            })
            .await;

        match result.unwrap_err() {
            ProviderError::NotConfigured(reason) => assert_eq!(reason, "no access token"),
            other => panic!("Expected NotConfigured, got: {other:?}"),
        }
        assert_eq!(provider.model(), "text-bison");
    }
}
