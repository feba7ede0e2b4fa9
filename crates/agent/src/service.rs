//! The chat service — turns one patient message into one response.

use enamai_core::clock::{Clock, IdGenerator, SystemClock, UuidGenerator};
use enamai_core::error::ProviderError;
use enamai_core::message::{ChatRequest, ChatResponse};
use enamai_core::provider::{PredictionParameters, PredictionProvider, PredictionRequest};
use enamai_core::session::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::fallback::{FallbackSelector, GENERIC_FALLBACK};
use crate::prompt::{DomainBriefing, compose};

/// Characters of the patient message included in log lines.
const LOG_PREVIEW_CHARS: usize = 50;

/// Orchestrates context lookup, prompt composition, prediction, and
/// session updates for each chat request.
pub struct ChatService {
    /// The prediction provider to use
    provider: Arc<dyn PredictionProvider>,

    /// Session history
    store: Arc<dyn SessionStore>,

    /// Clinic briefing and persona
    briefing: DomainBriefing,

    /// Sampling parameters for every prediction
    parameters: PredictionParameters,

    /// Canned answers used when prediction fails
    fallback: FallbackSelector,

    /// Upper bound on one prediction call
    timeout: Duration,

    /// Source of new session ids
    ids: Arc<dyn IdGenerator>,

    /// Source of response timestamps
    clock: Arc<dyn Clock>,
}

impl ChatService {
    /// Create a chat service with the standard fallback rules, default
    /// sampling parameters, and a 30s prediction timeout.
    pub fn new(
        provider: Arc<dyn PredictionProvider>,
        store: Arc<dyn SessionStore>,
        briefing: DomainBriefing,
    ) -> Self {
        Self {
            provider,
            store,
            briefing,
            parameters: PredictionParameters::default(),
            fallback: FallbackSelector::dental(),
            timeout: Duration::from_secs(30),
            ids: Arc::new(UuidGenerator),
            clock: Arc::new(SystemClock),
        }
    }

    /// Set the sampling parameters.
    pub fn with_parameters(mut self, parameters: PredictionParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the prediction timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the fallback rules.
    pub fn with_fallback(mut self, fallback: FallbackSelector) -> Self {
        self.fallback = fallback;
        self
    }

    /// Use a custom session id source.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Use a custom time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn provider(&self) -> &Arc<dyn PredictionProvider> {
        &self.provider
    }

    /// Answer a chat request. Never fails: provider errors and timeouts are
    /// answered from the fallback rules and leave the session unchanged.
    pub async fn handle(&self, request: &ChatRequest) -> ChatResponse {
        let session_id = request
            .session_id()
            .map(str::to_owned)
            .unwrap_or_else(|| self.ids.generate());

        info!(
            session_id = %session_id,
            preview = %preview(&request.message),
            "Processing chat message"
        );

        let response = match self.generate(&session_id, &request.message).await {
            Ok(text) => {
                self.store
                    .append(&session_id, &request.message, &text)
                    .await;
                info!(session_id = %session_id, "Generated response");
                text
            }
            Err(e) => {
                warn!(
                    session_id = %session_id,
                    provider = %self.provider.name(),
                    error = %e,
                    "Prediction failed, using fallback response"
                );
                self.fallback.select(&request.message).to_string()
            }
        };

        ChatResponse {
            response,
            session_id,
            timestamp: self.clock.now(),
        }
    }

    /// Compose the prompt and call the provider. The store is only read
    /// here; no lock is held across the prediction call.
    async fn generate(&self, session_id: &str, message: &str) -> Result<String, ProviderError> {
        let context = self.store.context(session_id).await;
        let prompt = compose(&self.briefing, context.as_deref(), message);

        debug!(
            session_id = %session_id,
            has_context = context.is_some(),
            prompt_len = prompt.len(),
            "Prompt composed"
        );

        let request = PredictionRequest {
            prompt,
            parameters: self.parameters,
        };

        let predictions = tokio::time::timeout(self.timeout, self.provider.predict(request))
            .await
            .map_err(|_| {
                ProviderError::Timeout(format!(
                    "Provider '{}' did not answer within {}s",
                    self.provider.name(),
                    self.timeout.as_secs()
                ))
            })??;

        let text = predictions
            .into_iter()
            .next()
            .map(|p| p.content)
            .filter(|content| !content.trim().is_empty());

        Ok(text.unwrap_or_else(|| {
            debug!(session_id = %session_id, "Provider returned no text");
            GENERIC_FALLBACK.to_string()
        }))
    }
}

/// First characters of a message, for logs.
fn preview(message: &str) -> String {
    let mut chars = message.chars();
    let head: String = chars.by_ref().take(LOG_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use enamai_core::provider::Prediction;
    use enamai_memory::InMemorySessionStore;
    use std::sync::Mutex;

    /// What the mock provider does on every call.
    #[derive(Clone)]
    enum Behavior {
        Answer(Vec<Prediction>),
        Fail(ProviderError),
        Hang,
        /// Wait for the signal, then answer.
        Block(Arc<tokio::sync::Notify>, &'static str),
    }

    /// A mock provider that records the prompts it receives.
    struct MockProvider {
        behavior: Behavior,
        prompts: Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn answering(text: &str) -> Self {
            Self::new(Behavior::Answer(vec![Prediction::new(text)]))
        }

        fn failing() -> Self {
            Self::new(Behavior::Fail(ProviderError::ApiError {
                status_code: 503,
                message: "Service Unavailable".into(),
            }))
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PredictionProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        async fn predict(
            &self,
            request: PredictionRequest,
        ) -> Result<Vec<Prediction>, ProviderError> {
            self.prompts.lock().unwrap().push(request.prompt);
            match &self.behavior {
                Behavior::Answer(predictions) => Ok(predictions.clone()),
                Behavior::Fail(e) => Err(e.clone()),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!()
                }
                Behavior::Block(release, text) => {
                    release.notified().await;
                    Ok(vec![Prediction::new(*text)])
                }
            }
        }
    }

    struct FixedIds(&'static str);

    impl IdGenerator for FixedIds {
        fn generate(&self) -> String {
            self.0.to_string()
        }
    }

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn briefing() -> DomainBriefing {
        DomainBriefing::new("enamAI", "You are enamAI at MH2 Dental Clinic.")
    }

    fn service(provider: Arc<MockProvider>) -> (ChatService, Arc<InMemorySessionStore>) {
        let store = Arc::new(InMemorySessionStore::new("enamAI"));
        let service = ChatService::new(provider, store.clone(), briefing());
        (service, store)
    }

    #[tokio::test]
    async fn success_returns_model_text_and_records_exchange() {
        let provider = Arc::new(MockProvider::answering("X"));
        let (service, store) = service(provider);

        let response = service.handle(&ChatRequest::new("hello").with_session("s1")).await;

        assert_eq!(response.response, "X");
        assert_eq!(response.session_id, "s1");
        assert_eq!(store.turn_count("s1").await, 2);
        assert_eq!(store.context("s1").await.unwrap(), "Patient: hello\nenamAI: X\n");
    }

    #[tokio::test]
    async fn failure_uses_fallback_and_leaves_store_untouched() {
        let provider = Arc::new(MockProvider::failing());
        let (service, store) = service(provider);

        let message = "Does insurance cover a cleaning?";
        let response = service.handle(&ChatRequest::new(message).with_session("s1")).await;

        assert_eq!(response.response, FallbackSelector::dental().select(message));
        assert_eq!(response.session_id, "s1");
        assert!(store.context("s1").await.is_none());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn failure_without_session_still_issues_id() {
        let provider = Arc::new(MockProvider::failing());
        let (service, _store) = service(provider);
        let service = service.with_id_generator(Arc::new(FixedIds("generated-id")));

        let response = service.handle(&ChatRequest::new("parking?")).await;
        assert_eq!(response.session_id, "generated-id");
        assert_eq!(response.response, GENERIC_FALLBACK);
    }

    #[tokio::test]
    async fn missing_or_empty_session_gets_new_id() {
        let provider = Arc::new(MockProvider::answering("Hi!"));
        let (service, store) = service(provider);

        let first = service.handle(&ChatRequest::new("hi")).await;
        let second = service.handle(&ChatRequest::new("hi").with_session("")).await;

        assert!(!first.session_id.is_empty());
        assert!(!second.session_id.is_empty());
        assert_ne!(first.session_id, second.session_id);
        assert_eq!(store.session_count().await, 2);
    }

    #[tokio::test]
    async fn empty_prediction_list_substitutes_generic_text() {
        let provider = Arc::new(MockProvider::new(Behavior::Answer(vec![])));
        let (service, store) = service(provider);

        let response = service.handle(&ChatRequest::new("hi").with_session("s1")).await;

        assert_eq!(response.response, GENERIC_FALLBACK);
        // Still the success path: the substituted text is recorded
        assert_eq!(store.turn_count("s1").await, 2);
        assert!(store.context("s1").await.unwrap().contains(GENERIC_FALLBACK));
    }

    #[tokio::test]
    async fn blank_prediction_substitutes_generic_text() {
        let provider = Arc::new(MockProvider::new(Behavior::Answer(vec![
            Prediction::new("   "),
            Prediction::new("ignored second candidate"),
        ])));
        let (service, _store) = service(provider);

        let response = service.handle(&ChatRequest::new("hi")).await;
        assert_eq!(response.response, GENERIC_FALLBACK);
    }

    #[tokio::test]
    async fn only_first_prediction_is_used() {
        let provider = Arc::new(MockProvider::new(Behavior::Answer(vec![
            Prediction::new("first"),
            Prediction::new("second"),
        ])));
        let (service, _store) = service(provider);

        let response = service.handle(&ChatRequest::new("hi")).await;
        assert_eq!(response.response, "first");
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_provider_times_out_to_fallback() {
        let provider = Arc::new(MockProvider::new(Behavior::Hang));
        let (service, store) = service(provider);
        let service = service.with_timeout(Duration::from_secs(5));

        let response = service
            .handle(&ChatRequest::new("I'm in pain").with_session("s1"))
            .await;

        assert!(response.response.starts_with("For dental emergencies"));
        assert_eq!(store.turn_count("s1").await, 0);
    }

    #[tokio::test]
    async fn store_stays_usable_while_prediction_is_pending() {
        let release = Arc::new(tokio::sync::Notify::new());
        let provider = Arc::new(MockProvider::new(Behavior::Block(
            release.clone(),
            "late answer",
        )));
        let (service, store) = service(provider.clone());
        let service = Arc::new(service);
        store.append("s1", "earlier", "reply").await;

        let pending = {
            let service = service.clone();
            tokio::spawn(async move {
                service.handle(&ChatRequest::new("hi").with_session("s1")).await
            })
        };

        // Wait until the provider call is in flight
        while provider.prompts().is_empty() {
            tokio::task::yield_now().await;
        }

        tokio::time::timeout(Duration::from_secs(1), async {
            store.append("other", "question", "answer").await;
            store.append("s1", "side question", "side answer").await;
            assert_eq!(store.turn_count("other").await, 2);
            assert_eq!(store.turn_count("s1").await, 4);
        })
        .await
        .expect("store was locked during the prediction call");

        release.notify_one();
        let response = pending.await.unwrap();
        assert_eq!(response.response, "late answer");
        assert_eq!(store.turn_count("s1").await, 6);
    }

    #[tokio::test]
    async fn prompt_carries_prior_context() {
        let provider = Arc::new(MockProvider::answering("A cleaning is $235."));
        let (service, _store) = service(provider.clone());

        service
            .handle(&ChatRequest::new("How much is a cleaning?").with_session("s1"))
            .await;
        service
            .handle(&ChatRequest::new("And a filling?").with_session("s1"))
            .await;

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(!prompts[0].contains("Previous conversation context"));
        assert!(prompts[1].contains(
            "Previous conversation context:\n\
             Patient: How much is a cleaning?\n\
             enamAI: A cleaning is $235."
        ));
        assert!(prompts[1].contains("Patient Question: And a filling?"));
        assert!(prompts[1].ends_with("response as enamAI:"));
    }

    #[tokio::test]
    async fn explicit_session_appends_after_history() {
        let provider = Arc::new(MockProvider::answering("reply"));
        let (service, store) = service(provider);
        store.append("s1", "earlier question", "earlier answer").await;

        service.handle(&ChatRequest::new("new question").with_session("s1")).await;

        assert_eq!(
            store.context("s1").await.unwrap(),
            "Patient: earlier question\nenamAI: earlier answer\n\
             Patient: new question\nenamAI: reply\n"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_exchanges_on_new_session_keep_all_turns() {
        let provider = Arc::new(MockProvider::answering("ok"));
        let (service, store) = service(provider);
        let service = Arc::new(service);

        let a = {
            let service = service.clone();
            tokio::spawn(async move {
                service.handle(&ChatRequest::new("first").with_session("fresh")).await
            })
        };
        let b = {
            let service = service.clone();
            tokio::spawn(async move {
                service.handle(&ChatRequest::new("second").with_session("fresh")).await
            })
        };
        a.await.unwrap();
        b.await.unwrap();

        assert_eq!(store.turn_count("fresh").await, 4);
    }

    #[tokio::test]
    async fn timestamp_comes_from_clock() {
        let stamp = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let provider = Arc::new(MockProvider::failing());
        let (service, _store) = service(provider);
        let service = service.with_clock(Arc::new(FixedClock(stamp)));

        let response = service.handle(&ChatRequest::new("hi")).await;
        assert_eq!(response.timestamp, stamp);
    }

    #[test]
    fn preview_truncates_long_messages() {
        let long = "a".repeat(80);
        assert_eq!(preview(&long), format!("{}...", "a".repeat(50)));
        assert_eq!(preview("short"), "short");
    }
}
