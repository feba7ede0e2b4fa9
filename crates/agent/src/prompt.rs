//! Prompt composition.
//!
//! The model sees one flat text prompt per request:
//!
//! ```text
//! <domain briefing>
//!
//! Previous conversation context:     (only when the session has history)
//! Patient: ...
//! enamAI: ...
//!
//!
//! Patient Question: <message>
//!
//! Please provide a helpful and accurate response as enamAI:
//! ```

use enamai_config::ClinicProfile;

/// Static business context injected at the top of every prompt, plus the
/// persona the model is asked to answer as.
#[derive(Debug, Clone)]
pub struct DomainBriefing {
    persona: String,
    text: String,
}

impl DomainBriefing {
    pub fn new(persona: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            text: text.into(),
        }
    }

    /// Render the briefing from the configured clinic profile.
    pub fn from_clinic(clinic: &ClinicProfile) -> Self {
        Self::new(clinic.persona.clone(), clinic.briefing())
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Build the model prompt. Pure; `context` is the store's rendered history
/// and is inserted as-is, trailing newline included.
pub fn compose(briefing: &DomainBriefing, context: Option<&str>, user_message: &str) -> String {
    let mut prompt = briefing.text().trim_end().to_string();

    if let Some(context) = context.filter(|c| !c.is_empty()) {
        prompt.push_str("\n\nPrevious conversation context:\n");
        prompt.push_str(context);
    }

    prompt.push_str("\n\nPatient Question: ");
    prompt.push_str(user_message);
    prompt.push_str("\n\nPlease provide a helpful and accurate response as ");
    prompt.push_str(briefing.persona());
    prompt.push(':');
    prompt
}
