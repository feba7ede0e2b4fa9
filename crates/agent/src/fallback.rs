//! Canned answers for when the model cannot be reached.
//!
//! Rules are evaluated in order against the lowercased message; the first
//! rule with any keyword contained in the message wins. A message that
//! matches nothing gets [`GENERIC_FALLBACK`].

/// Answer used when no rule matches, and when the model returns nothing.
pub const GENERIC_FALLBACK: &str = "Thank you for your question! I'm currently experiencing technical difficulties. Please contact our front desk at your convenience, and our staff will be happy to help you with any questions about our services, pricing, or appointments.";

/// One keyword rule.
#[derive(Debug, Clone)]
pub struct FallbackRule {
    keywords: Vec<String>,
    response: String,
}

impl FallbackRule {
    /// Keywords are matched case-insensitively as substrings.
    pub fn new<I, S>(keywords: I, response: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
            response: response.into(),
        }
    }

    /// `lowered` must already be lowercase.
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }

    pub fn response(&self) -> &str {
        &self.response
    }
}

/// Ordered, first-match-wins keyword rules.
#[derive(Debug, Clone)]
pub struct FallbackSelector {
    rules: Vec<FallbackRule>,
    default_response: String,
}

impl FallbackSelector {
    pub fn new(rules: Vec<FallbackRule>, default_response: impl Into<String>) -> Self {
        Self {
            rules,
            default_response: default_response.into(),
        }
    }

    /// The clinic's standard rules.
    pub fn dental() -> Self {
        Self::new(
            vec![
                FallbackRule::new(
                    ["insurance", "coverage"],
                    "We accept CDCP and most private insurance plans, but we do not accept provincial insurance. Please contact our front desk to verify your specific coverage.",
                ),
                FallbackRule::new(
                    ["cleaning", "clean"],
                    "A dental cleaning costs $235 and includes a comprehensive examination. We recommend cleanings every 6 months for optimal oral health.",
                ),
                FallbackRule::new(
                    ["filling", "cavity", "cavities"],
                    "Fillings for cavities cost between $300-$600 depending on the size and location. Our dentist will provide a detailed estimate during your consultation.",
                ),
                FallbackRule::new(
                    ["hours", "time", "open"],
                    "Our clinic hours are Monday-Friday 8:00 AM - 6:00 PM, Saturday 9:00 AM - 2:00 PM, and we're closed on Sunday. We also offer emergency appointments.",
                ),
                FallbackRule::new(
                    ["appointment", "book", "schedule"],
                    "I'd be happy to help you schedule an appointment! You can use our online booking system or call our front desk during business hours.",
                ),
                FallbackRule::new(
                    ["emergency", "urgent", "pain"],
                    "For dental emergencies, please call our clinic immediately. If it's after hours, we have an emergency line available. Dental pain should not be ignored.",
                ),
            ],
            GENERIC_FALLBACK,
        )
    }

    /// Pick the canned answer for a message. Always returns exactly one.
    pub fn select(&self, message: &str) -> &str {
        let lowered = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map_or(self.default_response.as_str(), FallbackRule::response)
    }

    pub fn rules(&self) -> &[FallbackRule] {
        &self.rules
    }
}

impl Default for FallbackSelector {
    fn default() -> Self {
        Self::dental()
    }
}
