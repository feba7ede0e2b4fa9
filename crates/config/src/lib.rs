//! Configuration loading, validation, and management for enamAI.
//!
//! Loads configuration from `~/.enamai/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use enamai_core::PredictionParameters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.enamai/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Service name reported by the root endpoint
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Debug logging
    #[serde(default)]
    pub debug: bool,

    /// HTTP server configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Vertex AI connection settings
    #[serde(default)]
    pub vertex: VertexConfig,

    /// Sampling parameters sent with every prediction
    #[serde(default)]
    pub prediction: PredictionParameters,

    /// Session history bounds
    #[serde(default)]
    pub sessions: SessionConfig,

    /// Clinic facts and assistant persona injected into every prompt
    #[serde(default)]
    pub clinic: ClinicProfile,
}

fn default_app_name() -> String {
    "Dental-AI Booking API".into()
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Origins allowed by CORS
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".into(),
        "http://localhost:5173".into(),
        "https://localhost:3000".into(),
        "https://localhost:5173".into(),
    ]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct VertexConfig {
    #[serde(default = "default_project_id")]
    pub project_id: String,

    #[serde(default = "default_location")]
    pub location: String,

    #[serde(default = "default_vertex_model")]
    pub model: String,

    /// Override for the regional API endpoint (e.g. a private service connect URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// OAuth access token used as the bearer credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Upper bound on a single prediction call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_project_id() -> String {
    "dental-dev".into()
}
fn default_location() -> String {
    "us-central1".into()
}
fn default_vertex_model() -> String {
    "medpalm2-text-bison@001".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for VertexConfig {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            location: default_location(),
            model: default_vertex_model(),
            endpoint: None,
            access_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for VertexConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexConfig")
            .field("project_id", &self.project_id)
            .field("location", &self.location)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("access_token", &redact(&self.access_token))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Turns kept per session; older turns are dropped first
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Turns rendered into the prompt as prior context
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,
}

fn default_max_turns() -> usize {
    20
}
fn default_context_turns() -> usize {
    5
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            context_turns: default_context_turns(),
        }
    }
}

/// Static clinic facts. Rendered into the domain briefing that opens every
/// prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicProfile {
    /// Name the assistant answers as
    #[serde(default = "default_persona")]
    pub persona: String,

    #[serde(default = "default_clinic_name")]
    pub name: String,

    #[serde(default = "default_hours")]
    pub hours: String,

    #[serde(default = "default_services")]
    pub services: Vec<String>,

    #[serde(default = "default_insurance")]
    pub insurance: String,

    #[serde(default = "default_pricing")]
    pub pricing: String,

    #[serde(default = "default_guidelines")]
    pub guidelines: Vec<String>,
}

fn default_persona() -> String {
    "enamAI".into()
}
fn default_clinic_name() -> String {
    "MH2 Dental Clinic".into()
}
fn default_hours() -> String {
    "Monday-Friday 8:00 AM - 6:00 PM, Saturday 9:00 AM - 2:00 PM, Sunday Closed".into()
}
fn default_services() -> Vec<String> {
    [
        "Cleanings",
        "fillings",
        "root canals",
        "extractions",
        "Invisalign",
        "dentures",
        "crowns",
        "bridges",
        "emergency care",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_insurance() -> String {
    "Accepts CDCP and most private insurance, does not accept provincial insurance".into()
}
fn default_pricing() -> String {
    "Cleaning $235, Fillings $300-$600 depending on size/location".into()
}
fn default_guidelines() -> Vec<String> {
    [
        "Be helpful, professional, and empathetic",
        "Provide accurate information about dental procedures and costs",
        "Encourage users to book appointments for specific concerns",
        "For emergencies, direct to immediate care",
        "Always maintain patient privacy and confidentiality",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for ClinicProfile {
    fn default() -> Self {
        Self {
            persona: default_persona(),
            name: default_clinic_name(),
            hours: default_hours(),
            services: default_services(),
            insurance: default_insurance(),
            pricing: default_pricing(),
            guidelines: default_guidelines(),
        }
    }
}

impl ClinicProfile {
    /// Render the domain briefing text.
    pub fn briefing(&self) -> String {
        let mut text = format!(
            "You are {persona}, a helpful dental assistant AI for {name}.\n\
             You provide accurate information about dental services, costs, insurance, and appointments.\n\
             \n\
             Clinic Information:\n\
             - Name: {name}\n\
             - Hours: {hours}\n\
             - Services: {services}\n\
             - Insurance: {insurance}\n\
             - Pricing: {pricing}\n",
            persona = self.persona,
            name = self.name,
            hours = self.hours,
            services = self.services.join(", "),
            insurance = self.insurance,
            pricing = self.pricing,
        );

        if !self.guidelines.is_empty() {
            text.push_str("\nGuidelines:\n");
            for guideline in &self.guidelines {
                text.push_str("- ");
                text.push_str(guideline);
                text.push('\n');
            }
        }

        text
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.enamai/config.toml).
    ///
    /// Environment variables override file values:
    /// - `ENAMAI_PROJECT_ID`, `ENAMAI_LOCATION`, `ENAMAI_MODEL`
    /// - `ENAMAI_ACCESS_TOKEN` (falls back to `GOOGLE_ACCESS_TOKEN`)
    /// - `ENAMAI_PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup, then re-validate.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(project_id) = lookup("ENAMAI_PROJECT_ID") {
            self.vertex.project_id = project_id;
        }
        if let Some(location) = lookup("ENAMAI_LOCATION") {
            self.vertex.location = location;
        }
        if let Some(model) = lookup("ENAMAI_MODEL") {
            self.vertex.model = model;
        }
        if let Some(token) = lookup("ENAMAI_ACCESS_TOKEN").or_else(|| lookup("GOOGLE_ACCESS_TOKEN")) {
            self.vertex.access_token = Some(token);
        }
        if let Some(port) = lookup("ENAMAI_PORT") {
            self.gateway.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("ENAMAI_PORT is not a valid port: {port}"))
            })?;
        }

        self.validate()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".enamai")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.prediction;
        if !(0.0..=1.0).contains(&p.temperature) {
            return Err(ConfigError::ValidationError(
                "prediction.temperature must be between 0.0 and 1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&p.top_p) {
            return Err(ConfigError::ValidationError(
                "prediction.top_p must be between 0.0 and 1.0".into(),
            ));
        }
        if p.max_output_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "prediction.max_output_tokens must be > 0".into(),
            ));
        }

        // One exchange is two turns; a smaller bound could never hold a reply.
        if self.sessions.max_turns < 2 {
            return Err(ConfigError::ValidationError(
                "sessions.max_turns must be at least 2".into(),
            ));
        }
        if self.sessions.context_turns == 0 {
            return Err(ConfigError::ValidationError(
                "sessions.context_turns must be > 0".into(),
            ));
        }

        if self.gateway.port == 0 {
            return Err(ConfigError::ValidationError("gateway.port must be > 0".into()));
        }
        if self.vertex.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "vertex.timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            debug: false,
            gateway: GatewayConfig::default(),
            vertex: VertexConfig::default(),
            prediction: PredictionParameters::default(),
            sessions: SessionConfig::default(),
            clinic: ClinicProfile::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for enamai_core::Error {
    fn from(err: ConfigError) -> Self {
        enamai_core::Error::Config {
            message: err.to_string(),
        }
    }
}
