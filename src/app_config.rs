use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Primary language code (ISO) of the source document
    pub primary_language: String,

    /// Target language codes for the translation pass
    #[serde(default)]
    pub target_languages: Vec<String>,

    /// Refinement config
    #[serde(default)]
    pub refinement: RefinementConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Export config
    #[serde(default)]
    pub export: ExportConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// LLM provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: Anthropic
    Anthropic,
}

impl LlmProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }
}

// Implement Display trait for LlmProvider
impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for LlmProvider
impl std::str::FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Max concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: LlmProvider) -> Self {
        match provider_type {
            LlmProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                concurrent_requests: default_concurrent_requests(),
                timeout_secs: default_timeout_secs(),
            },
            LlmProvider::Anthropic => Self {
                provider_type: "anthropic".to_string(),
                model: default_anthropic_model(),
                api_key: String::new(),
                endpoint: default_anthropic_endpoint(),
                concurrent_requests: default_concurrent_requests(),
                timeout_secs: default_anthropic_timeout_secs(),
            },
        }
    }
}

/// Speaker refinement configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefinementConfig {
    /// Whether a provider is available for refinement at all.
    /// When false the pipeline keeps rule-based attribution as-is.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Provider to use for refinement
    #[serde(default)]
    pub provider: LlmProvider,

    /// Available providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Confidence below which a paragraph is submitted for refinement
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Paragraphs per refinement batch
    #[serde(default = "default_refine_batch_size")]
    pub batch_size: usize,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        let mut config = Self {
            enabled: true,
            provider: LlmProvider::default(),
            available_providers: Vec::new(),
            confidence_threshold: default_confidence_threshold(),
            batch_size: default_refine_batch_size(),
            temperature: default_temperature(),
        };

        // Add default providers
        config.available_providers.push(ProviderConfig::new(LlmProvider::Ollama));
        config.available_providers.push(ProviderConfig::new(LlmProvider::Anthropic));

        config
    }
}

impl RefinementConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        // Default fallback based on provider type
        match self.provider {
            LlmProvider::Ollama => default_ollama_model(),
            LlmProvider::Anthropic => default_anthropic_model(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        // Default fallback - Ollama doesn't use API keys
        String::new()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            LlmProvider::Ollama => default_ollama_endpoint(),
            LlmProvider::Anthropic => default_anthropic_endpoint(),
        }
    }

    /// Get the timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        if let Some(provider_config) = self.get_active_provider_config() {
            if provider_config.timeout_secs > 0 {
                return provider_config.timeout_secs;
            }
        }

        match self.provider {
            LlmProvider::Ollama => default_timeout_secs(),
            LlmProvider::Anthropic => default_anthropic_timeout_secs(),
        }
    }

    /// Get the concurrency cap for the active provider
    pub fn optimal_concurrent_requests(&self) -> usize {
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.concurrent_requests;
        }

        default_concurrent_requests()
    }
}

/// Translation pass configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Paragraphs per translation batch
    #[serde(default = "default_translate_batch_size")]
    pub batch_size: usize,

    /// Terms (proper nouns) that must be left untranslated
    #[serde(default)]
    pub preserve_terms: Vec<String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            batch_size: default_translate_batch_size(),
            preserve_terms: Vec::new(),
        }
    }
}

/// Export configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExportConfig {
    /// Serialized size above which export splits into one file per chapter
    #[serde(default = "default_split_threshold_bytes")]
    pub split_threshold_bytes: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            split_threshold_bytes: default_split_threshold_bytes(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_anthropic_timeout_secs() -> u64 {
    60
}

fn default_confidence_threshold() -> f32 {
    0.7
}

fn default_refine_batch_size() -> usize {
    20
}

fn default_translate_batch_size() -> usize {
    15
}

fn default_split_threshold_bytes() -> usize {
    100_000
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_model() -> String {
    "llama2".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _primary = crate::language_utils::get_language_name(&self.primary_language)?;
        for target in &self.target_languages {
            let _name = crate::language_utils::get_language_name(target)?;
        }

        // Threshold must be a sensible probability
        if !(0.0..=1.0).contains(&self.refinement.confidence_threshold) {
            return Err(anyhow!(
                "Confidence threshold must be within [0, 1], got {}",
                self.refinement.confidence_threshold
            ));
        }

        if self.refinement.batch_size == 0 || self.translation.batch_size == 0 {
            return Err(anyhow!("Batch sizes must be greater than zero"));
        }

        // API key is required for hosted providers
        if self.refinement.enabled && self.refinement.provider == LlmProvider::Anthropic {
            let api_key = self.refinement.get_api_key();
            if api_key.is_empty() {
                return Err(anyhow!("API key is required for the Anthropic provider"));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            primary_language: "en".to_string(),
            target_languages: Vec::new(),
            refinement: RefinementConfig::default(),
            translation: TranslationConfig::default(),
            export: ExportConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
