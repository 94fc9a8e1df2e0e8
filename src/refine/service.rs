/*!
 * Collaborator service backing refinement and translation.
 *
 * Dispatches to the configured LLM provider, bounds every call with a
 * timeout, and extracts JSON arrays from whatever text the model
 * returns. LLMs wrap their output in prose or code fences often enough
 * that the extraction has to be tolerant; anything unsalvageable is a
 * `ParseError` the caller degrades on.
 */

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;
use std::time::Duration;

use crate::app_config::{LlmProvider, RefinementConfig};
use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::Provider;
use crate::refine::prompts::{self, PromptTemplate};
use crate::refine::{RefineContext, RefineItem, SpeakerAssignment, SpeakerRefiner};
use crate::translate::{TranslateItem, TranslateSpec, TranslatedItem, Translator};

/// The configured provider behind the service.
enum ProviderImpl {
    Ollama { client: Ollama },
    Anthropic { client: Anthropic },
}

/// Provider-backed implementation of the refinement and translation
/// collaborator contracts.
pub struct RefinerService {
    provider: ProviderImpl,
    model: String,
    timeout_secs: u64,
    temperature: f32,
}

impl RefinerService {
    /// Build a service from the refinement configuration.
    pub fn from_config(config: &RefinementConfig) -> Self {
        let provider = match config.provider {
            LlmProvider::Ollama => ProviderImpl::Ollama {
                client: Ollama::new(config.get_endpoint()),
            },
            LlmProvider::Anthropic => ProviderImpl::Anthropic {
                client: Anthropic::new(config.get_api_key(), config.get_endpoint()),
            },
        };

        Self {
            provider,
            model: config.get_model(),
            timeout_secs: config.get_timeout_secs(),
            temperature: config.temperature,
        }
    }

    /// Verify the provider is reachable before starting a long pass.
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        match &self.provider {
            ProviderImpl::Ollama { client } => client.test_connection().await,
            ProviderImpl::Anthropic { client } => client.test_connection().await,
        }
    }

    /// One bounded completion call, returning the raw response text.
    async fn complete_raw(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let deadline = Duration::from_secs(self.timeout_secs);

        let call = async {
            match &self.provider {
                ProviderImpl::Ollama { client } => {
                    let request = GenerationRequest::new(&self.model, user)
                        .system(system)
                        .temperature(self.temperature)
                        .json_format()
                        .no_stream();
                    let response = client.complete(request).await?;
                    Ok(Ollama::extract_text(&response))
                }
                ProviderImpl::Anthropic { client } => {
                    let request = AnthropicRequest::new(&self.model, 4096)
                        .system(system)
                        .temperature(self.temperature)
                        .add_message("user", user);
                    let response = client.complete(request).await?;
                    Ok(Anthropic::extract_text(&response))
                }
            }
        };

        tokio::time::timeout(deadline, call)
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout_secs))?
    }

    fn language_label(code: &str) -> String {
        language_utils::get_language_name(code).unwrap_or_else(|_| code.to_string())
    }
}

/// Extract a JSON array of objects from LLM response text.
///
/// Tries, in order: the whole text as JSON, a known wrapper field on a
/// top-level object, a fenced code block, and finally the outermost
/// bracketed span. A response with no salvageable array is a parse
/// error.
pub fn extract_json_array(text: &str) -> Result<Vec<Value>, ProviderError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::ParseError("empty response".to_string()));
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(array) = unwrap_array(value) {
            return Ok(array);
        }
    }

    // Fenced code block
    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            if let Ok(value) = serde_json::from_str::<Value>(after[..end].trim()) {
                if let Some(array) = unwrap_array(value) {
                    return Ok(array);
                }
            }
        }
    }

    // Outermost bracketed span
    if let (Some(start), Some(end)) = (trimmed.find('['), trimmed.rfind(']')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                if let Some(array) = unwrap_array(value) {
                    return Ok(array);
                }
            }
        }
    }

    debug!("Unsalvageable collaborator response: {:.120}", trimmed);
    Err(ProviderError::ParseError(
        "response contains no JSON array".to_string(),
    ))
}

fn unwrap_array(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => {
            for field in ["results", "items", "assignments", "entries", "paragraphs", "translations"] {
                if let Some(Value::Array(items)) = map.remove(field) {
                    return Some(items);
                }
            }
            None
        }
        _ => None,
    }
}

#[async_trait]
impl SpeakerRefiner for RefinerService {
    async fn refine_speakers(
        &self,
        batch: &[RefineItem],
        context: &RefineContext,
    ) -> Result<Vec<SpeakerAssignment>, ProviderError> {
        let user = prompts::refine_user_prompt(batch, context);

        let response = self
            .complete_raw(PromptTemplate::SPEAKER_REFINER, &user)
            .await?;
        let entries = extract_json_array(&response)?;

        let assignments: Vec<SpeakerAssignment> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<SpeakerAssignment>(entry) {
                Ok(assignment) => Some(assignment),
                Err(e) => {
                    warn!("Dropping malformed refinement entry: {}", e);
                    None
                }
            })
            .collect();

        Ok(assignments)
    }
}

#[async_trait]
impl Translator for RefinerService {
    async fn translate_batch(
        &self,
        batch: &[TranslateItem],
        spec: &TranslateSpec,
    ) -> Result<Vec<TranslatedItem>, ProviderError> {
        let system = PromptTemplate::book_translator().render(
            &Self::language_label(&spec.source_lang),
            &Self::language_label(&spec.target_lang),
        );
        let user = prompts::translate_user_prompt(batch, spec);

        let response = self.complete_raw(&system, &user).await?;
        let entries = extract_json_array(&response)?;

        let translations: Vec<TranslatedItem> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<TranslatedItem>(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Dropping malformed translation entry: {}", e);
                    None
                }
            })
            .collect();

        Ok(translations)
    }

    async fn translate_title(
        &self,
        title: &str,
        spec: &TranslateSpec,
    ) -> Result<String, ProviderError> {
        let system = PromptTemplate::book_translator().render(
            &Self::language_label(&spec.source_lang),
            &Self::language_label(&spec.target_lang),
        );
        let user = prompts::title_user_prompt(title, spec);

        let response = self.complete_raw(&system, &user).await?;
        let entries = extract_json_array(&response)?;

        entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<TranslatedItem>(entry).ok())
            .map(|item| item.text)
            .next()
            .ok_or_else(|| ProviderError::ParseError("no title translation in response".to_string()))
    }
}
