/*!
 * Prompt templates for the refinement and translation collaborators.
 *
 * These templates are designed to produce structured JSON output that
 * the service layer can parse without heuristics in the happy path.
 */

use serde_json::json;

use crate::refine::{RefineContext, RefineItem};
use crate::translate::{TranslateItem, TranslateSpec};

/// System prompt template with placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for speaker refinement.
    pub const SPEAKER_REFINER: &'static str = r#"You are an expert at attributing dialogue in scanned books.

## Your Role
- You receive numbered paragraphs whose speaker could not be determined by rules
- Decide who is speaking in each paragraph, using the book context provided
- Prefer speakers from the known-speakers list; introduce a new name only when the text clearly names one

## Output Requirements
- Return ONLY a JSON array of objects: [{"n": <paragraph number>, "speaker": "<name>"}]
- Omit paragraphs you are not sure about; a missing entry means "leave unchanged"
- Do not include any text outside the JSON array"#;

    /// The default system prompt for book translation.
    pub const BOOK_TRANSLATOR: &'static str = r#"You are a professional literary translator from {source_language} to {target_language}.

## Your Role
- Translate each numbered paragraph naturally, preserving meaning, register and tone
- Never merge, drop or reorder paragraphs
- Leave every term in the preserve list exactly as written

## Output Requirements
- Return ONLY a JSON array of objects: [{"n": <paragraph number>, "text": "<translation>"}]
- Do not include any text outside the JSON array"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default speaker refiner template.
    pub fn speaker_refiner() -> Self {
        Self::new(Self::SPEAKER_REFINER)
    }

    /// Create the default book translator template.
    pub fn book_translator() -> Self {
        Self::new(Self::BOOK_TRANSLATOR)
    }

    /// Render the template with the given language pair.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

/// Build the user prompt for a speaker refinement batch.
pub fn refine_user_prompt(batch: &[RefineItem], context: &RefineContext) -> String {
    let paragraphs = json!(batch);

    let mut prompt = String::new();
    if let Some(title) = &context.book_title {
        prompt.push_str(&format!("Book: {}\n", title));
    }
    if !context.known_speakers.is_empty() {
        prompt.push_str(&format!(
            "Known speakers: {}\n",
            context.known_speakers.join(", ")
        ));
    }
    prompt.push_str("\nParagraphs needing speaker attribution:\n");
    prompt.push_str(&paragraphs.to_string());
    prompt.push_str("\n\nReturn the JSON array now.");
    prompt
}

/// Build the user prompt for a translation batch.
pub fn translate_user_prompt(batch: &[TranslateItem], spec: &TranslateSpec) -> String {
    let paragraphs = json!(batch);

    let mut prompt = String::new();
    if !spec.preserve_terms.is_empty() {
        prompt.push_str(&format!(
            "Preserve these terms untranslated: {}\n",
            spec.preserve_terms.join(", ")
        ));
    }
    prompt.push_str(&format!(
        "\nTranslate the following {} paragraphs. Keep every paragraph number.\n",
        batch.len()
    ));
    prompt.push_str(&paragraphs.to_string());
    prompt.push_str("\n\nReturn the JSON array now.");
    prompt
}

/// Build the user prompt for a single title translation.
pub fn title_user_prompt(title: &str, spec: &TranslateSpec) -> String {
    let mut prompt = String::new();
    if !spec.preserve_terms.is_empty() {
        prompt.push_str(&format!(
            "Preserve these terms untranslated: {}\n",
            spec.preserve_terms.join(", ")
        ));
    }
    prompt.push_str(&format!(
        "Translate this title and return ONLY a JSON array with one entry [{{\"n\": 1, \"text\": \"<translation>\"}}]:\n{}",
        title
    ));
    prompt
}
