/*!
 * Batched translation into per-language slots.
 *
 * The translation pass never touches source text: it only fills the
 * i18n map on chapters, sections and paragraphs. Batches degrade
 * independently; a failed batch leaves its paragraphs' prior values.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

pub mod batcher;

pub use batcher::{translate_book, TranslateOptions, TranslateReport};

/// One paragraph submitted for translation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TranslateItem {
    /// Chapter-scoped paragraph number
    pub n: usize,
    /// Source text
    pub text: String,
}

/// Language pair and constraints for one translation call.
#[derive(Debug, Clone)]
pub struct TranslateSpec {
    /// Source language code
    pub source_lang: String,
    /// Target language code
    pub target_lang: String,
    /// Terms that must be preserved untranslated
    pub preserve_terms: Vec<String>,
}

/// One translated paragraph returned by the collaborator.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TranslatedItem {
    /// Paragraph number the translation applies to
    pub n: usize,
    /// Translated text
    pub text: String,
}

/// The translation collaborator contract.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a batch of paragraphs. The response maps paragraph
    /// numbers to translated text; paragraph count and order must not
    /// be altered by the collaborator, but missing entries are
    /// tolerated by the caller.
    async fn translate_batch(
        &self,
        batch: &[TranslateItem],
        spec: &TranslateSpec,
    ) -> Result<Vec<TranslatedItem>, ProviderError>;

    /// Translate a single title string.
    async fn translate_title(
        &self,
        title: &str,
        spec: &TranslateSpec,
    ) -> Result<String, ProviderError>;
}
