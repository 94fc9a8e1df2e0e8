/*!
 * LLM-assisted speaker refinement.
 *
 * Only low-confidence paragraphs are worth an expensive collaborator
 * call; everything else keeps its rule-based attribution. The
 * collaborator contract is sparse: it may answer for any subset of the
 * submitted paragraphs, and whatever it stays silent on is left alone.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

pub mod prompts;
pub mod service;
pub mod strategy;

pub use service::RefinerService;
pub use strategy::{refine_book, RefineOptions, RefineReport};

/// One paragraph submitted for speaker refinement.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RefineItem {
    /// Chapter-scoped paragraph number
    pub n: usize,
    /// Paragraph text
    pub text: String,
}

/// Shared context sent with every refinement batch.
#[derive(Debug, Clone, Default)]
pub struct RefineContext {
    /// Book title in the primary language, when known
    pub book_title: Option<String>,
    /// Speakers already attributed anywhere in the book
    pub known_speakers: Vec<String>,
}

/// A sparse speaker assignment returned by the collaborator.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SpeakerAssignment {
    /// Paragraph number the assignment applies to
    pub n: usize,
    /// Assigned speaker label
    pub speaker: String,
}

/// The speaker-refinement collaborator contract.
///
/// Implementations wrap an LLM provider; any paragraph absent from the
/// response is left unchanged by the caller.
#[async_trait]
pub trait SpeakerRefiner: Send + Sync {
    /// Refine speaker attribution for a batch of paragraphs.
    async fn refine_speakers(
        &self,
        batch: &[RefineItem],
        context: &RefineContext,
    ) -> Result<Vec<SpeakerAssignment>, ProviderError>;
}
