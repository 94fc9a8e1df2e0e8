/*!
 * Mock collaborator implementations for testing.
 *
 * This module provides a mock refiner/translator that simulates
 * different collaborator behaviors:
 * - `MockCollaborator::working()` - Always answers for every item
 * - `MockCollaborator::sparse(n)` - Answers only every nth item
 * - `MockCollaborator::failing()` - Always fails with an error
 * - `MockCollaborator::malformed()` - Simulates unparseable responses
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::refine::{RefineContext, RefineItem, SpeakerAssignment, SpeakerRefiner};
use crate::translate::{TranslateItem, TranslateSpec, TranslatedItem, Translator};

/// Behavior mode for the mock collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Answers every submitted item
    Working,
    /// Answers only items whose position is a multiple of `every`
    Sparse { every: usize },
    /// Fails intermittently (every nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an API error
    Failing,
    /// Returns an unparseable response
    Malformed,
    /// Returns a valid but empty answer
    Empty,
    /// Simulates slow responses (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock collaborator for testing refinement and translation behavior
#[derive(Debug)]
pub struct MockCollaborator {
    /// Behavior mode
    behavior: MockBehavior,
    /// Speaker assigned by the refiner contract
    speaker: String,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
}

impl MockCollaborator {
    /// Create a new mock with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            speaker: "Echo".to_string(),
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock that answers everything
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that answers only every nth item
    pub fn sparse(every: usize) -> Self {
        Self::new(MockBehavior::Sparse { every })
    }

    /// Create an intermittently failing mock
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that simulates malformed responses
    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    /// Create a mock that returns valid empty answers
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Use a specific speaker name in refinement answers
    pub fn with_speaker(mut self, speaker: &str) -> Self {
        self.speaker = speaker.to_string();
        self
    }

    /// Number of requests this mock has served
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Common failure/delay handling; returns Some(error) when the
    /// behavior says this request must not produce an answer.
    async fn gate(&self) -> Option<ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Failing => Some(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
            MockBehavior::Malformed => Some(ProviderError::ParseError(
                "response contains no JSON array".to_string(),
            )),
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Some(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    None
                }
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                None
            }
            _ => None,
        }
    }

    fn keeps(&self, position: usize) -> bool {
        match self.behavior {
            MockBehavior::Empty => false,
            MockBehavior::Sparse { every } => every > 0 && position % every == 0,
            _ => true,
        }
    }
}

impl Clone for MockCollaborator {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            speaker: self.speaker.clone(),
            request_count: Arc::clone(&self.request_count),
        }
    }
}

#[async_trait]
impl SpeakerRefiner for MockCollaborator {
    async fn refine_speakers(
        &self,
        batch: &[RefineItem],
        _context: &RefineContext,
    ) -> Result<Vec<SpeakerAssignment>, ProviderError> {
        if let Some(error) = self.gate().await {
            return Err(error);
        }

        Ok(batch
            .iter()
            .enumerate()
            .filter(|(position, _)| self.keeps(*position))
            .map(|(_, item)| SpeakerAssignment {
                n: item.n,
                speaker: self.speaker.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl Translator for MockCollaborator {
    async fn translate_batch(
        &self,
        batch: &[TranslateItem],
        spec: &TranslateSpec,
    ) -> Result<Vec<TranslatedItem>, ProviderError> {
        if let Some(error) = self.gate().await {
            return Err(error);
        }

        Ok(batch
            .iter()
            .enumerate()
            .filter(|(position, _)| self.keeps(*position))
            .map(|(_, item)| TranslatedItem {
                n: item.n,
                text: format!("[{}] {}", spec.target_lang, item.text),
            })
            .collect())
    }

    async fn translate_title(
        &self,
        title: &str,
        spec: &TranslateSpec,
    ) -> Result<String, ProviderError> {
        if let Some(error) = self.gate().await {
            return Err(error);
        }

        if !self.keeps(0) {
            return Err(ProviderError::ParseError(
                "no title translation in response".to_string(),
            ));
        }

        Ok(format!("[{}] {}", spec.target_lang, title))
    }
}
