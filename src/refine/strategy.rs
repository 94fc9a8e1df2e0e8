/*!
 * The refinement strategy.
 *
 * Partitions each chapter's paragraphs by confidence, submits only the
 * ambiguous ones to the collaborator in fixed-size batches, and merges
 * the sparse answers back by original position. A failed batch degrades
 * to the pre-call state for exactly its own paragraphs; the pass as a
 * whole never fails.
 */

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::app_config::RefinementConfig;
use crate::book::model::Book;
use crate::refine::{RefineContext, RefineItem, SpeakerRefiner};

/// Confidence stamped on a paragraph whose speaker came from the
/// refiner: above the default gate so a second pass will not resubmit
/// it, below the 1.0 reserved for rule-based certainty.
pub const REFINED_CONFIDENCE: f32 = 0.9;

/// Tuning knobs for a refinement pass.
#[derive(Debug, Clone)]
pub struct RefineOptions {
    /// Confidence below which a paragraph is submitted
    pub confidence_threshold: f32,

    /// Paragraphs per collaborator batch
    pub batch_size: usize,

    /// Concurrent in-flight batches
    pub max_concurrent_batches: usize,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            batch_size: 20,
            max_concurrent_batches: 4,
        }
    }
}

impl RefineOptions {
    /// Derive options from the application configuration.
    pub fn from_config(config: &RefinementConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            batch_size: config.batch_size.max(1),
            max_concurrent_batches: config.optimal_concurrent_requests().max(1),
        }
    }
}

/// Pure decision: does a paragraph qualify for refinement?
pub fn needs_refinement(confidence: f32, threshold: f32) -> bool {
    confidence < threshold
}

/// Pure decision: is a refinement pass worth running at all?
/// Capability flags are passed explicitly; no global lookups.
pub fn should_run(provider_available: bool, ambiguous_count: usize) -> bool {
    provider_available && ambiguous_count > 0
}

/// Outcome summary of one refinement pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefineReport {
    /// Paragraphs submitted to the collaborator
    pub submitted: usize,
    /// Paragraphs whose speaker was updated
    pub refined: usize,
    /// Batches that errored, timed out or returned garbage
    pub failed_batches: usize,
}

/// One batch queued for dispatch.
struct BatchJob {
    chapter_idx: usize,
    batch_idx: usize,
    items: Vec<RefineItem>,
}

/// Run a refinement pass over the whole book.
///
/// Text and ordering are never modified; only `speaker` and
/// `confidence` of submitted paragraphs can change. Batches are
/// dispatched concurrently, but merges are applied in a deterministic
/// order after all batches settle.
pub async fn refine_book(
    book: &mut Book,
    refiner: &dyn SpeakerRefiner,
    options: &RefineOptions,
) -> RefineReport {
    let context = RefineContext {
        book_title: book.primary_title().map(str::to_string),
        known_speakers: book.known_speakers().into_iter().collect(),
    };

    let mut jobs = Vec::new();
    for (chapter_idx, chapter) in book.chapters.iter().enumerate() {
        let ambiguous: Vec<RefineItem> = chapter
            .paragraphs()
            .filter(|p| needs_refinement(p.confidence, options.confidence_threshold))
            .map(|p| RefineItem {
                n: p.n,
                text: p.text.clone(),
            })
            .collect();

        for (batch_idx, batch) in ambiguous.chunks(options.batch_size).enumerate() {
            jobs.push(BatchJob {
                chapter_idx,
                batch_idx,
                items: batch.to_vec(),
            });
        }
    }

    let mut report = RefineReport {
        submitted: jobs.iter().map(|j| j.items.len()).sum(),
        ..Default::default()
    };
    if jobs.is_empty() {
        debug!("No paragraph below threshold {}", options.confidence_threshold);
        return report;
    }

    // Dispatch batches concurrently under a semaphore cap
    let semaphore = Arc::new(Semaphore::new(options.max_concurrent_batches));
    let mut results: Vec<_> = stream::iter(jobs)
        .map(|job| {
            let semaphore = semaphore.clone();
            let context = context.clone();
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                let submitted_ns: Vec<usize> = job.items.iter().map(|i| i.n).collect();
                let result = refiner.refine_speakers(&job.items, &context).await;
                (job.chapter_idx, job.batch_idx, submitted_ns, result)
            }
        })
        .buffer_unordered(options.max_concurrent_batches)
        .collect()
        .await;

    // Merge deterministically: original chapter/batch order, not
    // completion order
    results.sort_by_key(|(chapter_idx, batch_idx, _, _)| (*chapter_idx, *batch_idx));

    for (chapter_idx, batch_idx, submitted_ns, result) in results {
        match result {
            Ok(assignments) => {
                let submitted: HashSet<usize> = submitted_ns.into_iter().collect();
                let chapter = &mut book.chapters[chapter_idx];
                for assignment in assignments {
                    // A number we never submitted is collaborator noise
                    if !submitted.contains(&assignment.n) {
                        warn!(
                            "Refiner answered for unsubmitted paragraph {} in chapter {}",
                            assignment.n,
                            chapter_idx + 1
                        );
                        continue;
                    }
                    if let Some(paragraph) =
                        chapter.paragraphs_mut().find(|p| p.n == assignment.n)
                    {
                        paragraph.speaker = Some(assignment.speaker);
                        paragraph.confidence = REFINED_CONFIDENCE;
                        report.refined += 1;
                    }
                }
            }
            Err(e) => {
                // This batch's paragraphs pass through unmodified
                warn!(
                    "Refinement batch {} of chapter {} degraded: {}",
                    batch_idx + 1,
                    chapter_idx + 1,
                    e
                );
                report.failed_batches += 1;
            }
        }
    }

    if report.refined > 0 {
        book.touch();
    }
    info!(
        "Refinement pass: {} submitted, {} refined, {} failed batch(es)",
        report.submitted, report.refined, report.failed_batches
    );
    report
}
