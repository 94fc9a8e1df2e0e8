/*!
 * The translation batcher.
 *
 * Chunks paragraphs per target language, dispatches fixed-size batches
 * to the translator collaborator, and merges the answers into each
 * paragraph's i18n slot. Source text is never touched. Every batch and
 * every language degrades independently.
 */

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::app_config::TranslationConfig;
use crate::book::model::{Book, ChapterBody};
use crate::language_utils;
use crate::translate::{TranslateItem, TranslateSpec, Translator};

/// Tuning knobs for a translation pass.
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Paragraphs per collaborator batch
    pub batch_size: usize,

    /// Terms that must be preserved untranslated
    pub preserve_terms: Vec<String>,

    /// Concurrent in-flight batches
    pub max_concurrent_batches: usize,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            batch_size: 15,
            preserve_terms: Vec::new(),
            max_concurrent_batches: 4,
        }
    }
}

impl TranslateOptions {
    /// Derive options from the application configuration.
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            preserve_terms: config.preserve_terms.clone(),
            max_concurrent_batches: 4,
        }
    }
}

/// Outcome summary of one translation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslateReport {
    /// Target languages actually processed
    pub languages: usize,
    /// Paragraph slots filled
    pub translated_paragraphs: usize,
    /// Chapter and section titles filled
    pub translated_titles: usize,
    /// Batches that errored, timed out or returned garbage
    pub failed_batches: usize,
}

struct BatchJob {
    chapter_idx: usize,
    batch_idx: usize,
    items: Vec<TranslateItem>,
}

/// Run a translation pass for every target language.
///
/// A target equal to the primary language is skipped outright: i18n
/// maps never contain the primary language key. On the first pass every
/// paragraph's slot is seeded with an empty string, so a failed batch
/// leaves its paragraphs readable as "not yet translated" rather than
/// absent.
pub async fn translate_book(
    book: &mut Book,
    translator: &dyn Translator,
    targets: &[String],
    options: &TranslateOptions,
) -> TranslateReport {
    let mut report = TranslateReport::default();

    for target in targets {
        if language_utils::language_codes_match(target, &book.primary_lang) {
            debug!("Skipping target {}: same as primary language", target);
            continue;
        }
        let Ok(slot_key) = language_utils::normalize_slot_key(target) else {
            warn!("Skipping unknown target language code {}", target);
            continue;
        };

        report.languages += 1;
        let spec = TranslateSpec {
            source_lang: book.primary_lang.clone(),
            target_lang: slot_key.clone(),
            preserve_terms: options.preserve_terms.clone(),
        };

        translate_language(book, translator, &spec, &slot_key, options, &mut report).await;
    }

    if report.translated_paragraphs > 0 || report.translated_titles > 0 {
        book.touch();
    }
    info!(
        "Translation pass: {} language(s), {} paragraph(s), {} title(s), {} failed batch(es)",
        report.languages,
        report.translated_paragraphs,
        report.translated_titles,
        report.failed_batches
    );
    report
}

async fn translate_language(
    book: &mut Book,
    translator: &dyn Translator,
    spec: &TranslateSpec,
    slot_key: &str,
    options: &TranslateOptions,
    report: &mut TranslateReport,
) {
    // Seed paragraph slots so a later batch failure still leaves a
    // well-formed map
    for chapter in &mut book.chapters {
        for paragraph in chapter.paragraphs_mut() {
            paragraph
                .i18n
                .entry(slot_key.to_string())
                .or_insert_with(String::new);
        }
    }

    // Titles first: one call each for chapters and sections
    for chapter in &mut book.chapters {
        if let Some(title) = chapter.title.clone().filter(|t| !t.is_empty()) {
            match translator.translate_title(&title, spec).await {
                Ok(translated) => {
                    chapter.i18n.insert(slot_key.to_string(), translated);
                    report.translated_titles += 1;
                }
                Err(e) => warn!("Title translation degraded for {}: {}", chapter.ref_id, e),
            }
        }

        if let ChapterBody::Sectioned(sections) = &mut chapter.body {
            for section in sections {
                if let Some(title) = section.title.clone().filter(|t| !t.is_empty()) {
                    match translator.translate_title(&title, spec).await {
                        Ok(translated) => {
                            section.i18n.insert(slot_key.to_string(), translated);
                            report.translated_titles += 1;
                        }
                        Err(e) => warn!("Section title translation degraded: {}", e),
                    }
                }
            }
        }
    }

    // Paragraph batches, dispatched concurrently
    let mut jobs = Vec::new();
    for (chapter_idx, chapter) in book.chapters.iter().enumerate() {
        let items: Vec<TranslateItem> = chapter
            .paragraphs()
            .map(|p| TranslateItem {
                n: p.n,
                text: p.text.clone(),
            })
            .collect();

        for (batch_idx, batch) in items.chunks(options.batch_size).enumerate() {
            jobs.push(BatchJob {
                chapter_idx,
                batch_idx,
                items: batch.to_vec(),
            });
        }
    }

    let semaphore = Arc::new(Semaphore::new(options.max_concurrent_batches));
    let mut results: Vec<_> = stream::iter(jobs)
        .map(|job| {
            let semaphore = semaphore.clone();
            let spec = spec.clone();
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                let submitted_ns: Vec<usize> = job.items.iter().map(|i| i.n).collect();
                let result = translator.translate_batch(&job.items, &spec).await;
                (job.chapter_idx, job.batch_idx, submitted_ns, result)
            }
        })
        .buffer_unordered(options.max_concurrent_batches)
        .collect()
        .await;

    // Merge in original order once every batch has settled
    results.sort_by_key(|(chapter_idx, batch_idx, _, _)| (*chapter_idx, *batch_idx));

    for (chapter_idx, batch_idx, submitted_ns, result) in results {
        match result {
            Ok(translations) => {
                let submitted: HashSet<usize> = submitted_ns.into_iter().collect();
                let chapter = &mut book.chapters[chapter_idx];
                for item in translations {
                    if !submitted.contains(&item.n) {
                        warn!(
                            "Translator answered for unsubmitted paragraph {} in chapter {}",
                            item.n,
                            chapter_idx + 1
                        );
                        continue;
                    }
                    if let Some(paragraph) = chapter.paragraphs_mut().find(|p| p.n == item.n) {
                        paragraph.i18n.insert(slot_key.to_string(), item.text);
                        report.translated_paragraphs += 1;
                    }
                }
            }
            Err(e) => {
                // Prior slot values stay; other batches are unaffected
                warn!(
                    "Translation batch {} of chapter {} degraded for {}: {}",
                    batch_idx + 1,
                    chapter_idx + 1,
                    slot_key,
                    e
                );
                report.failed_batches += 1;
            }
        }
    }
}
