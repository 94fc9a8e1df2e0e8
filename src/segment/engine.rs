/*!
 * The rule engine.
 *
 * Composes the normalizer, the three segmenters and the speaker
 * attributor under a compiled rule profile to produce a draft book,
 * then stamps references so the tree is valid from birth.
 */

use anyhow::Result;
use log::{debug, info};

use crate::book::model::{Book, Chapter, Paragraph};
use crate::book::reference::assign_references;
use crate::normalize;
use crate::rule_profile::{CompiledProfile, RuleProfile};
use crate::segment::chapter::segment_chapters;
use crate::segment::paragraph::segment_paragraphs;
use crate::segment::speaker::attribute_speaker;

/// Rule-driven document structuring engine.
pub struct RuleEngine {
    profile: CompiledProfile,
}

impl RuleEngine {
    /// Compile a profile into an engine. Fails only on an uncompilable
    /// pattern.
    pub fn new(profile: &RuleProfile) -> Result<Self> {
        Ok(Self {
            profile: profile.compile()?,
        })
    }

    /// Build a draft book from raw OCR text.
    ///
    /// The returned tree is fully addressed: the reference pass runs
    /// before the book leaves this function.
    pub fn build_book(&self, raw_text: &str, slug: &str, code: &str, primary_lang: &str) -> Book {
        let cleaned = normalize::clean(raw_text);

        let mut book = Book::new(slug, code, primary_lang);

        for span in segment_chapters(&cleaned, &self.profile) {
            let paragraphs: Vec<Paragraph> = segment_paragraphs(&span.content, &self.profile)
                .into_iter()
                .map(|p| {
                    let attribution = attribute_speaker(&p.text, p.confidence, &self.profile);
                    Paragraph::draft(&p.text, attribution.speaker, attribution.confidence)
                })
                .collect();

            // A heading with nothing under it still earns its chapter;
            // an empty preamble does not reach this point.
            debug!(
                "Chapter {:?}: {} paragraph(s)",
                span.title,
                paragraphs.len()
            );
            book.chapters.push(Chapter::draft(span.title, paragraphs));
        }

        assign_references(&mut book);
        info!(
            "Structured '{}': {} chapter(s), {} paragraph(s)",
            slug,
            book.chapter_count(),
            book.paragraph_count()
        );
        book
    }
}
