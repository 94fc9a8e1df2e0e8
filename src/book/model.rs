/*!
 * Core document model types for structured books.
 *
 * These types provide a rich, JSON-serializable representation of a
 * segmented document that preserves hierarchy, speaker attribution, and
 * per-language translation slots.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A complete structured book with metadata and chapters.
///
/// This is the primary data structure of the pipeline. It is created once
/// per source document by the rule engine, mutated by structural edits and
/// the automated refinement/translation passes, and read by export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Stable external identifier
    pub slug: String,

    /// Short uppercase identifier used in reference ids.
    /// Immutable once references are stamped, unless a full
    /// re-addressing pass runs.
    pub code: String,

    /// Primary language code of the source text
    pub primary_lang: String,

    /// Book title per language (primary language included here)
    #[serde(default)]
    pub titles: HashMap<String, String>,

    /// Publication year of the scanned source, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,

    /// Monotonically increasing revision counter
    pub revision: u64,

    /// Timestamp of the last mutation
    pub updated: DateTime<Utc>,

    /// Ordered chapters
    pub chapters: Vec<Chapter>,
}

impl Book {
    /// Create an empty book shell. Chapters are filled in by the rule
    /// engine, reference ids by the reference pass.
    pub fn new(slug: &str, code: &str, primary_lang: &str) -> Self {
        Self {
            slug: slug.to_string(),
            code: code.to_uppercase(),
            primary_lang: primary_lang.to_string(),
            titles: HashMap::new(),
            publication_year: None,
            revision: 0,
            updated: Utc::now(),
            chapters: Vec::new(),
        }
    }

    /// Set the title in the primary language.
    pub fn with_title(mut self, title: &str) -> Self {
        self.titles.insert(self.primary_lang.clone(), title.to_string());
        self
    }

    /// Title in the primary language, when set.
    pub fn primary_title(&self) -> Option<&str> {
        self.titles.get(&self.primary_lang).map(String::as_str)
    }

    /// Record a mutation: bump revision, refresh the timestamp.
    pub fn touch(&mut self) {
        self.revision += 1;
        self.updated = Utc::now();
    }

    /// Total paragraph count across all chapters.
    pub fn paragraph_count(&self) -> usize {
        self.chapters.iter().map(Chapter::paragraph_count).sum()
    }

    /// Number of chapters.
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Every distinct speaker already attributed somewhere in the book.
    /// Fed to the refiner as shared context.
    pub fn known_speakers(&self) -> BTreeSet<String> {
        self.chapters
            .iter()
            .flat_map(Chapter::paragraphs)
            .filter_map(|p| p.speaker.clone())
            .collect()
    }

    /// Find a paragraph by its reference id.
    pub fn paragraph(&self, ref_id: &str) -> Option<&Paragraph> {
        self.chapters
            .iter()
            .flat_map(Chapter::paragraphs)
            .find(|p| p.ref_id == ref_id)
    }
}

/// A chapter: either a flat run of paragraphs or a run of sections,
/// never both. The tagged union makes the mutual-exclusivity invariant
/// unrepresentable-by-construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// 1-indexed position, recomputed by the reference pass
    pub n: usize,

    /// Chapter title; None for an untitled preamble chapter
    pub title: Option<String>,

    /// Translated titles per language, primary language excluded
    #[serde(default)]
    pub i18n: HashMap<String, String>,

    /// Canonical address: `{code}-{n}`
    pub ref_id: String,

    /// Flat paragraphs or sections
    #[serde(flatten)]
    pub body: ChapterBody,
}

/// The two legal chapter shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChapterBody {
    /// Flat ordered paragraphs
    #[serde(rename = "paragraphs")]
    Flat(Vec<Paragraph>),

    /// Ordered sections; only meaningful with two or more
    #[serde(rename = "sections")]
    Sectioned(Vec<Section>),
}

impl Chapter {
    /// Create a draft chapter with unstamped references.
    pub fn draft(title: Option<String>, paragraphs: Vec<Paragraph>) -> Self {
        Self {
            n: 0,
            title,
            i18n: HashMap::new(),
            ref_id: String::new(),
            body: ChapterBody::Flat(paragraphs),
        }
    }

    /// Whether this chapter is divided into sections.
    pub fn is_sectioned(&self) -> bool {
        matches!(self.body, ChapterBody::Sectioned(_))
    }

    /// Iterate paragraphs in order, across sections when present.
    pub fn paragraphs(&self) -> Box<dyn Iterator<Item = &Paragraph> + '_> {
        match &self.body {
            ChapterBody::Flat(paragraphs) => Box::new(paragraphs.iter()),
            ChapterBody::Sectioned(sections) => {
                Box::new(sections.iter().flat_map(|s| s.paragraphs.iter()))
            }
        }
    }

    /// Iterate paragraphs mutably in order, across sections when present.
    pub fn paragraphs_mut(&mut self) -> Box<dyn Iterator<Item = &mut Paragraph> + '_> {
        match &mut self.body {
            ChapterBody::Flat(paragraphs) => Box::new(paragraphs.iter_mut()),
            ChapterBody::Sectioned(sections) => {
                Box::new(sections.iter_mut().flat_map(|s| s.paragraphs.iter_mut()))
            }
        }
    }

    /// Paragraph count across the whole chapter.
    pub fn paragraph_count(&self) -> usize {
        match &self.body {
            ChapterBody::Flat(paragraphs) => paragraphs.len(),
            ChapterBody::Sectioned(sections) => sections.iter().map(|s| s.paragraphs.len()).sum(),
        }
    }
}

/// A titled subdivision of a chapter. Paragraph numbering is
/// chapter-scoped and runs continuously across sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// 1-indexed position within the chapter, recomputed
    pub n: usize,

    /// Section title; None for a synthesized section
    pub title: Option<String>,

    /// Translated titles per language, primary language excluded
    #[serde(default)]
    pub i18n: HashMap<String, String>,

    /// Paragraphs in this section
    pub paragraphs: Vec<Paragraph>,
}

impl Section {
    /// Create a draft section with unstamped numbering.
    pub fn draft(title: Option<String>, paragraphs: Vec<Paragraph>) -> Self {
        Self {
            n: 0,
            title,
            i18n: HashMap::new(),
            paragraphs,
        }
    }
}

/// Human review state of a paragraph. A workflow flag, not a structural
/// one: it never influences segmentation or addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vetted {
    /// Not yet looked at by a human
    #[default]
    Unreviewed,
    /// Reviewed and accepted
    Vetted,
    /// Explicitly skipped during review
    Skipped,
}

/// A single paragraph with attribution, confidence and translation slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    /// Chapter-scoped 1-indexed position, recomputed
    pub n: usize,

    /// Primary-language content; immutable except by explicit edit
    pub text: String,

    /// Attributed speaker, None for undetermined dialogue
    pub speaker: Option<String>,

    /// Translated text per language, primary language excluded
    #[serde(default)]
    pub i18n: HashMap<String, String>,

    /// Canonical address: `{code}-{chapterN}:{paragraphN}`
    pub ref_id: String,

    /// Segmentation/attribution reliability in [0, 1].
    /// Used only to gate refinement, not a quality score.
    pub confidence: f32,

    /// Human review tri-state
    #[serde(default)]
    pub vetted: Vetted,
}

impl Paragraph {
    /// Create a draft paragraph with unstamped references.
    pub fn draft(text: &str, speaker: Option<String>, confidence: f32) -> Self {
        Self {
            n: 0,
            text: text.to_string(),
            speaker,
            i18n: HashMap::new(),
            ref_id: String::new(),
            confidence: confidence.clamp(0.0, 1.0),
            vetted: Vetted::default(),
        }
    }
}
