/*!
 * Canonical JSON export.
 *
 * Export is a pure read of the book tree. The export shape is the
 * external data contract: internal workflow fields (confidence, vetted)
 * never appear in it. Oversized books are split into one file per
 * chapter plus a `_meta.json` index.
 */

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::book::model::{Book, Chapter, ChapterBody, Paragraph, Section};
use crate::errors::{ExportError, SchemaIssue};

/// Schema identifier stamped into every exported artifact.
pub const SCHEMA_VERSION: &str = "book.v1";

/// Serialized size above which export switches to the split layout.
pub const DEFAULT_SPLIT_THRESHOLD_BYTES: usize = 100_000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportBook<'a> {
    slug: &'a str,
    code: &'a str,
    primary_lang: &'a str,
    titles: &'a HashMap<String, String>,
    schema: &'static str,
    revision: u64,
    updated: &'a DateTime<Utc>,
    chapters: Vec<ExportChapter<'a>>,
    ref_id: &'a str,
    paragraph_count: usize,
    chapter_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportChapter<'a> {
    n: usize,
    title: &'a Option<String>,
    i18n: &'a HashMap<String, String>,
    ref_id: &'a str,
    #[serde(flatten)]
    body: ExportChapterBody<'a>,
}

#[derive(Debug, Serialize)]
enum ExportChapterBody<'a> {
    #[serde(rename = "paragraphs")]
    Flat(Vec<ExportParagraph<'a>>),
    #[serde(rename = "sections")]
    Sectioned(Vec<ExportSection<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportSection<'a> {
    n: usize,
    title: &'a Option<String>,
    i18n: &'a HashMap<String, String>,
    paragraphs: Vec<ExportParagraph<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportParagraph<'a> {
    n: usize,
    speaker: &'a Option<String>,
    text: &'a str,
    i18n: &'a HashMap<String, String>,
    ref_id: &'a str,
}

impl<'a> ExportParagraph<'a> {
    fn from(p: &'a Paragraph) -> Self {
        Self {
            n: p.n,
            speaker: &p.speaker,
            text: &p.text,
            i18n: &p.i18n,
            ref_id: &p.ref_id,
        }
    }
}

impl<'a> ExportSection<'a> {
    fn from(s: &'a Section) -> Self {
        Self {
            n: s.n,
            title: &s.title,
            i18n: &s.i18n,
            paragraphs: s.paragraphs.iter().map(ExportParagraph::from).collect(),
        }
    }
}

impl<'a> ExportChapter<'a> {
    fn from(c: &'a Chapter) -> Self {
        let body = match &c.body {
            ChapterBody::Flat(paragraphs) => {
                ExportChapterBody::Flat(paragraphs.iter().map(ExportParagraph::from).collect())
            }
            ChapterBody::Sectioned(sections) => {
                ExportChapterBody::Sectioned(sections.iter().map(ExportSection::from).collect())
            }
        };
        Self {
            n: c.n,
            title: &c.title,
            i18n: &c.i18n,
            ref_id: &c.ref_id,
            body,
        }
    }
}

fn export_view(book: &Book) -> ExportBook<'_> {
    ExportBook {
        slug: &book.slug,
        code: &book.code,
        primary_lang: &book.primary_lang,
        titles: &book.titles,
        schema: SCHEMA_VERSION,
        revision: book.revision,
        updated: &book.updated,
        chapters: book.chapters.iter().map(ExportChapter::from).collect(),
        ref_id: &book.code,
        paragraph_count: book.paragraph_count(),
        chapter_count: book.chapter_count(),
    }
}

/// Validate the tree against the export schema. Returns every problem
/// found, each with a path into the document and a message; a failed
/// validation means nothing gets written.
pub fn validate(book: &Book) -> Result<(), Vec<SchemaIssue>> {
    let mut issues = Vec::new();
    let mut push = |path: String, message: String| issues.push(SchemaIssue { path, message });

    if book.slug.trim().is_empty() {
        push("/slug".into(), "slug must not be empty".into());
    }
    if book.code.trim().is_empty() {
        push("/code".into(), "code must not be empty".into());
    }

    let mut seen_refs: HashSet<&str> = HashSet::new();

    for (ci, chapter) in book.chapters.iter().enumerate() {
        let cpath = format!("/chapters/{}", ci);

        if chapter.n != ci + 1 {
            push(format!("{}/n", cpath), format!("expected {}, found {}", ci + 1, chapter.n));
        }
        let expected_ref = format!("{}-{}", book.code, ci + 1);
        if chapter.ref_id != expected_ref {
            push(format!("{}/refId", cpath), format!("expected {}, found {}", expected_ref, chapter.ref_id));
        }
        if !seen_refs.insert(&chapter.ref_id) {
            push(format!("{}/refId", cpath), format!("duplicate reference id {}", chapter.ref_id));
        }
        if chapter.i18n.contains_key(&book.primary_lang) {
            push(format!("{}/i18n", cpath), "i18n must not contain the primary language".into());
        }

        if let ChapterBody::Sectioned(sections) = &chapter.body {
            if sections.len() < 2 {
                push(cpath.clone(), format!("sectioned chapter needs >= 2 sections, found {}", sections.len()));
            }
            for (si, section) in sections.iter().enumerate() {
                if section.n != si + 1 {
                    push(
                        format!("{}/sections/{}/n", cpath, si),
                        format!("expected {}, found {}", si + 1, section.n),
                    );
                }
                if section.i18n.contains_key(&book.primary_lang) {
                    push(
                        format!("{}/sections/{}/i18n", cpath, si),
                        "i18n must not contain the primary language".into(),
                    );
                }
            }
        }

        for (pi, paragraph) in chapter.paragraphs().enumerate() {
            let ppath = format!("{}/paragraphs/{}", cpath, pi);

            if paragraph.n != pi + 1 {
                push(format!("{}/n", ppath), format!("expected {}, found {}", pi + 1, paragraph.n));
            }
            let expected_ref = format!("{}-{}:{}", book.code, ci + 1, pi + 1);
            if paragraph.ref_id != expected_ref {
                push(
                    format!("{}/refId", ppath),
                    format!("expected {}, found {}", expected_ref, paragraph.ref_id),
                );
            }
            if !seen_refs.insert(&paragraph.ref_id) {
                push(format!("{}/refId", ppath), format!("duplicate reference id {}", paragraph.ref_id));
            }
            if !(0.0..=1.0).contains(&paragraph.confidence) {
                push(
                    format!("{}/confidence", ppath),
                    format!("confidence {} outside [0, 1]", paragraph.confidence),
                );
            }
            if paragraph.i18n.contains_key(&book.primary_lang) {
                push(format!("{}/i18n", ppath), "i18n must not contain the primary language".into());
            }
        }
    }

    if issues.is_empty() { Ok(()) } else { Err(issues) }
}

/// Which file layout an export will use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportLayout {
    /// Everything in one JSON file
    SingleFile,
    /// One file per chapter plus a `_meta.json` index
    SplitPerChapter,
}

/// A file the export will produce.
#[derive(Debug, Clone)]
pub struct ExportFile {
    /// File name relative to the export directory
    pub name: String,
    /// Serialized content
    pub json: serde_json::Value,
}

/// A fully planned export: validated, serialized, layout chosen.
#[derive(Debug)]
pub struct ExportPlan {
    /// Chosen layout
    pub layout: ExportLayout,
    /// Files to write, in order
    pub files: Vec<ExportFile>,
}

/// Validate and serialize the book, choosing single-file or per-chapter
/// layout by serialized size.
pub fn plan_export(book: &Book, split_threshold_bytes: usize) -> Result<ExportPlan, ExportError> {
    validate(book).map_err(ExportError::Validation)?;

    let view = export_view(book);
    let full = serde_json::to_value(&view).map_err(|e| ExportError::Serialize(e.to_string()))?;
    let serialized_len = serde_json::to_vec(&full)
        .map_err(|e| ExportError::Serialize(e.to_string()))?
        .len();

    if serialized_len <= split_threshold_bytes {
        debug!("Export fits in one file ({} bytes)", serialized_len);
        return Ok(ExportPlan {
            layout: ExportLayout::SingleFile,
            files: vec![ExportFile {
                name: format!("{}.json", book.slug),
                json: full,
            }],
        });
    }

    debug!(
        "Export is {} bytes (> {}), splitting per chapter",
        serialized_len, split_threshold_bytes
    );

    let mut files = Vec::with_capacity(book.chapters.len() + 1);
    let mut chapter_index = Vec::with_capacity(book.chapters.len());

    let mut meta = full;
    let chapters = meta
        .as_object_mut()
        .and_then(|o| o.remove("chapters"))
        .and_then(|v| match v {
            serde_json::Value::Array(items) => Some(items),
            _ => None,
        })
        .unwrap_or_default();

    for (idx, chapter_json) in chapters.into_iter().enumerate() {
        let n = idx + 1;
        let name = format!("{}-{:03}.json", book.slug, n);
        chapter_index.push(serde_json::json!({
            "n": n,
            "refId": chapter_json.get("refId").cloned().unwrap_or_default(),
            "title": chapter_json.get("title").cloned().unwrap_or_default(),
            "file": name,
        }));
        files.push(ExportFile { name, json: chapter_json });
    }

    if let Some(obj) = meta.as_object_mut() {
        obj.insert("chapters".to_string(), serde_json::Value::Array(chapter_index));
    }
    files.insert(0, ExportFile { name: "_meta.json".to_string(), json: meta });

    Ok(ExportPlan {
        layout: ExportLayout::SplitPerChapter,
        files,
    })
}

/// Write a planned export under `dir`. Returns the written paths.
pub fn write_plan(plan: &ExportPlan, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let mut written = Vec::with_capacity(plan.files.len());
    for file in &plan.files {
        let path = dir.join(&file.name);
        let bytes = serde_json::to_vec_pretty(&file.json)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write export file: {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
