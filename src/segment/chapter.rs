use once_cell::sync::Lazy;
use regex::Regex;

use crate::rule_profile::CompiledProfile;

// @module: Chapter boundary detection

// @const: Leading heading markers and whitespace stripped from titles
static HEADING_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[#*=\s]+").unwrap()
});

/// A chapter span produced by boundary scanning. Numbering and reference
/// ids are stamped later by the reference pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterSpan {
    /// Heading-derived title, None for the preamble or an unmatched text
    pub title: Option<String>,
    /// Raw content between this heading and the next
    pub content: String,
}

/// Scan `text` for chapter boundaries using the profile's OR-combined
/// heading pattern.
///
/// Each non-overlapping match becomes a chapter heading; a chapter's
/// content runs from the end of its heading to the start of the next
/// match. Text before the first match becomes an untitled preamble
/// chapter; text with no match at all becomes a single untitled chapter.
pub fn segment_chapters(text: &str, profile: &CompiledProfile) -> Vec<ChapterSpan> {
    let Some(boundary) = &profile.chapter_boundary else {
        return vec![ChapterSpan { title: None, content: text.to_string() }];
    };

    let matches: Vec<(usize, usize, &str)> = boundary
        .find_iter(text)
        .map(|m| (m.start(), m.end(), m.as_str()))
        .collect();

    if matches.is_empty() {
        return vec![ChapterSpan { title: None, content: text.to_string() }];
    }

    let mut spans = Vec::with_capacity(matches.len() + 1);

    // Leading text before the first heading becomes the preamble
    if matches[0].0 > 0 {
        let preamble = &text[..matches[0].0];
        if !preamble.trim().is_empty() {
            spans.push(ChapterSpan {
                title: None,
                content: preamble.to_string(),
            });
        }
    }

    for (idx, (_, heading_end, heading)) in matches.iter().enumerate() {
        let content_end = matches.get(idx + 1).map_or(text.len(), |next| next.0);
        spans.push(ChapterSpan {
            title: Some(strip_heading_marker(heading)),
            content: text[*heading_end..content_end].to_string(),
        });
    }

    spans
}

/// Turn a raw heading match into a title: leading markers and
/// whitespace removed, trailing whitespace trimmed.
fn strip_heading_marker(heading: &str) -> String {
    HEADING_MARKER_REGEX.replace(heading, "").trim_end().to_string()
}
