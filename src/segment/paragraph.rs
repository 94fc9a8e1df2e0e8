use crate::normalize;
use crate::rule_profile::CompiledProfile;

// @module: Paragraph splitting and confidence scoring

/// A paragraph span with its initial confidence score. Speaker
/// attribution and reference ids come later.
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphSpan {
    /// Trimmed paragraph text
    pub text: String,
    /// Initial segmentation confidence in [0, 1]
    pub confidence: f32,
}

/// Split one chapter's content into scored paragraphs.
///
/// The content arrives Unicode-normalized and de-hyphenated (see
/// `normalize::clean`, applied before chapter segmentation). This pass
/// strips the profile's noise-line patterns, collapses the blank lines
/// the stripping leaves behind, splits on the separator pattern, and
/// drops empty results.
pub fn segment_paragraphs(content: &str, profile: &CompiledProfile) -> Vec<ParagraphSpan> {
    let stripped = strip_noise_lines(content, profile);
    let collapsed = normalize::collapse_blank_lines(&stripped);

    profile
        .paragraph_separator
        .split(&collapsed)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|text| ParagraphSpan {
            text: text.to_string(),
            confidence: score_confidence(text),
        })
        .collect()
}

/// Remove lines matching any of the profile's strip patterns: page
/// numbers, running headers, printer's marks.
fn strip_noise_lines(content: &str, profile: &CompiledProfile) -> String {
    if profile.strip_patterns.is_empty() {
        return content.to_string();
    }

    content
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !profile.strip_patterns.iter().any(|re| re.is_match(trimmed))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Deterministic text-quality heuristic. Intentionally crude and fast:
/// it only flags candidates for refinement, it does not score quality.
///
/// Very short fragments are usually OCR debris; a high ratio of
/// characters outside letters/digits/whitespace/basic punctuation
/// usually means a mangled scan.
pub fn score_confidence(text: &str) -> f32 {
    let char_count = text.chars().count();

    if char_count < 10 {
        return 0.3;
    }
    if char_count < 30 {
        return 0.6;
    }
    if special_char_ratio(text) > 0.3 {
        return 0.5;
    }
    1.0
}

/// Ratio of characters outside letters, digits, whitespace and basic
/// punctuation.
fn special_char_ratio(text: &str) -> f32 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }

    let special = text
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace() && !is_basic_punctuation(*c))
        .count();

    special as f32 / total as f32
}

fn is_basic_punctuation(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"' | '(' | ')' | '-' | '\u{2014}' | '«' | '»')
}
