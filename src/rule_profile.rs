use anyhow::Result;
use log::warn;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ProfileError;

/// Rule profile module
///
/// A rule profile is pure data: the boundary patterns, separator, noise
/// patterns and speaker hints that drive segmentation for one document
/// tradition or layout. New layouts are supported by authoring a new
/// profile, never by changing segmentation code.

/// Declarative segmentation profile, loaded from JSON
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RuleProfile {
    /// Regex patterns matching chapter headings, OR-combined at compile time
    #[serde(default = "default_chapter_patterns")]
    pub chapter_patterns: Vec<String>,

    /// Pattern separating paragraphs inside a chapter
    #[serde(default = "default_paragraph_separator")]
    pub paragraph_separator: String,

    /// Line patterns stripped as OCR noise (page numbers, running headers)
    #[serde(default)]
    pub strip_patterns: Vec<String>,

    /// Speaker detection hints
    #[serde(default)]
    pub speaker_patterns: SpeakerPatterns,

    /// Speaker assigned when no pattern matches
    #[serde(default = "default_speaker")]
    pub default_speaker: String,
}

/// Speaker hint block of a rule profile
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpeakerPatterns {
    /// Characters opening an unattributed dialogue line
    #[serde(default = "default_dialogue_dash")]
    pub dialogue_dash: String,

    /// Names recognized as speakers when used as a lexical prefix
    #[serde(default)]
    pub known_speakers: Vec<String>,
}

impl Default for SpeakerPatterns {
    fn default() -> Self {
        Self {
            dialogue_dash: default_dialogue_dash(),
            known_speakers: Vec::new(),
        }
    }
}

impl Default for RuleProfile {
    fn default() -> Self {
        Self {
            chapter_patterns: default_chapter_patterns(),
            paragraph_separator: default_paragraph_separator(),
            strip_patterns: Vec::new(),
            speaker_patterns: SpeakerPatterns::default(),
            default_speaker: default_speaker(),
        }
    }
}

fn default_chapter_patterns() -> Vec<String> {
    vec![
        r"^#{1,3}\s+.+$".to_string(),
        r"^(?:CHAPTER|Chapter)\s+[IVXLC\d]+.*$".to_string(),
    ]
}

fn default_paragraph_separator() -> String {
    r"\r?\n\s*\r?\n".to_string()
}

fn default_dialogue_dash() -> String {
    r"^[\-\u{2013}\u{2014}]\s*".to_string()
}

fn default_speaker() -> String {
    "Narrator".to_string()
}

impl RuleProfile {
    /// Load a profile from a JSON file, falling back to the built-in
    /// default profile when the file is missing or invalid. Profile
    /// problems are a configuration concern, never fatal.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        let path = path.as_ref();

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<RuleProfile>(&content) {
                Ok(profile) => profile,
                Err(e) => {
                    warn!("Rule profile {} is not valid JSON ({}), using built-in default", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Cannot read rule profile {} ({}), using built-in default", path.display(), e);
                Self::default()
            }
        }
    }

    /// Compile the profile's patterns. Fails fast on an uncompilable
    /// pattern so that bad profiles surface before segmentation starts.
    pub fn compile(&self) -> Result<CompiledProfile, ProfileError> {
        let chapter_boundary = if self.chapter_patterns.is_empty() {
            None
        } else {
            let alternation = self
                .chapter_patterns
                .iter()
                .map(|p| format!("(?:{})", p))
                .collect::<Vec<_>>()
                .join("|");
            Some(build_pattern(&alternation, true)?)
        };

        let paragraph_separator = build_pattern(&self.paragraph_separator, false)?;

        let strip_patterns = self
            .strip_patterns
            .iter()
            .map(|p| build_pattern(p, true))
            .collect::<Result<Vec<_>, _>>()?;

        let dialogue_dash = build_pattern(&self.speaker_patterns.dialogue_dash, false)?;

        let known_speakers = self
            .speaker_patterns
            .known_speakers
            .iter()
            .map(|name| {
                let escaped = regex::escape(name);
                let pattern = format!(r"^(?:{n}\s*:|\[{n}\]|«\s*{n})", n = escaped);
                build_pattern(&pattern, false).map(|re| (name.clone(), re))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledProfile {
            chapter_boundary,
            paragraph_separator,
            strip_patterns,
            dialogue_dash,
            known_speakers,
            default_speaker: self.default_speaker.clone(),
        })
    }
}

fn build_pattern(pattern: &str, multi_line: bool) -> Result<Regex, ProfileError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .multi_line(multi_line)
        .build()
        .map_err(|e| ProfileError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// A rule profile with every pattern compiled, ready for segmentation
#[derive(Debug)]
pub struct CompiledProfile {
    /// OR-combined chapter heading matcher, None when the profile has no patterns
    pub chapter_boundary: Option<Regex>,

    /// Paragraph separator
    pub paragraph_separator: Regex,

    /// Noise line matchers, applied per line
    pub strip_patterns: Vec<Regex>,

    /// Dialogue-opening marker
    pub dialogue_dash: Regex,

    /// (name, prefix matcher) pairs for known speakers
    pub known_speakers: Vec<(String, Regex)>,

    /// Speaker assigned when no pattern matches
    pub default_speaker: String,
}
