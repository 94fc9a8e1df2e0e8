/*!
 * Speaker attribution.
 *
 * Assigns a speaker label per paragraph from the profile's lexical
 * patterns. Dialogue with an undetermined speaker is the canonical
 * candidate for LLM refinement, so its confidence is capped here.
 */

use crate::rule_profile::CompiledProfile;

/// Confidence ceiling for dialogue whose speaker could not be determined.
pub const AMBIGUOUS_DIALOGUE_CONFIDENCE: f32 = 0.5;

/// Outcome of attribution for one paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribution {
    /// Assigned speaker, None for undetermined dialogue
    pub speaker: Option<String>,
    /// Confidence after attribution
    pub confidence: f32,
}

/// Attribute a speaker to one paragraph, in priority order:
///
/// 1. A known-speaker lexical prefix (`Name:`, `[Name]`, `«Name`,
///    case-insensitive) assigns that speaker at full confidence.
/// 2. A dialogue-opening marker with no recognizable name assigns no
///    speaker and caps confidence at 0.5.
/// 3. Everything else is the profile's default speaker.
pub fn attribute_speaker(text: &str, confidence: f32, profile: &CompiledProfile) -> Attribution {
    let trimmed = text.trim_start();

    for (name, pattern) in &profile.known_speakers {
        if pattern.is_match(trimmed) {
            return Attribution {
                speaker: Some(name.clone()),
                confidence: 1.0,
            };
        }
    }

    if profile.dialogue_dash.is_match(trimmed) {
        return Attribution {
            speaker: None,
            confidence: confidence.min(AMBIGUOUS_DIALOGUE_CONFIDENCE),
        };
    }

    Attribution {
        speaker: Some(profile.default_speaker.clone()),
        confidence,
    }
}
