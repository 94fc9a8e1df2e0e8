/*!
 * Rule-based document segmentation.
 *
 * Raw OCR text goes in, a draft book tree comes out:
 * - `chapter`: chapter boundary detection from profile patterns
 * - `paragraph`: paragraph splitting, noise stripping, confidence scoring
 * - `speaker`: speaker attribution from lexical patterns
 * - `engine`: the orchestrator composing the three under a rule profile
 */

pub mod chapter;
pub mod engine;
pub mod paragraph;
pub mod speaker;

pub use engine::RuleEngine;
