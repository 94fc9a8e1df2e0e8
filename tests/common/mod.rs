/*!
 * Common test utilities shared across the test suite.
 */

use scriptorium::book::model::{Book, Chapter, ChapterBody, Paragraph, Section};
use scriptorium::book::reference::assign_references;
use scriptorium::rule_profile::{RuleProfile, SpeakerPatterns};

/// Build a flat-chapter book with the given paragraph texts, fully
/// addressed.
pub fn flat_book(code: &str, chapters: &[&[&str]]) -> Book {
    let mut book = Book::new("test-book", code, "en");
    for (idx, texts) in chapters.iter().enumerate() {
        let paragraphs = texts
            .iter()
            .map(|t| Paragraph::draft(t, Some("Narrator".to_string()), 1.0))
            .collect();
        book.chapters.push(Chapter::draft(
            Some(format!("Chapter {}", idx + 1)),
            paragraphs,
        ));
    }
    assign_references(&mut book);
    book
}

/// Build a book whose single chapter has two sections, fully addressed.
pub fn sectioned_book(code: &str, first: &[&str], second: &[&str]) -> Book {
    let mut book = Book::new("test-book", code, "en");
    let make = |texts: &[&str]| -> Vec<Paragraph> {
        texts
            .iter()
            .map(|t| Paragraph::draft(t, Some("Narrator".to_string()), 1.0))
            .collect()
    };
    book.chapters.push(Chapter {
        n: 0,
        title: Some("Chapter 1".to_string()),
        i18n: Default::default(),
        ref_id: String::new(),
        body: ChapterBody::Sectioned(vec![
            Section::draft(Some("First".to_string()), make(first)),
            Section::draft(Some("Second".to_string()), make(second)),
        ]),
    });
    assign_references(&mut book);
    book
}

/// A rule profile matching the scripture-style fixtures used in tests.
pub fn scripture_profile() -> RuleProfile {
    RuleProfile {
        chapter_patterns: vec![r"^#\s+CH\s+[IVX]+".to_string()],
        strip_patterns: vec![r"^\d{1,3}$".to_string()],
        speaker_patterns: SpeakerPatterns {
            known_speakers: vec!["Yahweh".to_string()],
            ..SpeakerPatterns::default()
        },
        ..RuleProfile::default()
    }
}

/// Collect every paragraph number of a chapter in order.
pub fn paragraph_numbers(book: &Book, chapter_idx: usize) -> Vec<usize> {
    book.chapters[chapter_idx].paragraphs().map(|p| p.n).collect()
}

/// Collect every paragraph text of a chapter in order.
pub fn paragraph_texts(book: &Book, chapter_idx: usize) -> Vec<String> {
    book.chapters[chapter_idx]
        .paragraphs()
        .map(|p| p.text.clone())
        .collect()
}
