/*!
 * Tests for the translation batcher.
 *
 * The translator is mocked; what is under test is slot seeding, the
 * per-language merge, primary-language exclusion, and batch-level
 * degradation.
 */

use scriptorium::book::model::ChapterBody;
use scriptorium::providers::mock::MockCollaborator;
use scriptorium::translate::{translate_book, TranslateOptions};

use crate::common::{flat_book, sectioned_book};

fn options() -> TranslateOptions {
    TranslateOptions {
        batch_size: 15,
        preserve_terms: vec!["Yahweh".to_string()],
        max_concurrent_batches: 2,
    }
}

#[tokio::test]
async fn test_translateBook_shouldFillParagraphSlots() {
    let mut book = flat_book("BK", &[&["In the beginning.", "There was text."]]);
    let mock = MockCollaborator::working();

    let report = translate_book(&mut book, &mock, &["fr".to_string()], &options()).await;

    assert_eq!(report.languages, 1);
    assert_eq!(report.translated_paragraphs, 2);

    let first = book.chapters[0].paragraphs().next().unwrap();
    assert_eq!(first.i18n.get("fr").unwrap(), "[fr] In the beginning.");
    // Source text untouched
    assert_eq!(first.text, "In the beginning.");
}

#[tokio::test]
async fn test_translateBook_shouldTranslateChapterAndSectionTitles() {
    let mut book = sectioned_book("BK", &["a"], &["b"]);
    let mock = MockCollaborator::working();

    let report = translate_book(&mut book, &mock, &["de".to_string()], &options()).await;

    // One chapter title + two section titles
    assert_eq!(report.translated_titles, 3);
    assert_eq!(book.chapters[0].i18n.get("de").unwrap(), "[de] Chapter 1");
    if let ChapterBody::Sectioned(sections) = &book.chapters[0].body {
        assert_eq!(sections[0].i18n.get("de").unwrap(), "[de] First");
    }
}

#[tokio::test]
async fn test_translateBook_shouldSkipPrimaryLanguage() {
    let mut book = flat_book("BK", &[&["Some text."]]);
    let mock = MockCollaborator::working();

    // "eng" and "en" are the same language in different code families
    let report = translate_book(&mut book, &mock, &["eng".to_string()], &options()).await;

    assert_eq!(report.languages, 0);
    assert_eq!(mock.request_count(), 0);
    let first = book.chapters[0].paragraphs().next().unwrap();
    assert!(first.i18n.is_empty());
}

#[tokio::test]
async fn test_translateBook_shouldSkipUnknownLanguageCodes() {
    let mut book = flat_book("BK", &[&["Some text."]]);
    let mock = MockCollaborator::working();

    let report = translate_book(&mut book, &mock, &["zz".to_string()], &options()).await;

    assert_eq!(report.languages, 0);
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_translateBook_onFailure_shouldSeedEmptySlots() {
    let mut book = flat_book("BK", &[&["Some text.", "More text."]]);
    let mock = MockCollaborator::failing();

    let report = translate_book(&mut book, &mock, &["fr".to_string()], &options()).await;

    assert_eq!(report.translated_paragraphs, 0);
    assert!(report.failed_batches >= 1);

    // First pass seeds the slot with an empty string even on failure
    for paragraph in book.chapters[0].paragraphs() {
        assert_eq!(paragraph.i18n.get("fr").unwrap(), "");
    }
}

#[tokio::test]
async fn test_translateBook_onFailure_shouldKeepPriorValue() {
    let mut book = flat_book("BK", &[&["Some text."]]);

    // First pass fills the slot
    translate_book(&mut book, &MockCollaborator::working(), &["fr".to_string()], &options()).await;
    let filled = book.chapters[0].paragraphs().next().unwrap().i18n.get("fr").unwrap().clone();
    assert!(!filled.is_empty());

    // Second pass fails: the prior value survives
    translate_book(&mut book, &MockCollaborator::failing(), &["fr".to_string()], &options()).await;
    let after = book.chapters[0].paragraphs().next().unwrap().i18n.get("fr").unwrap().clone();
    assert_eq!(filled, after);
}

#[tokio::test]
async fn test_translateBook_shouldNormalizeSlotKeys() {
    let mut book = flat_book("BK", &[&["Some text."]]);
    let mock = MockCollaborator::working();

    // ISO 639-2/B "fre" normalizes to the "fr" slot
    translate_book(&mut book, &mock, &["fre".to_string()], &options()).await;

    let first = book.chapters[0].paragraphs().next().unwrap();
    assert!(first.i18n.contains_key("fr"));
    assert!(!first.i18n.contains_key("fre"));
}

#[tokio::test]
async fn test_translateBook_multipleLanguages_shouldDegradeIndependently() {
    let mut book = flat_book("BK", &[&["Some text."]]);
    // Title call then batch call per language; fail every third request
    let mock = MockCollaborator::intermittent(3);

    let report = translate_book(
        &mut book,
        &mock,
        &["fr".to_string(), "de".to_string()],
        &options(),
    )
    .await;

    assert_eq!(report.languages, 2);
    // At least one language still landed its paragraphs
    assert!(report.translated_paragraphs >= 1);
}

#[tokio::test]
async fn test_translateBook_shouldChunkIntoBatches() {
    let texts: Vec<String> = (0..35).map(|i| format!("Paragraph number {}.", i)).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let mut book = flat_book("BK", &[refs.as_slice()]);
    // Untitled chapters make call counting exact: no title calls
    book.chapters[0].title = None;

    let mock = MockCollaborator::working();
    translate_book(&mut book, &mock, &["fr".to_string()], &options()).await;

    // 35 paragraphs at batch size 15: three batch calls
    assert_eq!(mock.request_count(), 3);
}
