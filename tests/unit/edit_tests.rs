/*!
 * Tests for the structural edit primitives.
 *
 * Every operation must keep numbering contiguous, keep reference ids
 * unique, and treat invalid addresses as no-ops.
 */

use scriptorium::book::edit;
use scriptorium::book::model::ChapterBody;

use crate::common::{flat_book, paragraph_numbers, paragraph_texts, sectioned_book};

#[test]
fn test_mergeParagraphs_shouldJoinWithBlankLine() {
    let mut book = flat_book("BK", &[&["First.", "Second.", "Third."]]);

    assert!(edit::merge_paragraphs(&mut book, "BK-1:1"));

    let texts = paragraph_texts(&book, 0);
    assert_eq!(texts, vec!["First.\n\nSecond.", "Third."]);
    assert_eq!(paragraph_numbers(&book, 0), vec![1, 2]);
}

#[test]
fn test_mergeParagraphs_onLastParagraph_shouldBeNoOp() {
    let mut book = flat_book("BK", &[&["First.", "Second."]]);
    let revision = book.revision;

    assert!(!edit::merge_paragraphs(&mut book, "BK-1:2"));
    assert_eq!(book.revision, revision);
    assert_eq!(paragraph_texts(&book, 0), vec!["First.", "Second."]);
}

#[test]
fn test_mergeParagraphs_withUnknownRef_shouldBeNoOp() {
    let mut book = flat_book("BK", &[&["First.", "Second."]]);
    assert!(!edit::merge_paragraphs(&mut book, "BK-9:9"));
    assert!(!edit::merge_paragraphs(&mut book, "garbage"));
    assert!(book.paragraph("BK-1:2").is_some());
}

#[test]
fn test_splitParagraph_thenMerge_shouldRestoreText() {
    let mut book = flat_book("BK", &[&["The beginning and the end."]]);
    let original = paragraph_texts(&book, 0)[0].clone();

    // Split inside "and"
    assert!(edit::split_paragraph(&mut book, "BK-1:1", 14));
    assert_eq!(paragraph_numbers(&book, 0), vec![1, 2]);

    assert!(edit::merge_paragraphs(&mut book, "BK-1:1"));
    let merged = paragraph_texts(&book, 0)[0].clone();

    // Concatenation is exact modulo the separator at the split point
    assert_eq!(merged.replace("\n\n", " "), original);
}

#[test]
fn test_splitParagraph_atEnds_shouldBeNoOp() {
    let mut book = flat_book("BK", &[&["Short text."]]);

    assert!(!edit::split_paragraph(&mut book, "BK-1:1", 0));
    assert!(!edit::split_paragraph(&mut book, "BK-1:1", 999));
    assert_eq!(paragraph_numbers(&book, 0), vec![1]);
}

#[test]
fn test_splitParagraph_shouldInheritSpeaker() {
    let mut book = flat_book("BK", &[&["One two three four five six."]]);
    assert!(edit::split_paragraph(&mut book, "BK-1:1", 8));

    let speakers: Vec<Option<String>> = book.chapters[0]
        .paragraphs()
        .map(|p| p.speaker.clone())
        .collect();
    assert_eq!(speakers.len(), 2);
    assert_eq!(speakers[0].as_deref(), Some("Narrator"));
    assert_eq!(speakers[1].as_deref(), Some("Narrator"));
}

#[test]
fn test_splitChapterAt_shouldCreateDownstreamSibling() {
    let mut book = flat_book("BK", &[&["One.", "Two.", "Three."]]);

    assert!(edit::split_chapter_at(&mut book, "BK-1:2"));

    assert_eq!(book.chapter_count(), 2);
    assert_eq!(paragraph_texts(&book, 0), vec!["One."]);
    assert_eq!(paragraph_texts(&book, 1), vec!["Two.", "Three."]);
    // Renumbered from scratch
    assert_eq!(book.chapters[1].ref_id, "BK-2");
    assert_eq!(paragraph_numbers(&book, 1), vec![1, 2]);
    assert_eq!(book.chapters[1].title, None);
}

#[test]
fn test_splitChapterAt_firstParagraph_shouldBeNoOp() {
    let mut book = flat_book("BK", &[&["One.", "Two."]]);
    assert!(!edit::split_chapter_at(&mut book, "BK-1:1"));
    assert_eq!(book.chapter_count(), 1);
}

#[test]
fn test_splitChapterAt_sectionedChapter_shouldSplitOwningSection() {
    let mut book = sectioned_book("BK", &["a", "b", "c"], &["d", "e"]);

    // Paragraph 2 is inside the first section
    assert!(edit::split_chapter_at(&mut book, "BK-1:2"));

    assert_eq!(book.chapter_count(), 2);
    assert_eq!(paragraph_texts(&book, 0), vec!["a"]);
    assert_eq!(paragraph_texts(&book, 1), vec!["b", "c", "d", "e"]);
    // Both halves keep valid shapes: one section left on each side of
    // the cut collapses to flat
    assert!(!book.chapters[0].is_sectioned());
    assert!(book.chapters[1].is_sectioned());
}

#[test]
fn test_splitSectionAt_onFlatChapter_shouldSynthesizeTwoSections() {
    let mut book = flat_book("BK", &[&["One.", "Two.", "Three."]]);

    assert!(edit::split_section_at(&mut book, "BK-1:3"));

    let chapter = &book.chapters[0];
    assert!(chapter.is_sectioned());
    if let ChapterBody::Sectioned(sections) = &chapter.body {
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].paragraphs.len(), 2);
        assert_eq!(sections[1].paragraphs.len(), 1);
    }
    // Paragraph numbering is chapter-scoped, continuous across sections
    assert_eq!(paragraph_numbers(&book, 0), vec![1, 2, 3]);
}

#[test]
fn test_splitSectionAt_onSectionedChapter_shouldSplitOnlyOwner() {
    let mut book = sectioned_book("BK", &["a", "b"], &["c", "d"]);

    assert!(edit::split_section_at(&mut book, "BK-1:4"));

    if let ChapterBody::Sectioned(sections) = &book.chapters[0].body {
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[1].paragraphs.len(), 1);
        assert_eq!(sections[2].paragraphs.len(), 1);
        assert_eq!(sections[2].title, None);
    } else {
        panic!("chapter should stay sectioned");
    }
}

#[test]
fn test_mergeChapters_shouldAbsorbNextSibling() {
    let mut book = flat_book("BK", &[&["One."], &["Two."], &["Three."]]);

    assert!(edit::merge_chapters(&mut book, 2));

    assert_eq!(book.chapter_count(), 2);
    assert_eq!(paragraph_texts(&book, 1), vec!["Two.", "Three."]);
    assert_eq!(book.chapters[1].ref_id, "BK-2");
}

#[test]
fn test_mergeChapters_onLastChapter_shouldBeNoOp() {
    let mut book = flat_book("BK", &[&["One."], &["Two."]]);
    assert!(!edit::merge_chapters(&mut book, 2));
    assert!(!edit::merge_chapters(&mut book, 0));
    assert_eq!(book.chapter_count(), 2);
}

#[test]
fn test_mergeSections_intoSoleRemaining_shouldFlattenChapter() {
    let mut book = sectioned_book("BK", &["a", "b"], &["c"]);

    assert!(edit::merge_sections(&mut book, 1, 1));

    let chapter = &book.chapters[0];
    assert!(!chapter.is_sectioned());
    assert_eq!(paragraph_texts(&book, 0), vec!["a", "b", "c"]);
    assert_eq!(paragraph_numbers(&book, 0), vec![1, 2, 3]);
}

#[test]
fn test_deleteParagraphs_shouldRenumberContiguously() {
    let mut book = flat_book("BK", &[&["One.", "Two.", "Three.", "Four."]]);

    assert!(edit::delete_paragraphs(&mut book, &["BK-1:2", "BK-1:4"]));

    assert_eq!(paragraph_texts(&book, 0), vec!["One.", "Three."]);
    assert_eq!(paragraph_numbers(&book, 0), vec![1, 2]);
}

#[test]
fn test_deleteParagraphs_emptyingASection_shouldRemoveIt() {
    let mut book = sectioned_book("BK", &["a"], &["b", "c"]);

    // Deleting the only paragraph of section one removes the section,
    // leaving one sibling: the chapter flattens
    assert!(edit::delete_paragraphs(&mut book, &["BK-1:1"]));

    let chapter = &book.chapters[0];
    assert!(!chapter.is_sectioned());
    assert_eq!(paragraph_texts(&book, 0), vec!["b", "c"]);
}

#[test]
fn test_deleteChapter_shouldRenumberRemaining() {
    let mut book = flat_book("BK", &[&["One."], &["Two."], &["Three."]]);

    assert!(edit::delete_chapter(&mut book, 2));

    assert_eq!(book.chapter_count(), 2);
    assert_eq!(paragraph_texts(&book, 1), vec!["Three."]);
    assert_eq!(book.chapters[1].ref_id, "BK-2");
    assert!(!edit::delete_chapter(&mut book, 7));
}

#[test]
fn test_deleteSection_leavingOneSibling_shouldFlatten() {
    let mut book = sectioned_book("BK", &["a", "b"], &["c"]);

    assert!(edit::delete_section(&mut book, 1, 2));

    let chapter = &book.chapters[0];
    assert!(!chapter.is_sectioned());
    assert_eq!(paragraph_texts(&book, 0), vec!["a", "b"]);
}

#[test]
fn test_editSequence_shouldKeepNumberingContiguous() {
    let mut book = flat_book("BK", &[&["a", "b", "c", "d", "e"], &["f", "g"]]);

    edit::split_chapter_at(&mut book, "BK-1:3");
    edit::merge_paragraphs(&mut book, "BK-1:1");
    edit::delete_paragraphs(&mut book, &["BK-2:1"]);
    edit::merge_chapters(&mut book, 2);

    for (ci, chapter) in book.chapters.iter().enumerate() {
        assert_eq!(chapter.n, ci + 1);
        let numbers: Vec<usize> = chapter.paragraphs().map(|p| p.n).collect();
        let expected: Vec<usize> = (1..=numbers.len()).collect();
        assert_eq!(numbers, expected, "chapter {} numbering has gaps", ci + 1);
    }
}

#[test]
fn test_editOps_shouldBumpRevision() {
    let mut book = flat_book("BK", &[&["a", "b"]]);
    let revision = book.revision;

    edit::merge_paragraphs(&mut book, "BK-1:1");
    assert_eq!(book.revision, revision + 1);
}
