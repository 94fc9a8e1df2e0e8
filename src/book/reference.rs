/*!
 * Canonical addressing for the book tree.
 *
 * `assign_references` is the single source of truth for numbering: it is
 * the only code allowed to mutate `n` and `ref_id` fields, and it runs
 * after every structural change. The pass is idempotent.
 */

use crate::book::model::{Book, ChapterBody};

/// Recompute every chapter/section/paragraph number and reference id.
///
/// Chapters are numbered 1..count in order. Within a sectioned chapter,
/// sections are numbered 1..count while a single running paragraph
/// counter carries across section boundaries, so paragraph numbering is
/// chapter-scoped and never resets per section.
pub fn assign_references(book: &mut Book) {
    let code = book.code.clone();

    for (chapter_idx, chapter) in book.chapters.iter_mut().enumerate() {
        let chapter_n = chapter_idx + 1;
        chapter.n = chapter_n;
        chapter.ref_id = format!("{}-{}", code, chapter_n);

        match &mut chapter.body {
            ChapterBody::Flat(paragraphs) => {
                for (idx, paragraph) in paragraphs.iter_mut().enumerate() {
                    paragraph.n = idx + 1;
                    paragraph.ref_id = format!("{}-{}:{}", code, chapter_n, paragraph.n);
                }
            }
            ChapterBody::Sectioned(sections) => {
                let mut paragraph_n = 0;
                for (section_idx, section) in sections.iter_mut().enumerate() {
                    section.n = section_idx + 1;
                    for paragraph in &mut section.paragraphs {
                        paragraph_n += 1;
                        paragraph.n = paragraph_n;
                        paragraph.ref_id = format!("{}-{}:{}", code, chapter_n, paragraph_n);
                    }
                }
            }
        }
    }
}
