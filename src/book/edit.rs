/*!
 * Structural edit primitives.
 *
 * Every operation here is a total function over a valid tree: an invalid
 * address is a no-op, never an error, so callers can freely retry with
 * stale addresses. Each mutation ends with a full reference pass and a
 * revision bump; no partially renumbered tree is ever observable.
 */

use log::debug;
use std::collections::hash_map::Entry;

use crate::book::model::{Book, Chapter, ChapterBody, Paragraph, Section};
use crate::book::reference::assign_references;

/// Which container inside a chapter owns a paragraph.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Owner {
    Flat,
    Section(usize),
}

/// Resolved location of a paragraph inside the book.
#[derive(Debug, Clone, Copy)]
struct ParaLoc {
    /// Chapter index
    chapter: usize,
    /// Owning container
    owner: Owner,
    /// Index within the owning container
    index: usize,
    /// Index within the chapter's full paragraph order
    chapter_index: usize,
}

fn locate_paragraph(book: &Book, ref_id: &str) -> Option<ParaLoc> {
    for (chapter_idx, chapter) in book.chapters.iter().enumerate() {
        let mut chapter_index = 0;
        match &chapter.body {
            ChapterBody::Flat(paragraphs) => {
                for (index, paragraph) in paragraphs.iter().enumerate() {
                    if paragraph.ref_id == ref_id {
                        return Some(ParaLoc {
                            chapter: chapter_idx,
                            owner: Owner::Flat,
                            index,
                            chapter_index: index,
                        });
                    }
                }
            }
            ChapterBody::Sectioned(sections) => {
                for (section_idx, section) in sections.iter().enumerate() {
                    for (index, paragraph) in section.paragraphs.iter().enumerate() {
                        if paragraph.ref_id == ref_id {
                            return Some(ParaLoc {
                                chapter: chapter_idx,
                                owner: Owner::Section(section_idx),
                                index,
                                chapter_index,
                            });
                        }
                        chapter_index += 1;
                    }
                }
            }
        }
    }
    None
}

fn container_mut<'a>(chapter: &'a mut Chapter, owner: Owner) -> Option<&'a mut Vec<Paragraph>> {
    match (&mut chapter.body, owner) {
        (ChapterBody::Flat(paragraphs), Owner::Flat) => Some(paragraphs),
        (ChapterBody::Sectioned(sections), Owner::Section(idx)) => {
            sections.get_mut(idx).map(|s| &mut s.paragraphs)
        }
        _ => None,
    }
}

/// Re-establish the section-count invariant after a mutation: empty
/// sections are dropped, and a chapter left with zero or one section is
/// flattened back to paragraph-only form.
fn normalize_chapter(chapter: &mut Chapter) {
    if let ChapterBody::Sectioned(sections) = &mut chapter.body {
        sections.retain(|s| !s.paragraphs.is_empty());
        if sections.len() <= 1 {
            let paragraphs: Vec<Paragraph> =
                sections.drain(..).flat_map(|s| s.paragraphs).collect();
            chapter.body = ChapterBody::Flat(paragraphs);
        }
    }
}

fn finish(book: &mut Book) {
    for chapter in &mut book.chapters {
        normalize_chapter(chapter);
    }
    assign_references(book);
    book.touch();
}

/// Merge the paragraph at `ref_id` with its immediate successor in the
/// same container, joining the texts with a blank line. No-op when the
/// address is unknown or addresses the last paragraph in its scope.
pub fn merge_paragraphs(book: &mut Book, ref_id: &str) -> bool {
    let Some(loc) = locate_paragraph(book, ref_id) else {
        debug!("merge_paragraphs: unknown ref {}", ref_id);
        return false;
    };

    let Some(container) = container_mut(&mut book.chapters[loc.chapter], loc.owner) else {
        return false;
    };
    if loc.index + 1 >= container.len() {
        return false;
    }

    let successor = container.remove(loc.index + 1);
    let target = &mut container[loc.index];
    target.text = format!("{}\n\n{}", target.text, successor.text);
    target.confidence = target.confidence.min(successor.confidence);
    for (lang, text) in successor.i18n {
        match target.i18n.entry(lang) {
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if existing.is_empty() {
                    *existing = text;
                } else if !text.is_empty() {
                    *existing = format!("{}\n\n{}", existing, text);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(text);
            }
        }
    }

    finish(book);
    true
}

/// Split the paragraph at `ref_id` into two at a character offset — the
/// insert-break primitive. The new sibling inherits speaker and
/// confidence; translation slots are cleared on both halves since their
/// text no longer matches. No-op on an unknown address, an offset at
/// either end, or an offset off a character boundary.
pub fn split_paragraph(book: &mut Book, ref_id: &str, offset: usize) -> bool {
    let Some(loc) = locate_paragraph(book, ref_id) else {
        return false;
    };

    let Some(container) = container_mut(&mut book.chapters[loc.chapter], loc.owner) else {
        return false;
    };
    let paragraph = &mut container[loc.index];

    if offset == 0 || offset >= paragraph.text.len() || !paragraph.text.is_char_boundary(offset) {
        debug!("split_paragraph: offset {} rejected for {}", offset, ref_id);
        return false;
    }

    let left = paragraph.text[..offset].trim_end().to_string();
    let right = paragraph.text[offset..].trim_start().to_string();
    if left.is_empty() || right.is_empty() {
        return false;
    }

    paragraph.text = left;
    paragraph.i18n.clear();
    let sibling = Paragraph::draft(&right, paragraph.speaker.clone(), paragraph.confidence);
    container.insert(loc.index + 1, sibling);

    finish(book);
    true
}

/// Split the owning chapter at the paragraph boundary, moving everything
/// from `ref_id` onward into a new untitled chapter inserted right after.
/// Splitting at a chapter's first paragraph is a no-op: an empty leading
/// chapter is never created.
pub fn split_chapter_at(book: &mut Book, ref_id: &str) -> bool {
    let Some(loc) = locate_paragraph(book, ref_id) else {
        return false;
    };
    if loc.chapter_index == 0 {
        return false;
    }

    let chapter = &mut book.chapters[loc.chapter];
    let new_body = match &mut chapter.body {
        ChapterBody::Flat(paragraphs) => {
            let moved = paragraphs.split_off(loc.index);
            ChapterBody::Flat(moved)
        }
        ChapterBody::Sectioned(sections) => {
            let Owner::Section(section_idx) = loc.owner else {
                return false;
            };
            let mut moved_sections = sections.split_off(section_idx + 1);
            if loc.index == 0 {
                // The addressed paragraph opens its section: the whole
                // section moves.
                moved_sections.insert(0, sections.remove(section_idx));
            } else {
                let right = sections[section_idx].paragraphs.split_off(loc.index);
                moved_sections.insert(0, Section::draft(None, right));
            }
            ChapterBody::Sectioned(moved_sections)
        }
    };

    let mut new_chapter = Chapter::draft(None, Vec::new());
    new_chapter.body = new_body;
    book.chapters.insert(loc.chapter + 1, new_chapter);

    finish(book);
    true
}

/// Split at a section boundary. In a flat chapter this synthesizes two
/// untitled sections from the paragraph list; in a sectioned chapter it
/// splits only the section owning `ref_id`. Splitting at a container's
/// first paragraph is a no-op.
pub fn split_section_at(book: &mut Book, ref_id: &str) -> bool {
    let Some(loc) = locate_paragraph(book, ref_id) else {
        return false;
    };
    if loc.index == 0 {
        return false;
    }

    let chapter = &mut book.chapters[loc.chapter];
    match &mut chapter.body {
        ChapterBody::Flat(paragraphs) => {
            let right = paragraphs.split_off(loc.index);
            let left = std::mem::take(paragraphs);
            chapter.body = ChapterBody::Sectioned(vec![
                Section::draft(None, left),
                Section::draft(None, right),
            ]);
        }
        ChapterBody::Sectioned(sections) => {
            let Owner::Section(section_idx) = loc.owner else {
                return false;
            };
            let right = sections[section_idx].paragraphs.split_off(loc.index);
            sections.insert(section_idx + 1, Section::draft(None, right));
        }
    }

    finish(book);
    true
}

/// Absorb chapter `n + 1` into chapter `n` (1-indexed). When either side
/// is sectioned, the flat side is wrapped as a single untitled section
/// before concatenation; the section-count invariant then decides the
/// final shape. No-op when `n` is unknown or the last chapter.
pub fn merge_chapters(book: &mut Book, n: usize) -> bool {
    if n == 0 || n >= book.chapters.len() {
        return false;
    }

    let absorbed = book.chapters.remove(n); // n is 1-indexed: this is chapter n+1
    let target = &mut book.chapters[n - 1];

    let target_body = std::mem::replace(&mut target.body, ChapterBody::Flat(Vec::new()));
    target.body = match (target_body, absorbed.body) {
        (ChapterBody::Flat(mut left), ChapterBody::Flat(right)) => {
            left.extend(right);
            ChapterBody::Flat(left)
        }
        (ChapterBody::Sectioned(mut left), ChapterBody::Sectioned(right)) => {
            left.extend(right);
            ChapterBody::Sectioned(left)
        }
        (ChapterBody::Sectioned(mut left), ChapterBody::Flat(right)) => {
            left.push(Section::draft(None, right));
            ChapterBody::Sectioned(left)
        }
        (ChapterBody::Flat(left), ChapterBody::Sectioned(right)) => {
            let mut sections = vec![Section::draft(None, left)];
            sections.extend(right);
            ChapterBody::Sectioned(sections)
        }
    };

    finish(book);
    true
}

/// Absorb section `section_n + 1` into section `section_n` of chapter
/// `chapter_n` (both 1-indexed). Merging into the sole remaining section
/// flattens the chapter back to paragraph-only form.
pub fn merge_sections(book: &mut Book, chapter_n: usize, section_n: usize) -> bool {
    let Some(chapter) = chapter_n.checked_sub(1).and_then(|i| book.chapters.get_mut(i)) else {
        return false;
    };
    let ChapterBody::Sectioned(sections) = &mut chapter.body else {
        return false;
    };
    if section_n == 0 || section_n >= sections.len() {
        return false;
    }

    let absorbed = sections.remove(section_n); // 1-indexed: this is section_n + 1
    sections[section_n - 1].paragraphs.extend(absorbed.paragraphs);

    finish(book);
    true
}

/// Delete every paragraph whose reference id appears in `ref_ids`.
/// Sections emptied by the deletion are removed; a chapter left with a
/// single section is flattened. Unknown ids are ignored.
pub fn delete_paragraphs(book: &mut Book, ref_ids: &[&str]) -> bool {
    let before = book.paragraph_count();

    for chapter in &mut book.chapters {
        match &mut chapter.body {
            ChapterBody::Flat(paragraphs) => {
                paragraphs.retain(|p| !ref_ids.contains(&p.ref_id.as_str()));
            }
            ChapterBody::Sectioned(sections) => {
                for section in sections.iter_mut() {
                    section.paragraphs.retain(|p| !ref_ids.contains(&p.ref_id.as_str()));
                }
            }
        }
    }

    if book.paragraph_count() == before {
        return false;
    }

    finish(book);
    true
}

/// Delete chapter `n` (1-indexed). No-op on an unknown position.
pub fn delete_chapter(book: &mut Book, n: usize) -> bool {
    if n == 0 || n > book.chapters.len() {
        return false;
    }

    book.chapters.remove(n - 1);
    finish(book);
    true
}

/// Delete section `section_n` of chapter `chapter_n` (both 1-indexed).
/// Deleting all sections but one flattens the chapter.
pub fn delete_section(book: &mut Book, chapter_n: usize, section_n: usize) -> bool {
    let Some(chapter) = chapter_n.checked_sub(1).and_then(|i| book.chapters.get_mut(i)) else {
        return false;
    };
    let ChapterBody::Sectioned(sections) = &mut chapter.body else {
        return false;
    };
    if section_n == 0 || section_n > sections.len() {
        return false;
    }

    sections.remove(section_n - 1);
    finish(book);
    true
}
