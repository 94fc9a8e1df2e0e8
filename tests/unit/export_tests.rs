/*!
 * Tests for the export contract: canonical shape, internal-field
 * exclusion, schema validation, and the single-vs-split layout choice.
 */

use scriptorium::book::edit;
use scriptorium::book::export::{plan_export, validate, write_plan, ExportLayout, SCHEMA_VERSION};
use scriptorium::book::model::Vetted;

use crate::common::{flat_book, sectioned_book};

#[test]
fn test_planExport_singleFile_shouldHaveCanonicalShape() {
    let mut book = flat_book("BK", &[&["In the beginning.", "There was text."]]);
    book.titles.insert("en".to_string(), "Test Book".to_string());

    let plan = plan_export(&book, 100_000).unwrap();
    assert_eq!(plan.layout, ExportLayout::SingleFile);
    assert_eq!(plan.files.len(), 1);
    assert_eq!(plan.files[0].name, "test-book.json");

    let json = &plan.files[0].json;
    assert_eq!(json["slug"], "test-book");
    assert_eq!(json["code"], "BK");
    assert_eq!(json["primaryLang"], "en");
    assert_eq!(json["schema"], SCHEMA_VERSION);
    assert_eq!(json["refId"], "BK");
    assert_eq!(json["chapterCount"], 1);
    assert_eq!(json["paragraphCount"], 2);

    let chapter = &json["chapters"][0];
    assert_eq!(chapter["n"], 1);
    assert_eq!(chapter["refId"], "BK-1");
    assert!(chapter.get("paragraphs").is_some());
    assert!(chapter.get("sections").is_none());

    let paragraph = &chapter["paragraphs"][0];
    assert_eq!(paragraph["n"], 1);
    assert_eq!(paragraph["refId"], "BK-1:1");
    assert_eq!(paragraph["text"], "In the beginning.");
    assert_eq!(paragraph["speaker"], "Narrator");
}

#[test]
fn test_planExport_shouldExcludeInternalFields() {
    let mut book = flat_book("BK", &[&["Some text."]]);
    if let Some(p) = book.chapters[0].paragraphs_mut().next() {
        p.vetted = Vetted::Vetted;
        p.confidence = 0.42;
    }

    let plan = plan_export(&book, 100_000).unwrap();
    let paragraph = &plan.files[0].json["chapters"][0]["paragraphs"][0];

    assert!(paragraph.get("confidence").is_none());
    assert!(paragraph.get("vetted").is_none());
}

#[test]
fn test_planExport_sectionedChapter_shouldEmitSectionsOnly() {
    let book = sectioned_book("BK", &["a"], &["b"]);

    let plan = plan_export(&book, 100_000).unwrap();
    let chapter = &plan.files[0].json["chapters"][0];

    assert!(chapter.get("sections").is_some());
    assert!(chapter.get("paragraphs").is_none());
    assert_eq!(chapter["sections"][0]["n"], 1);
    assert_eq!(chapter["sections"][0]["title"], "First");
    // Chapter-scoped numbering carries into the second section
    assert_eq!(chapter["sections"][1]["paragraphs"][0]["n"], 2);
}

#[test]
fn test_planExport_afterSectionDeletion_shouldHaveNoSectionsField() {
    let mut book = sectioned_book("BK", &["a", "b"], &["c"]);
    assert!(edit::delete_section(&mut book, 1, 2));

    let plan = plan_export(&book, 100_000).unwrap();
    let chapter = &plan.files[0].json["chapters"][0];

    assert!(chapter.get("sections").is_none());
    assert!(chapter.get("paragraphs").is_some());
}

#[test]
fn test_planExport_oversizedBook_shouldSplitPerChapter() {
    let long_a = "A very long paragraph of filler text. ".repeat(80);
    let long_b = "Another very long paragraph of filler. ".repeat(80);
    let texts_a: Vec<&str> = vec![&long_a; 20];
    let texts_b: Vec<&str> = vec![&long_b; 20];
    let book = flat_book("BK", &[texts_a.as_slice(), texts_b.as_slice()]);

    let plan = plan_export(&book, 100_000).unwrap();
    assert_eq!(plan.layout, ExportLayout::SplitPerChapter);

    // _meta.json first, then one file per chapter
    assert_eq!(plan.files.len(), 3);
    assert_eq!(plan.files[0].name, "_meta.json");
    assert_eq!(plan.files[1].name, "test-book-001.json");
    assert_eq!(plan.files[2].name, "test-book-002.json");

    let meta = &plan.files[0].json;
    assert_eq!(meta["chapters"][0]["file"], "test-book-001.json");
    assert_eq!(meta["chapters"][0]["refId"], "BK-1");
    assert_eq!(meta["paragraphCount"], 40);

    // Chapter files carry the full chapter payload
    assert_eq!(plan.files[1].json["refId"], "BK-1");
    assert!(plan.files[1].json.get("paragraphs").is_some());
}

#[test]
fn test_validate_withBrokenNumbering_shouldListIssues() {
    let mut book = flat_book("BK", &[&["One.", "Two."]]);
    // Corrupt the tree behind the reference pass's back
    if let Some(p) = book.chapters[0].paragraphs_mut().nth(1) {
        p.n = 7;
        p.ref_id = "BK-1:7".to_string();
    }

    let issues = validate(&book).unwrap_err();
    assert!(!issues.is_empty());
    assert!(issues.iter().any(|i| i.path.contains("/paragraphs/1")));
}

#[test]
fn test_validate_withDuplicateRefIds_shouldFail() {
    let mut book = flat_book("BK", &[&["One.", "Two."]]);
    if let Some(p) = book.chapters[0].paragraphs_mut().nth(1) {
        p.ref_id = "BK-1:1".to_string();
        p.n = 1;
    }

    let issues = validate(&book).unwrap_err();
    assert!(issues.iter().any(|i| i.message.contains("duplicate")));
}

#[test]
fn test_validate_withPrimaryLangInI18n_shouldFail() {
    let mut book = flat_book("BK", &[&["One."]]);
    if let Some(p) = book.chapters[0].paragraphs_mut().next() {
        p.i18n.insert("en".to_string(), "should not be here".to_string());
    }

    let issues = validate(&book).unwrap_err();
    assert!(issues.iter().any(|i| i.message.contains("primary language")));
}

#[test]
fn test_planExport_invalidBook_shouldNotProduceFiles() {
    let mut book = flat_book("BK", &[&["One."]]);
    if let Some(p) = book.chapters[0].paragraphs_mut().next() {
        p.confidence = 3.0;
    }

    assert!(plan_export(&book, 100_000).is_err());
}

#[test]
fn test_writePlan_shouldWriteAllFiles() {
    let dir = tempfile::tempdir().unwrap();
    let book = flat_book("BK", &[&["One.", "Two."]]);

    let plan = plan_export(&book, 100_000).unwrap();
    let written = write_plan(&plan, dir.path()).unwrap();

    assert_eq!(written.len(), 1);
    assert!(written[0].exists());
    let content = std::fs::read_to_string(&written[0]).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed["slug"], "test-book");
}
