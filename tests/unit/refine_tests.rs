/*!
 * Tests for the refinement strategy.
 *
 * The collaborator is mocked; what is under test is the partition by
 * confidence, the sparse merge, and the identity fallback on failure.
 */

use scriptorium::book::model::{Book, Chapter, Paragraph};
use scriptorium::book::reference::assign_references;
use scriptorium::providers::mock::MockCollaborator;
use scriptorium::refine::strategy::{needs_refinement, should_run, REFINED_CONFIDENCE};
use scriptorium::refine::{refine_book, RefineOptions};

/// A chapter mixing confident narration with ambiguous dialogue.
fn mixed_book() -> Book {
    let mut book = Book::new("mixed", "MIX", "en").with_title("Mixed Fixture");
    book.chapters.push(Chapter::draft(
        Some("One".to_string()),
        vec![
            Paragraph::draft("A confident narrated paragraph of sufficient length.", Some("Narrator".to_string()), 1.0),
            Paragraph::draft("\u{2014} Who goes there?", None, 0.5),
            Paragraph::draft("Another confident paragraph, long enough to pass.", Some("Narrator".to_string()), 1.0),
            Paragraph::draft("\u{2014} It is I.", None, 0.3),
        ],
    ));
    assign_references(&mut book);
    book
}

fn options() -> RefineOptions {
    RefineOptions {
        confidence_threshold: 0.7,
        batch_size: 20,
        max_concurrent_batches: 2,
    }
}

#[tokio::test]
async fn test_refineBook_shouldOnlyTouchAmbiguousParagraphs() {
    let mut book = mixed_book();
    let mock = MockCollaborator::working().with_speaker("Watchman");

    let report = refine_book(&mut book, &mock, &options()).await;

    assert_eq!(report.submitted, 2);
    assert_eq!(report.refined, 2);
    assert_eq!(report.failed_batches, 0);

    let paragraphs: Vec<&Paragraph> = book.chapters[0].paragraphs().collect();
    // Confident paragraphs untouched
    assert_eq!(paragraphs[0].speaker.as_deref(), Some("Narrator"));
    assert_eq!(paragraphs[0].confidence, 1.0);
    // Ambiguous paragraphs refined
    assert_eq!(paragraphs[1].speaker.as_deref(), Some("Watchman"));
    assert_eq!(paragraphs[1].confidence, REFINED_CONFIDENCE);
    assert_eq!(paragraphs[3].speaker.as_deref(), Some("Watchman"));
}

#[tokio::test]
async fn test_refineBook_shouldNeverChangeTextOrOrder() {
    let mut book = mixed_book();
    let before: Vec<String> = book.chapters[0].paragraphs().map(|p| p.text.clone()).collect();
    let refs_before: Vec<String> = book.chapters[0].paragraphs().map(|p| p.ref_id.clone()).collect();

    refine_book(&mut book, &MockCollaborator::working(), &options()).await;

    let after: Vec<String> = book.chapters[0].paragraphs().map(|p| p.text.clone()).collect();
    let refs_after: Vec<String> = book.chapters[0].paragraphs().map(|p| p.ref_id.clone()).collect();
    assert_eq!(before, after);
    assert_eq!(refs_before, refs_after);
}

#[tokio::test]
async fn test_refineBook_onFailure_shouldFallBackToIdentity() {
    let mut book = mixed_book();
    let snapshot: Vec<(Option<String>, f32)> = book.chapters[0]
        .paragraphs()
        .map(|p| (p.speaker.clone(), p.confidence))
        .collect();

    let report = refine_book(&mut book, &MockCollaborator::failing(), &options()).await;

    assert_eq!(report.refined, 0);
    assert_eq!(report.failed_batches, 1);

    let after: Vec<(Option<String>, f32)> = book.chapters[0]
        .paragraphs()
        .map(|p| (p.speaker.clone(), p.confidence))
        .collect();
    assert_eq!(snapshot, after);
}

#[tokio::test]
async fn test_refineBook_onMalformedResponse_shouldFallBackToIdentity() {
    let mut book = mixed_book();
    let report = refine_book(&mut book, &MockCollaborator::malformed(), &options()).await;

    assert_eq!(report.refined, 0);
    assert_eq!(report.failed_batches, 1);
    let second = book.chapters[0].paragraphs().nth(1).unwrap().clone();
    assert_eq!(second.speaker, None);
    assert_eq!(second.confidence, 0.5);
}

#[tokio::test]
async fn test_refineBook_withSparseAnswers_shouldLeaveSilentParagraphsAlone() {
    let mut book = mixed_book();
    // Answers only the first item of each batch
    let mock = MockCollaborator::sparse(2).with_speaker("Watchman");

    let report = refine_book(&mut book, &mock, &options()).await;

    assert_eq!(report.refined, 1);
    let paragraphs: Vec<&Paragraph> = book.chapters[0].paragraphs().collect();
    assert_eq!(paragraphs[1].speaker.as_deref(), Some("Watchman"));
    // The silent one keeps its pre-pass state
    assert_eq!(paragraphs[3].speaker, None);
    assert_eq!(paragraphs[3].confidence, 0.3);
}

#[tokio::test]
async fn test_refineBook_shouldChunkIntoBatches() {
    let mut book = Book::new("big", "BIG", "en");
    let paragraphs: Vec<Paragraph> = (0..45)
        .map(|i| Paragraph::draft(&format!("\u{2014} ambiguous line {}", i), None, 0.5))
        .collect();
    book.chapters.push(Chapter::draft(None, paragraphs));
    assign_references(&mut book);

    let mock = MockCollaborator::working();
    let report = refine_book(
        &mut book,
        &mock,
        &RefineOptions {
            batch_size: 20,
            ..options()
        },
    )
    .await;

    assert_eq!(report.submitted, 45);
    // 45 paragraphs at batch size 20: three collaborator calls
    assert_eq!(mock.request_count(), 3);
}

#[tokio::test]
async fn test_refineBook_intermittentFailure_shouldDegradeOnlyThatBatch() {
    let mut book = Book::new("big", "BIG", "en");
    let paragraphs: Vec<Paragraph> = (0..40)
        .map(|i| Paragraph::draft(&format!("\u{2014} ambiguous line {}", i), None, 0.5))
        .collect();
    book.chapters.push(Chapter::draft(None, paragraphs));
    assign_references(&mut book);

    // Second request fails
    let mock = MockCollaborator::intermittent(2).with_speaker("Watchman");
    let report = refine_book(
        &mut book,
        &mock,
        &RefineOptions {
            batch_size: 20,
            max_concurrent_batches: 1,
            ..options()
        },
    )
    .await;

    assert_eq!(report.failed_batches, 1);
    assert_eq!(report.refined, 20);
}

#[tokio::test]
async fn test_refineBook_withNothingAmbiguous_shouldMakeNoCalls() {
    let mut book = Book::new("clear", "CLR", "en");
    book.chapters.push(Chapter::draft(
        None,
        vec![Paragraph::draft("Entirely confident narrated paragraph.", Some("Narrator".to_string()), 1.0)],
    ));
    assign_references(&mut book);

    let mock = MockCollaborator::working();
    let report = refine_book(&mut book, &mock, &options()).await;

    assert_eq!(report.submitted, 0);
    assert_eq!(mock.request_count(), 0);
}

#[test]
fn test_needsRefinement_atThresholdBoundary() {
    assert!(needs_refinement(0.69, 0.7));
    assert!(!needs_refinement(0.7, 0.7));
    assert!(!needs_refinement(1.0, 0.7));
}

#[test]
fn test_shouldRun_requiresProviderAndWork() {
    assert!(should_run(true, 3));
    assert!(!should_run(true, 0));
    assert!(!should_run(false, 3));
}
