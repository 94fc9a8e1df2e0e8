use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::Path;

use crate::app_config::Config;
use crate::book::export;
use crate::book::model::Book;
use crate::job::{JobRecord, JobStatus};
use crate::refine::{self, RefineOptions, RefinerService};
use crate::rule_profile::RuleProfile;
use crate::segment::engine::RuleEngine;
use crate::storage::ArtifactStore;
use crate::translate::{self, TranslateOptions};

// @module: Application controller for document structuring

/// Main application controller for the structuring pipeline
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.primary_language.is_empty()
    }

    /// Run the full pipeline for one source document: parse the OCR
    /// markdown into a book, optionally refine and translate it, then
    /// export. Each stage advances the job machine; refinement and
    /// translation degrade rather than fail the job.
    pub async fn run(
        &self,
        input_file: &Path,
        slug: &str,
        code: &str,
        profile: &RuleProfile,
        store_root: &Path,
        export_dir: &Path,
    ) -> Result<JobRecord> {
        let start_time = std::time::Instant::now();
        let mut job = JobRecord::new(slug);

        let outcome = self
            .run_stages(&mut job, input_file, slug, code, profile, store_root, export_dir)
            .await;

        match outcome {
            Ok(()) => {
                job.advance(JobStatus::Complete)?;
                info!(
                    "Job {} complete in {:.1}s",
                    job.id,
                    start_time.elapsed().as_secs_f64()
                );
                Ok(job)
            }
            Err(e) => {
                let _ = job.fail(&e.to_string());
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        job: &mut JobRecord,
        input_file: &Path,
        slug: &str,
        code: &str,
        profile: &RuleProfile,
        store_root: &Path,
        export_dir: &Path,
    ) -> Result<()> {
        if !self.is_initialized() {
            return Err(anyhow!("Controller not properly initialized"));
        }
        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        // The OCR provider runs upstream; this stage ingests its output
        job.advance(JobStatus::Ocr)?;
        let raw_text = std::fs::read_to_string(input_file)
            .with_context(|| format!("Failed to read OCR markdown: {}", input_file.display()))?;

        job.advance(JobStatus::Parsing)?;
        let engine = RuleEngine::new(profile)?;
        let mut book = engine.build_book(&raw_text, slug, code, &self.config.primary_language);

        let store = ArtifactStore::new(store_root);
        store.save(&book)?;

        // LLM presence is an explicit capability flag, not an ambient
        // lookup
        let provider_available = self.config.refinement.enabled;
        let ambiguous = count_ambiguous(&book, self.config.refinement.confidence_threshold);

        if refine::strategy::should_run(provider_available, ambiguous) {
            job.advance(JobStatus::Refining)?;
            self.run_refinement(&mut book, ambiguous).await;
            store.save(&book)?;
        } else {
            info!(
                "Skipping refinement: provider available = {}, ambiguous paragraphs = {}",
                provider_available, ambiguous
            );
        }

        if provider_available && !self.config.target_languages.is_empty() {
            job.advance(JobStatus::Translating)?;
            self.run_translation(&mut book).await;
            store.save(&book)?;
        }

        job.advance(JobStatus::Exporting)?;
        let plan = export::plan_export(&book, self.config.export.split_threshold_bytes)?;
        let written = export::write_plan(&plan, export_dir)?;
        info!("Exported {} file(s) to {}", written.len(), export_dir.display());

        Ok(())
    }

    async fn run_refinement(&self, book: &mut Book, ambiguous: usize) {
        let service = RefinerService::from_config(&self.config.refinement);

        if let Err(e) = service.test_connection().await {
            // Refinement is best-effort: an unreachable provider keeps
            // the rule-based attribution
            warn!("Refinement provider unreachable, keeping rule-based speakers: {}", e);
            return;
        }

        let bar = stage_bar(ambiguous as u64, "Refining speakers");
        let options = RefineOptions::from_config(&self.config.refinement);
        let report = refine::refine_book(book, &service, &options).await;
        bar.finish_with_message(format!(
            "Refined {}/{} paragraph(s), {} failed batch(es)",
            report.refined, report.submitted, report.failed_batches
        ));
    }

    async fn run_translation(&self, book: &mut Book) {
        let service = RefinerService::from_config(&self.config.refinement);
        let options = TranslateOptions::from_config(&self.config.translation);

        let total = book.paragraph_count() * self.config.target_languages.len();
        let bar = stage_bar(total as u64, "Translating");
        let report =
            translate::translate_book(book, &service, &self.config.target_languages, &options)
                .await;
        bar.finish_with_message(format!(
            "Translated {} paragraph(s) into {} language(s), {} failed batch(es)",
            report.translated_paragraphs, report.languages, report.failed_batches
        ));
    }
}

fn count_ambiguous(book: &Book, threshold: f32) -> usize {
    book.chapters
        .iter()
        .flat_map(|c| c.paragraphs())
        .filter(|p| refine::strategy::needs_refinement(p.confidence, threshold))
        .count()
}

fn stage_bar(len: u64, message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(len.max(1));
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message(message);
    bar
}
