use anyhow::{anyhow, Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::book::model::Book;

// @module: Slug-keyed artifact store

// @struct: JSON blob store rooted at a directory
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    // @creates: Store rooted at the given directory
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    // @checks: Artifact existence
    pub fn exists(&self, slug: &str) -> bool {
        self.path_for(slug).is_file()
    }

    // @generates: Path for a slug
    fn path_for(&self, slug: &str) -> PathBuf {
        self.root.join(format!("{}.json", slug))
    }

    /// Persist a book under its slug. Artifacts are opaque JSON blobs;
    /// nothing here inspects their content.
    pub fn save(&self, book: &Book) -> Result<PathBuf> {
        if book.slug.trim().is_empty() {
            return Err(anyhow!("Cannot save a book with an empty slug"));
        }

        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create store directory: {}", self.root.display()))?;

        let path = self.path_for(&book.slug);
        let bytes = serde_json::to_vec_pretty(book)?;
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write artifact: {}", path.display()))?;

        debug!("Saved artifact {} ({} chapters)", path.display(), book.chapter_count());
        Ok(path)
    }

    /// Load a book by slug.
    pub fn load(&self, slug: &str) -> Result<Book> {
        let path = self.path_for(slug);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read artifact: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Artifact is not a valid book: {}", path.display()))
    }

    /// List the slugs present in the store.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut slugs = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    slugs.push(stem.to_string());
                }
            }
        }
        slugs.sort();
        Ok(slugs)
    }
}
