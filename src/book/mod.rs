/*!
 * The document tree and its verified operations.
 *
 * This module contains the book data model and everything allowed to
 * touch its structure:
 * - `model`: Book/Chapter/Section/Paragraph types
 * - `reference`: canonical renumbering, the single source of truth for
 *   reference ids
 * - `edit`: structural edit primitives that preserve tree invariants
 * - `export`: canonical JSON export shape and validation
 */

pub mod edit;
pub mod export;
pub mod model;
pub mod reference;

pub use model::{Book, Chapter, ChapterBody, Paragraph, Section, Vetted};
