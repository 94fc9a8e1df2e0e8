/*!
 * Error types for the scriptorium application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to an LLM provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Call exceeded its deadline
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
}

/// Errors that can occur while loading or applying a rule profile
#[derive(Error, Debug)]
pub enum ProfileError {
    /// A pattern in the profile failed to compile
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending regex source
        pattern: String,
        /// Compiler message
        message: String,
    },

    /// The profile file could not be read or parsed
    #[error("Unreadable profile: {0}")]
    Unreadable(String),
}

/// A single schema problem found while validating a book for export
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaIssue {
    /// JSON-pointer-ish path to the offending node
    pub path: String,
    /// Human-readable description
    pub message: String,
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Errors that can occur during export
#[derive(Error, Debug)]
pub enum ExportError {
    /// The book failed schema validation; nothing was written
    #[error("Schema validation failed with {} issue(s)", .0.len())]
    Validation(Vec<SchemaIssue>),

    /// Serialization failure
    #[error("Serialization failed: {0}")]
    Serialize(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from a rule profile
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Error from export
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
