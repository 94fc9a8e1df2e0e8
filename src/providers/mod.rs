/*!
 * Provider implementations for LLM collaborators.
 *
 * This module contains client implementations for the providers that
 * back speaker refinement and translation:
 * - Ollama: Local LLM server
 * - Anthropic: Anthropic API integration
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all LLM provider clients.
///
/// Each provider speaks its own wire format, so requests and responses
/// are associated types; the refiner service owns the mapping from
/// domain payloads to provider requests.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Provider-specific request type
    type Request: Send + Sync;

    /// Provider-specific response type
    type Response: Send + Sync;

    /// Send one completion request. All transport and API-level
    /// failures surface as `ProviderError`; retry policy, if any, lives
    /// at this boundary rather than in the pipeline.
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Cheap reachability probe, called before a long refinement or
    /// translation pass.
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Pull the plain response text out of a provider response.
    fn extract_text(response: &Self::Response) -> String;
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
