//! Pluggable statement extraction backends
//!
//! The extraction collaborator is a black box: raw statement bytes (an image
//! or tabular text) in, candidate transaction records out. This module
//! provides a backend-agnostic interface for it.
//!
//! # Architecture
//!
//! - `ExtractionBackend` trait: defines the interface for extraction
//! - `ExtractionClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaExtractor`, `MockExtractor`
//!
//! # Configuration
//!
//! Environment variables:
//! - `TALLY_AI_BACKEND`: Backend to use (ollama, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2-vision)

mod mock;
mod ollama;
pub mod parsing;

pub use mock::MockExtractor;
pub use ollama::OllamaExtractor;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Candidate;

/// What kind of statement payload is being extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementMedia {
    /// A statement photo or page raster; sent to a vision model
    Image,
    /// Plain or tabular text lifted from a statement
    Text,
}

/// Trait defining the interface for statement extraction backends
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    /// Extract candidate transactions from raw statement bytes
    async fn extract_statement(&self, data: &[u8], media: StatementMedia)
        -> Result<Vec<Candidate>>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete extraction client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ExtractionClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaExtractor),
    /// Mock backend for testing
    Mock(MockExtractor),
}

impl ExtractionClient {
    /// Create an extraction client from environment variables
    ///
    /// Checks `TALLY_AI_BACKEND` to determine which backend to use:
    /// - `ollama` (default): Uses OLLAMA_HOST and OLLAMA_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend =
            std::env::var("TALLY_AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaExtractor::from_env().map(ExtractionClient::Ollama),
            "mock" => Some(ExtractionClient::Mock(MockExtractor::new())),
            _ => None,
        }
    }
}

#[async_trait]
impl ExtractionBackend for ExtractionClient {
    async fn extract_statement(
        &self,
        data: &[u8],
        media: StatementMedia,
    ) -> Result<Vec<Candidate>> {
        match self {
            Self::Ollama(backend) => backend.extract_statement(data, media).await,
            Self::Mock(backend) => backend.extract_statement(data, media).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            Self::Ollama(backend) => backend.health_check().await,
            Self::Mock(backend) => backend.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            Self::Ollama(backend) => backend.model(),
            Self::Mock(backend) => backend.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            Self::Ollama(backend) => backend.host(),
            Self::Mock(backend) => backend.host(),
        }
    }
}
