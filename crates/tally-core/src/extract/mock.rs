//! Mock extraction backend for testing

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Candidate;

use super::{ExtractionBackend, StatementMedia};

/// Mock backend that returns canned candidates without any network I/O
#[derive(Clone, Default)]
pub struct MockExtractor {
    candidates: Vec<Candidate>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that answers every extraction with the given candidates
    pub fn with_candidates(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }
}

#[async_trait]
impl ExtractionBackend for MockExtractor {
    async fn extract_statement(
        &self,
        _data: &[u8],
        _media: StatementMedia,
    ) -> Result<Vec<Candidate>> {
        Ok(self.candidates.clone())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
