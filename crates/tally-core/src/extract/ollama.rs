//! Ollama backend implementation
//!
//! HTTP client for the Ollama generate API. Images go to a vision model as
//! base64 payloads; text statements are inlined into the prompt.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::Candidate;

use super::parsing::parse_candidates;
use super::{ExtractionBackend, StatementMedia};

const DEFAULT_MODEL: &str = "llama3.2-vision";

/// Instruction shared by the image and text paths; the model must answer
/// with a bare JSON array.
const EXTRACT_PROMPT: &str = r#"You are reading a bank or card statement. Extract every transaction as a JSON array. Each element must have:
- "date": the transaction date in YYYY-MM-DD format
- "description": the merchant or payee text as printed
- "amount": a number, negative for charges/expenses and positive for credits/income
- "category": a short spending category label, or null if unclear

Respond with ONLY the JSON array, no other text."#;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama-backed statement extractor
#[derive(Clone)]
pub struct OllamaExtractor {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaExtractor {
    /// Create a new Ollama extractor
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables
    ///
    /// Requires `OLLAMA_HOST`; `OLLAMA_MODEL` defaults to a vision-capable
    /// model since statements usually arrive as images.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model =
            std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(&host, &model))
    }

    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        debug!(model = request.model, url = %url, "sending extraction request");

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Extraction(format!(
                "Ollama returned {} from {}",
                response.status(),
                url
            )));
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.response)
    }
}

#[async_trait]
impl ExtractionBackend for OllamaExtractor {
    async fn extract_statement(
        &self,
        data: &[u8],
        media: StatementMedia,
    ) -> Result<Vec<Candidate>> {
        let request = match media {
            StatementMedia::Image => GenerateRequest {
                model: &self.model,
                prompt: EXTRACT_PROMPT.to_string(),
                stream: false,
                images: Some(vec![base64::engine::general_purpose::STANDARD.encode(data)]),
            },
            StatementMedia::Text => {
                let text = String::from_utf8_lossy(data);
                GenerateRequest {
                    model: &self.model,
                    prompt: format!("{}\n\nStatement text:\n{}", EXTRACT_PROMPT, text),
                    stream: false,
                    images: None,
                }
            }
        };

        let response = self.generate(&request).await?;
        let candidates = parse_candidates(&response)?;
        debug!(
            count = candidates.len(),
            model = %self.model,
            "extraction complete"
        );
        Ok(candidates)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.http_client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, "Ollama health check failed");
                false
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
