//! OpenAI-compatible embedder implementation over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::hazards::traits::{Embedder, HazardError, Result};

/// Default embedding model configuration.
pub const OPENAI_MODEL: &str = "text-embedding-3-small";
pub const OPENAI_DIMENSIONS: usize = 1536;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Embedder backed by the `/embeddings` endpoint of an OpenAI-compatible API.
///
/// Credentials are passed in explicitly; nothing is read from the process
/// environment here.
///
/// # Example
///
/// ```ignore
/// let embedder = OpenAiEmbedder::new(api_key)?;
/// let embedding = embedder.embed("install shower circuit").await?;
/// assert_eq!(embedding.len(), 1536);
/// ```
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    /// Create an embedder with the default model and endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_model(api_key, OPENAI_MODEL, DEFAULT_BASE_URL, OPENAI_DIMENSIONS)
    }

    /// Create an embedder for a specific model and endpoint.
    pub fn with_model(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        dimensions: usize,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(HazardError::ConfigError("embedding API key is empty".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HazardError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimensions,
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Ok(vec![]);
        }

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
                dimensions: self.dimensions,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<EmbeddingResponse>()
            .await?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| HazardError::EmbeddingError("No embedding in response".into()))?
            .embedding;

        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
