//! Ollama HTTP client for embedding generation.
//!
//! Uses the Ollama API at /api/embeddings to generate vectors
//! (nomic-embed-text by default, 768 dimensions).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::{StoreError, StoreResult};

/// Ollama embedding client.
#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a new Ollama client with specified URL and model.
    pub fn new(base_url: &str, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        }
    }

    /// Generate an embedding vector for the given text.
    pub async fn embed(&self, text: &str) -> StoreResult<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Embedding(format!(
                "Ollama API error ({}): {}",
                status, body
            )));
        }

        let result: EmbeddingResponse = response.json().await?;
        if result.embedding.is_empty() {
            return Err(StoreError::Embedding(format!(
                "Model '{}' returned an empty embedding",
                self.model
            )));
        }

        debug!(dim = result.embedding.len(), "Generated embedding");

        Ok(result.embedding)
    }

    /// Check if the Ollama service is healthy and the model is available.
    pub async fn health_check(&self) -> bool {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                let text = resp.text().await.unwrap_or_default();
                text.contains(&self.model)
            }
            _ => false,
        }
    }
}
