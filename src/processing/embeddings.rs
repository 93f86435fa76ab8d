//! Embedding backends: a hosted OpenAI-compatible endpoint and a local Model2Vec model

use crate::config::{Config, EmbeddingProvider};
use crate::error::{ApplyCopilotError, Result};
use async_trait::async_trait;
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Turns text into fixed-length vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier recorded in persisted indexes.
    fn model_name(&self) -> &str;

    /// Embeds `texts`, returning one vector per input in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            ApplyCopilotError::EmbeddingService("Embedding service returned no vector".to_string())
        })
    }
}

/// Builds the embedder selected in the configuration.
pub fn embedder_from_config(config: &Config) -> Result<Box<dyn Embedder>> {
    match config.embedding.provider {
        EmbeddingProvider::OpenAi => Ok(Box::new(OpenAiEmbedder::new(
            config.api_key()?,
            &config.embedding.base_url,
            &config.embedding.model,
            Duration::from_secs(config.llm.timeout_secs),
        )?)),
        EmbeddingProvider::Model2Vec => Ok(Box::new(Model2VecEmbedder::load(&config.embedding.model)?)),
    }
}

/// Client for `POST {base_url}/embeddings`.
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String, base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        if model.trim().is_empty() {
            return Err(ApplyCopilotError::Configuration(
                "missing embedding model name".to_string(),
            ));
        }
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            ApplyCopilotError::Configuration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            api_key,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let start_time = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| ApplyCopilotError::EmbeddingService(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApplyCopilotError::EmbeddingService(format!(
                "Embeddings request failed ({}): {}",
                status, body
            )));
        }

        let mut parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            ApplyCopilotError::EmbeddingService(format!("Failed to parse embedding response: {}", e))
        })?;
        parsed.data.sort_by_key(|entry| entry.index);

        if parsed.data.len() != texts.len() {
            return Err(ApplyCopilotError::EmbeddingService(format!(
                "Embedding service returned {} vectors for {} inputs",
                parsed.data.len(),
                texts.len()
            )));
        }

        debug!(
            "Embedded {} texts with {} in {:.2?}",
            texts.len(),
            self.model,
            start_time.elapsed()
        );
        Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect())
    }
}

/// Local static embeddings; the model is fetched from the Hugging Face Hub
/// on first use unless `model` is a local directory.
pub struct Model2VecEmbedder {
    model: StaticModel,
    model_name: String,
}

impl Model2VecEmbedder {
    pub fn load(model: &str) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model: {}", model);

        let static_model = StaticModel::from_pretrained(model, None, None, None)?;

        info!("Model loaded in {:.2?}", start_time.elapsed());
        Ok(Self {
            model: static_model,
            model_name: model.to_string(),
        })
    }
}

#[async_trait]
impl Embedder for Model2VecEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.model.encode(texts))
    }
}

/// Cosine similarity; zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ApplyCopilotError::EmbeddingService(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let same = cosine_similarity(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((same - 1.0).abs() < 1e-6);

        let orthogonal = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(orthogonal.abs() < 1e-6);

        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_similarity_dimension_mismatch() {
        assert!(cosine_similarity(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_openai_embedder_endpoint() {
        let embedder = OpenAiEmbedder::new(
            "key".to_string(),
            "https://api.example.com/v1/",
            "text-embedding-3-small",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(embedder.endpoint, "https://api.example.com/v1/embeddings");
        assert_eq!(embedder.model_name(), "text-embedding-3-small");
    }
}
