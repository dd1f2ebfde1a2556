#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EmbeddingProvider, IndexedEmbeddings};
use crate::client::ApiClient;
use crate::config::OpenAiConfig;
use crate::Result;

const EMBEDDINGS_PATH: &str = "embeddings";

/// Embedding gateway for the OpenAI `/embeddings` endpoint
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingClient {
    client: ApiClient,
    model: String,
    batch_size: usize,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    input: &'a [String],
    model: &'a str,
    dimensions: u32,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

impl OpenAiEmbeddingClient {
    #[inline]
    pub fn new(config: &OpenAiConfig, api_key: &str) -> Result<Self> {
        let client = ApiClient::new(config, api_key)?;

        Ok(Self {
            client,
            model: config.embedding_model.clone(),
            batch_size: config.batch_size.max(1) as usize,
        })
    }

    #[inline]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn embed_batch(&self, inputs: &[String], dimensions: u32) -> Result<Vec<Vec<f32>>> {
        let request = EmbedRequest {
            input: inputs,
            model: &self.model,
            dimensions,
        };

        let response = self.client.post_json(EMBEDDINGS_PATH, &request)?;
        debug!("Embedding response: {} bytes", response.body.len());

        let parsed: EmbedResponse = serde_json::from_str(&response.body).map_err(|e| {
            response.malformed(format!("Failed to parse embedding response: {}", e))
        })?;

        order_by_index(parsed.data, inputs.len(), dimensions as usize)
            .map_err(|message| response.malformed(message))
    }
}

impl EmbeddingProvider for OpenAiEmbeddingClient {
    fn embed(&self, inputs: &[String], dimensions: u32) -> Result<IndexedEmbeddings> {
        if inputs.is_empty() {
            return Ok(IndexedEmbeddings::new());
        }

        debug!(
            "Generating {}-dimensional embeddings for {} inputs with {}",
            dimensions,
            inputs.len(),
            self.model
        );

        let mut embeddings = IndexedEmbeddings::new();

        // Batch-local indices are offset back to positions in `inputs`
        for (batch_number, batch) in inputs.chunks(self.batch_size).enumerate() {
            let offset = batch_number * self.batch_size;
            let vectors = self.embed_batch(batch, dimensions)?;
            embeddings.extend(
                vectors
                    .into_iter()
                    .enumerate()
                    .map(|(index, vector)| (offset + index, vector)),
            );
        }

        debug!("Generated {} embeddings total", embeddings.len());
        Ok(embeddings)
    }
}

/// Place each returned vector at its `index`, rejecting responses that do not
/// cover every input exactly once with vectors of the requested width
fn order_by_index(
    data: Vec<EmbeddingData>,
    expected: usize,
    dimensions: usize,
) -> std::result::Result<Vec<Vec<f32>>, String> {
    if data.len() != expected {
        return Err(format!(
            "Mismatch between request and response counts: {} vs {}",
            expected,
            data.len()
        ));
    }

    let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];

    for item in data {
        if item.embedding.len() != dimensions {
            return Err(format!(
                "Embedding {} has {} dimensions, expected {}",
                item.index,
                item.embedding.len(),
                dimensions
            ));
        }

        match slots.get_mut(item.index) {
            Some(slot @ None) => *slot = Some(item.embedding),
            Some(Some(_)) => {
                return Err(format!(
                    "Duplicate embedding index {}",
                    item.index
                ));
            }
            None => {
                return Err(format!(
                    "Embedding index {} out of range for {} inputs",
                    item.index, expected
                ));
            }
        }
    }

    // Counts match and duplicates were rejected, so every slot is filled
    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or_else(|| format!("Missing embedding {}", index)))
        .collect()
}

