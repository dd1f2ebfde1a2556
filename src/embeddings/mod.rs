// Embeddings module
// Text chunking and the OpenAI-compatible embeddings gateway

pub mod chunking;
pub mod openai;

use std::collections::BTreeMap;

pub use chunking::{Chunk, ChunkingConfig, chunk_document, chunk_text};
pub use openai::OpenAiEmbeddingClient;

/// Embedding vectors keyed by the position of their input text
pub type IndexedEmbeddings = BTreeMap<usize, Vec<f32>>;

/// Source of embedding vectors for ingestion and query time
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `inputs`, returning exactly one vector of `dimensions` values per
    /// input, keyed by the input's position
    fn embed(&self, inputs: &[String], dimensions: u32) -> crate::Result<IndexedEmbeddings>;
}
