
use std::path::Path;
use tracing::{debug, info};

use crate::database::VectorStore;
use crate::embeddings::{ChunkingConfig, EmbeddingProvider, chunk_document};
use crate::{RagError, Result};

/// Outcome of ingesting one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub document_name: String,
    /// Characters read from the document
    pub characters: usize,
    pub chunks: usize,
    pub stored: u64,
    pub truncated: bool,
}

/// Chunk `text`, embed every chunk and store the results under
/// `document_name`.
///
/// Embedding happens before the store is touched, so a failed embedding
/// call leaves existing rows in place even when `truncate_first` is set.
#[inline]
pub async fn ingest_document<E>(
    embedder: &E,
    store: &VectorStore,
    document_name: &str,
    text: &str,
    chunking: &ChunkingConfig,
    dimensions: u32,
    truncate_first: bool,
) -> Result<IngestReport>
where
    E: EmbeddingProvider + ?Sized,
{
    let chunks = chunk_document(document_name, text, chunking)?;
    info!(
        "Split '{}' into {} chunks (size {}, overlap {})",
        document_name,
        chunks.len(),
        chunking.chunk_size,
        chunking.overlap
    );

    let inputs: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
    let embeddings = embedder.embed(&inputs, dimensions)?;
    debug!("Received {} embeddings", embeddings.len());

    let stored = store
        .ingest(document_name, &chunks, &embeddings, truncate_first)
        .await?;

    Ok(IngestReport {
        document_name: document_name.to_string(),
        characters: text.chars().count(),
        chunks: chunks.len(),
        stored,
        truncated: truncate_first,
    })
}

/// Read a UTF-8 document from disk and ingest it, named after its file name
/// unless `document_name` is given
#[inline]
pub async fn ingest_file<E>(
    embedder: &E,
    store: &VectorStore,
    path: &Path,
    document_name: Option<&str>,
    chunking: &ChunkingConfig,
    dimensions: u32,
    truncate_first: bool,
) -> Result<IngestReport>
where
    E: EmbeddingProvider + ?Sized,
{
    let text = std::fs::read_to_string(path).map_err(|e| {
        RagError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read {}: {}", path.display(), e),
        ))
    })?;

    let name = document_name.map_or_else(|| document_name_for(path), str::to_string);

    ingest_document(
        embedder,
        store,
        &name,
        &text,
        chunking,
        dimensions,
        truncate_first,
    )
    .await
}

/// File name of `path`, or the whole path when it has none
#[inline]
pub fn document_name_for(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
