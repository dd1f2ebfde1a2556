
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConfigError;

/// Represents a chunk of document text ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Name of the document this chunk was cut from
    pub source_document: String,
    /// Position of this chunk within the document
    pub sequence_index: usize,
    /// The chunk text
    pub text: String,
}

/// Configuration for sliding-window chunking
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window size in characters
    pub chunk_size: usize,
    /// Characters shared between adjacent windows
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 150,
            overlap: 40,
        }
    }
}

impl ChunkingConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_window(self.chunk_size, self.overlap)
    }
}

fn validate_window(chunk_size: usize, overlap: usize) -> Result<(), ConfigError> {
    if chunk_size == 0 {
        return Err(ConfigError::InvalidChunkSize(chunk_size));
    }

    // A window that does not advance would never terminate
    if overlap >= chunk_size {
        return Err(ConfigError::OverlapTooLarge(overlap, chunk_size));
    }

    Ok(())
}

/// Split `text` into windows of `chunk_size` characters, each starting
/// `chunk_size - overlap` characters after the previous one.
///
/// The last window may be shorter than `chunk_size`. Windowing stops at the
/// first window that reaches the end of the text.
#[inline]
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>, ConfigError> {
    validate_window(chunk_size, overlap)?;

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());

        if end == chars.len() {
            break;
        }
        start += step;
    }

    debug!(
        "Split {} characters into {} chunks (size {}, overlap {})",
        chars.len(),
        chunks.len(),
        chunk_size,
        overlap
    );

    Ok(chunks)
}

/// Chunk a named document, tagging each chunk with its source and position
#[inline]
pub fn chunk_document(
    document_name: &str,
    text: &str,
    config: &ChunkingConfig,
) -> Result<Vec<Chunk>, ConfigError> {
    let chunks = chunk_text(text, config.chunk_size, config.overlap)?
        .into_iter()
        .enumerate()
        .map(|(sequence_index, text)| Chunk {
            source_document: document_name.to_string(),
            sequence_index,
            text,
        })
        .collect();

    Ok(chunks)
}
