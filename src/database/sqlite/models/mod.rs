
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// A row of the `vectors` table with its embedding still encoded
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StoredVector {
    pub id: i64,
    pub document_name: String,
    pub chunk_index: i64,
    pub text: String,
    pub embedding: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStoredVector<'a> {
    pub document_name: &'a str,
    pub chunk_index: i64,
    pub text: &'a str,
    pub embedding: &'a [f32],
}

/// A chunk matched by a similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document_name: String,
    pub chunk_index: i64,
    pub text: String,
    pub distance: f32,
}

/// Per-document row counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DocumentSummary {
    pub document_name: String,
    pub chunk_count: i64,
    pub last_ingested: Option<NaiveDateTime>,
}

/// Encode an embedding as little-endian `f32` values
#[inline]
pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|value| value.to_le_bytes()).collect()
}

/// Decode a little-endian `f32` blob, or `None` if its length is not a
/// whole number of values
#[inline]
pub fn decode_embedding(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % F32_BYTES != 0 {
        return None;
    }

    Some(
        bytes
            .chunks_exact(F32_BYTES)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
    )
}
