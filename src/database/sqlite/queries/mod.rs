
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use super::models::{DocumentSummary, NewStoredVector, StoredVector, encode_embedding};
use crate::{RagError, Result};

/// Every stored vector in insertion order
pub const SELECT_ALL_VECTORS: &str =
    "SELECT id, document_name, chunk_index, text, embedding FROM vectors ORDER BY id";

pub struct VectorQueries;

impl VectorQueries {
    #[inline]
    pub async fn insert(conn: &mut SqliteConnection, row: &NewStoredVector<'_>) -> Result<i64> {
        let now = Utc::now().naive_utc();
        let id = sqlx::query(
            "INSERT INTO vectors (document_name, chunk_index, text, embedding, created_date) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(row.document_name)
        .bind(row.chunk_index)
        .bind(row.text)
        .bind(encode_embedding(row.embedding))
        .bind(now)
        .execute(conn)
        .await
        .map_err(|e| RagError::Database(format!("Failed to insert vector: {}", e)))?
        .last_insert_rowid();

        Ok(id)
    }

    /// Delete every row, returning how many were removed
    #[inline]
    pub async fn truncate(conn: &mut SqliteConnection) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM vectors")
            .execute(conn)
            .await
            .map_err(|e| RagError::Database(format!("Failed to truncate vectors: {}", e)))?
            .rows_affected();

        debug!("Truncated {} vectors", deleted);
        Ok(deleted)
    }

    #[inline]
    pub async fn count(conn: &mut SqliteConnection) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vectors")
            .fetch_one(conn)
            .await
            .map_err(|e| RagError::Database(format!("Failed to count vectors: {}", e)))
    }

    #[inline]
    pub async fn list_documents(conn: &mut SqliteConnection) -> Result<Vec<DocumentSummary>> {
        sqlx::query_as::<_, DocumentSummary>(
            r#"
            SELECT document_name,
                   COUNT(*) AS chunk_count,
                   MAX(created_date) AS last_ingested
            FROM vectors
            GROUP BY document_name
            ORDER BY document_name
            "#,
        )
        .fetch_all(conn)
        .await
        .map_err(|e| RagError::Database(format!("Failed to list documents: {}", e)))
    }

    /// Rows of one document in chunk order
    #[inline]
    pub async fn list_by_document(
        conn: &mut SqliteConnection,
        document_name: &str,
    ) -> Result<Vec<StoredVector>> {
        sqlx::query_as::<_, StoredVector>(
            r#"
            SELECT id, document_name, chunk_index, text, embedding
            FROM vectors
            WHERE document_name = ?
            ORDER BY chunk_index, id
            "#,
        )
        .bind(document_name)
        .fetch_all(conn)
        .await
        .map_err(|e| RagError::Database(format!("Failed to list document chunks: {}", e)))
    }
}
