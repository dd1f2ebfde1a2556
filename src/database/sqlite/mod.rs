use futures::TryStreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::database::distance::DistanceMetric;
use crate::database::sqlite::models::{
    DocumentSummary, NewStoredVector, SearchHit, StoredVector, decode_embedding,
};
use crate::database::sqlite::queries::{SELECT_ALL_VECTORS, VectorQueries};
use crate::embeddings::{Chunk, IndexedEmbeddings};
use crate::{RagError, Result};


pub mod models;
pub mod queries;

pub type DbPool = Pool<Sqlite>;

/// Vector store over a SQLite table of fixed-width embeddings.
///
/// Connections are taken from the pool for the duration of a single ingest
/// or search and returned when that call finishes, on success or failure.
#[derive(Debug, Clone)]
pub struct VectorStore {
    pool: DbPool,
    dimensions: usize,
}

impl VectorStore {
    pub async fn open<P: AsRef<Path>>(database_path: P, dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(RagError::Configuration(
                "Vector dimension must be greater than 0".to_string(),
            ));
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| {
                RagError::Database(format!("Failed to create database connection pool: {}", e))
            })?;

        let store = Self { pool, dimensions };
        store.run_migrations().await?;

        Ok(store)
    }

    pub async fn open_from_config(config: &Config) -> Result<Self> {
        let base_dir = config.get_base_dir();
        std::fs::create_dir_all(base_dir)?;

        Self::open(config.database_path(), config.retrieval.dimensions as usize).await
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");

        sqlx::migrate!("src/database/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RagError::Database(format!("Failed to run schema migration: {}", e)))?;

        debug!("Database migrations completed successfully");
        Ok(())
    }

    /// Store one row per chunk, in chunk order, pairing each chunk with the
    /// embedding at the same position.
    ///
    /// With `truncate_first` every existing row is deleted in the same
    /// transaction before inserting. Nothing is written if any chunk lacks a
    /// correctly sized embedding.
    pub async fn ingest(
        &self,
        document_name: &str,
        chunks: &[Chunk],
        embeddings: &IndexedEmbeddings,
        truncate_first: bool,
    ) -> Result<u64> {
        if embeddings.len() != chunks.len() {
            return Err(RagError::Database(format!(
                "Got {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let mut rows = Vec::with_capacity(chunks.len());
        for (position, chunk) in chunks.iter().enumerate() {
            let embedding = embeddings.get(&position).ok_or_else(|| {
                RagError::Database(format!("Missing embedding for chunk {}", position))
            })?;
            self.check_dimensions(embedding, "Chunk embedding")?;

            rows.push(NewStoredVector {
                document_name,
                chunk_index: chunk.sequence_index as i64,
                text: &chunk.text,
                embedding,
            });
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RagError::Database(format!("Failed to begin transaction: {}", e)))?;

        if truncate_first {
            let deleted = VectorQueries::truncate(&mut tx).await?;
            info!("Cleared {} existing vectors before ingestion", deleted);
        }

        for row in &rows {
            VectorQueries::insert(&mut tx, row).await?;
        }

        tx.commit()
            .await
            .map_err(|e| RagError::Database(format!("Failed to commit ingestion: {}", e)))?;

        info!(
            "Stored {} chunks for document '{}'",
            rows.len(),
            document_name
        );
        Ok(rows.len() as u64)
    }

    /// Delete every stored row
    pub async fn truncate(&self) -> Result<u64> {
        let mut conn = self.acquire().await?;
        VectorQueries::truncate(&mut conn).await
    }

    /// Texts of the closest chunks, nearest first
    pub async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        score_threshold: f32,
        metric: DistanceMetric,
    ) -> Result<Vec<String>> {
        let hits = self
            .search_scored(query_embedding, top_k, score_threshold, metric)
            .await?;
        Ok(hits.into_iter().map(|hit| hit.text).collect())
    }

    /// At most `top_k` rows whose `metric` distance from the query is no
    /// greater than `score_threshold`, in ascending distance order. Rows at
    /// equal distance keep insertion order.
    pub async fn search_scored(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        score_threshold: f32,
        metric: DistanceMetric,
    ) -> Result<Vec<SearchHit>> {
        self.check_dimensions(query_embedding, "Query embedding")?;

        if top_k == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.acquire().await?;
        let mut rows = sqlx::query_as::<_, StoredVector>(SELECT_ALL_VECTORS).fetch(&mut *conn);

        let mut scanned = 0_usize;
        let mut hits = Vec::new();
        while let Some(row) = rows
            .try_next()
            .await
            .map_err(|e| RagError::Database(format!("Failed to read vectors: {}", e)))?
        {
            scanned += 1;
            let embedding = self.decode_row(&row)?;
            let distance = metric.distance(query_embedding, &embedding);

            // NaN fails this comparison, so undefined distances are excluded
            if distance <= score_threshold {
                hits.push(SearchHit {
                    document_name: row.document_name,
                    chunk_index: row.chunk_index,
                    text: row.text,
                    distance,
                });
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(top_k);

        info!(
            "Search ({}, threshold {}) matched {} of {} vectors",
            metric,
            score_threshold,
            hits.len(),
            scanned
        );
        Ok(hits)
    }

    pub async fn count(&self) -> Result<i64> {
        let mut conn = self.acquire().await?;
        VectorQueries::count(&mut conn).await
    }

    pub async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        let mut conn = self.acquire().await?;
        VectorQueries::list_documents(&mut conn).await
    }

    /// Chunk texts of a document in their original order
    pub async fn document_chunks(&self, document_name: &str) -> Result<Vec<String>> {
        let mut conn = self.acquire().await?;
        let rows = VectorQueries::list_by_document(&mut conn, document_name).await?;
        Ok(rows.into_iter().map(|row| row.text).collect())
    }

    async fn acquire(&self) -> Result<sqlx::pool::PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| RagError::Database(format!("Failed to acquire connection: {}", e)))
    }

    fn check_dimensions(&self, embedding: &[f32], what: &str) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(RagError::Database(format!(
                "{} has {} dimensions, store expects {}",
                what,
                embedding.len(),
                self.dimensions
            )));
        }
        Ok(())
    }

    fn decode_row(&self, row: &StoredVector) -> Result<Vec<f32>> {
        let embedding = decode_embedding(&row.embedding).ok_or_else(|| {
            RagError::Database(format!("Stored embedding for row {} is corrupt", row.id))
        })?;
        self.check_dimensions(&embedding, &format!("Stored embedding for row {}", row.id))?;
        Ok(embedding)
    }
}
