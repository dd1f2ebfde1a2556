use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::chat::console::run_console;
use crate::chat::{ChatSession, OpenAiChatClient};
use crate::config::Config;
use crate::database::{DistanceMetric, VectorStore};
use crate::embeddings::{EmbeddingProvider, OpenAiEmbeddingClient};
use crate::indexer::{IngestReport, ingest_file};

/// Overrides for a one-off search
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchOverrides {
    pub top_k: Option<usize>,
    pub score_threshold: Option<f32>,
    pub metric: Option<DistanceMetric>,
}

#[inline]
pub fn load_config(config_dir: &Path) -> Result<Config> {
    Config::load(config_dir)
        .with_context(|| format!("Failed to load configuration from {}", config_dir.display()))
}

fn embedding_client(config: &Config) -> Result<OpenAiEmbeddingClient> {
    let api_key = config.openai.resolve_api_key()?;
    OpenAiEmbeddingClient::new(&config.openai, &api_key)
        .context("Failed to create embedding client")
}

async fn open_store(config: &Config) -> Result<VectorStore> {
    VectorStore::open_from_config(config)
        .await
        .with_context(|| format!("Failed to open {}", config.database_path().display()))
}

fn spinner(message: String) -> Result<ProgressBar> {
    let bar = if console::user_attended_stderr() {
        let bar = ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .context("Invalid progress template")?,
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    } else {
        ProgressBar::hidden()
    };
    bar.set_message(message);
    Ok(bar)
}

async fn ingest_with(
    config: &Config,
    embedder: &OpenAiEmbeddingClient,
    store: &VectorStore,
    path: &Path,
    name: Option<&str>,
    truncate_first: bool,
) -> Result<IngestReport> {
    let bar = spinner(format!("Ingesting {}", path.display()))?;
    let result = ingest_file(
        embedder,
        store,
        path,
        name,
        &config.chunking,
        config.retrieval.dimensions,
        truncate_first,
    )
    .await;
    bar.finish_and_clear();

    let report = result.with_context(|| format!("Failed to ingest {}", path.display()))?;
    println!(
        "📄 Ingested '{}': {} characters, {} chunks stored{}",
        report.document_name,
        report.characters,
        report.stored,
        if report.truncated {
            " (store cleared first)"
        } else {
            ""
        }
    );
    Ok(report)
}

/// Chunk, embed and store a document file
#[inline]
pub async fn ingest_document_file(
    config_dir: &Path,
    path: &Path,
    name: Option<&str>,
    keep_existing: bool,
) -> Result<()> {
    let config = load_config(config_dir)?;
    let embedder = embedding_client(&config)?;
    let store = open_store(&config).await?;

    ingest_with(&config, &embedder, &store, path, name, !keep_existing).await?;
    Ok(())
}

/// Print the chunks closest to `query` with their distances
#[inline]
pub async fn search_chunks(config_dir: &Path, query: &str, overrides: SearchOverrides) -> Result<()> {
    let mut config = load_config(config_dir)?;
    if let Some(top_k) = overrides.top_k {
        config.retrieval.set_top_k(top_k)?;
    }
    if let Some(score_threshold) = overrides.score_threshold {
        config.retrieval.set_score_threshold(score_threshold)?;
    }
    if let Some(metric) = overrides.metric {
        config.retrieval.metric = metric;
    }

    let embedder = embedding_client(&config)?;
    let store = open_store(&config).await?;

    let mut embeddings = embedder.embed(&[query.to_string()], config.retrieval.dimensions)?;
    let query_embedding = embeddings
        .remove(&0)
        .context("No embedding returned for query")?;

    let retrieval = &config.retrieval;
    let hits = store
        .search_scored(
            &query_embedding,
            retrieval.top_k,
            retrieval.score_threshold,
            retrieval.metric,
        )
        .await?;

    if hits.is_empty() {
        println!(
            "No chunks within {} distance {} of the query.",
            retrieval.metric, retrieval.score_threshold
        );
        return Ok(());
    }

    println!("🔍 {} matching chunks ({}):", hits.len(), retrieval.metric);
    println!();
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{}. {} #{} (distance {:.4})",
            rank + 1,
            style(&hit.document_name).cyan(),
            hit.chunk_index,
            hit.distance
        );
        println!("   {}", hit.text.replace('\n', " "));
        println!();
    }

    Ok(())
}

/// Interactive chat over the stored chunks, optionally ingesting a fresh
/// document first
#[inline]
pub async fn start_chat(config_dir: &Path, ingest: Option<&Path>) -> Result<()> {
    let config = load_config(config_dir)?;
    let api_key = config.openai.resolve_api_key()?;
    let embedder = OpenAiEmbeddingClient::new(&config.openai, &api_key)
        .context("Failed to create embedding client")?;
    let completer = OpenAiChatClient::new(&config.openai, &api_key)
        .context("Failed to create chat client")?;
    let store = open_store(&config).await?;

    if let Some(path) = ingest {
        ingest_with(&config, &embedder, &store, path, None, true).await?;
    }

    let stored = store.count().await?;
    if stored == 0 {
        println!(
            "{}",
            style("⚠ The vector store is empty; answers will have no retrieved context.").yellow()
        );
    }
    info!(
        "Starting chat with {} stored chunks using {}",
        stored,
        completer.model()
    );

    let mut session = ChatSession::new(
        embedder,
        completer,
        store,
        config.retrieval.clone(),
        config.conversation.clone(),
    );

    let input = BufReader::new(std::io::stdin());
    run_console(&mut session, input, std::io::stdout()).await?;

    Ok(())
}

/// Show configuration health and stored documents
#[inline]
pub async fn show_status(config_dir: &Path) -> Result<()> {
    println!("📊 RAG Chat Status Report");
    println!("{}", "=".repeat(50));
    println!();

    let config = match Config::load(config_dir) {
        Ok(config) => {
            println!("⚙️  Configuration: {}", config.config_file_path().display());
            config
        }
        Err(e) => {
            println!("   ❌ Configuration invalid - {:#}", e);
            return Ok(());
        }
    };

    println!("🤖 OpenAI Status:");
    match config.openai.resolve_api_key() {
        Ok(_) => println!("   ✅ API key: found"),
        Err(e) => println!("   ❌ API key: {}", e),
    }
    println!("   🌐 Base URL: {}", config.openai.base_url);
    println!("   📋 Embedding Model: {}", config.openai.embedding_model);
    println!("   💬 Completion Model: {}", config.openai.completion_model);
    println!();

    println!("🗄️  Vector Store Status:");
    let store = match VectorStore::open_from_config(&config).await {
        Ok(store) => {
            println!("   ✅ SQLite: {}", config.database_path().display());
            store
        }
        Err(e) => {
            println!("   ❌ SQLite: Failed to open - {}", e);
            return Ok(());
        }
    };
    println!(
        "   🔢 Dimensions: {}, metric {}, top {} within {}",
        store.dimensions(),
        config.retrieval.metric,
        config.retrieval.top_k,
        config.retrieval.score_threshold
    );
    println!();

    let documents = store.list_documents().await?;
    if documents.is_empty() {
        println!("No documents have been ingested yet.");
        println!("Use 'rag-chat ingest <file>' to add one.");
        return Ok(());
    }

    println!("Documents ({} total):", documents.len());
    for document in &documents {
        let ingested = document
            .last_ingested
            .map_or_else(
                || "unknown".to_string(),
                |at| at.format("%Y-%m-%d %H:%M:%S").to_string(),
            );
        println!(
            "   📄 {}: {} chunks (ingested {})",
            document.document_name, document.chunk_count, ingested
        );
    }

    Ok(())
}
