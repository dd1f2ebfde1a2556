
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::path::Path;

use super::{API_KEY_ENV, Config, ConfigError, OpenAiConfig, RetrievalConfig};
use crate::database::DistanceMetric;
use crate::embeddings::ChunkingConfig;

#[inline]
pub fn run_interactive_config(config_dir: &Path) -> Result<()> {
    eprintln!("{}", style("🔧 RAG Chat Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config(config_dir);

    eprintln!("{}", style("OpenAI Configuration").bold().yellow());
    eprintln!("Configure the OpenAI-compatible API used for embeddings and chat.");
    eprintln!();
    configure_openai(&mut config.openai)?;

    eprintln!();
    eprintln!("{}", style("Chunking").bold().yellow());
    configure_chunking(&mut config.chunking)?;

    eprintln!();
    eprintln!("{}", style("Retrieval").bold().yellow());
    configure_retrieval(&mut config.retrieval)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    match config.openai.resolve_api_key() {
        Ok(api_key) => {
            if test_openai_connection(&config.openai, &api_key)? {
                eprintln!("{}", style("✓ API connection successful!").green());
            } else {
                eprintln!("{}", style("⚠ Warning: Could not reach the API").yellow());
                eprintln!("You can continue, but check the base URL and key before ingesting.");
            }
        }
        Err(_) => {
            eprintln!(
                "{}",
                style(format!("⚠ No API key found, set {} before chatting", API_KEY_ENV)).yellow()
            );
        }
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config(config_dir: &Path) -> Result<()> {
    let config = Config::load(config_dir).context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("OpenAI Settings:").bold().yellow());
    eprintln!("  Base URL: {}", style(&config.openai.base_url).cyan());
    eprintln!(
        "  Embedding Model: {}",
        style(&config.openai.embedding_model).cyan()
    );
    eprintln!(
        "  Completion Model: {}",
        style(&config.openai.completion_model).cyan()
    );
    eprintln!("  Batch Size: {}", style(config.openai.batch_size).cyan());
    eprintln!(
        "  API Key: {}",
        style(api_key_source(&config.openai, std::env::var(API_KEY_ENV).ok())).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Chunking:").bold().yellow());
    eprintln!("  Chunk Size: {}", style(config.chunking.chunk_size).cyan());
    eprintln!("  Overlap: {}", style(config.chunking.overlap).cyan());

    eprintln!();
    eprintln!("{}", style("Retrieval:").bold().yellow());
    eprintln!("  Dimensions: {}", style(config.retrieval.dimensions).cyan());
    eprintln!("  Top K: {}", style(config.retrieval.top_k).cyan());
    eprintln!(
        "  Score Threshold: {}",
        style(config.retrieval.score_threshold).cyan()
    );
    eprintln!("  Metric: {}", style(config.retrieval.metric).cyan());

    eprintln!();
    eprintln!("Config file: {}", style(config.config_file_path().display()).dim());
    eprintln!("Vector database: {}", style(config.database_path().display()).dim());

    Ok(())
}

/// Where the API key will come from, without revealing it
fn api_key_source(openai: &OpenAiConfig, env_value: Option<String>) -> &'static str {
    if env_value.is_some_and(|key| !key.trim().is_empty()) {
        "set via environment"
    } else if openai
        .api_key
        .as_ref()
        .is_some_and(|key| !key.trim().is_empty())
    {
        "set in config file"
    } else {
        "not set"
    }
}

fn load_existing_config(config_dir: &Path) -> Config {
    Config::load(config_dir).map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            Config {
                base_dir: config_dir.to_path_buf(),
                ..Config::default()
            }
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            config
        },
    )
}

fn configure_openai(openai: &mut OpenAiConfig) -> Result<()> {
    let base_url: String = Input::new()
        .with_prompt("API base URL")
        .default(openai.base_url.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            let temp_config = OpenAiConfig {
                base_url: input.clone(),
                ..OpenAiConfig::default()
            };
            temp_config.endpoint_base()?;
            Ok(())
        })
        .interact_text()?;

    let embedding_model: String = Input::new()
        .with_prompt("Embedding model")
        .default(openai.embedding_model.clone())
        .validate_with(non_empty("Model name cannot be empty"))
        .interact_text()?;

    let completion_model: String = Input::new()
        .with_prompt("Chat completion model")
        .default(openai.completion_model.clone())
        .validate_with(non_empty("Model name cannot be empty"))
        .interact_text()?;

    let batch_size: u32 = Input::new()
        .with_prompt("Batch size for embedding requests")
        .default(openai.batch_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Batch size must be greater than 0")
            } else if *input > 2048 {
                Err("Batch size must be 2048 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    openai.set_base_url(base_url)?;
    openai.set_embedding_model(embedding_model)?;
    openai.set_completion_model(completion_model)?;
    openai.set_batch_size(batch_size)?;

    Ok(())
}

fn configure_chunking(chunking: &mut ChunkingConfig) -> Result<()> {
    let chunk_size: usize = Input::new()
        .with_prompt("Chunk size (characters)")
        .default(chunking.chunk_size)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if *input == 0 {
                Err("Chunk size must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let overlap: usize = Input::new()
        .with_prompt("Overlap between chunks (characters)")
        .default(chunking.overlap.min(chunk_size - 1))
        .validate_with(|input: &usize| -> Result<(), ConfigError> {
            ChunkingConfig {
                chunk_size,
                overlap: *input,
            }
            .validate()
        })
        .interact_text()?;

    *chunking = ChunkingConfig {
        chunk_size,
        overlap,
    };
    Ok(())
}

fn configure_retrieval(retrieval: &mut RetrievalConfig) -> Result<()> {
    let dimensions: u32 = Input::new()
        .with_prompt("Embedding dimensions")
        .default(retrieval.dimensions)
        .validate_with(|input: &u32| check_dimensions(*input))
        .interact_text()?;

    let top_k: usize = Input::new()
        .with_prompt("Chunks retrieved per question (top k)")
        .default(retrieval.top_k)
        .validate_with(|input: &usize| check_top_k(*input))
        .interact_text()?;

    let score_threshold: f32 = Input::new()
        .with_prompt("Maximum distance for retrieved chunks")
        .default(retrieval.score_threshold)
        .validate_with(|input: &f32| check_score_threshold(*input))
        .interact_text()?;

    let metrics = [DistanceMetric::Cosine, DistanceMetric::Euclidean];
    let default_index = metrics
        .iter()
        .position(|&m| m == retrieval.metric)
        .unwrap_or(0);
    let metric_index = Select::new()
        .with_prompt("Distance metric")
        .default(default_index)
        .items(&metrics.map(|m| m.as_str()))
        .interact()?;

    retrieval.set_dimensions(dimensions)?;
    retrieval.set_top_k(top_k)?;
    retrieval.set_score_threshold(score_threshold)?;
    retrieval.metric = metrics.get(metric_index).copied().unwrap_or_default();

    Ok(())
}

fn check_dimensions(input: u32) -> Result<(), ConfigError> {
    RetrievalConfig::default().set_dimensions(input)
}

fn check_top_k(input: usize) -> Result<(), ConfigError> {
    RetrievalConfig::default().set_top_k(input)
}

fn check_score_threshold(input: f32) -> Result<(), ConfigError> {
    RetrievalConfig::default().set_score_threshold(input)
}

fn non_empty(message: &'static str) -> impl Fn(&String) -> Result<(), &'static str> {
    move |input: &String| {
        if input.trim().is_empty() {
            Err(message)
        } else {
            Ok(())
        }
    }
}

fn models_url(openai: &OpenAiConfig) -> Result<url::Url> {
    openai
        .endpoint_base()?
        .join("models")
        .context("Failed to build models URL")
}

fn test_openai_connection(openai: &OpenAiConfig, api_key: &str) -> Result<bool> {
    let url = models_url(openai)?;

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(5)))
        .build()
        .into();

    let authorization = format!("Bearer {}", api_key.trim());
    match agent
        .get(url.as_str())
        .header("Authorization", authorization.as_str())
        .call()
    {
        Ok(_) => Ok(true),
        Err(ureq::Error::StatusCode(401 | 403)) => Ok(false),
        Err(ureq::Error::StatusCode(code)) if (400..500).contains(&code) => Ok(true),
        Err(_) => Ok(false),
    }
}
