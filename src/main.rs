use clap::{Parser, Subcommand};
use rag_chat::Result;
use rag_chat::commands::{
    SearchOverrides, ingest_document_file, search_chunks, show_status, start_chat,
};
use rag_chat::config::{Config, run_interactive_config, show_config};
use rag_chat::database::DistanceMetric;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rag-chat")]
#[command(about = "Retrieval-augmented chat over your own documents")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml and the vector database
    #[arg(long, global = true, env = "RAG_CHAT_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the API connection, chunking and retrieval settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Chunk, embed and store a text document
    Ingest {
        /// Path of the UTF-8 text file to ingest
        file: PathBuf,
        /// Document name to store instead of the file name
        #[arg(long)]
        name: Option<String>,
        /// Append to the store instead of clearing it first
        #[arg(long)]
        keep_existing: bool,
    },
    /// Show the stored chunks closest to a query
    Search {
        query: String,
        /// Maximum number of chunks to return
        #[arg(long)]
        top_k: Option<usize>,
        /// Maximum distance from the query
        #[arg(long)]
        threshold: Option<f32>,
        #[arg(long, value_enum)]
        metric: Option<DistanceMetric>,
    },
    /// Start an interactive chat grounded in the stored chunks
    Chat {
        /// Replace the store with this document before chatting
        #[arg(long)]
        ingest: Option<PathBuf>,
    },
    /// Show configuration and vector store status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => Config::default_dir()?,
    };

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config(&config_dir)?;
            } else {
                run_interactive_config(&config_dir)?;
            }
        }
        Commands::Ingest {
            file,
            name,
            keep_existing,
        } => {
            ingest_document_file(&config_dir, &file, name.as_deref(), keep_existing).await?;
        }
        Commands::Search {
            query,
            top_k,
            threshold,
            metric,
        } => {
            let overrides = SearchOverrides {
                top_k,
                score_threshold: threshold,
                metric,
            };
            search_chunks(&config_dir, &query, overrides).await?;
        }
        Commands::Chat { ingest } => {
            start_chat(&config_dir, ingest.as_deref()).await?;
        }
        Commands::Status => {
            show_status(&config_dir).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn status_command() {
        let cli = Cli::try_parse_from(["rag-chat", "status"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            assert!(matches!(parsed.command, Commands::Status));
        }
    }

    #[test]
    fn ingest_command_with_options() {
        let cli = Cli::try_parse_from([
            "rag-chat",
            "ingest",
            "manual.txt",
            "--name",
            "Microwave Manual",
            "--keep-existing",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ingest {
                file,
                name,
                keep_existing,
            } = parsed.command
            {
                assert_eq!(file, PathBuf::from("manual.txt"));
                assert_eq!(name, Some("Microwave Manual".to_string()));
                assert!(keep_existing);
            } else {
                panic!("expected ingest command");
            }
        }
    }

    #[test]
    fn search_command_parses_metric() {
        let cli = Cli::try_parse_from([
            "rag-chat",
            "search",
            "how to defrost",
            "--top-k",
            "3",
            "--threshold",
            "0.8",
            "--metric",
            "euclidean",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Search {
                query,
                top_k,
                threshold,
                metric,
            } = parsed.command
            {
                assert_eq!(query, "how to defrost");
                assert_eq!(top_k, Some(3));
                assert_eq!(threshold, Some(0.8));
                assert_eq!(metric, Some(DistanceMetric::Euclidean));
            } else {
                panic!("expected search command");
            }
        }
    }

    #[test]
    fn l2_metric_alias() {
        let cli = Cli::try_parse_from(["rag-chat", "search", "q", "--metric", "l2"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Search { metric, .. } = parsed.command {
                assert_eq!(metric, Some(DistanceMetric::Euclidean));
            } else {
                panic!("expected search command");
            }
        }
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let cli = Cli::try_parse_from(["rag-chat", "search", "q", "--metric", "manhattan"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidValue);
        }
    }

    #[test]
    fn config_dir_is_global() {
        let cli = Cli::try_parse_from(["rag-chat", "chat", "--config-dir", "/tmp/rag"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            assert_eq!(parsed.config_dir, Some(PathBuf::from("/tmp/rag")));
            assert!(matches!(parsed.command, Commands::Chat { ingest: None }));
        }
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["rag-chat", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["rag-chat", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["rag-chat", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
