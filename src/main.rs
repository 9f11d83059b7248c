use clap::{Parser, Subcommand};
use knowledge_rag::Result;
use knowledge_rag::commands::{print_prompt, run_session, search_documents};
use knowledge_rag::config::{get_config_dir, run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "knowledge-rag")]
#[command(about = "Retrieval-augmented prompts over your own documents")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml (defaults to ~/.knowledge-rag)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the embedding service, chunking, and retrieval settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Index documents and print the chunks most relevant to a query
    Search {
        /// Text to search for
        query: String,
        /// Plain-text document to index (repeatable)
        #[arg(long = "file", short = 'f', required = true)]
        files: Vec<PathBuf>,
        /// Number of results, overriding the configured value
        #[arg(long)]
        top_k: Option<usize>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Index documents and print the augmented prompt for a query
    Prompt {
        /// Question to augment
        query: String,
        /// Plain-text document to index (repeatable)
        #[arg(long = "file", short = 'f', required = true)]
        files: Vec<PathBuf>,
        /// Number of excerpts, overriding the configured value
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Start an interactive session with a knowledge base
    Session {
        /// Plain-text document to load before the session starts (repeatable)
        #[arg(long = "file", short = 'f')]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_dir = get_config_dir(cli.config_dir.as_deref())?;

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config(&config_dir)?;
            } else {
                run_interactive_config(&config_dir)?;
            }
        }
        Commands::Search {
            query,
            files,
            top_k,
            json,
        } => {
            search_documents(&config_dir, &query, &files, top_k, json)?;
        }
        Commands::Prompt {
            query,
            files,
            top_k,
        } => {
            print_prompt(&config_dir, &query, &files, top_k)?;
        }
        Commands::Session { files } => {
            run_session(&config_dir, &files)?;
        }
    }

    Ok(())
}
