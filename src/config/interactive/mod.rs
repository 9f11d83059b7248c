
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input};
use std::path::Path;

use super::{Config, EmbeddingConfig, RetrievalConfig};
use crate::embeddings::EmbeddingClient;
use crate::embeddings::chunking::ChunkingConfig;

#[inline]
pub fn run_interactive_config(config_dir: &Path) -> Result<()> {
    eprintln!("{}", style("🔧 Knowledge RAG Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config(config_dir)?;

    eprintln!("{}", style("Embedding Service").bold().yellow());
    eprintln!("Configure the OpenAI-compatible service used to embed documents and queries.");
    eprintln!();

    configure_embedding(&mut config.embedding)?;

    eprintln!();
    eprintln!("{}", style("Chunking and Retrieval").bold().yellow());
    configure_chunking(&mut config.chunking)?;
    configure_retrieval(&mut config.retrieval)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if test_embedding_connection(&config.embedding) {
        eprintln!("{}", style("✓ Embedding service responded!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not get an embedding from the service").yellow()
        );
        eprintln!(
            "You can continue, but documents will be indexed with zero vectors until the service is reachable."
        );
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

    eprintln!("{}", style("Embedding Settings:").bold().yellow());
    match config.embedding.base_url() {
        Ok(url) => eprintln!("  Service URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  Service URL: {} ({})", style("Invalid").red(), e),
    }
    eprintln!("  Model: {}", style(&config.embedding.model).cyan());
    eprintln!("  Dimension: {}", style(config.embedding.dimension).cyan());
    let key_state = if config.embedding.api_key().is_some() {
        style("set").green()
    } else {
        style("not set").yellow()
    };
    eprintln!(
        "  API Key: ${} ({})",
        style(&config.embedding.api_key_env).cyan(),
        key_state
    );
    eprintln!(
        "  Timeout: {}s, Retries: {}",
        style(config.embedding.timeout_seconds).cyan(),
        style(config.embedding.retry_attempts).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Chunking Settings:").bold().yellow());
    eprintln!(
        "  Chunk Size: {} words",
        style(config.chunking.chunk_size).cyan()
    );
    eprintln!("  Overlap: {} words", style(config.chunking.overlap).cyan());

    eprintln!();
    eprintln!("{}", style("Retrieval Settings:").bold().yellow());
    eprintln!("  Top K: {}", style(config.retrieval.top_k).cyan());

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config(config_dir: &Path) -> Result<Config> {
    Config::load(config_dir).map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No valid configuration found. Using defaults.").yellow()
            );
            Ok(Config {
                base_dir: config_dir.to_path_buf(),
                ..Config::default()
            })
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_embedding(embedding: &mut EmbeddingConfig) -> Result<()> {
    let base_url: String = Input::new()
        .with_prompt("Embedding service URL")
        .default(embedding.base_url.clone())
        .validate_with(|input: &String| -> Result<(), String> {
            let candidate = EmbeddingConfig {
                base_url: input.clone(),
                ..EmbeddingConfig::default()
            };
            candidate.base_url().map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Embedding model")
        .default(embedding.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let dimension: usize = Input::new()
        .with_prompt("Embedding dimension")
        .default(embedding.dimension)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if (1..=8192).contains(input) {
                Ok(())
            } else {
                Err("Dimension must be between 1 and 8192")
            }
        })
        .interact_text()?;

    let api_key_env: String = Input::new()
        .with_prompt("Environment variable holding the API key")
        .default(embedding.api_key_env.clone())
        .interact_text()?;

    embedding.set_base_url(base_url)?;
    embedding.set_model(model)?;
    embedding.set_dimension(dimension)?;
    embedding.set_api_key_env(api_key_env)?;

    Ok(())
}

fn configure_chunking(chunking: &mut ChunkingConfig) -> Result<()> {
    let chunk_size: usize = Input::new()
        .with_prompt("Words per chunk")
        .default(chunking.chunk_size)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if *input == 0 {
                Err("Chunk size must be at least 1 word")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let overlap: usize = Input::new()
        .with_prompt("Words shared between adjacent chunks")
        .default(chunking.overlap.min(chunk_size - 1))
        .validate_with(move |input: &usize| -> Result<(), String> {
            if *input >= chunk_size {
                Err(format!("Overlap must be smaller than {}", chunk_size))
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    *chunking = ChunkingConfig::new(chunk_size, overlap)?;

    Ok(())
}

fn configure_retrieval(retrieval: &mut RetrievalConfig) -> Result<()> {
    let top_k: usize = Input::new()
        .with_prompt("Excerpts per augmented prompt")
        .default(retrieval.top_k)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if (1..=100).contains(input) {
                Ok(())
            } else {
                Err("Top-k must be between 1 and 100")
            }
        })
        .interact_text()?;

    retrieval.set_top_k(top_k)?;

    Ok(())
}

fn test_embedding_connection(embedding: &EmbeddingConfig) -> bool {
    EmbeddingClient::new(embedding)
        .map(|client| client.with_retry_attempts(1))
        .and_then(|client| client.health_check())
        .is_ok()
}
