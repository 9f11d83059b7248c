use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::RagError;
use crate::config::Config;
use crate::embeddings::{EmbeddingClient, EmbeddingProvider};
use crate::knowledge::{ChunkMetadata, IngestionReport, KnowledgeStore, SearchResult};
use crate::prompt::{DEFAULT_DOCUMENT_NAME, build_prompt};

/// Knowledge store backed by the configured embedding service
pub type SessionStore = KnowledgeStore<Arc<EmbeddingClient>>;

/// Create an empty store using the embedding and chunking settings in `config`
#[inline]
pub fn open_store(config: &Config) -> Result<SessionStore> {
    config.validate().context("Invalid configuration")?;

    let client = EmbeddingClient::new(&config.embedding)
        .context("Failed to create embedding client")?;
    info!(
        "Using embedding model {} at {}",
        client.model(),
        client.base_url()
    );

    KnowledgeStore::new(Arc::new(client), config.chunking)
        .context("Failed to create knowledge store")
}

/// Metadata for a document loaded from `path`, named after the file
#[inline]
pub fn document_metadata(path: &Path) -> ChunkMetadata {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
    ChunkMetadata::named(name)
}

/// Read a plain-text file and add it to `store`
#[inline]
pub fn ingest_file<E: EmbeddingProvider>(
    store: &mut KnowledgeStore<E>,
    path: &Path,
) -> Result<IngestionReport> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;
    let metadata = document_metadata(path);

    let bar = if console::user_attended_stderr() {
        ProgressBar::new(0).with_style(
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} Embedding {msg}")
                .expect("style template is valid")
                .progress_chars("=> "),
        )
    } else {
        ProgressBar::hidden()
    };
    bar.set_message(metadata.name().unwrap_or_default().to_string());

    let report = store.add_document_with_progress(&text, &metadata, |done, total| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    });
    bar.finish_and_clear();

    Ok(report?)
}

/// Add every file in `paths` to `store`, skipping files with no text.
///
/// Returns the number of documents added.
#[inline]
pub fn ingest_files<E: EmbeddingProvider>(
    store: &mut KnowledgeStore<E>,
    paths: &[PathBuf],
) -> Result<usize> {
    let mut added = 0;

    for path in paths {
        match ingest_file(store, path) {
            Ok(report) => {
                added += 1;
                eprintln!(
                    "{} {} ({} chunks)",
                    style("✓ Added").green(),
                    path.display(),
                    report.chunks_added
                );
                if report.degraded_embeddings > 0 {
                    eprintln!(
                        "  {}",
                        style(format!(
                            "⚠ {} chunks could not be embedded and will not match well",
                            report.degraded_embeddings
                        ))
                        .yellow()
                    );
                }
            }
            Err(e) if matches!(e.downcast_ref::<RagError>(), Some(RagError::NothingToAdd(_))) => {
                warn!("Skipping {}: {}", path.display(), e);
                eprintln!("{} {}", style("⚠ Skipped").yellow(), e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(added)
}

/// The prompt to send for `query`: augmented with retrieved excerpts when any were
/// found, otherwise the query itself
#[inline]
pub fn augment_query<E: EmbeddingProvider>(
    store: &KnowledgeStore<E>,
    query: &str,
    top_k: usize,
) -> String {
    let results = store.search(query, top_k);
    build_prompt(query, &results).unwrap_or_else(|| query.to_string())
}

fn load_session(config: &Config, files: &[PathBuf]) -> Result<SessionStore> {
    let mut store = open_store(config)?;
    ingest_files(&mut store, files)?;
    store.toggle(true);
    Ok(store)
}

/// Index `files` and print the chunks nearest to `query`
#[inline]
pub fn search_documents(
    config_dir: &Path,
    query: &str,
    files: &[PathBuf],
    top_k: Option<usize>,
    json: bool,
) -> Result<()> {
    let config = Config::load(config_dir).context("Failed to load configuration")?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let store = load_session(&config, files)?;

    let results = store.search(query, top_k);

    if json {
        let output =
            serde_json::to_string_pretty(&results).context("Failed to serialize results")?;
        println!("{}", output);
    } else {
        print_results(&results);
    }

    Ok(())
}

fn print_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("No matching content found.");
        return;
    }

    for (i, result) in results.iter().enumerate() {
        let name = result.metadata.name().unwrap_or(DEFAULT_DOCUMENT_NAME);
        let chunk = result
            .metadata
            .chunk_id()
            .map(|id| format!(" chunk {}", id))
            .unwrap_or_default();
        println!(
            "{} {}{} {}",
            style(format!("{}.", i + 1)).bold(),
            style(name).cyan(),
            chunk,
            style(format!("(distance {:.4})", result.distance)).dim()
        );
        println!("{}", result.text);
        println!();
    }
}

/// Index `files` and print the augmented prompt for `query`
#[inline]
pub fn print_prompt(
    config_dir: &Path,
    query: &str,
    files: &[PathBuf],
    top_k: Option<usize>,
) -> Result<()> {
    let config = Config::load(config_dir).context("Failed to load configuration")?;
    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let store = load_session(&config, files)?;

    println!("{}", augment_query(&store, query, top_k));

    Ok(())
}

/// A line of input in an interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Add(PathBuf),
    Enable,
    Disable,
    Clear,
    Status,
    Help,
    Quit,
    Query(String),
    Empty,
    Unknown(String),
}

impl SessionCommand {
    #[inline]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return if line.is_empty() {
                Self::Empty
            } else {
                Self::Query(line.to_string())
            };
        };

        let (name, argument) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, rest)| (name, rest.trim()));

        match name {
            "add" if !argument.is_empty() => Self::Add(PathBuf::from(argument)),
            "on" => Self::Enable,
            "off" => Self::Disable,
            "clear" => Self::Clear,
            "status" => Self::Status,
            "help" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

const SESSION_HELP: &str = "Commands:
  :add PATH   add a plain-text document to the knowledge base
  :on         use the knowledge base for queries
  :off        answer queries without the knowledge base
  :clear      remove every document
  :status     show knowledge base status
  :quit       leave the session
Anything else is a question; its augmented prompt is printed.";

/// Run an interactive session on stdin over a store preloaded with `files`
#[inline]
pub fn run_session(config_dir: &Path, files: &[PathBuf]) -> Result<()> {
    let config = Config::load(config_dir).context("Failed to load configuration")?;
    let mut store = load_session(&config, files)?;

    eprintln!("{}", style("📚 Knowledge RAG session").bold().cyan());
    eprintln!("Type :help for commands.");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    session_loop(
        &mut store,
        config.retrieval.top_k,
        stdin.lock(),
        &mut stdout.lock(),
    )
}

/// Process session commands from `input` until it ends or `:quit` is read
#[inline]
pub fn session_loop<E, R, W>(
    store: &mut KnowledgeStore<E>,
    top_k: usize,
    input: R,
    output: &mut W,
) -> Result<()>
where
    E: EmbeddingProvider,
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line.context("Failed to read input")?;

        match SessionCommand::parse(&line) {
            SessionCommand::Empty => {}
            SessionCommand::Quit => break,
            SessionCommand::Help => writeln!(output, "{}", SESSION_HELP)?,
            SessionCommand::Add(path) => match ingest_file(store, &path) {
                Ok(report) => {
                    store.toggle(true);
                    writeln!(
                        output,
                        "Added {} ({} chunks, {} total)",
                        path.display(),
                        report.chunks_added,
                        report.total_chunks
                    )?;
                }
                Err(e) => writeln!(output, "Could not add {}: {:#}", path.display(), e)?,
            },
            SessionCommand::Enable => {
                store.toggle(true);
                if store.is_enabled() {
                    writeln!(output, "Knowledge base enabled")?;
                } else {
                    writeln!(output, "Knowledge base is empty; add a document first")?;
                }
            }
            SessionCommand::Disable => {
                store.toggle(false);
                writeln!(output, "Knowledge base disabled")?;
            }
            SessionCommand::Clear => {
                store.clear();
                writeln!(output, "Knowledge base cleared")?;
            }
            SessionCommand::Status => {
                let state = if store.is_enabled() { "on" } else { "off" };
                writeln!(output, "{} chunks stored, retrieval {}", store.len(), state)?;
            }
            SessionCommand::Query(query) => {
                writeln!(output, "{}", augment_query(store, &query, top_k))?;
            }
            SessionCommand::Unknown(line) => {
                writeln!(output, "Unknown command: {} (try :help)", line)?;
            }
        }
        output.flush()?;
    }

    Ok(())
}
