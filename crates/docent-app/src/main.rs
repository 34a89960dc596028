//! Docent service binary - composition root.
//!
//! Ties the crates together into a single executable:
//! 1. Parse CLI arguments and initialize tracing
//! 2. Load configuration from TOML and apply overrides
//! 3. Choose the embedding gateway (ONNX model if installed, hash fallback)
//! 4. Build or load the indexed corpus through the corpus manager
//! 5. Start the axum HTTP server

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use docent_api::routes;
use docent_api::state::AppState;
use docent_core::config::DocentConfig;
use docent_storage::{CorpusManager, DocumentSource, IndexStore, PlainTextSource};
use docent_vector::embedding::{DynEmbeddingService, HashEmbedding, OnnxEmbedder};
use docent_vector::search::QueryEngine;

use cli::CliArgs;

/// Expand ~ to the home directory in a path string.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Pick the embedding gateway: the configured ONNX model when its assets
/// are present, the deterministic hash gateway otherwise.
fn select_embedder(model_dir: &PathBuf) -> Arc<dyn DynEmbeddingService> {
    match OnnxEmbedder::from_directory(model_dir) {
        Ok(embedder) => Arc::new(embedder),
        Err(e) => {
            tracing::warn!(
                model_dir = %model_dir.display(),
                error = %e,
                "ONNX model unavailable, falling back to hash embeddings"
            );
            Arc::new(HashEmbedding::new())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Tracing.
    let default_level = args.log_level.clone().unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!("Starting Docent v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = DocentConfig::load_or_default(&config_file);
    config.general.port = args.resolve_port(config.general.port);
    if let Some(doc) = args.resolve_document() {
        config.document.source_path = doc;
    }
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }

    // Storage.
    let data_dir = expand_home(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }

    // Embedding gateway.
    let model_dir = expand_home(&config.embedding.model_dir);
    let embedder = select_embedder(&model_dir);

    // Document source. The corpus name defaults to the source file stem.
    let source_path = expand_home(&config.document.source_path);
    let source = match config.document.corpus_name.as_deref() {
        Some(name) => PlainTextSource::with_name(&source_path, name),
        None => PlainTextSource::new(&source_path),
    };
    tracing::info!(
        document = %source_path.display(),
        corpus = source.name(),
        "Document source configured"
    );

    // Build or load the corpus. A failure here leaves the service running
    // with no corpus; /ask reports 404 until the document is fixed and the
    // service restarted.
    let manager = CorpusManager::new(
        IndexStore::new(&data_dir),
        Box::new(source),
        Arc::clone(&embedder),
        config.embedding.model_tag.clone(),
    );

    let state = match manager.get_or_load().await {
        Ok(loaded) => {
            tracing::info!(
                sections = loaded.corpus.len(),
                dimension = loaded.corpus.dimension,
                "Corpus ready"
            );
            let engine = QueryEngine::new_dyn(loaded, embedder);
            AppState::new(config, Arc::new(engine))
        }
        Err(e) => {
            tracing::warn!(error = %e, "No corpus available, serving without index");
            AppState::without_corpus(config)
        }
    };

    // HTTP server.
    routes::start_server(state).await?;

    Ok(())
}
