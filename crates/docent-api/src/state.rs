//! Application state shared across all route handlers.
//!
//! AppState is passed to handlers via axum's State extractor. All fields
//! use `Arc` for cheap cloning across handler tasks; nothing here is
//! mutable after startup.

use std::sync::Arc;
use std::time::Instant;

use docent_core::config::DocentConfig;
use docent_vector::search::QueryEngine;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration, fixed at startup.
    pub config: Arc<DocentConfig>,
    /// The query engine over the loaded corpus. `None` when no corpus could
    /// be built or loaded at startup; `/ask` then reports 404.
    pub engine: Option<Arc<QueryEngine>>,
    /// Server start time for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    /// Create state for a service with a ready query engine.
    pub fn new(config: DocentConfig, engine: Arc<QueryEngine>) -> Self {
        Self {
            config: Arc::new(config),
            engine: Some(engine),
            start_time: Instant::now(),
        }
    }

    /// Create state for a service that has no corpus to serve.
    pub fn without_corpus(config: DocentConfig) -> Self {
        Self {
            config: Arc::new(config),
            engine: None,
            start_time: Instant::now(),
        }
    }
}
