//! Route handler functions.
//!
//! Each handler extracts its payload via axum extractors, calls into the
//! retrieval core through AppState, and returns JSON.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use docent_core::types::Section;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    /// The question as received.
    pub question: String,
    /// The nearest indexed section.
    pub context: Section,
    /// Squared L2 distance between question and section title embeddings.
    pub distance: f32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Number of indexed sections, 0 when no corpus is loaded.
    pub corpus_sections: usize,
    /// Embedding width of the loaded corpus, if any.
    pub dimension: Option<usize>,
    pub uptime_secs: u64,
    pub version: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /ask` - answer a question with the nearest indexed section.
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let engine = state
        .engine
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("no indexed corpus is available".to_string()))?;

    let result = engine.answer(&request.question).await?;

    info!(
        question_len = result.question.len(),
        matched = %result.matched_section.title,
        distance = result.distance,
        "Question answered"
    );

    Ok(Json(AskResponse {
        question: result.question,
        context: result.matched_section,
        distance: result.distance,
    }))
}

/// `GET /health` - service status and corpus summary.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (corpus_sections, dimension) = match state.engine.as_ref() {
        Some(engine) => (engine.corpus().len(), Some(engine.corpus().dimension)),
        None => (0, None),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        corpus_sections,
        dimension,
        uptime_secs: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
