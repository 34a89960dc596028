//! Docent API crate - axum HTTP server and route handlers.
//!
//! Exposes the retrieval core over HTTP: `POST /ask` answers a question
//! against the loaded corpus, `GET /health` reports service status. Expected
//! conditions (no corpus, no relevant result) map to 404; client mistakes to
//! 400; internal faults to 500.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
