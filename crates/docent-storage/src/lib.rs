//! Docent storage crate - document source, artifact persistence, and
//! build-once corpus coordination.
//!
//! Provides the `DocumentSource` seam for raw text input, the `IndexStore`
//! that persists an indexed corpus as an atomic three-artifact set, and the
//! `CorpusManager` that decides between reusing persisted artifacts and
//! running a fresh build.

pub mod manager;
pub mod source;
pub mod store;

pub use manager::CorpusManager;
pub use source::{DocumentSource, PlainTextSource, StaticTextSource};
pub use store::IndexStore;
