use std::sync::Arc;

use crate::llm_client::TextGenerator;
use crate::synonyms::SynonymDict;
use crate::tokenize::Tokenizer;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Everything here is read-only after startup; each request owns its own
/// pipeline accumulator.
#[derive(Clone)]
pub struct AppState {
    /// The generation backend. Production: `LlmClient`; tests may inject a
    /// scripted implementation.
    pub llm: Arc<dyn TextGenerator>,
    pub tokenizer: Arc<dyn Tokenizer>,
    /// Loaded once at startup; empty when the resource is missing.
    pub synonyms: Arc<SynonymDict>,
}
