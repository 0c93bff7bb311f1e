//! Row pipelines — sequence tokenization, substitution, prompting,
//! generation, and response parsing into the five table-to-table variants.
//!
//! Failure policy: a generation failure is isolated to the single call. The
//! affected output field gets an inline `[ERROR] <cause>` marker and the
//! run continues; only input decoding aborts a batch. Quota and rate-limit
//! causes additionally record a user-visible advisory.

pub mod handlers;
pub mod parse;
pub mod prompts;
pub mod rewrite;
pub mod split;

use tracing::warn;

use crate::llm_client::LlmError;
use crate::table::Table;

/// Advisory recorded once per quota/rate-limit failure. Kept out-of-band
/// from cell data so a UI can show it separately from error markers.
pub const QUOTA_ADVISORY: &str =
    "The OpenAI usage limit was reached. Wait a while and run the batch again.";

/// Output of one pipeline invocation. Owned exclusively by that invocation;
/// two runs never share an accumulator.
#[derive(Debug)]
pub struct PipelineOutput {
    pub table: Table,
    pub advisories: Vec<String>,
}

impl PipelineOutput {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            table: Table::new(headers),
            advisories: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.table.push_row(row);
    }

    /// Converts a failed generation call into its inline cell marker,
    /// recording a quota advisory when the cause warrants one.
    pub fn note_failure(&mut self, err: &LlmError) -> String {
        warn!("generation call failed: {err}");
        if err.is_quota() {
            self.advisories.push(QUOTA_ADVISORY.to_string());
        }
        format!("[ERROR] {err}")
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted generation backend for pipeline tests.

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{LlmError, TextGenerator};

    /// Replays a fixed queue of replies in order and counts calls. Panics
    /// if the pipeline under test issues more calls than were scripted.
    pub struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn ok(replies: &[&str]) -> Self {
            Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn quota_error() -> LlmError {
            LlmError::Api {
                status: 429,
                message: "You exceeded your current quota".to_string(),
            }
        }

        pub fn server_error() -> LlmError {
            LlmError::Api {
                status: 500,
                message: "backend exploded".to_string(),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str, _temperature: f32) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .expect("scripted replies lock")
                .pop_front()
                .expect("pipeline issued more generation calls than scripted")
        }
    }
}
