//! Core trait definitions

use crate::error::DocsmithResult;
use async_trait::async_trait;

/// A text-completion service.
///
/// One call takes a fully rendered prompt and returns the raw completion text.
/// Implementations must be shareable across the summarizer's worker tasks.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Request a completion for `prompt`
    async fn complete(&self, prompt: &str) -> DocsmithResult<String>;

    /// Human-readable `provider/model` label used in logs
    fn describe(&self) -> String {
        "language-model".to_string()
    }
}
