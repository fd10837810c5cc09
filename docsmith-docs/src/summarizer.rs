//! Concurrent per-file summarization
//!
//! Every discovered file becomes one spawned unit of work: read, render the
//! summary prompt, ask the model. Outcomes are folded into the
//! [`AnalysisResult`] by the calling task as units finish.

use crate::prompts::PromptTemplate;
use docsmith_core::{
    spawn_unordered, AnalysisResult, DiscoveredFile, DocsmithError, ErrorContext, FileRecord,
    LanguageModel, SkipReason, SkippedFile, Stage, SummaryOutcome,
};
use futures::{FutureExt, StreamExt};
use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ConcurrentSummarizer {
    model: Arc<dyn LanguageModel>,
    template: Arc<PromptTemplate>,
    max_concurrency: usize,
}

impl ConcurrentSummarizer {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        template: PromptTemplate,
        max_concurrency: usize,
    ) -> Self {
        Self {
            model,
            template: Arc::new(template),
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Summarize `files`, returning once every unit has finished.
    ///
    /// Per-file failures never abort the run; the file is left out of both
    /// maps and listed in `skipped`.
    pub async fn summarize(&self, root: &Path, files: Vec<DiscoveredFile>) -> AnalysisResult {
        let total = files.len();
        let mut pending: BTreeSet<String> =
            files.iter().map(|file| file.relative_path.clone()).collect();
        let model = Arc::clone(&self.model);
        let template = Arc::clone(&self.template);

        info!(
            files = total,
            max_concurrency = self.max_concurrency,
            model = %model.describe(),
            "Summarizing repository files"
        );

        let mut outcomes = spawn_unordered(files, self.max_concurrency, move |file| {
            let model = Arc::clone(&model);
            let template = Arc::clone(&template);
            async move { summarize_guarded(model, template, file).await }
        });

        let mut result = AnalysisResult::new(root.to_path_buf());
        let mut join_errors = Vec::new();
        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Ok(outcome) => {
                    pending.remove(outcome_path(&outcome));
                    result.record(outcome);
                }
                // Units catch their own panics, so this only fires if the runtime drops a task
                Err(e) => {
                    e.log();
                    join_errors.push(e.to_string());
                }
            }
        }
        record_unfinished(&mut result, pending, &join_errors);

        info!(
            summarized = result.summaries.len(),
            skipped = result.skipped.len(),
            "Summarization finished"
        );

        result
    }
}

fn outcome_path(outcome: &SummaryOutcome) -> &str {
    match outcome {
        SummaryOutcome::Summarized(record) => &record.relative_path,
        SummaryOutcome::Failed(skipped) => &skipped.relative_path,
    }
}

/// Files whose unit never reported back are listed as skipped
fn record_unfinished(
    result: &mut AnalysisResult,
    unfinished: BTreeSet<String>,
    join_errors: &[String],
) {
    let error = if join_errors.is_empty() {
        "summarization task did not complete".to_string()
    } else {
        join_errors.join("; ")
    };

    for relative_path in unfinished {
        warn!(file = %relative_path, error = %error, "Summarization task did not report back");
        result.skipped.push(SkippedFile {
            relative_path,
            reason: SkipReason::Summarize,
            error: error.clone(),
        });
    }
}

async fn summarize_guarded(
    model: Arc<dyn LanguageModel>,
    template: Arc<PromptTemplate>,
    file: DiscoveredFile,
) -> SummaryOutcome {
    let relative_path = file.relative_path.clone();

    match AssertUnwindSafe(summarize_file(model.as_ref(), &template, file))
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(file = %relative_path, "Summarization task panicked");
            SummaryOutcome::Failed(SkippedFile {
                relative_path,
                reason: SkipReason::Summarize,
                error: "summarization task panicked".to_string(),
            })
        }
    }
}

/// One unit of work
pub async fn summarize_file(
    model: &dyn LanguageModel,
    template: &PromptTemplate,
    file: DiscoveredFile,
) -> SummaryOutcome {
    let DiscoveredFile {
        absolute_path,
        relative_path,
    } = file;

    // read_to_string rejects invalid UTF-8 with InvalidData
    let content = match tokio::fs::read_to_string(&absolute_path).await {
        Ok(content) => content,
        Err(source) => {
            let error = DocsmithError::FileRead {
                path: relative_path.clone(),
                source,
                context: ErrorContext::new("summarizer").with_operation("read_file"),
            };
            warn!(file = %relative_path, error = %error, "Skipping unreadable file");
            return SummaryOutcome::Failed(SkippedFile {
                relative_path,
                reason: SkipReason::Read,
                error: error.to_string(),
            });
        }
    };

    let summary = match template.render(&[("content", &content)]) {
        Ok(prompt) => model.complete(&prompt).await,
        Err(e) => Err(e),
    };

    match summary {
        Ok(summary) => {
            debug!(file = %relative_path, summary_chars = summary.len(), "Summarized file");
            let summary = summary.trim().to_string();
            SummaryOutcome::Summarized(FileRecord::summarized(relative_path, content, summary))
        }
        Err(cause) => {
            let error =
                DocsmithError::model_invocation(Stage::Analysis, Some(&relative_path), cause);
            warn!(file = %relative_path, error = %error, "Skipping file that could not be summarized");
            SummaryOutcome::Failed(SkippedFile {
                relative_path,
                reason: SkipReason::Summarize,
                error: error.to_string(),
            })
        }
    }
}
