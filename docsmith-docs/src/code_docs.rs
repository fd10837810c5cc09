//! Per-file code documentation
//!
//! Each eligible file gets its own model request. Requests run concurrently,
//! but sections are assembled in content-map order and the document is
//! written once at the end.

use crate::output::write_atomically;
use crate::prompts::PromptTemplate;
use docsmith_core::{
    spawn_ordered, AnalysisResult, DocFailurePolicy, DocsmithError, DocsmithResult, ErrorContext,
    GeneratedDocument, LanguageModel, SkipReason, SkippedFile, Stage,
};
use docsmith_repo::matches_extension;
use futures::{FutureExt, StreamExt};
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct CodeDocumentationGenerator {
    model: Arc<dyn LanguageModel>,
    template: PromptTemplate,
    extensions: Vec<String>,
    file_name: String,
    policy: DocFailurePolicy,
    max_concurrency: usize,
}

impl CodeDocumentationGenerator {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        template: PromptTemplate,
        extensions: Vec<String>,
        file_name: &str,
    ) -> Self {
        Self {
            model,
            template,
            extensions,
            file_name: file_name.to_string(),
            policy: DocFailurePolicy::default(),
            max_concurrency: 1,
        }
    }

    pub fn with_policy(mut self, policy: DocFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Files to document, in content-map order
    pub fn eligible_files<'a>(
        &self,
        contents: &'a BTreeMap<String, String>,
    ) -> Vec<(&'a str, &'a str)> {
        contents
            .iter()
            .filter(|(path, _)| matches_extension(path, &self.extensions))
            .map(|(path, content)| (path.as_str(), content.as_str()))
            .collect()
    }

    pub async fn generate(&self, analysis: &AnalysisResult) -> DocsmithResult<GeneratedDocument> {
        // Render every prompt up front: a broken template fails the pass before any request
        let requests = self
            .eligible_files(&analysis.contents)
            .into_iter()
            .map(|(path, content)| {
                let prompt = self
                    .template
                    .render(&[("file_path", path), ("content", content)])?;
                Ok((path.to_string(), prompt))
            })
            .collect::<DocsmithResult<Vec<_>>>()?;

        info!(
            files = requests.len(),
            policy = ?self.policy,
            "Generating code documentation"
        );

        let model = Arc::clone(&self.model);
        let mut responses = spawn_ordered(requests, self.max_concurrency, move |(path, prompt)| {
            let model = Arc::clone(&model);
            async move {
                let response = AssertUnwindSafe(model.complete(&prompt))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        Err(DocsmithError::Internal {
                            message: "documentation task panicked".to_string(),
                            source: None,
                            context: ErrorContext::new("code_documentation"),
                        })
                    });
                (path, response)
            }
        });

        let mut content = String::new();
        let mut sections = 0;
        let mut skipped = Vec::new();

        while let Some(joined) = responses.next().await {
            let (path, response) = joined?;

            match response {
                Ok(body) => {
                    debug!(file = %path, "Documented file");
                    content.push_str(&format!("# {}\n\n{}\n\n---\n\n", path, body.trim()));
                    sections += 1;
                }
                Err(cause) => {
                    let error = DocsmithError::model_invocation(
                        Stage::CodeDocumentation,
                        Some(&path),
                        cause,
                    );
                    match self.policy {
                        DocFailurePolicy::Abort => return Err(error),
                        DocFailurePolicy::Skip => {
                            warn!(file = %path, error = %error, "Leaving file out of code documentation");
                            skipped.push(SkippedFile {
                                relative_path: path,
                                reason: SkipReason::Document,
                                error: error.to_string(),
                            });
                        }
                    }
                }
            }
        }

        if !skipped.is_empty() {
            content.push_str(&skipped_note(&skipped));
        }

        let path = analysis.root.join(&self.file_name);
        write_atomically(&path, &content, Stage::CodeDocumentation).await?;

        info!(
            path = %path.display(),
            sections = sections,
            skipped = skipped.len(),
            "Code documentation generated"
        );

        Ok(GeneratedDocument {
            path,
            content,
            sections,
            skipped,
        })
    }
}

fn skipped_note(skipped: &[SkippedFile]) -> String {
    let mut note =
        String::from("> **Note:** documentation could not be generated for these files:\n>\n");
    for file in skipped {
        note.push_str(&format!("> - `{}`\n", file.relative_path));
    }
    note
}
