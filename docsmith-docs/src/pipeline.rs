//! Documentation pipeline
//!
//! Wires the walker, the summarizer and both generators to one language model
//! and one configuration.

use crate::code_docs::CodeDocumentationGenerator;
use crate::prompts::PromptSet;
use crate::readme::ReadmeGenerator;
use crate::summarizer::ConcurrentSummarizer;
use docsmith_core::{
    log_operation_error, log_operation_start, log_operation_success, performance, AnalysisResult,
    DocsmithConfig, DocsmithError, DocsmithResult, ErrorContext, GeneratedDocument, LanguageModel,
};
use docsmith_repo::{validate_repository_root, FileFilter, FileWalker};
use std::path::Path;
use std::sync::Arc;

pub struct DocumentationPipeline {
    config: DocsmithConfig,
    filter: FileFilter,
    summarizer: ConcurrentSummarizer,
    readme: ReadmeGenerator,
    code_docs: CodeDocumentationGenerator,
}

impl DocumentationPipeline {
    /// Build a pipeline, validating the configuration and any prompt overrides
    pub fn new(model: Arc<dyn LanguageModel>, config: DocsmithConfig) -> DocsmithResult<Self> {
        config.validate()?;
        let prompts = PromptSet::from_config(&config.prompts)?;
        let max_concurrency = config.analysis.effective_concurrency();

        let summarizer =
            ConcurrentSummarizer::new(Arc::clone(&model), prompts.summary, max_concurrency);
        let readme = ReadmeGenerator::new(
            Arc::clone(&model),
            prompts.readme,
            &config.output.readme_file,
        );
        let code_docs = CodeDocumentationGenerator::new(
            model,
            prompts.code_documentation,
            config.analysis.documentation_extensions.clone(),
            &config.output.documentation_file,
        )
        .with_policy(config.output.doc_failure_policy)
        .with_max_concurrency(max_concurrency);

        Ok(Self {
            filter: FileFilter::from_config(&config.analysis),
            config,
            summarizer,
            readme,
            code_docs,
        })
    }

    pub fn config(&self) -> &DocsmithConfig {
        &self.config
    }

    /// Walk `root` and summarize every eligible file
    pub async fn analyze<P: AsRef<Path>>(&self, root: P) -> DocsmithResult<AnalysisResult> {
        let root = validate_repository_root(root)?;
        log_operation_start!("analyze", root = %root.display());

        let walker = FileWalker::new(&root, self.filter.clone());
        let files = tokio::task::spawn_blocking(move || walker.walk().collect::<Vec<_>>())
            .await
            .map_err(|e| DocsmithError::Internal {
                message: format!("Repository walk failed: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("documentation_pipeline").with_operation("walk"),
            })?;

        let result =
            performance::measure_async("analyze", self.summarizer.summarize(&root, files)).await;

        log_operation_success!(
            "analyze",
            files = result.len(),
            skipped = result.skipped.len()
        );
        Ok(result)
    }

    /// Generate `<root>/<output.readme_file>` from the summaries
    pub async fn generate_readme(
        &self,
        analysis: &AnalysisResult,
    ) -> DocsmithResult<GeneratedDocument> {
        log_operation_start!("generate_readme", summaries = analysis.summaries.len());

        match performance::measure_async("generate_readme", self.readme.generate(analysis)).await
        {
            Ok(document) => {
                log_operation_success!("generate_readme", path = %document.path.display());
                Ok(document)
            }
            Err(e) => {
                log_operation_error!("generate_readme", e);
                Err(e)
            }
        }
    }

    /// Generate `<root>/<output.documentation_file>` from the file contents
    pub async fn generate_code_documentation(
        &self,
        analysis: &AnalysisResult,
    ) -> DocsmithResult<GeneratedDocument> {
        log_operation_start!("generate_code_documentation", files = analysis.contents.len());

        match performance::measure_async(
            "generate_code_documentation",
            self.code_docs.generate(analysis),
        )
        .await
        {
            Ok(document) => {
                log_operation_success!(
                    "generate_code_documentation",
                    sections = document.sections,
                    skipped = document.skipped.len()
                );
                Ok(document)
            }
            Err(e) => {
                log_operation_error!("generate_code_documentation", e);
                Err(e)
            }
        }
    }
}
