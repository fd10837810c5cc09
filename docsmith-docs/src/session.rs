//! Analysis session: one repository, one stored analysis result

use crate::pipeline::DocumentationPipeline;
use docsmith_core::{
    AnalysisResult, DocsmithError, DocsmithResult, ErrorContext, GeneratedDocument, Stage,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Holds the latest analysis of a repository so the generation passes can
/// run against it, in any order and as often as needed.
pub struct AnalysisSession {
    pipeline: DocumentationPipeline,
    root: PathBuf,
    result: Option<AnalysisResult>,
}

impl AnalysisSession {
    pub fn new<P: Into<PathBuf>>(pipeline: DocumentationPipeline, root: P) -> Self {
        Self {
            pipeline,
            root: root.into(),
            result: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pipeline(&self) -> &DocumentationPipeline {
        &self.pipeline
    }

    /// Analyze the repository, replacing any previous result.
    /// A failed analysis leaves the previous result in place.
    pub async fn analyze(&mut self) -> DocsmithResult<&AnalysisResult> {
        let result = self.pipeline.analyze(&self.root).await?;
        Ok(self.result.insert(result))
    }

    pub async fn generate_readme(&self) -> DocsmithResult<GeneratedDocument> {
        let analysis = self.require_result(Stage::Readme)?;
        self.pipeline.generate_readme(analysis).await
    }

    pub async fn generate_code_documentation(&self) -> DocsmithResult<GeneratedDocument> {
        let analysis = self.require_result(Stage::CodeDocumentation)?;
        self.pipeline.generate_code_documentation(analysis).await
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Drop the stored result
    pub fn reset(&mut self) {
        debug!(root = %self.root.display(), "Resetting analysis session");
        self.result = None;
    }

    fn require_result(&self, stage: Stage) -> DocsmithResult<&AnalysisResult> {
        self.result.as_ref().ok_or_else(|| DocsmithError::NotAnalyzed {
            stage,
            context: ErrorContext::new("analysis_session")
                .with_operation(stage.as_str())
                .with_suggestion("Run the analysis before generating documents"),
        })
    }
}
