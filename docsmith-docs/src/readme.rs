//! README generation from file summaries

use crate::output::write_atomically;
use crate::prompts::PromptTemplate;
use docsmith_core::{
    AnalysisResult, DocsmithError, DocsmithResult, ErrorContext, GeneratedDocument, LanguageModel,
    Stage,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ReadmeGenerator {
    model: Arc<dyn LanguageModel>,
    template: PromptTemplate,
    file_name: String,
}

impl ReadmeGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, template: PromptTemplate, file_name: &str) -> Self {
        Self {
            model,
            template,
            file_name: file_name.to_string(),
        }
    }

    /// The full README prompt for a repository and its summaries
    pub fn build_prompt(
        &self,
        root: &Path,
        summaries: &BTreeMap<String, String>,
    ) -> DocsmithResult<String> {
        let repo_name = repository_name(root);
        let summaries = render_summaries(summaries)?;

        self.template
            .render(&[("repo_name", &repo_name), ("summaries", &summaries)])
    }

    /// Ask the model for a README and write its response verbatim to
    /// `<root>/<readme_file>`
    pub async fn generate(&self, analysis: &AnalysisResult) -> DocsmithResult<GeneratedDocument> {
        let prompt = self.build_prompt(&analysis.root, &analysis.summaries)?;

        debug!(
            summaries = analysis.summaries.len(),
            prompt_chars = prompt.len(),
            "Requesting README"
        );

        let content = self
            .model
            .complete(&prompt)
            .await
            .map_err(|e| DocsmithError::model_invocation(Stage::Readme, None, e))?;

        let path = analysis.root.join(&self.file_name);
        write_atomically(&path, &content, Stage::Readme).await?;

        info!(path = %path.display(), "README generated");

        Ok(GeneratedDocument {
            path,
            content,
            sections: 1,
            skipped: Vec::new(),
        })
    }
}

/// Base name of the canonicalized root, so `.` resolves to the directory's real name
pub fn repository_name(root: &Path) -> String {
    let resolved = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| resolved.display().to_string())
}

/// Summaries as 2-space indented JSON, keys in path order
pub fn render_summaries(summaries: &BTreeMap<String, String>) -> DocsmithResult<String> {
    serde_json::to_string_pretty(summaries).map_err(|e| DocsmithError::PromptRender {
        stage: Stage::Readme,
        template: "readme".to_string(),
        message: format!("failed to serialize summaries: {}", e),
        context: ErrorContext::new("readme_generator").with_operation("render_summaries"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_summaries() {
        assert_eq!(render_summaries(&BTreeMap::new()).unwrap(), "{}");

        let mut summaries = BTreeMap::new();
        summaries.insert("b.py".to_string(), "second".to_string());
        summaries.insert("a.py".to_string(), "first".to_string());

        assert_eq!(
            render_summaries(&summaries).unwrap(),
            "{\n  \"a.py\": \"first\",\n  \"b.py\": \"second\"\n}"
        );
    }

    #[test]
    fn test_repository_name_resolves_relative_roots() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("my-project");
        std::fs::create_dir_all(root.join("src")).unwrap();

        assert_eq!(repository_name(&root), "my-project");
        assert_eq!(repository_name(&root.join("src").join("..")), "my-project");
    }
}
