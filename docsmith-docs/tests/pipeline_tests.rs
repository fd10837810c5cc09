//! End-to-end pipeline tests driven by a deterministic stub model

use docsmith_core::{
    async_trait, DocFailurePolicy, DocsmithConfig, DocsmithError, DocsmithResult, LanguageModel,
    SkipReason, Stage,
};
use docsmith_docs::{AnalysisSession, DocumentationPipeline};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Answers every prompt with a digest of it; fails any prompt mentioning `fail_marker`
struct StubModel {
    fail_marker: Option<String>,
    calls: AtomicUsize,
}

impl StubModel {
    fn new() -> Self {
        Self {
            fail_marker: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete(&self, prompt: &str) -> DocsmithResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(marker) = &self.fail_marker {
            if prompt.contains(marker.as_str()) {
                return Err(DocsmithError::Llm {
                    message: "stub refused".to_string(),
                    provider: None,
                    model: None,
                    context: docsmith_core::ErrorContext::new("stub_model"),
                });
            }
        }

        let last_line = prompt.lines().last().unwrap_or_default();
        Ok(format!("\n  response({} chars): {}  \n", prompt.len(), last_line))
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn pipeline(model: Arc<StubModel>, config: DocsmithConfig) -> DocumentationPipeline {
    DocumentationPipeline::new(model, config).unwrap()
}

#[tokio::test]
async fn test_analysis_applies_filters() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "a.py", "x");
    write(root, "b.exe", "MZ");
    write(root, "node_modules/c.js", "module.exports = {}");

    let model = Arc::new(StubModel::new());
    let result = pipeline(model.clone(), DocsmithConfig::default())
        .analyze(root)
        .await
        .unwrap();

    assert_eq!(result.contents.len(), 1);
    assert_eq!(result.contents["a.py"], "x");
    assert!(result.summaries.contains_key("a.py"));
    assert!(result.skipped.is_empty());
    assert!(result.is_consistent());
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_failed_summary_excludes_file() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "a.py", "print('a')");
    write(root, "b.py", "FAIL_HERE");

    let model = Arc::new(StubModel::failing_on("FAIL_HERE"));
    let result = pipeline(model, DocsmithConfig::default())
        .analyze(root)
        .await
        .unwrap();

    assert_eq!(result.contents.keys().collect::<Vec<_>>(), vec!["a.py"]);
    assert_eq!(result.summaries.keys().collect::<Vec<_>>(), vec!["a.py"]);
    assert!(result.was_skipped("b.py"));
    assert_eq!(result.skipped[0].reason, SkipReason::Summarize);
    assert!(result.skipped[0].error.contains("b.py"));
}

#[tokio::test]
async fn test_analysis_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    for i in 0..12 {
        write(root, &format!("pkg/mod_{:02}.py", i), &format!("value = {}", i));
    }
    write(root, "docs/index.md", "# Docs");

    let mut config = DocsmithConfig::default();
    config.analysis.max_concurrency = Some(3);
    let pipeline = pipeline(Arc::new(StubModel::new()), config);

    let first = pipeline.analyze(root).await.unwrap();
    let second = pipeline.analyze(root).await.unwrap();

    assert_eq!(first.contents.len(), 13);
    assert_eq!(first.contents, second.contents);
    assert_eq!(first.summaries, second.summaries);
}

#[tokio::test]
async fn test_invalid_root_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing");

    let result = pipeline(Arc::new(StubModel::new()), DocsmithConfig::default())
        .analyze(&missing)
        .await;

    assert!(matches!(
        result,
        Err(DocsmithError::InvalidRepositoryPath { .. })
    ));
}

#[tokio::test]
async fn test_empty_repository_still_produces_documents() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("empty-repo");
    std::fs::create_dir_all(&root).unwrap();

    let model = Arc::new(StubModel::new());
    let pipeline = pipeline(model.clone(), DocsmithConfig::default());
    let analysis = pipeline.analyze(&root).await.unwrap();
    assert!(analysis.is_empty());

    let readme = pipeline.generate_readme(&analysis).await.unwrap();
    // The stub echoes the last prompt line, which is the summaries JSON
    assert!(readme.content.contains("response("));
    assert!(readme.content.contains("): {}"));
    assert_eq!(model.calls(), 1);

    let docs = pipeline.generate_code_documentation(&analysis).await.unwrap();
    assert_eq!(docs.sections, 0);
    assert_eq!(docs.content, "");
    assert_eq!(
        std::fs::read_to_string(root.join("CODE_DOCUMENTATION.md")).unwrap(),
        ""
    );
}

#[tokio::test]
async fn test_readme_written_verbatim_and_pure() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("demo");
    write(&root, "a.py", "x");
    write(&root, "lib/b.js", "y");

    let pipeline = pipeline(Arc::new(StubModel::new()), DocsmithConfig::default());
    let analysis = pipeline.analyze(&root).await.unwrap();

    let first = pipeline.generate_readme(&analysis).await.unwrap();
    let second = pipeline.generate_readme(&analysis).await.unwrap();

    assert_eq!(first.path, root.join("README.md"));
    assert_eq!(first.content, second.content);
    // Raw response, whitespace included
    assert!(first.content.starts_with("\n  response("));
    assert_eq!(std::fs::read_to_string(&first.path).unwrap(), first.content);
}

#[tokio::test]
async fn test_readme_prompt_names_repository() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("named-repo");
    write(&root, "a.py", "x");

    let mut config = DocsmithConfig::default();
    config.prompts.readme = Some("{repo_name}".to_string());
    let pipeline = pipeline(Arc::new(StubModel::new()), config);
    let analysis = pipeline.analyze(&root).await.unwrap();

    let readme = pipeline.generate_readme(&analysis).await.unwrap();
    assert!(readme.content.contains("named-repo"));
}

#[tokio::test]
async fn test_code_documentation_sections_follow_path_order() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "z.py", "z = 1");
    write(root, "a.py", "a = 1");
    write(root, "m/b.js", "let b = 1");
    write(root, "notes.md", "# not documented");

    let mut config = DocsmithConfig::default();
    config.analysis.max_concurrency = Some(4);
    let pipeline = pipeline(Arc::new(StubModel::new()), config);
    let analysis = pipeline.analyze(root).await.unwrap();

    let document = pipeline.generate_code_documentation(&analysis).await.unwrap();
    assert_eq!(document.sections, 3);

    let headings: Vec<&str> = document
        .content
        .lines()
        .filter(|line| line.starts_with("# "))
        .collect();
    assert_eq!(headings, vec!["# a.py", "# m/b.js", "# z.py"]);
    assert!(document.content.contains("# a.py\n\nresponse("));
    assert!(document.content.ends_with("\n\n---\n\n"));
    assert_eq!(
        std::fs::read_to_string(root.join("CODE_DOCUMENTATION.md")).unwrap(),
        document.content
    );
}

#[tokio::test]
async fn test_code_documentation_skips_failing_file() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "a.py", "a = 1");
    write(root, "b.py", "DOC_FAIL");

    // Only the documentation prompt contains "File: b.py"
    let model = Arc::new(StubModel::failing_on("File: b.py"));
    let pipeline = pipeline(model, DocsmithConfig::default());
    let analysis = pipeline.analyze(root).await.unwrap();
    assert_eq!(analysis.len(), 2);

    let document = pipeline.generate_code_documentation(&analysis).await.unwrap();
    assert_eq!(document.sections, 1);
    assert_eq!(document.skipped.len(), 1);
    assert_eq!(document.skipped[0].relative_path, "b.py");
    assert!(!document.content.contains("# b.py"));
    assert!(document.content.contains("> - `b.py`"));
}

#[tokio::test]
async fn test_code_documentation_abort_policy_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "a.py", "a = 1");
    write(root, "b.py", "b = 2");

    let mut config = DocsmithConfig::default();
    config.output.doc_failure_policy = DocFailurePolicy::Abort;
    let pipeline = pipeline(Arc::new(StubModel::failing_on("File: b.py")), config);
    let analysis = pipeline.analyze(root).await.unwrap();

    match pipeline.generate_code_documentation(&analysis).await {
        Err(error @ DocsmithError::ModelInvocation { .. }) => {
            assert_eq!(error.stage(), Some(Stage::CodeDocumentation));
            assert!(error.to_string().contains("b.py"));
        }
        other => panic!("Expected ModelInvocation error, got {:?}", other),
    }
    assert!(!root.join("CODE_DOCUMENTATION.md").exists());
}

#[tokio::test]
async fn test_readme_failure_identifies_stage() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "a.py", "x");

    let pipeline = pipeline(
        Arc::new(StubModel::failing_on("Generate a README.md")),
        DocsmithConfig::default(),
    );
    let analysis = pipeline.analyze(root).await.unwrap();

    let error = pipeline.generate_readme(&analysis).await.unwrap_err();
    assert_eq!(error.stage(), Some(Stage::Readme));
    assert!(!root.join("README.md").exists());
}

#[tokio::test]
async fn test_custom_output_names() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "a.py", "x");

    let mut config = DocsmithConfig::default();
    config.output.readme_file = "OVERVIEW.md".to_string();
    config.output.documentation_file = "API.md".to_string();
    let pipeline = pipeline(Arc::new(StubModel::new()), config);
    let analysis = pipeline.analyze(root).await.unwrap();

    pipeline.generate_readme(&analysis).await.unwrap();
    pipeline.generate_code_documentation(&analysis).await.unwrap();

    assert!(root.join("OVERVIEW.md").exists());
    assert!(root.join("API.md").exists());
    assert!(!root.join("README.md").exists());
}

#[test]
fn test_invalid_prompt_override_rejected() {
    let mut config = DocsmithConfig::default();
    config.prompts.summary = Some("{file_path}".to_string());

    assert!(matches!(
        DocumentationPipeline::new(Arc::new(StubModel::new()), config),
        Err(DocsmithError::PromptRender { .. })
    ));
}

#[tokio::test]
async fn test_session_requires_analysis() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a.py", "x");

    let pipeline = pipeline(Arc::new(StubModel::new()), DocsmithConfig::default());
    let mut session = AnalysisSession::new(pipeline, temp_dir.path());

    assert!(session.result().is_none());
    match session.generate_readme().await {
        Err(DocsmithError::NotAnalyzed { stage, .. }) => assert_eq!(stage, Stage::Readme),
        other => panic!("Expected NotAnalyzed, got {:?}", other),
    }
    assert!(matches!(
        session.generate_code_documentation().await,
        Err(DocsmithError::NotAnalyzed {
            stage: Stage::CodeDocumentation,
            ..
        })
    ));

    assert_eq!(session.analyze().await.unwrap().len(), 1);
    session.generate_readme().await.unwrap();
    session.generate_code_documentation().await.unwrap();

    session.reset();
    assert!(session.result().is_none());
    assert!(session.generate_readme().await.is_err());
}

#[tokio::test]
async fn test_session_keeps_result_after_failed_generation() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a.py", "x");

    let pipeline = pipeline(
        Arc::new(StubModel::failing_on("Generate a README.md")),
        DocsmithConfig::default(),
    );
    let mut session = AnalysisSession::new(pipeline, temp_dir.path());
    session.analyze().await.unwrap();

    assert!(session.generate_readme().await.is_err());
    assert!(session.result().is_some());
    session.generate_code_documentation().await.unwrap();
}
