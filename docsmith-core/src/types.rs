//! Core data type definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A file yielded by the repository walker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredFile {
    pub absolute_path: PathBuf,
    /// Path relative to the repository root, always `/`-separated
    pub relative_path: String,
}

/// One analyzed file. `content` is the text read at discovery time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub relative_path: String,
    pub content: String,
    pub summary: Option<String>,
}

impl FileRecord {
    pub fn summarized(relative_path: String, content: String, summary: String) -> Self {
        Self {
            relative_path,
            content,
            summary: Some(summary),
        }
    }
}

/// Step at which a file dropped out of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Read,
    Summarize,
    Document,
}

/// Diagnostic entry for a file excluded from a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub relative_path: String,
    pub reason: SkipReason,
    pub error: String,
}

/// Result of one summarization unit of work
#[derive(Debug, Clone)]
pub enum SummaryOutcome {
    Summarized(FileRecord),
    Failed(SkippedFile),
}

/// Path-keyed results of one analysis run.
///
/// Both maps are ordered by relative path, which keeps iteration stable for
/// the generation passes. Every key of `summaries` is also a key of `contents`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub root: PathBuf,
    pub contents: BTreeMap<String, String>,
    pub summaries: BTreeMap<String, String>,
    pub skipped: Vec<SkippedFile>,
}

impl AnalysisResult {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Default::default()
        }
    }

    /// Merge one completed unit of work
    pub fn record(&mut self, outcome: SummaryOutcome) {
        match outcome {
            SummaryOutcome::Summarized(FileRecord {
                relative_path,
                content,
                summary: Some(summary),
            }) => {
                self.contents.insert(relative_path.clone(), content);
                self.summaries.insert(relative_path, summary);
            }
            SummaryOutcome::Summarized(record) => self.skipped.push(SkippedFile {
                relative_path: record.relative_path,
                reason: SkipReason::Summarize,
                error: "no summary produced".to_string(),
            }),
            SummaryOutcome::Failed(skipped) => self.skipped.push(skipped),
        }
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn is_consistent(&self) -> bool {
        self.summaries.keys().all(|k| self.contents.contains_key(k))
    }

    pub fn was_skipped(&self, relative_path: &str) -> bool {
        self.skipped.iter().any(|s| s.relative_path == relative_path)
    }
}

/// A document produced by a generation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub path: PathBuf,
    pub content: String,
    pub sections: usize,
    pub skipped: Vec<SkippedFile>,
}

/// What the code documentation pass does when one file's request fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocFailurePolicy {
    /// Omit the file, log a warning and note it at the end of the document
    #[default]
    Skip,
    /// Fail the whole pass without writing anything
    Abort,
}

/// Configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocsmithConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub prompts: PromptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Upper bound for a single completion request
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Directory names pruned from traversal at any depth
    pub excluded_dirs: Vec<String>,
    /// File name suffixes eligible for analysis
    pub included_extensions: Vec<String>,
    /// File name suffixes eligible for code documentation
    pub documentation_extensions: Vec<String>,
    /// Concurrent model requests; defaults to the available parallelism
    pub max_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub readme_file: String,
    pub documentation_file: String,
    pub doc_failure_policy: DocFailurePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub clone_depth: Option<u32>,
}

/// Optional prompt template overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    pub summary: Option<String>,
    pub readme: Option<String>,
    pub code_documentation: Option<String>,
}
