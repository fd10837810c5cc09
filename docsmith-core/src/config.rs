//! Configuration management

use crate::error::{DocsmithError, DocsmithResult, ErrorContext};
use crate::types::{
    AnalysisConfig, DocFailurePolicy, DocsmithConfig, LlmConfig, OutputConfig, StorageConfig,
};

use std::path::{Path, PathBuf};

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            base_url: None,
            api_key: None,
            temperature: 0.7,
            max_tokens: None,
            timeout_secs: 300,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: vec![
                "env".to_string(),
                "venv".to_string(),
                ".git".to_string(),
                "__pycache__".to_string(),
                "node_modules".to_string(),
            ],
            included_extensions: vec![
                ".py".to_string(),
                ".js".to_string(),
                ".html".to_string(),
                ".css".to_string(),
                ".md".to_string(),
                ".txt".to_string(),
                ".yml".to_string(),
                ".yaml".to_string(),
            ],
            documentation_extensions: vec![".py".to_string(), ".js".to_string()],
            max_concurrency: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            readme_file: "README.md".to_string(),
            documentation_file: "CODE_DOCUMENTATION.md".to_string(),
            doc_failure_policy: DocFailurePolicy::Skip,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.docsmith/data".to_string(),
            clone_depth: Some(1), // Shallow clone by default
        }
    }
}

impl AnalysisConfig {
    /// Number of model requests allowed in flight at once
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency
            .unwrap_or_else(crate::async_utils::default_concurrency)
            .max(1)
    }
}

impl StorageConfig {
    /// Data directory with a leading `~` resolved against the home directory
    pub fn expanded_data_dir(&self) -> PathBuf {
        match self.data_dir.strip_prefix('~') {
            Some(rest) => match dirs::home_dir() {
                Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
                None => PathBuf::from(&self.data_dir),
            },
            None => PathBuf::from(&self.data_dir),
        }
    }
}

impl DocsmithConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> DocsmithResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DocsmithError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> DocsmithResult<Self> {
        toml::from_str(content).map_err(|e| DocsmithError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> DocsmithResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| DocsmithError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| DocsmithError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> DocsmithResult<()> {
        if self.llm.model.trim().is_empty() {
            return Err(invalid("llm.model must not be empty", "Set llm.model"));
        }

        if self.llm.timeout_secs == 0 {
            return Err(invalid(
                "llm.timeout_secs must be greater than 0",
                "Set llm.timeout_secs to a positive value",
            ));
        }

        if self.analysis.max_concurrency == Some(0) {
            return Err(invalid(
                "analysis.max_concurrency must be greater than 0",
                "Remove analysis.max_concurrency to use one worker per CPU",
            ));
        }

        if self.analysis.included_extensions.is_empty() {
            return Err(invalid(
                "analysis.included_extensions must not be empty",
                "List at least one file extension, e.g. \".py\"",
            ));
        }

        if let Some(ext) = self
            .analysis
            .documentation_extensions
            .iter()
            .find(|ext| !self.analysis.included_extensions.contains(ext))
        {
            return Err(invalid(
                &format!(
                    "Documentation extension '{}' is not an analysis extension",
                    ext
                ),
                "Add it to analysis.included_extensions or remove it",
            ));
        }

        if self.output.readme_file.trim().is_empty()
            || self.output.documentation_file.trim().is_empty()
        {
            return Err(invalid(
                "Output file names must not be empty",
                "Set output.readme_file and output.documentation_file",
            ));
        }

        Ok(())
    }
}

fn invalid(message: &str, suggestion: &str) -> DocsmithError {
    crate::config_error!(message, "config", suggestion)
}
