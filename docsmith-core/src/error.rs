//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

pub type DocsmithResult<T> = Result<T, DocsmithError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Pipeline stage an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Acquisition,
    Analysis,
    Readme,
    CodeDocumentation,
    Configuration,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Acquisition => "acquisition",
            Stage::Analysis => "analysis",
            Stage::Readme => "readme",
            Stage::CodeDocumentation => "code_documentation",
            Stage::Configuration => "configuration",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for the docsmith system
#[derive(Error, Debug)]
pub enum DocsmithError {
    #[error("Invalid repository path '{path}': {reason}")]
    InvalidRepositoryPath {
        path: String,
        reason: String,
        context: ErrorContext,
    },

    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
        context: ErrorContext,
    },

    #[error("Model invocation failed during {stage}: {message}")]
    ModelInvocation {
        stage: Stage,
        file: Option<String>,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("LLM error: {message}")]
    Llm {
        message: String,
        provider: Option<String>,
        model: Option<String>,
        context: ErrorContext,
    },

    #[error("Failed to render prompt '{template}' during {stage}: {message}")]
    PromptRender {
        stage: Stage,
        template: String,
        message: String,
        context: ErrorContext,
    },

    #[error("Failed to write output '{path}' during {stage}: {source}")]
    OutputWrite {
        stage: Stage,
        path: String,
        #[source]
        source: std::io::Error,
        context: ErrorContext,
    },

    #[error("No analysis results available for {stage}; analyze the repository first")]
    NotAnalyzed { stage: Stage, context: ErrorContext },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Git error: {message}")]
    Git {
        message: String,
        context: ErrorContext,
    },

    #[error("Operation timeout: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl DocsmithError {
    /// Wrap a failed model call with the stage and file it was made for
    pub fn model_invocation(stage: Stage, file: Option<&str>, cause: DocsmithError) -> Self {
        let message = match file {
            Some(file) => format!("{}: {}", file, cause),
            None => cause.to_string(),
        };
        let mut context = ErrorContext::new("language_model").with_operation(stage.as_str());
        if let Some(file) = file {
            context = context.with_metadata("file", file);
        }

        DocsmithError::ModelInvocation {
            stage,
            file: file.map(str::to_string),
            message,
            source: Some(Box::new(cause)),
            context: context.with_suggestion("Check that the model provider is reachable"),
        }
    }

    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            DocsmithError::InvalidRepositoryPath { context, .. } => Some(context),
            DocsmithError::FileRead { context, .. } => Some(context),
            DocsmithError::ModelInvocation { context, .. } => Some(context),
            DocsmithError::Llm { context, .. } => Some(context),
            DocsmithError::PromptRender { context, .. } => Some(context),
            DocsmithError::OutputWrite { context, .. } => Some(context),
            DocsmithError::NotAnalyzed { context, .. } => Some(context),
            DocsmithError::Config { context, .. } => Some(context),
            DocsmithError::Git { context, .. } => Some(context),
            DocsmithError::Timeout { context, .. } => Some(context),
            DocsmithError::Internal { context, .. } => Some(context),
            DocsmithError::Io(_) => None,
        }
    }

    /// Pipeline stage the error is attributed to
    pub fn stage(&self) -> Option<Stage> {
        match self {
            DocsmithError::InvalidRepositoryPath { .. } | DocsmithError::FileRead { .. } => {
                Some(Stage::Analysis)
            }
            DocsmithError::ModelInvocation { stage, .. }
            | DocsmithError::PromptRender { stage, .. }
            | DocsmithError::OutputWrite { stage, .. }
            | DocsmithError::NotAnalyzed { stage, .. } => Some(*stage),
            DocsmithError::Config { .. } => Some(Stage::Configuration),
            DocsmithError::Git { .. } => Some(Stage::Acquisition),
            _ => None,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let error_id = self.context().map(|c| c.error_id.as_str());
        let stage = self.stage().map(|s| s.as_str());

        match self {
            DocsmithError::Internal { .. } => {
                error!(error_id = ?error_id, error = %self, "Internal error occurred");
            }
            DocsmithError::Config { .. } | DocsmithError::InvalidRepositoryPath { .. } => {
                error!(
                    error_id = ?error_id,
                    error = %self,
                    "Configuration or validation error"
                );
            }
            DocsmithError::FileRead { .. } | DocsmithError::Timeout { .. } => {
                warn!(error_id = ?error_id, stage = ?stage, error = %self, "Recoverable error");
            }
            _ => {
                error!(error_id = ?error_id, stage = ?stage, error = %self, "Error occurred");
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! invalid_repository_error {
    ($path:expr, $reason:expr, $component:expr) => {
        $crate::DocsmithError::InvalidRepositoryPath {
            path: $path.to_string(),
            reason: $reason.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Pass an existing directory or a repository URL"),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::DocsmithError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'docsmith config --init' to create default config"),
        }
    };
    ($msg:expr, $component:expr, $suggestion:expr) => {
        $crate::DocsmithError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component).with_suggestion($suggestion),
        }
    };
}

#[macro_export]
macro_rules! llm_error {
    ($msg:expr, $llm_config:expr, $operation:expr) => {
        $crate::DocsmithError::Llm {
            message: $msg.to_string(),
            provider: Some($llm_config.provider.clone()),
            model: Some($llm_config.model.clone()),
            context: $crate::ErrorContext::new("llm_client").with_operation($operation),
        }
    };
}
