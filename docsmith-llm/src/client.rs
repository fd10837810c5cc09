//! LLM client integration using siumai
//!
//! Wraps a siumai chat client behind the `LanguageModel` trait so the
//! documentation pipeline only ever sees `complete(prompt) -> text`.

use docsmith_core::{
    async_trait, llm_error, with_timeout, DocsmithError, DocsmithResult, ErrorContext,
    LanguageModel, LlmConfig,
};
use siumai::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Language model backed by a siumai provider client
pub struct SiumaiModel {
    client: Box<dyn LlmClient>,
    config: LlmConfig,
}

impl SiumaiModel {
    /// Create a new LLM client
    pub async fn new(config: LlmConfig) -> DocsmithResult<Self> {
        let client = Self::build_client(&config).await?;

        info!(
            provider = %config.provider,
            model = %config.model,
            "Created LLM client"
        );

        Ok(Self { client, config })
    }

    /// Build the appropriate siumai client based on configuration
    async fn build_client(config: &LlmConfig) -> DocsmithResult<Box<dyn LlmClient>> {
        match config.provider.as_str() {
            "ollama" => {
                let base_url = config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".to_string());

                let mut builder = LlmBuilder::new()
                    .ollama()
                    .model(&config.model)
                    .base_url(&base_url)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder
                    .build()
                    .await
                    .map_err(|e| build_error(config, "Ollama", e))?;

                Ok(Box::new(client))
            }
            "openai" => {
                let api_key = api_key(config, "OPENAI_API_KEY")?;

                let mut builder = LlmBuilder::new()
                    .openai()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                if let Some(base_url) = &config.base_url {
                    builder = builder.base_url(base_url);
                }

                let client = builder
                    .build()
                    .await
                    .map_err(|e| build_error(config, "OpenAI", e))?;

                Ok(Box::new(client))
            }
            "anthropic" => {
                let api_key = api_key(config, "ANTHROPIC_API_KEY")?;

                let mut builder = LlmBuilder::new()
                    .anthropic()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder
                    .build()
                    .await
                    .map_err(|e| build_error(config, "Anthropic", e))?;

                Ok(Box::new(client))
            }
            "groq" => {
                let api_key = api_key(config, "GROQ_API_KEY")?;

                let mut builder = LlmBuilder::new()
                    .groq()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature);

                if let Some(max_tokens) = config.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }

                let client = builder
                    .build()
                    .await
                    .map_err(|e| build_error(config, "Groq", e))?;

                Ok(Box::new(client))
            }
            provider => Err(unsupported_provider(provider)),
        }
    }

    /// Test the connection to the LLM provider
    pub async fn test_connection(&self) -> DocsmithResult<()> {
        debug!(provider = %self.config.provider, "Testing connection to LLM provider");

        match self
            .complete("Hello! Please respond with 'OK' to confirm the connection.")
            .await
        {
            Ok(response) => {
                info!(
                    "Connection test successful. Response: {}",
                    response.chars().take(50).collect::<String>()
                );
                Ok(())
            }
            Err(e) => {
                warn!("Connection test failed: {}", e);
                Err(e)
            }
        }
    }

    /// Get the current configuration
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Get model information
    pub fn model_info(&self) -> ModelInfo {
        ModelInfo::from(&self.config)
    }

    fn llm_error(&self, message: String) -> DocsmithError {
        llm_error!(message, self.config, "complete")
    }
}

#[async_trait]
impl LanguageModel for SiumaiModel {
    async fn complete(&self, prompt: &str) -> DocsmithResult<String> {
        let start_time = Instant::now();
        let messages = vec![user!(prompt)];

        debug!(prompt_chars = prompt.len(), "Requesting completion");

        let response = with_timeout(
            self.client.chat(messages),
            self.config.timeout_secs.saturating_mul(1000),
            "llm_completion",
        )
        .await?
        .map_err(|e| self.llm_error(format!("LLM generation failed: {}", e)))?;

        match response.content_text() {
            Some(content) => {
                debug!(
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    response_chars = content.len(),
                    "Generated response"
                );
                Ok(content.to_string())
            }
            None => Err(self.llm_error("No text content in LLM response".to_string())),
        }
    }

    fn describe(&self) -> String {
        self.model_info().summary()
    }
}

/// Information about the current model
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl ModelInfo {
    pub fn summary(&self) -> String {
        format!(
            "{}/{} (temp: {:.1})",
            self.provider, self.model, self.temperature
        )
    }
}

impl From<&LlmConfig> for ModelInfo {
    fn from(config: &LlmConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Build the configured model as a shareable trait object
pub async fn create_language_model(config: &LlmConfig) -> DocsmithResult<Arc<dyn LanguageModel>> {
    let model = SiumaiModel::new(config.clone()).await?;
    Ok(Arc::new(model))
}

fn api_key(config: &LlmConfig, env_var: &str) -> DocsmithResult<String> {
    config
        .api_key
        .clone()
        .or_else(|| std::env::var(env_var).ok())
        .ok_or_else(|| DocsmithError::Config {
            message: format!("{} API key not found", config.provider),
            source: None,
            context: ErrorContext::new("llm_client")
                .with_operation("build_client")
                .with_suggestion(&format!("Set llm.api_key or the {} variable", env_var)),
        })
}

fn build_error(config: &LlmConfig, provider: &str, error: impl std::fmt::Display) -> DocsmithError {
    llm_error!(
        format!("Failed to build {} client: {}", provider, error),
        config,
        "build_client"
    )
}

fn unsupported_provider(provider: &str) -> DocsmithError {
    DocsmithError::Config {
        message: format!("Unsupported LLM provider: {}", provider),
        source: None,
        context: ErrorContext::new("llm_client")
            .with_operation("build_client")
            .with_suggestion("Use one of: ollama, openai, anthropic, groq"),
    }
}
