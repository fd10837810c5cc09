//! Docsmith CLI - Command-line interface for Docsmith
//!
//! Analyzes a local or remote repository and writes a README and per-file
//! code documentation into it.

use anyhow::Context;
use clap::{Parser, Subcommand};
use docsmith_core::{
    config_error, init_logging, DocsmithConfig, DocsmithError, DocsmithResult, GeneratedDocument,
    LoggingConfig,
};
use docsmith_docs::{AnalysisSession, DocumentationPipeline, PromptSet};
use docsmith_llm::{create_language_model, SiumaiModel};
use docsmith_repo::RepositoryProcessor;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "docsmith")]
#[command(about = "Generate a README and code documentation for a repository")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the configured LLM provider
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Override the configured model
    #[arg(long, global = true)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize every eligible file and print the summaries as JSON
    Analyze {
        /// Repository URL or local path
        repo: String,

        /// Access token for private repositories
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Analyze the repository and generate its README
    Readme {
        /// Repository URL or local path
        repo: String,

        /// Access token for private repositories
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Analyze the repository and generate per-file code documentation
    Docs {
        /// Repository URL or local path
        repo: String,

        /// Access token for private repositories
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Analyze once, then generate both the README and the code documentation
    Run {
        /// Repository URL or local path
        repo: String,

        /// Access token for private repositories
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,

        /// Send a test prompt to the configured model
        #[arg(long)]
        check: bool,
    },
}

/// Which documents a run produces after analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outputs {
    Summaries,
    Readme,
    CodeDocumentation,
    All,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for command output
    let logging_config = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    };
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!("Starting Docsmith CLI v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<DocsmithError>().and_then(|d| d.stage()) {
            Some(stage) => eprintln!("Error during {}: {:#}", stage, e),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    apply_overrides(&mut config, cli.provider, cli.model);

    match cli.command {
        Commands::Analyze { repo, token } => {
            handle_documents(&repo, token, Outputs::Summaries, config).await?;
        }
        Commands::Readme { repo, token } => {
            handle_documents(&repo, token, Outputs::Readme, config).await?;
        }
        Commands::Docs { repo, token } => {
            handle_documents(&repo, token, Outputs::CodeDocumentation, config).await?;
        }
        Commands::Run { repo, token } => {
            handle_documents(&repo, token, Outputs::All, config).await?;
        }
        Commands::Config {
            show,
            init,
            validate,
            check,
        } => {
            let actions = ConfigActions {
                show,
                init,
                validate,
                check,
            };
            handle_config(actions, cli.config.as_deref(), &config).await?;
        }
    }

    Ok(())
}

fn load_config(config_path: Option<&Path>) -> DocsmithResult<DocsmithConfig> {
    if let Some(path) = config_path {
        info!("Loading configuration from {:?}", path);
        return DocsmithConfig::from_file(path);
    }

    for path in default_config_paths() {
        if path.exists() {
            info!("Loading configuration from {:?}", path);
            return DocsmithConfig::from_file(&path);
        }
    }

    info!("No configuration file found, using defaults");
    Ok(DocsmithConfig::default())
}

/// Candidate configuration files, in lookup order
fn default_config_paths() -> Vec<PathBuf> {
    [
        dirs::config_dir().map(|d| d.join("docsmith").join("config.toml")),
        dirs::home_dir().map(|d| d.join(".docsmith").join("config.toml")),
        Some(PathBuf::from("docsmith.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn apply_overrides(config: &mut DocsmithConfig, provider: Option<String>, model: Option<String>) {
    if let Some(provider) = provider {
        config.llm.provider = provider;
    }
    if let Some(model) = model {
        config.llm.model = model;
    }
}

async fn handle_documents(
    repo: &str,
    token: Option<String>,
    outputs: Outputs,
    config: DocsmithConfig,
) -> anyhow::Result<()> {
    config.validate()?;

    let processor = RepositoryProcessor::new(config.storage.expanded_data_dir())
        .with_clone_depth(config.storage.clone_depth)
        .with_access_token(token);
    let repository = processor.acquire(repo).await?;
    info!(path = %repository.path.display(), "Repository ready");

    let model = create_language_model(&config.llm).await?;
    let pipeline = DocumentationPipeline::new(model, config)?;
    let mut session = AnalysisSession::new(pipeline, &repository.path);

    let analysis = session.analyze().await?;
    for skipped in &analysis.skipped {
        warn!(file = %skipped.relative_path, reason = ?skipped.reason, "Skipped file");
    }
    eprintln!(
        "Analyzed {} files ({} skipped)",
        analysis.len(),
        analysis.skipped.len()
    );

    match outputs {
        Outputs::Summaries => {
            let summaries = serde_json::to_string_pretty(&analysis.summaries)
                .context("failed to serialize summaries")?;
            println!("{}", summaries);
        }
        Outputs::Readme => report(&session.generate_readme().await?),
        Outputs::CodeDocumentation => report(&session.generate_code_documentation().await?),
        Outputs::All => {
            report(&session.generate_readme().await?);
            report(&session.generate_code_documentation().await?);
        }
    }

    Ok(())
}

fn report(document: &GeneratedDocument) {
    println!("Wrote {}", document.path.display());
    if !document.skipped.is_empty() {
        println!("  {} file(s) left out:", document.skipped.len());
        for skipped in &document.skipped {
            println!("    {}: {}", skipped.relative_path, skipped.error);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ConfigActions {
    show: bool,
    init: bool,
    validate: bool,
    check: bool,
}

async fn handle_config(
    actions: ConfigActions,
    explicit_path: Option<&Path>,
    config: &DocsmithConfig,
) -> anyhow::Result<()> {
    if actions.init {
        let config_path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => user_config_path()?,
        };
        if config_path.exists() {
            anyhow::bail!(
                "configuration already exists at {}; remove it first to re-initialize",
                config_path.display()
            );
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        DocsmithConfig::default().save_to_file(&config_path)?;
        println!("Configuration initialized at: {}", config_path.display());
        println!("Edit the file to choose a provider and model.");
    }

    if actions.show {
        let rendered = toml::to_string_pretty(config).context("failed to render configuration")?;
        println!("{}", rendered);
    }

    if actions.validate {
        config.validate()?;
        PromptSet::from_config(&config.prompts)?;
        println!("Configuration is valid");
    }

    if actions.check {
        let model = SiumaiModel::new(config.llm.clone()).await?;
        model.test_connection().await?;
        println!("Model {} is reachable", model.model_info().summary());
    }

    Ok(())
}

/// `$CONFIG_DIR/docsmith/config.toml`
fn user_config_path() -> DocsmithResult<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
        .map(|d| d.join("docsmith").join("config.toml"))
        .ok_or_else(|| {
            config_error!(
                "Could not determine a configuration directory",
                "cli",
                "Pass --config <path> explicitly"
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_config_file_is_loaded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("docsmith.toml");
        std::fs::write(&path, "[llm]\nprovider = \"openai\"\nmodel = \"gpt-4o-mini\"\n").unwrap();

        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.output.readme_file, "README.md");
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_config(Some(temp_dir.path().join("absent.toml").as_path())).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = DocsmithConfig::default();
        apply_overrides(&mut config, Some("anthropic".to_string()), None);

        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.model, DocsmithConfig::default().llm.model);
    }

    #[test]
    fn test_default_config_paths_end_with_working_directory() {
        let paths = default_config_paths();
        assert_eq!(paths.last(), Some(&PathBuf::from("docsmith.toml")));
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "docsmith",
            "run",
            "./repo",
            "--model",
            "qwen2.5",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.model.as_deref(), Some("qwen2.5"));
        assert!(matches!(cli.command, Commands::Run { ref repo, .. } if repo == "./repo"));
    }

    #[tokio::test]
    async fn test_config_init_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let init = ConfigActions {
            init: true,
            ..ConfigActions::default()
        };

        handle_config(init, Some(path.as_path()), &DocsmithConfig::default())
            .await
            .unwrap();
        assert!(DocsmithConfig::from_file(&path).unwrap().validate().is_ok());

        // Refuses to clobber an existing file
        assert!(handle_config(init, Some(path.as_path()), &DocsmithConfig::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_config_check_rejects_unknown_provider() {
        let mut config = DocsmithConfig::default();
        config.llm.provider = "carrier-pigeon".to_string();
        let check = ConfigActions {
            check: true,
            ..ConfigActions::default()
        };

        let error = handle_config(check, None, &config).await.unwrap_err();
        assert!(error.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn test_cli_parses_config_check() {
        let cli = Cli::try_parse_from(["docsmith", "config", "--check"]).unwrap();
        assert!(matches!(cli.command, Commands::Config { check: true, .. }));
    }
}
