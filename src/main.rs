// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use crate::app_config::{Config, LlmProvider};
use crate::app_controller::Controller;
use crate::rule_profile::RuleProfile;
use crate::storage::ArtifactStore;

mod app_config;
mod app_controller;
mod book;
mod errors;
mod job;
mod language_utils;
mod normalize;
mod providers;
mod refine;
mod rule_profile;
mod segment;
mod storage;
mod translate;

/// CLI Wrapper for LlmProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Ollama,
    Anthropic,
}

impl From<CliProvider> for LlmProvider {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Ollama => LlmProvider::Ollama,
            CliProvider::Anthropic => LlmProvider::Anthropic,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Structure an OCR markdown file into a book (default command)
    Structure(StructureArgs),

    /// List book artifacts in the store
    List {
        /// Artifact store directory
        #[arg(long, default_value = "artifacts")]
        store_dir: PathBuf,
    },
}

#[derive(Parser, Debug)]
struct StructureArgs {
    /// Input OCR markdown file
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Book slug (stable external id); defaults to the input file stem
    #[arg(long)]
    slug: Option<String>,

    /// Short uppercase code used in reference ids; defaults from the slug
    #[arg(long)]
    code: Option<String>,

    /// Rule profile JSON file
    #[arg(short = 'r', long)]
    profile: Option<PathBuf>,

    /// Target language codes for translation (e.g., 'fr', 'de')
    #[arg(short, long)]
    target_language: Vec<String>,

    /// LLM provider for refinement and translation
    #[arg(short, long, value_enum)]
    provider: Option<CliProvider>,

    /// Model name to use
    #[arg(short, long)]
    model: Option<String>,

    /// Disable the LLM passes entirely
    #[arg(long)]
    no_refine: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Artifact store directory
    #[arg(long, default_value = "artifacts")]
    store_dir: PathBuf,

    /// Export output directory
    #[arg(short, long, default_value = "export")]
    output_dir: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Scriptorium - OCR scans to structured, translated books
///
/// Turns raw OCR markdown of a scanned document into a hierarchical,
/// speaker-attributed book and optionally machine-translates it using
/// AI providers (Ollama, Anthropic).
#[derive(Parser, Debug)]
#[command(name = "scriptorium")]
#[command(version = "0.3.0")]
#[command(about = "OCR-to-structured-book pipeline")]
#[command(long_about = "Scriptorium segments raw OCR markdown into chapters, sections and
paragraphs, attributes speakers, refines low-confidence attributions with an
LLM, and fills per-language translation slots.

EXAMPLES:
    scriptorium scan.md                          # Structure using default config
    scriptorium scan.md --slug genesis --code GEN
    scriptorium -r psalter.json scan.md          # Use a custom rule profile
    scriptorium -t fr -t de scan.md              # Translate into French and German
    scriptorium --no-refine scan.md              # Rules only, no LLM calls
    scriptorium list --store-dir artifacts       # List stored books

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama2)
    anthropic - Anthropic Claude API (requires API key)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    structure: StructureArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default.
    // The level is updated after the config is loaded.
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::List { store_dir }) => {
            let store = ArtifactStore::new(&store_dir);
            for slug in store.list()? {
                println!("{}", slug);
            }
            Ok(())
        }
        Some(Commands::Structure(args)) => run_structure(args).await,
        None => run_structure(cli.structure).await,
    }
}

async fn run_structure(options: StructureArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = load_or_create_config(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.refinement.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        let provider_str = config.refinement.provider.to_lowercase_string();
        if let Some(provider_config) = config
            .refinement
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            provider_config.model = model.clone();
        }
    }
    if !options.target_language.is_empty() {
        config.target_languages = options.target_language.clone();
    }
    if options.no_refine {
        config.refinement.enabled = false;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    let input_path = options
        .input_path
        .clone()
        .ok_or_else(|| anyhow!("INPUT_PATH is required"))?;

    let slug = match &options.slug {
        Some(slug) => slug.clone(),
        None => input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Cannot derive a slug from {:?}", input_path))?,
    };
    let code = options
        .code
        .clone()
        .unwrap_or_else(|| default_code_from_slug(&slug));

    let profile = RuleProfile::load_or_default(options.profile.as_deref());

    let controller = Controller::with_config(config)?;
    let job = controller
        .run(
            &input_path,
            &slug,
            &code,
            &profile,
            &options.store_dir,
            &options.output_dir,
        )
        .await?;

    println!("Job {} finished: {}", job.id, job.status);
    Ok(())
}

fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        Ok(config)
    }
}

/// Derive a short uppercase code from a slug: first three alphanumeric
/// characters, uppercased.
fn default_code_from_slug(slug: &str) -> String {
    let code: String = slug
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    if code.is_empty() { "BK".to_string() } else { code }
}
