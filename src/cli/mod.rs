//! CLI module for Easel
//!
//! Command-line interface definitions and handlers for the image generation
//! gateway.
//!
//! # Commands
//!
//! - `serve` - Start the HTTP gateway
//! - `generate` - Run one generation through the fallback chain
//! - `providers` - Inspect configured providers
//! - `health` - Probe providers once and report
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start server with default config
//! easel serve
//!
//! # One-shot generation, printing URLs
//! easel generate "a lighthouse at dusk" --size 1024x768
//!
//! # Provider table
//! easel providers list
//! ```

pub mod completions;
pub mod config;
pub mod generate;
pub mod health;
pub mod output;
pub mod providers;
pub mod serve;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::{ConfigError, EaselConfig};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "easel.toml";

/// Easel - Image generation gateway
#[derive(Parser, Debug)]
#[command(
    name = "easel",
    version,
    about = "Image generation gateway with provider retry and fallback"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway
    Serve(ServeArgs),
    /// Generate images once and print the result
    Generate(GenerateArgs),
    /// Inspect providers
    #[command(subcommand)]
    Providers(ProvidersCommands),
    /// Probe every enabled provider once
    Health(HealthArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "EASEL_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "EASEL_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "EASEL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Disable periodic health probes
    #[arg(long)]
    pub no_health_check: bool,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Text prompt
    pub prompt: String,

    /// Image size as WIDTHxHEIGHT
    #[arg(short, long)]
    pub size: Option<String>,

    /// Model or endpoint id to request
    #[arg(short, long)]
    pub model: Option<String>,

    /// Seed passed to providers that support it
    #[arg(long)]
    pub seed: Option<i64>,

    /// Number of images (1-4)
    #[arg(short, long)]
    pub n: Option<u8>,

    /// Start the fallback chain at this provider
    #[arg(long)]
    pub provider: Option<String>,

    /// Print the full response as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ProvidersCommands {
    /// List configured providers in dispatch order
    List(ProvidersListArgs),
}

#[derive(Args, Debug)]
pub struct ProvidersListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Include disabled providers
    #[arg(short, long)]
    pub all: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load `path` if it exists (defaults otherwise), apply environment
/// overrides and validate.
pub fn load_config(path: &Path) -> Result<EaselConfig, ConfigError> {
    let config = if path.exists() {
        EaselConfig::load(Some(path))?
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        EaselConfig::default()
    };

    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Shared HTTP client for provider adapters.
pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        .user_agent(concat!("easel/", env!("CARGO_PKG_VERSION")))
        .build()
}
