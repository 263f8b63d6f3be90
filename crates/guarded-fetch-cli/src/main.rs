//! guarded-fetch command line client

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{Config, File};
use guarded_fetch::{BlockingFetcher, FetchSettings};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod sub_commands;

/// Fetch untrusted URLs with SSRF guards, timeouts and size caps
#[derive(Parser)]
#[command(name = "guarded-fetch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML settings file
    #[arg(short, long, env = "GUARDED_FETCH_CONFIG")]
    config: Option<PathBuf>,
    /// Logging level
    #[arg(short, long, default_value = "warn")]
    log_level: Level,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a URL with GET
    Get(sub_commands::get::GetSubCommand),
    /// POST form data to a URL
    Post(sub_commands::post::PostSubCommand),
    /// Check a URL against the guard without fetching it
    Check(sub_commands::check::CheckSubCommand),
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();
    let default_filter = args.log_level;

    let hyper_filter = "hyper_util=warn";

    let env_filter = EnvFilter::new(format!("{},{}", default_filter, hyper_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = load_settings(args.config.as_deref())?;
    tracing::debug!(
        "Response cap {} bytes, redirect cap {}",
        settings.max_response_bytes,
        settings.max_redirects
    );

    let fetcher = BlockingFetcher::from_settings(&settings)?;

    match &args.command {
        Commands::Get(sub_command_args) => sub_commands::get::get(&fetcher, sub_command_args),
        Commands::Post(sub_command_args) => sub_commands::post::post(&fetcher, sub_command_args),
        Commands::Check(sub_command_args) => {
            sub_commands::check::check(&fetcher, sub_command_args)
        }
    }
}

/// Defaults, overridden by the settings file when one is given
fn load_settings(config_file: Option<&Path>) -> Result<FetchSettings> {
    let defaults = FetchSettings::default();

    let Some(config_file) = config_file else {
        return Ok(defaults);
    };

    let settings = Config::builder()
        // use defaults
        .add_source(Config::try_from(&defaults)?)
        // override with file contents
        .add_source(File::from(config_file))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
