mod commands;
mod render;
mod utils;

use anyhow::Result;
use calblock_core::config::BlockConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calblock")]
#[command(about = "Block out time in your calendar wherever your other calendars are busy")]
struct Cli {
    /// Config file to use (defaults to ~/.config/calblock/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing blocks and remove obsolete ones
    Sync,
    /// Show what `sync` would change, without changing anything
    Status,
    /// Show config location and resolved settings
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Sync => {
            let config = load_config(cli.config.as_deref())?;
            commands::sync::run(config).await
        }
        Commands::Status => {
            let config = load_config(cli.config.as_deref())?;
            commands::status::run(config).await
        }
        Commands::Config => commands::config::run(cli.config.as_deref()),
    }
}

/// `RUST_LOG` wins when set; otherwise warnings only, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&str>) -> Result<BlockConfig> {
    let config_path = BlockConfig::resolve_path(path)?;
    let config = BlockConfig::load(path)?;
    tracing::debug!(
        path = %config_path.display(),
        remotes = config.remote_calendar_ids.len(),
        lookahead_days = config.lookahead_days,
        "loaded config"
    );

    if config.remote_calendar_ids.is_empty() {
        anyhow::bail!(
            "No remote calendars configured.\n\n\
            Add the calendars to mirror to {}:\n  \
            remote_calendar_ids = [\"you@work.example.com\"]",
            config_path.display()
        );
    }

    Ok(config)
}
