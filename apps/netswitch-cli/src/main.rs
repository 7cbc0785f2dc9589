mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use trusted_zones::{
    FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, TrustedZonesClientV1, build_client,
};

use crate::commands::Command;
use crate::config::{AppConfig, StorageBackend};

/// NetSwitch - trusted WiFi zones and profile settings
#[derive(Parser)]
#[command(name = "netswitch")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("{}", commands::render_error(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.verbose);

    if cli.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    logging::init_logging(&config.logging)?;

    let Some(command) = cli.command else {
        anyhow::bail!("no command given, see `netswitch --help`");
    };

    let client = open_client(&config)?;
    let mut stdout = std::io::stdout().lock();
    commands::execute(client.as_ref(), command, &mut stdout).await
}

fn open_client(config: &AppConfig) -> anyhow::Result<Arc<dyn TrustedZonesClientV1>> {
    let store: Arc<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::File => {
            let dir = config.storage.resolve_home_dir()?;
            tracing::debug!(dir = %dir.display(), "using file storage");
            Arc::new(FileKeyValueStore::new(dir))
        }
        StorageBackend::Memory => Arc::new(InMemoryKeyValueStore::new()),
    };
    Ok(build_client(store, config.zones.clone()))
}
