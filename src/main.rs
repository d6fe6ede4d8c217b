//! Expensebot main entry point

use expensebot_api::start_server;
use expensebot_config::{Config, ConfigError, ConfigResult, LoggingConfig};
use expensebot_core::DatasetStore;
use expensebot_parser::DefaultExpenseParser;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "expensebot")]
#[command(author = "Expensebot Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Answer questions about an uploaded expense CSV", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,
}

/// Apply the CLI overrides to the loaded config, falling back to defaults
/// when the file does not exist
fn resolve_config(args: &Args, loaded: ConfigResult<Config>) -> anyhow::Result<Config> {
    let mut config = match loaded {
        Ok(config) => config,
        Err(ConfigError::FileNotFound { path }) => {
            log::warn!("Config file {} not found, using defaults", path);
            Config::default()
        }
        Err(e) => anyhow::bail!("Failed to load {}: {}", args.config.display(), e.to_details()),
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().map_err(|e| anyhow::anyhow!("{}", e.to_details()))?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let loaded = Config::load(&args.config);
    let level = match &loaded {
        Ok(config) => config.logging.level.clone(),
        Err(_) => LoggingConfig::default().level,
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = resolve_config(&args, loaded)?;
    log::info!(
        "Config loaded: bind={}, spool_dir={}, invalid_amount={}",
        config.bind_addr(),
        config.upload.spool_dir.display(),
        config.ingest.invalid_amount
    );

    let rt = Runtime::new()?;
    rt.block_on(async {
        let parser = Arc::new(DefaultExpenseParser);
        let store = Arc::new(DatasetStore::new(config, parser));
        start_server(store).await
    })?;

    Ok(())
}
