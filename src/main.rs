//! CareWatch monitor daemon.

use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use carewatch::settings::MonitorConfig;

#[derive(Parser)]
#[command(name = "carewatch")]
#[command(about = "Care monitoring loop: vitals, inactivity, reminders and escalation", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path. Defaults apply when the file is missing.
    #[arg(short, long, env = "CAREWATCH_CONFIG", default_value = "carewatch.json")]
    config: PathBuf,

    /// Override the event store path
    #[arg(long, env = "CAREWATCH_DB")]
    db: Option<PathBuf>,

    /// Override the classifier artifact path
    #[arg(long, env = "CAREWATCH_MODEL")]
    model: Option<PathBuf>,

    /// Override the tick period in seconds
    #[arg(long)]
    tick_secs: Option<u64>,

    /// Enable the HTTP ingest server
    #[arg(long)]
    ingest: bool,
}

#[tokio::main]
async fn main() {
    // Reads RUST_LOG, defaulting to info
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!("CareWatch starting up...");

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid configuration: {err:#}");
            std::process::exit(1);
        }
    };

    let cancel_token = CancellationToken::new();
    {
        let cancel_token = cancel_token.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl-C: {err}");
                return;
            }
            log::info!("Ctrl-C received, finishing current tick");
            cancel_token.cancel();
        });
    }

    if let Err(err) = carewatch::run(config, cancel_token).await {
        log::error!("CareWatch failed: {err:#}");
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<MonitorConfig> {
    let mut config = MonitorConfig::load(&cli.config)?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(model) = &cli.model {
        config.model_path = model.clone();
    }
    if let Some(secs) = cli.tick_secs {
        config.tick_period_secs = secs;
    }
    if cli.ingest {
        config.ingest.enabled = true;
    }
    config.validate()?;
    Ok(config)
}
