mod bot;
mod config;
mod error;
mod monitoring;
mod notify;
mod orchestrator;
mod telegram;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;

use crate::bot::{CommandLoop, LONG_POLL_TIMEOUT};
use crate::config::Config;
use crate::monitoring::{MonitoringScheduler, Prober};
use crate::notify::Notifier;
use crate::orchestrator::Monitor;
use crate::telegram::TelegramClient;

/// Watch a host or URL and report reachability changes over Telegram
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML config (defaults to $XDG_CONFIG_HOME/pingwatch/config.toml)
    config: Option<PathBuf>,

    /// Probe the target once, print the result and exit
    #[arg(long)]
    once: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is the normal case
    let _ = dotenvy::dotenv();
    logger::init();

    let cli = Cli::parse();

    let config = Config::from_config(cli.config.as_ref()).context("Failed to load config")?;
    config.validate()?;

    if cli.print_config {
        print!("{config}");
        return Ok(());
    }

    let target = config.target();
    let prober = Prober::for_target(target.clone(), config.http_timeout_seconds)?;

    if cli.once {
        let is_up = prober.probe().await;
        println!("{}: {}", target, if is_up { "UP" } else { "DOWN" });
        std::process::exit(if is_up { 0 } else { 1 });
    }

    let telegram = Arc::new(
        TelegramClient::new(&config.api_base, &config.bot_token, LONG_POLL_TIMEOUT)
            .context("Failed to build Telegram client")?,
    );
    let notifier = Arc::new(Notifier::new(telegram.clone(), config.chat_id.clone()));
    let monitor = Arc::new(Monitor::new(prober, notifier.clone()));

    info!(
        "Starting network monitor for {} (interval: {}s)",
        target,
        config.interval().as_secs()
    );

    // The timer's first tick is the initial check
    let _timer = MonitoringScheduler::new(monitor.clone(), config.interval()).start();

    tokio::spawn(CommandLoop::new(telegram, monitor, notifier).run());

    signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping monitor");

    Ok(())
}
