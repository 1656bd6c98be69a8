//! # qt-runner
//!
//! Command-line entry point for the strategy framework.
//!
//! Loads a JSON configuration file and the contract table, connects to the
//! message bus, and then either runs a logging strategy over a set of
//! tickers or publishes a single order command.
//!
//! # Usage
//!
//! ```bash
//! qt-runner config.json watch --tickers IF2309,rb2310
//! qt-runner config.json send-order --ticker IF2309 --direction buy --volume 1 --price 4000
//! ```

mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use qt_bus::{RedisPublisher, RedisSubscriber};
use qt_core::backoff::Backoff;
use qt_core::config::{AppConfig, load_config};
use qt_core::{ContractTable, Direction, NewOrder, Offset, OrderType, cpu_affinity, logging};
use qt_strategy::{StrategyContext, StrategyRuntime};
use qt_td::{OrderSender, spawn_command_publisher};
use tracing::{info, warn};

use crate::watch::TickLogger;

/// Strategy runner and manual order tool.
#[derive(Parser)]
#[command(name = "qt-runner", about = "Strategy runner and manual order tool")]
struct Cli {
    /// Configuration file path (JSON).
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Log directory for file output. Overrides `module.log_path`.
    #[arg(long)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Subscribe to tickers and log every tick and order response.
    Watch {
        /// Comma-separated tickers.
        #[arg(long, value_delimiter = ',', required = true)]
        tickers: Vec<String>,
    },
    /// Publish one order command on `trader_cmd`.
    SendOrder {
        #[arg(long)]
        ticker: String,
        /// buy | sell
        #[arg(long)]
        direction: Direction,
        /// open | close | close_today | close_yesterday
        #[arg(long, default_value = "open")]
        offset: Offset,
        /// limit | market | best | fak | fok
        #[arg(long, default_value = "fak")]
        order_type: OrderType,
        #[arg(long)]
        volume: u32,
        #[arg(long)]
        price: f64,
        #[arg(long, default_value_t = 0)]
        user_order_id: u32,
    },
}

// Single-threaded so `cpu_affinity` pins the thread every callback runs on.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Configuration, then logging named after the module
    let config = load_config(&cli.config)?;
    let log_dir = cli.log_dir.clone().or_else(|| config.log_path());
    logging::init_logging(&cli.log_level, log_dir.as_deref(), &config.module_name());

    info!(
        "qt-runner starting: config={}, strategy_id='{}', bus={}",
        cli.config.display(),
        config.strategy_id,
        config.bus.url
    );

    // 2. Reference data
    let contracts = Arc::new(ContractTable::load(&config.contracts_file)?);

    // 3. Command path: sender -> bounded queue -> publisher task -> bus
    let mut backoff = Backoff::from_config(&config.reconnect);
    let publisher = RedisPublisher::connect(&config.bus.url, &mut backoff).await?;
    let (sender, rx) = OrderSender::new(config.strategy_id.clone(), contracts, config.outbound_queue_size);
    let publisher_task = spawn_command_publisher(publisher, rx, config.reconnect);

    match cli.command {
        Command::Watch { tickers } => watch(&config, sender, tickers).await?,
        Command::SendOrder { ticker, direction, offset, order_type, volume, price, user_order_id } => {
            if volume == 0 {
                bail!("volume must be positive");
            }
            let order = NewOrder::new(ticker, direction, offset, order_type, volume, price)
                .with_user_order_id(user_order_id);
            sender.send_order(&order)?;
            drop(sender);
        }
    }

    // 4. Drain queued commands
    let stats = publisher_task.await?;
    info!("commands published={}, failed={}", stats.published, stats.failed);
    if stats.failed > 0 {
        bail!("{} order command(s) could not be published", stats.failed);
    }
    Ok(())
}

/// Run [`TickLogger`] until Ctrl+C or a bus failure. Consumes `sender` so
/// the publisher task can finish once the runtime is gone.
async fn watch(config: &AppConfig, sender: OrderSender, tickers: Vec<String>) -> Result<()> {
    cpu_affinity::maybe_bind(config.cpu_affinity);

    let subscriber = RedisSubscriber::connect(&config.bus.url, Backoff::from_config(&config.reconnect)).await?;
    let ctx = StrategyContext::new(sender, config.bus.md_channel_prefix.clone());
    let mut runtime = StrategyRuntime::new(ctx, subscriber);
    let mut strategy = TickLogger::new(tickers);

    tokio::select! {
        res = runtime.run(&mut strategy) => {
            let stats = res?;
            warn!("subscription ended after {} tick(s)", stats.ticks);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    info!("runtime state {}", runtime.state());
    Ok(())
}
