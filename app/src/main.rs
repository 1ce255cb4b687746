// In app/src/main.rs

use anyhow::{Context, Result};
use api_client::ApiClient;
use app_config::Settings;
use clap::{Parser, Subcommand};
use core_types::Symbol;
use engine::Engine;
use std::str::FromStr;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::prelude::*;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "An EMA/RSI/ATR candle trading bot for Bybit linear perpetuals.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the trading loop in paper or live mode until Ctrl-C / SIGTERM.
    Run,

    /// Prints the unified wallet balance and the open position for the configured symbol.
    Balance {
        /// Only show this coin's balance (e.g., "USDT").
        #[arg(short, long)]
        coin: Option<String>,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();

    let settings = app_config::load_settings().context("Failed to load application settings")?;
    init_tracing(&settings.app.log_level);
    tracing::info!(environment = %settings.app.environment, "Application settings loaded successfully.");

    match cli.command {
        Commands::Run => run_bot(settings).await?,
        Commands::Balance { coin } => show_balance(&settings, coin.as_deref()).await?,
    }

    tracing::info!("Application has finished successfully.");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let level = LevelFilter::from_str(log_level).unwrap_or(LevelFilter::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        Targets::new()
            .with_target("reqwest", LevelFilter::WARN)
            .with_target("hyper", LevelFilter::WARN)
            .with_default(level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();
}

// --- "Run" Subcommand Logic ---

async fn run_bot(settings: Settings) -> Result<()> {
    tracing::info!(
        symbol = %settings.trading.symbol,
        timeframe = %settings.trading.timeframe,
        live = settings.app.live_trading_enabled,
        testnet = settings.bybit.testnet,
        "Starting trading bot."
    );

    let engine = Engine::new(settings);
    engine.run(shutdown_signal()).await
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C.");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM.");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C."),
        _ = terminate => tracing::info!("Received SIGTERM."),
    }
}

// --- "Balance" Subcommand Logic ---

async fn show_balance(settings: &Settings, coin: Option<&str>) -> Result<()> {
    let client = ApiClient::new(&settings.bybit)?;
    let symbol = Symbol(settings.trading.symbol.clone());

    let account = client.get_wallet_balance(coin).await?;
    println!(
        "{} account: equity {}, wallet {}, available {}",
        account.account_type, account.total_equity, account.total_wallet_balance, account.total_available_balance
    );
    for balance in &account.coin {
        println!(
            "  {:<6} wallet {:>14}  equity {:>14}  uPnL {:>12}",
            balance.coin, balance.wallet_balance, balance.equity, balance.unrealised_pnl
        );
    }

    match client.get_position(&symbol).await? {
        Some(position) => println!(
            "{} position: {} {} @ {} (mark {}, uPnL {})",
            position.symbol, position.side, position.size, position.avg_price, position.mark_price, position.unrealised_pnl
        ),
        None => println!("{symbol}: no open position"),
    }

    Ok(())
}
