// In crates/engine/src/lib.rs

pub mod task;

pub use crate::task::{TickOutcome, TradingTask};

use anyhow::Result;
use api_client::{ApiClient, BybitMarketData};
use app_config::Settings;
use core_types::Symbol;
use execution::{Executor, LiveExecutor, PaperExecutor};
use std::future::Future;
use strategies::factory::create_strategy;

/// Wires the configured components into a `TradingTask` and runs it.
pub struct Engine {
    settings: Settings,
}

impl Engine {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Instantiates market data, strategy and executor from the settings.
    pub fn build_task(&self) -> Result<TradingTask> {
        let settings = &self.settings;
        let symbol = Symbol(settings.trading.symbol.clone());

        let client = ApiClient::new(&settings.bybit)?;
        let market_data = BybitMarketData::new(client.clone(), &settings.market_data);
        let strategy = create_strategy(&settings.strategy)?;

        let executor: Box<dyn Executor> = if settings.app.live_trading_enabled {
            tracing::warn!(%symbol, base_url = %client.base_url, "LIVE TRADING ENABLED: signals will place real orders.");
            Box::new(LiveExecutor::new(client, symbol.clone(), settings.trading.quantity))
        } else {
            Box::new(PaperExecutor::new(
                symbol.clone(),
                settings.trading.quantity,
                &settings.simulation,
            )?)
        };

        Ok(TradingTask::new(
            symbol,
            settings.trading.timeframe,
            settings.trading.fetch_limit,
            Box::new(market_data),
            strategy,
            executor,
        ))
    }

    /// Runs the trading loop until `shutdown` resolves.
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("Initializing trading engine...");
        let mut task = self.build_task()?;

        let warmup = self.settings.trading.warmup_candles;
        if warmup > 0 {
            if let Err(e) = task.warm_up(warmup).await {
                tracing::warn!(error = %e, "Warm-up failed, starting with an empty history.");
            }
        }

        task.run(shutdown).await;
        tracing::info!("Trading engine stopped.");
        Ok(())
    }
}
