// In crates/engine/src/task.rs

use api_client::MarketData;
use core_types::{Signal, Symbol, Timeframe};
use execution::Executor;
use std::future::Future;
use strategies::Strategy;
use tokio::time::MissedTickBehavior;

/// What a single tick of the ingestion loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The fetch failed or returned nothing; the tick was skipped.
    FetchFailed,
    /// The newest candle was already processed.
    Duplicate,
    /// A new candle went through the strategy and the signal was dispatched.
    Processed(Signal),
}

/// A self-contained task that runs the candle pipeline for a single symbol.
///
/// Owns the strategy and executor outright; nothing else touches them while
/// the loop runs.
pub struct TradingTask {
    symbol: Symbol,
    timeframe: Timeframe,
    fetch_limit: u16,
    market_data: Box<dyn MarketData>,
    strategy: Box<dyn Strategy + Send>,
    executor: Box<dyn Executor>,
    // Start time of the last candle handed to the strategy.
    last_processed: Option<i64>,
}

impl TradingTask {
    pub fn new(
        symbol: Symbol,
        timeframe: Timeframe,
        fetch_limit: u16,
        market_data: Box<dyn MarketData>,
        strategy: Box<dyn Strategy + Send>,
        executor: Box<dyn Executor>,
    ) -> Self {
        Self {
            symbol,
            timeframe,
            fetch_limit,
            market_data,
            strategy,
            executor,
            last_processed: None,
        }
    }

    pub fn last_processed(&self) -> Option<i64> {
        self.last_processed
    }

    /// Seeds the strategy with recent history before the loop starts.
    ///
    /// The newest candle is held back so that the first tick processes it
    /// normally and produces a decision for it.
    pub async fn warm_up(&mut self, candles: u16) -> anyhow::Result<()> {
        let history = self
            .market_data
            .get_candles(&self.symbol, self.timeframe, candles)
            .await?;
        let Some((_newest, seed)) = history.split_last() else {
            anyhow::bail!("No history returned for {}", self.symbol);
        };
        self.strategy.warm_up(seed);
        tracing::info!(symbol = %self.symbol, seeded = seed.len(), "Task warm-up complete.");
        Ok(())
    }

    /// Runs one tick: fetch, dedup, decide, dispatch.
    ///
    /// Never fails; every problem is logged and reflected in the outcome.
    pub async fn process_once(&mut self) -> TickOutcome {
        let candles = match self
            .market_data
            .get_candles(&self.symbol, self.timeframe, self.fetch_limit)
            .await
        {
            Ok(candles) => candles,
            Err(e) => {
                tracing::error!(symbol = %self.symbol, error = %e, "Failed to fetch candles.");
                return TickOutcome::FetchFailed;
            }
        };

        let Some(candle) = candles.last().copied() else {
            tracing::warn!(symbol = %self.symbol, "Market data returned no candles.");
            return TickOutcome::FetchFailed;
        };

        if self.last_processed == Some(candle.timestamp) {
            tracing::debug!(symbol = %self.symbol, timestamp = candle.timestamp, "Candle already processed, skipping.");
            return TickOutcome::Duplicate;
        }

        let time = candle
            .open_time()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| candle.timestamp.to_string());
        tracing::info!(
            symbol = %self.symbol,
            %time,
            open = candle.open,
            high = candle.high,
            low = candle.low,
            close = candle.close,
            "New candle."
        );

        let signal = self.strategy.on_candle(candle);
        tracing::info!(symbol = %self.symbol, %signal, strategy = self.strategy.name(), "Strategy decision.");

        if let Err(e) = self.executor.on_signal(signal, candle.close).await {
            tracing::error!(symbol = %self.symbol, executor = self.executor.name(), error = %e, "Executor failed to handle signal.");
        }
        self.last_processed = Some(candle.timestamp);

        tracing::info!(
            symbol = %self.symbol,
            position = %self.executor.state(),
            strategy_position = %self.strategy.position_side(),
            "Position state."
        );

        TickOutcome::Processed(signal)
    }

    /// The main, long-running loop for this trading task.
    ///
    /// Ticks once per timeframe, starting immediately. `shutdown` is only
    /// observed between ticks; a tick in progress always runs to completion.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            symbol = %self.symbol,
            timeframe = %self.timeframe,
            strategy = self.strategy.name(),
            executor = self.executor.name(),
            "Starting trading task."
        );

        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(self.timeframe.duration());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!(symbol = %self.symbol, "Shutdown requested, stopping trading task.");
                    return;
                }
                _ = ticker.tick() => {}
            }
            self.process_once().await;
        }
    }
}
