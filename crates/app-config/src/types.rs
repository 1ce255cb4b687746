// In crates/app-config/src/types.rs

use core_types::{StrategyConfig, Timeframe};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;

const BYBIT_MAINNET_URL: &str = "https://api.bybit.com";
const BYBIT_TESTNET_URL: &str = "https://api-testnet.bybit.com";

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    #[serde(default)]
    pub app: AppSettings,
    /// Settings for the Bybit API.
    #[serde(default)]
    pub bybit: BybitSettings,
    /// What to trade and how often.
    pub trading: TradingSettings,
    #[serde(default)]
    pub market_data: MarketDataSettings,
    /// Fee and slippage model for paper trading.
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub strategy: StrategyConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    #[serde(default = "default_environment")]
    pub environment: String,
    /// The log level for the application.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Route signals to real orders instead of the paper executor.
    #[serde(default)]
    pub live_trading_enabled: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            live_trading_enabled: false,
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct BybitSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_true")]
    pub testnet: bool,
    /// Overrides the mainnet/testnet URL, e.g. for a local proxy.
    #[serde(default)]
    pub rest_base_url: Option<String>,
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

impl BybitSettings {
    pub fn base_url(&self) -> &str {
        match &self.rest_base_url {
            Some(url) => url.trim_end_matches('/'),
            None if self.testnet => BYBIT_TESTNET_URL,
            None => BYBIT_MAINNET_URL,
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

impl Default for BybitSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            testnet: true,
            rest_base_url: None,
            recv_window_ms: default_recv_window_ms(),
            timeout_secs: default_request_timeout_secs(),
        }
    }
}

// Keeps the secret out of logs.
impl fmt::Debug for BybitSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BybitSettings")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("testnet", &self.testnet)
            .field("rest_base_url", &self.rest_base_url)
            .field("recv_window_ms", &self.recv_window_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct TradingSettings {
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Order size in base currency.
    pub quantity: Decimal,
    /// Candles requested per tick; the newest one is the candidate.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u16,
    /// History fetched at startup to seed the strategy. 0 disables warm-up.
    #[serde(default)]
    pub warmup_candles: u16,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MarketDataSettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
    #[serde(default = "default_market_data_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_secs: default_backoff_secs(),
            timeout_secs: default_market_data_timeout_secs(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SimulationSettings {
    /// The taker fee for the exchange (e.g., 0.00055 for 0.055%).
    #[serde(default)]
    pub taker_fee: f64,
    /// The simulated slippage percentage for market orders (e.g., 0.0005 for 0.05%).
    #[serde(default)]
    pub slippage_percent: f64,
}

/// Helper functions for serde defaults
fn default_environment() -> String {
    "development".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_recv_window_ms() -> u64 {
    5000
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_fetch_limit() -> u16 {
    2
}
fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_secs() -> u64 {
    1
}
fn default_market_data_timeout_secs() -> u64 {
    30
}
