// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};
use rust_decimal::Decimal;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, BybitSettings, MarketDataSettings, Settings, SimulationSettings, TradingSettings};

/// Upper bound on the warm-up request; Bybit serves at most 1000 klines per call.
pub const MAX_WARMUP_CANDLES: u16 = 1000;

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
///
/// The result is validated before it is returned.
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let config = Config::builder()
        .add_source(File::with_name("config/base"))
        .add_source(File::with_name(&format!("config/{}", environment)).required(false))
        .add_source(self::environment())
        .build()?;

    from_config(config)
}

/// Overrides from `APP__SECTION__KEY` variables, e.g. `APP__BYBIT__API_KEY=...`.
///
/// Values are parsed as numbers or booleans where possible so that overrides
/// of untyped tables such as `strategy.params` keep their numeric type.
fn environment() -> Environment {
    Environment::with_prefix("APP")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Deserializes and validates an already assembled configuration.
pub fn from_config(config: Config) -> Result<Settings> {
    let settings: Settings = config.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

impl Settings {
    /// Rejects values the rest of the application cannot work with.
    pub fn validate(&self) -> Result<()> {
        let trading = &self.trading;
        if trading.symbol.trim().is_empty() {
            return Err(Error::Validation("trading.symbol must not be empty".into()));
        }
        if trading.quantity <= Decimal::ZERO {
            return Err(Error::Validation(format!(
                "trading.quantity must be positive, got {}",
                trading.quantity
            )));
        }
        if trading.fetch_limit < 2 {
            return Err(Error::Validation(format!(
                "trading.fetch_limit must be at least 2, got {}",
                trading.fetch_limit
            )));
        }
        if trading.warmup_candles > MAX_WARMUP_CANDLES {
            return Err(Error::Validation(format!(
                "trading.warmup_candles must not exceed {MAX_WARMUP_CANDLES}, got {}",
                trading.warmup_candles
            )));
        }

        if self.market_data.max_attempts == 0 {
            return Err(Error::Validation("market_data.max_attempts must be at least 1".into()));
        }

        let sim = &self.simulation;
        for (name, value) in [("taker_fee", sim.taker_fee), ("slippage_percent", sim.slippage_percent)] {
            if !(value.is_finite() && (0.0..1.0).contains(&value)) {
                return Err(Error::Validation(format!(
                    "simulation.{name} must be within [0, 1), got {value}"
                )));
            }
        }

        if self.app.live_trading_enabled && !self.bybit.has_credentials() {
            return Err(Error::Validation(
                "live trading requires bybit.api_key and bybit.api_secret".into(),
            ));
        }

        Ok(())
    }
}
