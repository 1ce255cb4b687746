// In crates/core-types/src/strategy.rs

use serde::Deserialize;
use toml::Value;

/// The `[strategy]` block of the settings: which strategy to run and its raw parameters.
#[derive(Deserialize, Debug, Clone)]
pub struct StrategyConfig {
    #[serde(default = "default_name")]
    pub name: String,
    // This will hold the `params = { ... }` table from the TOML
    #[serde(default = "empty_params")]
    pub params: Value,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            params: empty_params(),
        }
    }
}

fn default_name() -> String {
    "ema_rsi_atr".to_string()
}

fn empty_params() -> Value {
    Value::Table(Default::default())
}
