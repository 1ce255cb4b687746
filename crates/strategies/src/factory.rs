// In crates/strategies/src/factory.rs

use crate::{EmaRsiAtr, Strategy, types::EmaRsiAtrSettings};
use anyhow::Result;
use core_types::StrategyConfig;

/// Builds the strategy named in the config, parsing its `params` table into the
/// strategy's settings.
pub fn create_strategy(config: &StrategyConfig) -> Result<Box<dyn Strategy + Send>> {
    let strategy: Box<dyn Strategy + Send> = match config.name.as_str() {
        "ema_rsi_atr" => {
            let settings: EmaRsiAtrSettings = config.params.clone().try_into()?;
            Box::new(EmaRsiAtr::new(settings)?)
        }
        unknown => anyhow::bail!("Attempted to create unknown strategy: {}", unknown),
    };

    tracing::info!(strategy = strategy.name(), "Strategy created.");
    Ok(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_ema_rsi_atr() {
        let strategy = create_strategy(&StrategyConfig::default()).unwrap();
        assert_eq!(strategy.name(), "EmaRsiAtr");
    }

    #[test]
    fn params_are_parsed_into_settings() {
        let params: toml::Value = toml::from_str("ema_period = 20\nwindow_capacity = 60").unwrap();
        let config = StrategyConfig {
            name: "ema_rsi_atr".to_string(),
            params,
        };
        assert!(create_strategy(&config).is_ok());
    }

    #[test]
    fn invalid_params_are_rejected() {
        let params: toml::Value = toml::from_str("window_capacity = 10").unwrap();
        let config = StrategyConfig {
            name: "ema_rsi_atr".to_string(),
            params,
        };
        assert!(create_strategy(&config).is_err());
    }

    #[test]
    fn unknown_strategy_is_an_error() {
        let config = StrategyConfig {
            name: "supertrend".to_string(),
            ..StrategyConfig::default()
        };
        let err = create_strategy(&config).err().unwrap();
        assert!(err.to_string().contains("unknown strategy"));
    }
}
