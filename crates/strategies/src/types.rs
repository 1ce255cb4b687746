// In crates/strategies/src/types.rs

use crate::{Error, Result};
use risk::RiskSettings;
use serde::{Deserialize, Serialize};

/// Parameters of the EMA/RSI/ATR trend strategy.
///
/// Every field has a default, so an empty `params` table in the config yields
/// the standard 100/14/14 setup.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EmaRsiAtrSettings {
    pub ema_period: usize,
    pub rsi_period: usize,
    pub atr_period: usize,

    /// RSI must cross up through this level for a long entry.
    pub rsi_long_threshold: f64,
    /// RSI must cross down through this level for a short entry.
    pub rsi_short_threshold: f64,

    /// ATR must be at least `close * min_atr_ratio` for the strategy to act.
    pub min_atr_ratio: f64,

    /// How many candles of history are kept.
    pub window_capacity: usize,

    pub risk: RiskSettings,
}

impl Default for EmaRsiAtrSettings {
    fn default() -> Self {
        Self {
            ema_period: 100,
            rsi_period: 14,
            atr_period: 14,
            rsi_long_threshold: 45.0,
            rsi_short_threshold: 55.0,
            min_atr_ratio: 0.002,
            window_capacity: crate::window::DEFAULT_WINDOW_CAPACITY,
            risk: RiskSettings::default(),
        }
    }
}

impl EmaRsiAtrSettings {
    /// Candles needed before indicators are evaluated.
    pub fn min_history(&self) -> usize {
        self.ema_period + self.rsi_period + self.atr_period
    }

    pub fn validate(&self) -> Result<()> {
        if self.ema_period == 0 || self.rsi_period == 0 || self.atr_period == 0 {
            return Err(Error::InvalidSettings(
                "indicator periods must be greater than 0".to_string(),
            ));
        }
        if self.window_capacity < self.min_history() {
            return Err(Error::InvalidSettings(format!(
                "window_capacity ({}) is smaller than the required history ({})",
                self.window_capacity,
                self.min_history()
            )));
        }
        if !(0.0..=100.0).contains(&self.rsi_long_threshold)
            || !(0.0..=100.0).contains(&self.rsi_short_threshold)
        {
            return Err(Error::InvalidSettings(
                "RSI thresholds must lie within 0..=100".to_string(),
            ));
        }
        if !(self.min_atr_ratio.is_finite() && self.min_atr_ratio >= 0.0) {
            return Err(Error::InvalidSettings(format!(
                "min_atr_ratio must be non-negative, got {}",
                self.min_atr_ratio
            )));
        }
        self.risk.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_need_128_candles() {
        let settings = EmaRsiAtrSettings::default();
        assert_eq!(settings.min_history(), 128);
        assert_eq!(settings.window_capacity, 300);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn window_must_hold_the_required_history() {
        let settings = EmaRsiAtrSettings {
            window_capacity: 100,
            ..EmaRsiAtrSettings::default()
        };
        assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));
    }

    #[test]
    fn invalid_risk_settings_are_reported() {
        let mut settings = EmaRsiAtrSettings::default();
        settings.risk.reward_risk_ratio = -1.0;
        assert!(matches!(settings.validate(), Err(Error::Risk(_))));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let settings: EmaRsiAtrSettings = toml::from_str(
            r#"
            ema_period = 50
            [risk]
            reward_risk_ratio = 2.0
            "#,
        )
        .unwrap();

        assert_eq!(settings.ema_period, 50);
        assert_eq!(settings.rsi_period, 14);
        assert_eq!(settings.risk.reward_risk_ratio, 2.0);
        assert_eq!(settings.risk.atr_stop_multiplier, 2.0);
    }
}
