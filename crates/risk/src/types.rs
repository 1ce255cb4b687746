// In crates/risk/src/types.rs

use crate::{Error, Result};
use core_types::{PositionSide, Side};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ATR multiples that drive stop-loss, take-profit and breakeven placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Stop-loss distance from entry, in ATRs.
    pub atr_stop_multiplier: f64,
    /// Take-profit distance as a multiple of the stop-loss distance (reward:risk).
    pub reward_risk_ratio: f64,
    /// Favorable move from entry, in ATRs, that activates the breakeven stop.
    pub breakeven_activation_multiplier: f64,
    /// Where the breakeven stop sits beyond entry, in ATRs.
    pub breakeven_offset_multiplier: f64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            atr_stop_multiplier: 2.0,
            reward_risk_ratio: 3.0,
            breakeven_activation_multiplier: 2.5,
            breakeven_offset_multiplier: 0.3,
        }
    }
}

impl RiskSettings {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("atr_stop_multiplier", self.atr_stop_multiplier),
            ("reward_risk_ratio", self.reward_risk_ratio),
            ("breakeven_activation_multiplier", self.breakeven_activation_multiplier),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidParameters(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !(self.breakeven_offset_multiplier.is_finite() && self.breakeven_offset_multiplier >= 0.0) {
            return Err(Error::InvalidParameters(format!(
                "breakeven_offset_multiplier must be non-negative, got {}",
                self.breakeven_offset_multiplier
            )));
        }
        Ok(())
    }
}

/// The risk levels of a position that is currently open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenPosition {
    pub side: Side,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub breakeven_activated: bool,
}

/// Either flat or holding exactly one open position.
///
/// Levels only exist while a position is open, so nothing can read a stale
/// stop or target after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Open(OpenPosition),
}

impl PositionState {
    pub fn side(&self) -> PositionSide {
        match self {
            PositionState::Flat => PositionSide::Flat,
            PositionState::Open(position) => position.side.into(),
        }
    }

    pub fn open_position(&self) -> Option<&OpenPosition> {
        match self {
            PositionState::Flat => None,
            PositionState::Open(position) => Some(position),
        }
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    /// The stop was hit after it had been moved to breakeven.
    BreakevenStop,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::TakeProfit => "take-profit",
            ExitReason::StopLoss => "stop-loss",
            ExitReason::BreakevenStop => "breakeven-stop",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        assert!(RiskSettings::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_multipliers() {
        let settings = RiskSettings {
            atr_stop_multiplier: 0.0,
            ..RiskSettings::default()
        };
        assert!(matches!(settings.validate(), Err(Error::InvalidParameters(_))));

        let settings = RiskSettings {
            breakeven_offset_multiplier: f64::NAN,
            ..RiskSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
