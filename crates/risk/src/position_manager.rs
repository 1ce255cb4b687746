// In crates/risk/src/position_manager.rs

use crate::types::{ExitReason, OpenPosition, PositionState, RiskSettings};
use crate::{Error, Result};
use core_types::{Candle, PositionSide, Side};

/// Tracks the single open position and decides when it must be closed.
///
/// State machine over FLAT / LONG / SHORT:
/// - `enter` places the stop-loss `atr * atr_stop_multiplier` away from entry and
///   the take-profit `reward_risk_ratio` times further.
/// - `evaluate` checks, in this order: take-profit, breakeven activation,
///   stop-loss. Activation and a stop hit can both happen on one candle.
/// - `reset` returns to FLAT.
#[derive(Debug, Clone, Default)]
pub struct PositionRiskManager {
    settings: RiskSettings,
    state: PositionState,
}

impl PositionRiskManager {
    pub fn new(settings: RiskSettings) -> Self {
        Self {
            settings,
            state: PositionState::Flat,
        }
    }

    pub fn settings(&self) -> &RiskSettings {
        &self.settings
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    pub fn side(&self) -> PositionSide {
        self.state.side()
    }

    pub fn is_flat(&self) -> bool {
        matches!(self.state, PositionState::Flat)
    }

    /// Opens a position at `price` and derives its stop and target from `atr`.
    pub fn enter(&mut self, price: f64, atr: f64, side: Side) -> Result<OpenPosition> {
        if let PositionState::Open(open) = &self.state {
            return Err(Error::PositionAlreadyOpen {
                open: open.side,
                requested: side,
            });
        }

        let sl_distance = atr * self.settings.atr_stop_multiplier;
        let tp_distance = sl_distance * self.settings.reward_risk_ratio;
        let (stop_loss, take_profit) = match side {
            Side::Long => (price - sl_distance, price + tp_distance),
            Side::Short => (price + sl_distance, price - tp_distance),
        };

        let position = OpenPosition {
            side,
            entry_price: price,
            stop_loss,
            take_profit,
            breakeven_activated: false,
        };
        self.state = PositionState::Open(position);

        tracing::info!(
            ?side,
            entry_price = price,
            stop_loss,
            take_profit,
            atr,
            "Position opened."
        );
        Ok(position)
    }

    /// Runs the exit checks for one candle. Returns the exit reason if the
    /// position was closed; the manager is FLAT afterwards in that case.
    pub fn evaluate(&mut self, candle: &Candle, atr: f64) -> Option<ExitReason> {
        let PositionState::Open(position) = &mut self.state else {
            return None;
        };

        // 1. Take-profit
        let take_profit_hit = match position.side {
            Side::Long => candle.high >= position.take_profit,
            Side::Short => candle.low <= position.take_profit,
        };
        if take_profit_hit {
            tracing::info!(side = ?position.side, take_profit = position.take_profit, "Take-profit hit.");
            self.reset();
            return Some(ExitReason::TakeProfit);
        }

        // 2. Breakeven activation
        if !position.breakeven_activated {
            let activation_distance = atr * self.settings.breakeven_activation_multiplier;
            let offset = atr * self.settings.breakeven_offset_multiplier;
            let activated = match position.side {
                Side::Long => candle.high >= position.entry_price + activation_distance,
                Side::Short => candle.low <= position.entry_price - activation_distance,
            };
            if activated {
                position.stop_loss = match position.side {
                    Side::Long => position.entry_price + offset,
                    Side::Short => position.entry_price - offset,
                };
                position.breakeven_activated = true;
                tracing::info!(
                    side = ?position.side,
                    stop_loss = position.stop_loss,
                    "Breakeven activated, stop moved."
                );
            }
        }

        // 3. Stop-loss / breakeven stop
        let stop_hit = match position.side {
            Side::Long => candle.low <= position.stop_loss,
            Side::Short => candle.high >= position.stop_loss,
        };
        if stop_hit {
            let reason = if position.breakeven_activated {
                ExitReason::BreakevenStop
            } else {
                ExitReason::StopLoss
            };
            tracing::info!(side = ?position.side, stop_loss = position.stop_loss, %reason, "Stop hit.");
            self.reset();
            return Some(reason);
        }

        None
    }

    pub fn reset(&mut self) {
        self.state = PositionState::Flat;
    }
}
