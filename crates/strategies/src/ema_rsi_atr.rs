// In crates/strategies/src/ema_rsi_atr.rs

use crate::entry::{EntrySignalDetector, passes_volatility_gate};
use crate::indicators::IndicatorSeries;
use crate::types::EmaRsiAtrSettings;
use crate::window::CandleWindow;
use crate::{Result, Strategy};
use core_types::{Candle, PositionSide, Side, Signal};
use risk::PositionRiskManager;

/// Trend-following strategy: EMA trend filter, RSI crossover trigger, ATR-based
/// volatility gate and exits.
///
/// Per candle:
/// 1. Append to the window; HOLD until `min_history` candles are available.
/// 2. Recompute EMA/RSI/ATR over the whole window.
/// 3. HOLD if volatility is below the gate (this also blocks exits).
/// 4. With an open position, run the exit checks; otherwise look for an entry.
#[derive(Debug)]
pub struct EmaRsiAtr {
    settings: EmaRsiAtrSettings,
    window: CandleWindow,
    detector: EntrySignalDetector,
    risk: PositionRiskManager,
}

impl EmaRsiAtr {
    pub fn new(settings: EmaRsiAtrSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            window: CandleWindow::new(settings.window_capacity),
            detector: EntrySignalDetector::new(settings.rsi_long_threshold, settings.rsi_short_threshold),
            risk: PositionRiskManager::new(settings.risk.clone()),
            settings,
        })
    }

    pub fn settings(&self) -> &EmaRsiAtrSettings {
        &self.settings
    }

    pub fn window(&self) -> &CandleWindow {
        &self.window
    }

    pub fn risk(&self) -> &PositionRiskManager {
        &self.risk
    }

    fn decide(&mut self, candle: &Candle) -> Signal {
        if self.window.len() < self.settings.min_history() {
            return Signal::Hold;
        }

        let series = IndicatorSeries::compute(
            &self.window,
            self.settings.ema_period,
            self.settings.rsi_period,
            self.settings.atr_period,
        );
        let Some(snapshot) = series.latest() else {
            return Signal::Hold;
        };

        if !passes_volatility_gate(snapshot.atr, candle.close, self.settings.min_atr_ratio) {
            tracing::debug!(atr = snapshot.atr, close = candle.close, "Volatility below gate, holding.");
            return Signal::Hold;
        }

        if !self.risk.is_flat() {
            return match self.risk.evaluate(candle, snapshot.atr) {
                Some(reason) => {
                    tracing::info!(%reason, close = candle.close, "Exit triggered.");
                    Signal::Exit
                }
                None => Signal::Hold,
            };
        }

        let Some(side) = self.detector.detect(candle, &snapshot) else {
            return Signal::Hold;
        };

        match self.risk.enter(candle.close, snapshot.atr, side) {
            Ok(_) => match side {
                Side::Long => Signal::Buy,
                Side::Short => Signal::Sell,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Entry rejected by position manager.");
                Signal::Hold
            }
        }
    }
}

impl Strategy for EmaRsiAtr {
    fn name(&self) -> &'static str {
        "EmaRsiAtr"
    }

    fn on_candle(&mut self, candle: Candle) -> Signal {
        self.window.append(candle);
        self.decide(&candle)
    }

    fn warm_up(&mut self, history: &[Candle]) {
        for candle in history {
            self.window.append(*candle);
        }
        tracing::info!(
            seeded = history.len(),
            window = self.window.len(),
            required = self.settings.min_history(),
            "Strategy history warmed up."
        );
    }

    fn position_side(&self) -> PositionSide {
        self.risk.side()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_candle(ts: i64) -> Candle {
        Candle::new(ts, 100.0, 100.01, 99.99, 100.0, 1.0)
    }

    #[test]
    fn holds_until_enough_history() {
        let mut strategy = EmaRsiAtr::new(EmaRsiAtrSettings::default()).unwrap();
        for ts in 0..127 {
            assert_eq!(strategy.on_candle(quiet_candle(ts)), Signal::Hold);
        }
        assert_eq!(strategy.window().len(), 127);
    }

    #[test]
    fn volatility_gate_blocks_exits_of_an_open_position() {
        let mut strategy = EmaRsiAtr::new(EmaRsiAtrSettings::default()).unwrap();
        for ts in 0..128 {
            strategy.on_candle(quiet_candle(ts));
        }
        // Stop at 99.82, target at 100.54.
        strategy.risk.enter(100.0, 0.09, Side::Long).unwrap();

        // Crosses both the target and the stop, but ATR stays far below 0.2.
        let signal = strategy.on_candle(Candle::new(128, 100.0, 100.6, 99.5, 100.0, 1.0));

        assert_eq!(signal, Signal::Hold);
        assert_eq!(strategy.position_side(), PositionSide::Long);
    }

    #[test]
    fn warm_up_fills_the_window_without_signals() {
        let mut strategy = EmaRsiAtr::new(EmaRsiAtrSettings::default()).unwrap();
        let history: Vec<Candle> = (0..400).map(quiet_candle).collect();
        strategy.warm_up(&history);

        assert_eq!(strategy.window().len(), 300);
        assert_eq!(strategy.window().last().map(|c| c.timestamp), Some(399));
        assert_eq!(strategy.position_side(), PositionSide::Flat);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = EmaRsiAtrSettings {
            rsi_period: 0,
            ..EmaRsiAtrSettings::default()
        };
        assert!(EmaRsiAtr::new(settings).is_err());
    }
}
