// In crates/strategies/src/entry.rs

use crate::indicators::IndicatorSnapshot;
use core_types::{Candle, Side};

/// Minimum volatility required before the strategy acts at all.
///
/// Fails when ATR is not positive or is below `close * min_atr_ratio`. A
/// failing gate suppresses entries and exits alike.
pub fn passes_volatility_gate(atr: f64, close: f64, min_atr_ratio: f64) -> bool {
    atr > 0.0 && atr >= close * min_atr_ratio
}

/// Trend + momentum entry rules, evaluated only while flat.
///
/// Long: close above the EMA, RSI crossing up through the long threshold, and
/// a bullish candle. Short is the mirror image around the short threshold.
#[derive(Debug, Clone, Copy)]
pub struct EntrySignalDetector {
    rsi_long_threshold: f64,
    rsi_short_threshold: f64,
}

impl EntrySignalDetector {
    pub fn new(rsi_long_threshold: f64, rsi_short_threshold: f64) -> Self {
        Self {
            rsi_long_threshold,
            rsi_short_threshold,
        }
    }

    pub fn detect(&self, candle: &Candle, snapshot: &IndicatorSnapshot) -> Option<Side> {
        let long = candle.close > snapshot.ema
            && snapshot.rsi > self.rsi_long_threshold
            && snapshot.prev_rsi <= self.rsi_long_threshold
            && candle.is_bullish();
        if long {
            return Some(Side::Long);
        }

        let short = candle.close < snapshot.ema
            && snapshot.rsi < self.rsi_short_threshold
            && snapshot.prev_rsi >= self.rsi_short_threshold
            && candle.is_bearish();
        if short {
            return Some(Side::Short);
        }

        None
    }
}

impl Default for EntrySignalDetector {
    fn default() -> Self {
        Self::new(45.0, 55.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ema: f64, rsi: f64, prev_rsi: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            ema,
            rsi,
            prev_rsi,
            atr: 1.0,
        }
    }

    #[test]
    fn rsi_crossing_up_through_45_above_ema_is_a_long() {
        let candle = Candle::new(0, 100.0, 103.0, 99.5, 102.0, 1.0);
        let side = EntrySignalDetector::default().detect(&candle, &snapshot(95.0, 46.0, 44.0));
        assert_eq!(side, Some(Side::Long));
    }

    #[test]
    fn previous_rsi_exactly_at_threshold_still_counts_as_a_cross() {
        let candle = Candle::new(0, 100.0, 103.0, 99.5, 102.0, 1.0);
        let side = EntrySignalDetector::default().detect(&candle, &snapshot(95.0, 46.0, 45.0));
        assert_eq!(side, Some(Side::Long));
    }

    #[test]
    fn long_needs_every_condition() {
        let detector = EntrySignalDetector::default();
        let bullish = Candle::new(0, 100.0, 103.0, 99.5, 102.0, 1.0);
        let bearish = Candle::new(0, 103.0, 103.5, 101.0, 102.0, 1.0);

        // No cross: RSI was already above 45.
        assert_eq!(detector.detect(&bullish, &snapshot(95.0, 50.0, 47.0)), None);
        // Close below the EMA.
        assert_eq!(detector.detect(&bullish, &snapshot(105.0, 46.0, 44.0)), None);
        // Bearish candle.
        assert_eq!(detector.detect(&bearish, &snapshot(95.0, 46.0, 44.0)), None);
    }

    #[test]
    fn rsi_crossing_down_through_55_below_ema_is_a_short() {
        let detector = EntrySignalDetector::default();
        let bearish = Candle::new(0, 100.0, 100.5, 97.0, 98.0, 1.0);

        assert_eq!(detector.detect(&bearish, &snapshot(101.0, 54.0, 56.0)), Some(Side::Short));
        assert_eq!(detector.detect(&bearish, &snapshot(101.0, 54.0, 55.0)), Some(Side::Short));
        assert_eq!(detector.detect(&bearish, &snapshot(97.0, 54.0, 56.0)), None);
    }

    #[test]
    fn volatility_gate() {
        assert!(passes_volatility_gate(0.25, 100.0, 0.002));
        assert!(passes_volatility_gate(1.5, 100.0, 0.002));
        assert!(!passes_volatility_gate(0.19, 100.0, 0.002));
        assert!(!passes_volatility_gate(0.0, 100.0, 0.002));
        assert!(!passes_volatility_gate(-1.0, 100.0, 0.0));
        assert!(!passes_volatility_gate(f64::NAN, 100.0, 0.002));
    }
}
