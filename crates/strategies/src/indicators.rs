// In crates/strategies/src/indicators.rs

//! Full-series EMA, RSI and ATR over the candle window.
//!
//! Every function returns a vector aligned with its input. Indices before a
//! series' seed index hold `0.0` and must not be read. Inputs too short to
//! seed a series yield an all-zero vector.

use crate::window::CandleWindow;

/// Exponential moving average seeded with the SMA of the first `period` closes
/// (stored at index `period - 1`), smoothing factor `2 / (period + 1)`.
pub fn ema(closes: &[f64], period: usize) -> Vec<f64> {
    let mut ema = vec![0.0; closes.len()];
    if period == 0 || closes.len() < period {
        return ema;
    }

    ema[period - 1] = closes[..period].iter().sum::<f64>() / period as f64;
    let k = 2.0 / (period as f64 + 1.0);
    for i in period..closes.len() {
        ema[i] = (closes[i] - ema[i - 1]) * k + ema[i - 1];
    }
    ema
}

/// Relative strength index with Wilder's smoothing, seeded at index `period`.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut rsi = vec![0.0; closes.len()];
    if period == 0 || closes.len() <= period {
        return rsi;
    }

    let (mut up, mut down) = (0.0, 0.0);
    for i in 1..=period {
        let delta = closes[i] - closes[i - 1];
        if delta > 0.0 {
            up += delta;
        } else {
            down -= delta;
        }
    }
    let mut avg_up = up / period as f64;
    let mut avg_down = down / period as f64;
    rsi[period] = rsi_value(avg_up, avg_down);

    let weight = (period - 1) as f64;
    for i in period + 1..closes.len() {
        let delta = closes[i] - closes[i - 1];
        let (gain, loss) = if delta > 0.0 { (delta, 0.0) } else { (0.0, -delta) };
        avg_up = (avg_up * weight + gain) / period as f64;
        avg_down = (avg_down * weight + loss) / period as f64;
        rsi[i] = rsi_value(avg_up, avg_down);
    }
    rsi
}

fn rsi_value(avg_up: f64, avg_down: f64) -> f64 {
    if avg_down == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_up / avg_down)
    }
}

/// Average true range with Wilder's smoothing, seeded at index `period` with
/// the mean true range of indices `1..=period`.
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut atr = vec![0.0; n];
    if period == 0 || n <= period || highs.len() != n || lows.len() != n {
        return atr;
    }

    let true_range = |i: usize| {
        (highs[i] - lows[i])
            .max((highs[i] - closes[i - 1]).abs())
            .max((lows[i] - closes[i - 1]).abs())
    };

    atr[period] = (1..=period).map(true_range).sum::<f64>() / period as f64;
    let weight = (period - 1) as f64;
    for i in period + 1..n {
        atr[i] = (atr[i - 1] * weight + true_range(i)) / period as f64;
    }
    atr
}

/// Indicator values read at the newest index of the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub ema: f64,
    pub rsi: f64,
    /// RSI one bar earlier, used for crossover detection.
    pub prev_rsi: f64,
    pub atr: f64,
}

/// The three series computed over one window, index-aligned with its candles.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSeries {
    pub ema: Vec<f64>,
    pub rsi: Vec<f64>,
    pub atr: Vec<f64>,
}

impl IndicatorSeries {
    pub fn compute(window: &CandleWindow, ema_period: usize, rsi_period: usize, atr_period: usize) -> Self {
        let closes = window.closes();
        let highs = window.highs();
        let lows = window.lows();

        Self {
            ema: ema(&closes, ema_period),
            rsi: rsi(&closes, rsi_period),
            atr: atr(&highs, &lows, &closes, atr_period),
        }
    }

    /// The values at the last index, or `None` with fewer than two points.
    pub fn latest(&self) -> Option<IndicatorSnapshot> {
        let i = self.rsi.len().checked_sub(1)?;
        if i == 0 || self.ema.len() != self.rsi.len() || self.atr.len() != self.rsi.len() {
            return None;
        }
        Some(IndicatorSnapshot {
            ema: self.ema[i],
            rsi: self.rsi[i],
            prev_rsi: self.rsi[i - 1],
            atr: self.atr[i],
        })
    }
}
