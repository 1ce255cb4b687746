// In crates/strategies/src/window.rs

use core_types::Candle;
use std::collections::VecDeque;

pub const DEFAULT_WINDOW_CAPACITY: usize = 300;

/// A bounded, insertion-ordered history of candles.
///
/// Appending past capacity evicts the oldest candle. Candles are never
/// re-sorted or removed otherwise.
#[derive(Debug, Clone)]
pub struct CandleWindow {
    candles: VecDeque<Candle>,
    capacity: usize,
}

impl CandleWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            candles: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn append(&mut self, candle: Candle) {
        self.candles.push_back(candle);
        if self.candles.len() > self.capacity {
            self.candles.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.candles.iter()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }
}

impl Default for CandleWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(ts: i64) -> Candle {
        let price = 100.0 + ts as f64;
        Candle::new(ts, price, price + 1.0, price - 1.0, price, 10.0)
    }

    #[test]
    fn appending_past_capacity_evicts_the_oldest() {
        let mut window = CandleWindow::default();
        for ts in 0..301 {
            window.append(candle(ts));
        }

        assert_eq!(window.len(), 300);
        let timestamps: Vec<i64> = window.iter().map(|c| c.timestamp).collect();
        assert_eq!(timestamps.first(), Some(&1));
        assert_eq!(timestamps.last(), Some(&300));
        assert!(timestamps.windows(2).all(|w| w[1] == w[0] + 1));
    }

    #[test]
    fn series_follow_insertion_order() {
        let mut window = CandleWindow::new(3);
        for ts in [5, 6, 7, 8] {
            window.append(candle(ts));
        }

        assert_eq!(window.closes(), vec![106.0, 107.0, 108.0]);
        assert_eq!(window.highs(), vec![107.0, 108.0, 109.0]);
        assert_eq!(window.lows(), vec![105.0, 106.0, 107.0]);
        assert_eq!(window.last().map(|c| c.timestamp), Some(8));
    }

    #[test]
    fn empty_window() {
        let window = CandleWindow::new(10);
        assert!(window.is_empty());
        assert_eq!(window.last(), None);
        assert!(window.closes().is_empty());
    }
}
