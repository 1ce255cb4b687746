// In crates/strategies/src/lib.rs

use core_types::{Candle, PositionSide, Signal};

pub mod ema_rsi_atr;
pub mod entry;
pub mod error;
pub mod factory;
pub mod indicators;
pub mod types;
pub mod window;

pub use ema_rsi_atr::EmaRsiAtr;
pub use error::{Error, Result};
pub use window::CandleWindow;

/// The universal interface for a trading strategy.
///
/// A strategy consumes one closed-or-forming candle at a time and turns it into
/// a `Signal`. It is a stateful entity: it keeps its own candle history and the
/// state of any position it has opened across calls.
pub trait Strategy {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    /// Feeds the next candle and returns the decision for it.
    fn on_candle(&mut self, candle: Candle) -> Signal;

    /// Seeds the strategy's history without producing any decisions.
    fn warm_up(&mut self, _history: &[Candle]) {}

    /// The side of the position the strategy believes it holds.
    fn position_side(&self) -> PositionSide;
}
