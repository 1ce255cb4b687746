// In crates/execution/src/types.rs

use crate::{Error, Result};
use core_types::{PositionSide, Side};
use rust_decimal::Decimal;
use std::fmt;

/// What an executor reports about its position after each signal.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionView {
    pub side: PositionSide,
    pub entry_price: Option<Decimal>,
    pub quantity: Decimal,
    pub unrealized_pnl: Decimal,
    pub realized_pnl: Decimal,
}

impl fmt::Display for PositionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entry_price {
            Some(entry) => write!(
                f,
                "{} {} @ {} (unrealized {}, realized {})",
                self.side, self.quantity, entry, self.unrealized_pnl, self.realized_pnl
            ),
            None => write!(f, "{} (realized {})", self.side, self.realized_pnl),
        }
    }
}

/// A position held by an executor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenTrade {
    pub side: Side,
    pub entry_price: Decimal,
    pub quantity: Decimal,
}

impl OpenTrade {
    /// Gross P&L if the position were closed at `price`.
    pub fn pnl_at(&self, price: Decimal) -> Decimal {
        let direction = match self.side {
            Side::Long => Decimal::ONE,
            Side::Short => Decimal::NEGATIVE_ONE,
        };
        (price - self.entry_price) * self.quantity * direction
    }
}

/// Flat/open bookkeeping shared by the executors: one position at a time,
/// realized P&L accumulated across trades, unrealized P&L marked to the last price.
#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    open: Option<OpenTrade>,
    realized_pnl: Decimal,
    last_price: Option<Decimal>,
}

impl PositionBook {
    pub fn open_trade(&self) -> Option<&OpenTrade> {
        self.open.as_ref()
    }

    pub fn is_flat(&self) -> bool {
        self.open.is_none()
    }

    pub fn realized_pnl(&self) -> Decimal {
        self.realized_pnl
    }

    pub fn mark(&mut self, price: Decimal) {
        self.last_price = Some(price);
    }

    /// Records a fill that opens a position. The entry fee is charged immediately.
    pub fn open(&mut self, side: Side, price: Decimal, quantity: Decimal, fee: Decimal) {
        self.open = Some(OpenTrade {
            side,
            entry_price: price,
            quantity,
        });
        self.realized_pnl -= fee;
        self.last_price = Some(price);
    }

    /// Records a fill that closes the position and returns its net P&L.
    pub fn close(&mut self, price: Decimal, fee: Decimal) -> Option<Decimal> {
        let trade = self.open.take()?;
        let net = trade.pnl_at(price) - fee;
        self.realized_pnl += net;
        self.last_price = Some(price);
        Some(net)
    }

    pub fn view(&self) -> PositionView {
        match &self.open {
            Some(trade) => PositionView {
                side: trade.side.into(),
                entry_price: Some(trade.entry_price),
                quantity: trade.quantity,
                unrealized_pnl: self.last_price.map(|p| trade.pnl_at(p)).unwrap_or_default(),
                realized_pnl: self.realized_pnl,
            },
            None => PositionView {
                side: PositionSide::Flat,
                entry_price: None,
                quantity: Decimal::ZERO,
                unrealized_pnl: Decimal::ZERO,
                realized_pnl: self.realized_pnl,
            },
        }
    }
}

/// Converts a candle price into a `Decimal`, rejecting non-finite and non-positive values.
pub fn to_price(price: f64) -> Result<Decimal> {
    if !(price.is_finite() && price > 0.0) {
        return Err(Error::InvalidPrice(price));
    }
    Decimal::try_from(price).map_err(|_| Error::InvalidPrice(price))
}
