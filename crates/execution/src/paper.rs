// In crates/execution/src/paper.rs

use crate::types::{PositionBook, PositionView, to_price};
use crate::{Error, Executor, Result};
use app_config::SimulationSettings;
use async_trait::async_trait;
use core_types::{Side, Signal, Symbol};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Simulated fills at the signal price, worsened by slippage and charged a taker fee.
///
/// Entries are ignored while a position is open and exits are ignored while flat.
pub struct PaperExecutor {
    symbol: Symbol,
    quantity: Decimal,
    taker_fee: Decimal,
    slippage: Decimal,
    book: PositionBook,
}

impl PaperExecutor {
    pub fn new(symbol: Symbol, quantity: Decimal, settings: &SimulationSettings) -> Result<Self> {
        let rate = |name: &str, value: f64| {
            Decimal::try_from(value)
                .map_err(|_| Error::InvalidSettings(format!("{name} is not a valid rate: {value}")))
        };
        Ok(Self {
            symbol,
            quantity,
            taker_fee: rate("taker_fee", settings.taker_fee)?,
            slippage: rate("slippage_percent", settings.slippage_percent)?,
            book: PositionBook::default(),
        })
    }

    /// Fill price for an order on `side`. Slippage always works against us.
    fn fill_price(&self, side: Side, price: Decimal) -> Decimal {
        match side {
            Side::Long => price * (dec!(1) + self.slippage),
            Side::Short => price * (dec!(1) - self.slippage),
        }
    }

    fn fee(&self, fill_price: Decimal) -> Decimal {
        self.quantity * fill_price * self.taker_fee
    }

    fn process_entry(&mut self, side: Side, price: Decimal) {
        if let Some(open) = self.book.open_trade() {
            tracing::debug!(open = ?open.side, requested = ?side, "Position already open, entry ignored.");
            return;
        }
        let fill = self.fill_price(side, price);
        let fee = self.fee(fill);
        self.book.open(side, fill, self.quantity, fee);
        tracing::info!(symbol = %self.symbol, ?side, %fill, %fee, "PAPER: position opened.");
    }

    fn process_close(&mut self, price: Decimal) {
        let Some(open) = self.book.open_trade().copied() else {
            tracing::debug!("No open position, exit ignored.");
            return;
        };
        // Closing trades the opposite side.
        let closing_side = match open.side {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        };
        let fill = self.fill_price(closing_side, price);
        let fee = self.fee(fill);
        if let Some(pnl) = self.book.close(fill, fee) {
            tracing::info!(symbol = %self.symbol, side = ?open.side, %fill, %pnl, "PAPER: position closed.");
        }
    }
}

#[async_trait]
impl Executor for PaperExecutor {
    fn name(&self) -> &'static str {
        "PaperExecutor"
    }

    async fn on_signal(&mut self, signal: Signal, price: f64) -> Result<()> {
        let price = to_price(price)?;
        match signal {
            Signal::Buy => self.process_entry(Side::Long, price),
            Signal::Sell => self.process_entry(Side::Short, price),
            Signal::Exit => self.process_close(price),
            Signal::Hold => {}
        }
        self.book.mark(price);
        Ok(())
    }

    fn state(&self) -> PositionView {
        self.book.view()
    }
}
