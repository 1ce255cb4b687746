// In crates/execution/src/live.rs

use crate::types::{PositionBook, PositionView, to_price};
use crate::{Error, Executor, Result};
use api_client::{ApiClient, OrderResult};
use async_trait::async_trait;
use core_types::{Side, Signal, Symbol};
use rust_decimal::Decimal;

/// Where live market orders go. Implemented by the Bybit `ApiClient`.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn place_market_order(
        &self,
        symbol: &Symbol,
        side: Side,
        quantity: Decimal,
        reduce_only: bool,
    ) -> api_client::Result<OrderResult>;
}

#[async_trait]
impl OrderGateway for ApiClient {
    async fn place_market_order(
        &self,
        symbol: &Symbol,
        side: Side,
        quantity: Decimal,
        reduce_only: bool,
    ) -> api_client::Result<OrderResult> {
        ApiClient::place_market_order(self, symbol, side, quantity, reduce_only).await
    }
}

/// An executor that places real market orders on the exchange.
///
/// Bookkeeping is updated only after the exchange accepts an order, so a
/// rejected order leaves the position view untouched.
///
/// The order-create response carries only the order id, so the book records
/// the signal price (the candle close) as the fill and ignores fees. Entry
/// price and P&L in the position view are estimates; the exchange's own
/// position (`bot balance`) is authoritative.
pub struct LiveExecutor<G = ApiClient> {
    gateway: G,
    symbol: Symbol,
    quantity: Decimal,
    book: PositionBook,
}

impl<G: OrderGateway> LiveExecutor<G> {
    pub fn new(gateway: G, symbol: Symbol, quantity: Decimal) -> Self {
        Self {
            gateway,
            symbol,
            quantity,
            book: PositionBook::default(),
        }
    }

    async fn process_entry(&mut self, side: Side, price: Decimal) -> Result<()> {
        if let Some(open) = self.book.open_trade() {
            tracing::debug!(open = ?open.side, requested = ?side, "Position already open, entry ignored.");
            return Ok(());
        }

        let order = self.place(side, false).await?;
        self.book.open(side, price, self.quantity, Decimal::ZERO);
        tracing::info!(symbol = %self.symbol, ?side, %price, order_id = %order.order_id, "LIVE: position opened.");
        Ok(())
    }

    async fn process_close(&mut self, price: Decimal) -> Result<()> {
        let Some(open) = self.book.open_trade().copied() else {
            tracing::debug!("No open position, exit ignored.");
            return Ok(());
        };

        let closing_side = match open.side {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        };
        let order = self.place(closing_side, true).await?;
        let pnl = self.book.close(price, Decimal::ZERO).unwrap_or_default();
        tracing::info!(symbol = %self.symbol, side = ?open.side, %price, %pnl, order_id = %order.order_id, "LIVE: position closed.");
        Ok(())
    }

    async fn place(&self, side: Side, reduce_only: bool) -> Result<OrderResult> {
        self.gateway
            .place_market_order(&self.symbol, side, self.quantity, reduce_only)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, ?side, reduce_only, "Failed to place market order.");
                Error::from(e)
            })
    }
}

#[async_trait]
impl<G: OrderGateway> Executor for LiveExecutor<G> {
    fn name(&self) -> &'static str {
        "LiveExecutor"
    }

    async fn on_signal(&mut self, signal: Signal, price: f64) -> Result<()> {
        let price = to_price(price)?;
        let result = match signal {
            Signal::Buy => self.process_entry(Side::Long, price).await,
            Signal::Sell => self.process_entry(Side::Short, price).await,
            Signal::Exit => self.process_close(price).await,
            Signal::Hold => Ok(()),
        };
        self.book.mark(price);
        result
    }

    fn state(&self) -> PositionView {
        self.book.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::PositionSide;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockGateway {
        reject: bool,
        orders: Mutex<Vec<(Side, bool)>>,
    }

    #[async_trait]
    impl OrderGateway for MockGateway {
        async fn place_market_order(
            &self,
            _symbol: &Symbol,
            side: Side,
            _quantity: Decimal,
            reduce_only: bool,
        ) -> api_client::Result<OrderResult> {
            if self.reject {
                return Err(api_client::Error::ApiError {
                    code: 110007,
                    msg: "ab not enough for new order".into(),
                });
            }
            self.orders.lock().unwrap().push((side, reduce_only));
            Ok(OrderResult {
                order_id: "order-1".into(),
                order_link_id: String::new(),
            })
        }
    }

    fn executor(reject: bool) -> LiveExecutor<MockGateway> {
        let gateway = MockGateway {
            reject,
            ..MockGateway::default()
        };
        LiveExecutor::new(gateway, Symbol("BTCUSDT".into()), dec!(0.01))
    }

    #[tokio::test]
    async fn exit_sends_a_reduce_only_order_on_the_opposite_side() {
        let mut executor = executor(false);

        executor.on_signal(Signal::Sell, 200.0).await.unwrap();
        executor.on_signal(Signal::Exit, 190.0).await.unwrap();

        let orders = executor.gateway.orders.lock().unwrap().clone();
        assert_eq!(orders, vec![(Side::Short, false), (Side::Long, true)]);
        assert_eq!(executor.state().side, PositionSide::Flat);
        assert_eq!(executor.state().realized_pnl, dec!(0.1));
    }

    #[tokio::test]
    async fn rejected_order_leaves_the_book_unchanged() {
        let mut executor = executor(true);

        let result = executor.on_signal(Signal::Buy, 200.0).await;

        assert!(matches!(result, Err(Error::ApiClientError(_))));
        assert_eq!(executor.state().side, PositionSide::Flat);
    }

    #[tokio::test]
    async fn book_records_the_signal_price_as_the_fill() {
        let mut executor = executor(false);

        executor.on_signal(Signal::Buy, 200.5).await.unwrap();
        assert_eq!(executor.state().entry_price, Some(dec!(200.5)));

        executor.on_signal(Signal::Exit, 210.5).await.unwrap();
        let state = executor.state();
        assert_eq!(state.entry_price, None);
        // (210.5 - 200.5) * 0.01, no fee deducted.
        assert_eq!(state.realized_pnl, dec!(0.1));
    }

    #[tokio::test]
    async fn hold_and_repeated_entries_place_no_orders() {
        let mut executor = executor(false);

        executor.on_signal(Signal::Hold, 200.0).await.unwrap();
        executor.on_signal(Signal::Buy, 200.0).await.unwrap();
        executor.on_signal(Signal::Buy, 201.0).await.unwrap();

        assert_eq!(executor.gateway.orders.lock().unwrap().len(), 1);
        assert_eq!(executor.state().unrealized_pnl, dec!(0.01));
    }
}
