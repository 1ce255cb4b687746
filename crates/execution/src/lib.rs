// In crates/execution/src/lib.rs

use async_trait::async_trait;
use core_types::Signal;

pub mod error;
pub mod live;
pub mod paper;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use live::{LiveExecutor, OrderGateway};
pub use paper::PaperExecutor;
pub use types::{PositionBook, PositionView};

/// The universal interface for an execution handler.
///
/// An `Executor` turns strategy signals into positions, either simulated or on
/// a live exchange, and keeps its own view of the resulting position. Its state
/// is independent of the strategy's: an error here never changes what the
/// strategy believes it holds.
#[async_trait]
pub trait Executor: Send {
    /// The name of the executor (e.g., "PaperExecutor", "LiveExecutor").
    fn name(&self) -> &'static str;

    /// Acts on a signal at the given price. `Hold` only marks the price.
    async fn on_signal(&mut self, signal: Signal, price: f64) -> Result<()>;

    /// The executor's current position.
    fn state(&self) -> PositionView;
}
