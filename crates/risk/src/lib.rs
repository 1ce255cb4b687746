// In crates/risk/src/lib.rs

pub mod error;
pub mod position_manager;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use position_manager::PositionRiskManager;
pub use types::{ExitReason, OpenPosition, PositionState, RiskSettings};
