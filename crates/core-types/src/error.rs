// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unsupported timeframe: {0}")]
    InvalidTimeframe(String),
}

pub type Result<T> = std::result::Result<T, Error>;
