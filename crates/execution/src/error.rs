// In crates/execution/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Execution failed: {reason}")]
    ExecutionFailed { reason: String },

    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Invalid execution settings: {0}")]
    InvalidSettings(String),

    #[error("API client error: {0}")]
    ApiClientError(#[from] api_client::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
