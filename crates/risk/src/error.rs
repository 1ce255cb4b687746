// In crates/risk/src/error.rs

use core_types::Side;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Cannot enter {requested:?}: a {open:?} position is already open")]
    PositionAlreadyOpen { open: Side, requested: Side },

    #[error("Invalid risk parameters: {0}")]
    InvalidParameters(String),
}

pub type Result<T> = std::result::Result<T, Error>;
