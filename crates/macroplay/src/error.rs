//! Error types and result alias for the macroplay crate.
use std::result::Result as StdResult;

use thiserror::Error;

/// Crate-local `Result` alias.
pub type Result<T> = StdResult<T, Error>;

/// Errors that can occur while recording or playing a macro.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A step's modifier or key did not parse.
    #[error("Invalid macro step {index}: {modifier:?} + {key:?}")]
    InvalidStep {
        /// Zero-based step position.
        index: usize,
        /// Raw modifier text.
        modifier: String,
        /// Raw key text.
        key: String,
    },
    /// The injection primitive refused an event.
    #[error("Input injection failed: {0}")]
    Inject(String),
    /// The text contains a character the injector cannot type.
    #[error("Cannot type character {0:?}")]
    Untypable(char),
}
