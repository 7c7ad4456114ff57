//! Error types and result alias for the deck-hotkey crate.
use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type used throughout this crate.
pub type Result<T> = StdResult<T, Error>;

/// Error variants produced by this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// The listener thread could not be spawned.
    #[error("Listener failed to start: {0}")]
    ListenerStart(String),
    /// The key event source has shut down.
    #[error("Key source closed")]
    SourceClosed,
    /// The underlying OS hook reported an error.
    #[error("OS error: {0}")]
    OsError(String),
    /// Two bindings in one table encode to the same combination.
    #[error("Duplicate binding for {0}")]
    Duplicate(String),
}
