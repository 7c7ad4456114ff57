use std::{io, result::Result as StdResult};

use thiserror::Error;

use crate::ServiceError;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the keydeck engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The slot's action needs an argument and has none.
    #[error("Slot {slot} is not configured")]
    NotConfigured {
        /// Slot index.
        slot: usize,
    },

    /// Two live slots of the active view would share a hotkey.
    #[error("Hotkey {combo} is already in use")]
    HotkeyConflict {
        /// Canonical encoding of the contested combination.
        combo: String,
    },

    /// An open-view slot points past the last view.
    #[error("Slot {slot} opens view {target}, which does not exist")]
    DanglingReference {
        /// Slot index.
        slot: usize,
        /// The stored target.
        target: usize,
    },

    /// A hotkey table has more entries than the listener can number.
    #[error("Too many hotkeys to bind: {count}")]
    TooManyBindings {
        /// Entries in the table.
        count: usize,
    },

    /// The operation is only allowed while the root view is active.
    #[error("Only available in the root view")]
    NotInRoot,

    /// An external collaborator failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Errors originating from the hotkey listener.
    #[error("Hotkey listener error: {0}")]
    Hotkey(#[from] deck_hotkey::Error),

    /// Rejected model mutation.
    #[error(transparent)]
    Model(#[from] deck_model::Error),

    /// Layout or save file failure.
    #[error(transparent)]
    Config(#[from] deck_config::Error),

    /// Macro playback or text typing failed.
    #[error("Macro failed: {0}")]
    Macro(#[from] macroplay::Error),

    /// I/O failure while spawning a worker or reading media.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The UI event channel has been closed by the receiver.
    #[error("UI channel closed")]
    ChannelClosed,

    /// The UI task queue stayed full past the handoff timeout.
    #[error("UI queue full")]
    QueueFull,
}
