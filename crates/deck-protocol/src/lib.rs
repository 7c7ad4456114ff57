//! Messages the keydeck core sends to whatever renders it.
//!
//! The core never touches widgets. It reports what changed and the host
//! redraws from the model.

use serde::{Deserialize, Serialize};

/// How a slot should be drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotFace {
    /// Slot index.
    pub slot: usize,
    /// Label shown on the slot.
    pub text: String,
    /// Fill color.
    pub fill: String,
    /// Border color.
    pub border: String,
    /// Hover color.
    pub hover: String,
    /// Image file, if any.
    pub image: Option<String>,
    /// True for the locked "return to root" control.
    pub locked: bool,
    /// True when the slot shows the root view's state.
    pub shared: bool,
}

/// Messages sent from the core to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum MsgToUi {
    /// A different view is now active. Carries every slot's face.
    ViewChanged {
        index: usize,
        name: String,
        slots: Vec<SlotFace>,
    },

    /// Some slots of the active view changed.
    SlotsChanged { slots: Vec<SlotFace> },

    /// View names or order changed.
    ViewsChanged { names: Vec<String> },

    /// A slot was selected for editing.
    Selected { slot: usize },

    /// A hotkey matched.
    HotkeyTriggered { slot: usize, combo: String },

    /// Status text for the user.
    Notify {
        kind: NotifyKind,
        title: String,
        text: String,
    },

    /// Clear any visible status text.
    ClearNotifications,
}

/// Severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum NotifyKind {
    Info,
    Warn,
    Error,
    Success,
}

/// Channel aliases for UI messages.
pub mod ipc {
    use super::MsgToUi;

    /// Sender half of the UI message channel.
    pub type UiTx = crossbeam_channel::Sender<MsgToUi>;
    /// Receiver half of the UI message channel.
    pub type UiRx = crossbeam_channel::Receiver<MsgToUi>;

    /// Create an unbounded UI message channel.
    pub fn ui_channel() -> (UiTx, UiRx) {
        crossbeam_channel::unbounded()
    }
}
