//! Deck Engine
//!
//! The deck engine crate owns the running keydeck:
//! - keeps the view set and switches the active view
//! - derives and installs the hotkey table of the active view
//! - runs actions against external collaborators (media, scenes, browser,
//!   window manager) and macro playback
//! - funnels every state change onto the UI thread
//!
//! Threads: the UI thread drives [`App`]; the hotkey listener and
//! short-lived workers run actions and hand results back through a bounded
//! queue of [`UiTask`]s.

mod app;
mod error;
mod handoff;
mod hotkeys;
mod invoker;
mod notification;
mod services;
mod shuffle;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use app::{App, AppDeps, AppOptions, EditorInfo, EditorSession};
pub use error::{Error, Result};
pub use handoff::{UiHandle, UiQueue, UiTask, ui_queue};
pub use hotkeys::{HotkeyEngine, HotkeyTable, TableEntry};
pub use invoker::{Invoker, MULTI_STEP_DELAY, scene_colors};
pub use notification::NotificationDispatcher;
pub use services::{
    MediaPlayer, SceneClient, ServiceError, ServiceResult, Services, UrlOpener, WindowMover,
};
pub use shuffle::playlist;
