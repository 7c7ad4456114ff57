//! Key event sources feeding the listener thread.
//!
//! The OS keyboard hook is an external collaborator. Anything that can
//! produce [`KeyEvent`]s implements [`KeySource`]; the listener thread
//! polls it with a short timeout so that it can observe stop requests.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use deck_keycode::Chord;

use crate::{Error, EventKind, Result};

/// A single physical key transition as reported by the OS hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// The combination held when the transition happened.
    pub chord: Chord,
    /// Press or release.
    pub kind: EventKind,
    /// True for OS auto-repeat KeyDown events.
    pub repeat: bool,
    /// When the transition reached the hook. Suspension is judged against
    /// this, not against when the listener dequeues the event.
    pub at: Instant,
}

impl KeyEvent {
    /// An initial (non-repeat) KeyDown for `chord`.
    pub fn down(chord: Chord) -> Self {
        Self {
            chord,
            kind: EventKind::KeyDown,
            repeat: false,
            at: Instant::now(),
        }
    }

    /// A KeyUp for `chord`.
    pub fn up(chord: Chord) -> Self {
        Self {
            chord,
            kind: EventKind::KeyUp,
            repeat: false,
            at: Instant::now(),
        }
    }
}

/// Producer of key events consumed by the listener thread.
pub trait KeySource: Send + Sync {
    /// Wait up to `timeout` for the next event.
    ///
    /// Returns `Ok(None)` on timeout and [`Error::SourceClosed`] once the
    /// source will never produce another event.
    fn next_event(&self, timeout: Duration) -> Result<Option<KeyEvent>>;
}

/// Channel-backed [`KeySource`].
///
/// Events are pushed through the paired [`KeyFeed`]. Used by the headless
/// runner and by tests.
pub struct ChannelSource {
    rx: Receiver<KeyEvent>,
}

/// Sending half of a [`ChannelSource`].
#[derive(Clone)]
pub struct KeyFeed {
    tx: Sender<KeyEvent>,
}

impl KeyFeed {
    /// Push an event. Returns false if the source has been dropped.
    pub fn send(&self, ev: KeyEvent) -> bool {
        self.tx.send(ev).is_ok()
    }

    /// Push a full press: an initial KeyDown followed by its KeyUp.
    pub fn tap(&self, chord: Chord) -> bool {
        self.send(KeyEvent::down(chord.clone())) && self.send(KeyEvent::up(chord))
    }
}

impl ChannelSource {
    /// Create a connected feed/source pair.
    pub fn new() -> (KeyFeed, Self) {
        let (tx, rx) = unbounded();
        (KeyFeed { tx }, Self { rx })
    }
}

impl KeySource for ChannelSource {
    fn next_event(&self, timeout: Duration) -> Result<Option<KeyEvent>> {
        match self.rx.recv_timeout(timeout) {
            Ok(ev) => Ok(Some(ev)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Error::SourceClosed),
        }
    }
}
