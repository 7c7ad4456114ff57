//! Injector that records events instead of posting them.

use deck_hotkey::Suspender;
use deck_keycode::KeyOrModifier;
use parking_lot::Mutex;

use crate::{Error, Injector, Result};

/// One recorded injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injected {
    /// Key pressed.
    Press(KeyOrModifier),
    /// Key released.
    Release(KeyOrModifier),
    /// Text character typed.
    Char(char),
}

#[derive(Default)]
struct State {
    events: Vec<Injected>,
    fail_on: Option<KeyOrModifier>,
    observe: Option<Suspender>,
    unsuspended: usize,
}

/// Records every injected event. Optionally fails on one key and notes
/// whether hotkeys were suspended when each event arrived.
#[derive(Default)]
pub struct RecordingInjector {
    state: Mutex<State>,
}

impl RecordingInjector {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every press of `key` fail.
    pub fn fail_on(&self, key: KeyOrModifier) {
        self.state.lock().fail_on = Some(key);
    }

    /// Check `suspender` on every injected event.
    pub fn observe_suspension(&self, suspender: Suspender) {
        self.state.lock().observe = Some(suspender);
    }

    /// True if every event so far arrived while hotkeys were suspended.
    pub fn all_suspended(&self) -> bool {
        self.state.lock().unsuspended == 0
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<Injected> {
        self.state.lock().events.clone()
    }

    fn push(&self, ev: Injected) {
        let mut st = self.state.lock();
        if st.observe.as_ref().is_some_and(|s| !s.is_suspended()) {
            st.unsuspended += 1;
        }
        st.events.push(ev);
    }
}

impl Injector for RecordingInjector {
    fn press(&self, key: KeyOrModifier) -> Result<()> {
        if self.state.lock().fail_on == Some(key) {
            return Err(Error::Inject(format!("{key:?}")));
        }
        self.push(Injected::Press(key));
        Ok(())
    }

    fn release(&self, key: KeyOrModifier) -> Result<()> {
        self.push(Injected::Release(key));
        Ok(())
    }

    fn type_char(&self, c: char) -> Result<()> {
        self.push(Injected::Char(c));
        Ok(())
    }
}
