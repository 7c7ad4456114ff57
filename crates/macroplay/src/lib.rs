//! Keystroke macro playback.
//!
//! A [`Macro`] is an ordered list of chords. [`MacroPlayer::play`] presses
//! every key of a step (modifiers first), optionally holds, releases them in
//! reverse, then waits at least [`MIN_STEP_DELAY`] before the next step.
//!
//! Playback performs real key presses, so the hotkey listener is suspended
//! for the whole run via a [`deck_hotkey::SuspendGuard`]. The guard is
//! dropped on every exit path, including injection failures.
use std::{sync::Arc, thread, time::Duration};

use deck_hotkey::Suspender;
use deck_keycode::{Chord, KeyOrModifier};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

mod error;
#[cfg(any(test, feature = "test-utils"))]
mod recording;

pub use error::{Error, Result};
#[cfg(any(test, feature = "test-utils"))]
pub use recording::{Injected, RecordingInjector};

/// Lower bound on the pause after each macro step.
///
/// The injection primitive drops events that arrive faster than this; it is
/// not a tunable.
pub const MIN_STEP_DELAY: Duration = Duration::from_millis(100);

/// The input-injection primitive.
pub trait Injector: Send + Sync {
    /// Press a single key.
    fn press(&self, key: KeyOrModifier) -> Result<()>;
    /// Release a single key.
    fn release(&self, key: KeyOrModifier) -> Result<()>;
    /// Type one character of text, independent of the keyboard layout.
    fn type_char(&self, c: char) -> Result<()>;
}

/// Injector that only logs. Used when no OS injection backend is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogInjector;

impl Injector for LogInjector {
    fn press(&self, key: KeyOrModifier) -> Result<()> {
        debug!(?key, "inject_press");
        Ok(())
    }

    fn release(&self, key: KeyOrModifier) -> Result<()> {
        debug!(?key, "inject_release");
        Ok(())
    }

    fn type_char(&self, c: char) -> Result<()> {
        debug!(?c, "inject_char");
        Ok(())
    }
}

/// A recorded keystroke sequence.
///
/// Serialized as a list of `[modifier, key]` pairs, e.g.
/// `[["ctrl", "c"], ["", "<f5>"]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(String, String)>", into = "Vec<(String, String)>")]
pub struct Macro {
    steps: Vec<Chord>,
}

impl Macro {
    /// Validate and normalize a sequence of `(modifier, key)` pairs.
    ///
    /// Modifiers accept both hotkey names (`ctrl`) and macro editor names
    /// (`CONTROL`, `WIN`). Keys are normalized to their canonical token.
    pub fn record<I, M, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (M, K)>,
        M: AsRef<str>,
        K: AsRef<str>,
    {
        let steps = pairs
            .into_iter()
            .enumerate()
            .map(|(index, (m, k))| {
                Chord::from_pair(m.as_ref(), k.as_ref()).ok_or_else(|| Error::InvalidStep {
                    index,
                    modifier: m.as_ref().to_string(),
                    key: k.as_ref().to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }

    /// A macro from already-parsed chords.
    pub fn from_chords(steps: Vec<Chord>) -> Self {
        Self { steps }
    }

    /// The steps in playback order.
    pub fn steps(&self) -> &[Chord] {
        &self.steps
    }

    /// True when there is nothing to play.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The stored `(modifier, key)` pair form.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.steps.iter().map(Chord::to_pair).collect()
    }
}

impl TryFrom<Vec<(String, String)>> for Macro {
    type Error = Error;

    fn try_from(pairs: Vec<(String, String)>) -> Result<Self> {
        Self::record(pairs)
    }
}

impl From<Macro> for Vec<(String, String)> {
    fn from(m: Macro) -> Self {
        m.to_pairs()
    }
}

/// Plays macros and text through an [`Injector`].
#[derive(Clone)]
pub struct MacroPlayer {
    injector: Arc<dyn Injector>,
    suspender: Suspender,
    hold: Duration,
    step_delay: Duration,
}

impl MacroPlayer {
    /// A player that suspends hotkeys through `suspender` while it runs.
    pub fn new(injector: Arc<dyn Injector>, suspender: Suspender) -> Self {
        Self {
            injector,
            suspender,
            hold: Duration::ZERO,
            step_delay: MIN_STEP_DELAY,
        }
    }

    /// Hold every step's keys down for `hold` before releasing.
    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    /// Lengthen the pause after each step. Values below [`MIN_STEP_DELAY`]
    /// are raised to it.
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay.max(MIN_STEP_DELAY);
        self
    }

    /// The effective pause after each step.
    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    /// Play `m` on the calling thread. Blocks for the whole playback.
    pub fn play(&self, m: &Macro) -> Result<()> {
        let _guard = self.suspender.suspend();
        debug!(steps = m.steps.len(), "macro_play_start");
        for (i, step) in m.steps.iter().enumerate() {
            trace!(step = i, chord = %step, "macro_step");
            self.play_step(step)?;
            thread::sleep(self.step_delay);
        }
        debug!("macro_play_done");
        Ok(())
    }

    /// Type `text` character by character with hotkeys suspended.
    pub fn type_text(&self, text: &str) -> Result<()> {
        let _guard = self.suspender.suspend();
        debug!(len = text.chars().count(), "type_text");
        for c in text.chars() {
            self.injector.type_char(c)?;
        }
        Ok(())
    }

    fn play_step(&self, step: &Chord) -> Result<()> {
        let mut held: Vec<KeyOrModifier> = Vec::new();
        let mut outcome = Ok(());
        for k in step.keys() {
            match self.injector.press(k) {
                Ok(()) => held.push(k),
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }
        if outcome.is_ok() && !self.hold.is_zero() {
            thread::sleep(self.hold);
        }
        // Whatever went down must come back up, even after a failed press.
        for k in held.into_iter().rev() {
            if let Err(e) = self.injector.release(k) {
                warn!(?k, error = %e, "macro_release_failed");
                if outcome.is_ok() {
                    outcome = Err(e);
                }
            }
        }
        outcome
    }
}
