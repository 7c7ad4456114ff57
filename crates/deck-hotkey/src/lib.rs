//! Global hotkey listener with rebuildable binding tables.
//!
//! A [`Manager`] owns at most one listener thread. The thread pulls
//! [`KeyEvent`]s from a [`KeySource`], matches them against the current
//! binding table, and invokes a [`HotkeyHandler`] for every match.
//!
//! Rebuilding is stop-then-start: [`Manager::start`] validates the new table,
//! joins the previous listener, and only then spawns the replacement. While a
//! [`SuspendGuard`] is alive no events are emitted, which is how synthesized
//! macro keystrokes avoid re-triggering bindings.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
    time::Instant,
};

use deck_keycode::Chord;
use parking_lot::Mutex;
use tracing::{debug, warn};

mod error;
mod listener;
mod policy;
mod source;

pub use error::{Error, Result};
pub use source::{ChannelSource, KeyEvent, KeyFeed, KeySource};

/// Kind of key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Key pressed.
    KeyDown,
    /// Key released.
    KeyUp,
}

/// A matched hotkey delivered to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Caller-assigned binding id.
    pub id: u32,
    /// The bound combination.
    pub chord: Chord,
    /// Transition kind. Always `KeyDown` with the default policy.
    pub kind: EventKind,
    /// True for OS auto-repeat.
    pub repeat: bool,
}

/// One entry of a binding table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Caller-assigned id, echoed back in [`Event::id`].
    pub id: u32,
    /// The combination to listen for.
    pub chord: Chord,
}

/// Receives matched hotkeys on the listener thread.
pub trait HotkeyHandler: Send + Sync {
    /// Called once per matched KeyDown.
    fn on_hotkey(&self, ev: Event);
}

impl<F> HotkeyHandler for F
where
    F: Fn(Event) + Send + Sync,
{
    fn on_hotkey(&self, ev: Event) {
        self(ev)
    }
}

/// Immutable lookup table used by one listener generation.
pub(crate) struct Registry {
    by_code: HashMap<String, (u32, Chord)>,
}

impl Registry {
    pub(crate) fn build(bindings: &[Binding]) -> Result<Self> {
        let mut by_code = HashMap::with_capacity(bindings.len());
        for b in bindings {
            let code = b.chord.encode();
            if by_code.contains_key(&code) {
                return Err(Error::Duplicate(code));
            }
            by_code.insert(code, (b.id, b.chord.clone()));
        }
        Ok(Self { by_code })
    }

    pub(crate) fn lookup(&self, chord: &Chord) -> Option<(u32, &Chord)> {
        self.by_code.get(&chord.encode()).map(|(id, c)| (*id, c))
    }

    fn chords(&self) -> Vec<Chord> {
        let mut v: Vec<Chord> = self.by_code.values().map(|(_, c)| c.clone()).collect();
        v.sort();
        v
    }
}

/// Open and most recently closed suspension windows.
#[derive(Default)]
struct Windows {
    /// Start of the window currently open.
    open: Option<Instant>,
    /// The last closed window, `(start, end)`.
    last: Option<(Instant, Instant)>,
}

/// Suspension state shared by the manager, its listeners and suspenders.
#[derive(Default)]
pub(crate) struct Shared {
    /// Number of live guards.
    suspend: AtomicUsize,
    /// Suspension windows, for events dequeued late.
    windows: Mutex<Windows>,
}

impl Shared {
    pub(crate) fn suspended(&self) -> bool {
        self.suspend.load(Ordering::SeqCst) > 0
    }

    /// True if an event that arrived at `at` must not fire: either
    /// emission is suspended now, or the event arrived during the last
    /// suspension and is only being dequeued after it ended.
    pub(crate) fn suppressed(&self, at: Instant) -> bool {
        if self.suspended() {
            return true;
        }
        self.windows
            .lock()
            .last
            .is_some_and(|(start, end)| at >= start && at <= end)
    }
}

/// Cloneable handle that pauses hotkey emission.
#[derive(Clone)]
pub struct Suspender {
    shared: Arc<Shared>,
}

impl Suspender {
    /// Suspend hotkey emission until the returned guard is dropped.
    ///
    /// Guards nest; emission resumes when the last one is dropped.
    pub fn suspend(&self) -> SuspendGuard {
        let mut w = self.shared.windows.lock();
        let depth = self.shared.suspend.fetch_add(1, Ordering::SeqCst) + 1;
        if depth == 1 {
            w.open = Some(Instant::now());
        }
        drop(w);
        debug!(depth, "hotkeys_suspended");
        SuspendGuard {
            shared: self.shared.clone(),
        }
    }

    /// True while at least one guard is alive.
    pub fn is_suspended(&self) -> bool {
        self.shared.suspended()
    }
}

impl fmt::Debug for Suspender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suspender")
            .field("suspended", &self.is_suspended())
            .finish()
    }
}

/// RAII guard returned by [`Suspender::suspend`].
#[must_use = "hotkeys resume as soon as the guard is dropped"]
pub struct SuspendGuard {
    shared: Arc<Shared>,
}

impl Drop for SuspendGuard {
    fn drop(&mut self) {
        let mut w = self.shared.windows.lock();
        let prev = self.shared.suspend.fetch_sub(1, Ordering::SeqCst);
        if prev == 1
            && let Some(start) = w.open.take()
        {
            w.last = Some((start, Instant::now()));
        }
        drop(w);
        debug!(depth = prev.saturating_sub(1), "hotkeys_resumed");
    }
}

struct Listener {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
    registry: Arc<Registry>,
}

impl Listener {
    fn shutdown(self) {
        self.stop.store(true, Ordering::SeqCst);
        if self.handle.thread().id() == thread::current().id() {
            // Stopping from inside a handler: the loop exits after it returns.
            debug!("listener_stop_from_own_thread");
            return;
        }
        if self.handle.join().is_err() {
            warn!("listener_thread_panicked");
        }
    }
}

/// Owner of the listener thread and the shared suspension state.
pub struct Manager {
    source: Arc<dyn KeySource>,
    shared: Arc<Shared>,
    listener: Mutex<Option<Listener>>,
}

impl Manager {
    /// Create an idle manager reading from `source`.
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self {
            source,
            shared: Arc::new(Shared::default()),
            listener: Mutex::new(None),
        }
    }

    /// Install `bindings`, replacing any running listener.
    ///
    /// The table is validated before the old listener is touched, so a
    /// rejected table leaves the previous one active. An empty table stops
    /// listening altogether.
    pub fn start(&self, bindings: &[Binding], handler: Arc<dyn HotkeyHandler>) -> Result<()> {
        let registry = Arc::new(Registry::build(bindings)?);
        let mut slot = self.listener.lock();
        if let Some(old) = slot.take() {
            old.shutdown();
        }
        if bindings.is_empty() {
            debug!("listener_idle_no_bindings");
            return Ok(());
        }
        let stop = Arc::new(AtomicBool::new(false));
        let ctx = listener::Ctx {
            source: self.source.clone(),
            registry: registry.clone(),
            shared: self.shared.clone(),
            stop: stop.clone(),
            handler,
        };
        let handle = thread::Builder::new()
            .name("deck-hotkey-listener".into())
            .spawn(move || listener::run(ctx))
            .map_err(|e| Error::ListenerStart(e.to_string()))?;
        debug!(count = bindings.len(), "listener_started");
        *slot = Some(Listener {
            stop,
            handle,
            registry,
        });
        Ok(())
    }

    /// Stop the listener, if any, and wait for it to exit.
    pub fn stop(&self) {
        if let Some(old) = self.listener.lock().take() {
            old.shutdown();
            debug!("listener_stopped");
        }
    }

    /// True while a listener thread is running.
    pub fn is_listening(&self) -> bool {
        self.listener
            .lock()
            .as_ref()
            .is_some_and(|l| !l.handle.is_finished())
    }

    /// The combinations in the active table, sorted.
    pub fn bound(&self) -> Vec<Chord> {
        self.listener
            .lock()
            .as_ref()
            .map(|l| l.registry.chords())
            .unwrap_or_default()
    }

    /// A handle for pausing emission.
    pub fn suspender(&self) -> Suspender {
        Suspender {
            shared: self.shared.clone(),
        }
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        if let Some(old) = self.listener.get_mut().take() {
            old.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossbeam_channel::{Receiver, unbounded};

    use super::*;

    fn chord(s: &str) -> Chord {
        Chord::parse(s).expect("chord")
    }

    fn setup() -> (KeyFeed, Manager) {
        let (feed, src) = ChannelSource::new();
        (feed, Manager::new(Arc::new(src)))
    }

    fn collector() -> (Arc<dyn HotkeyHandler>, Receiver<Event>) {
        let (tx, rx) = unbounded();
        let h = move |ev: Event| {
            let _ = tx.send(ev);
        };
        (Arc::new(h), rx)
    }

    #[test]
    fn duplicate_bindings_rejected() {
        let (_feed, mgr) = setup();
        let (h, _rx) = collector();
        let bindings = [
            Binding {
                id: 1,
                chord: chord("ctrl+a"),
            },
            Binding {
                id: 2,
                chord: chord("<ctrl>+A"),
            },
        ];
        assert!(matches!(mgr.start(&bindings, h), Err(Error::Duplicate(_))));
        assert!(!mgr.is_listening());
    }

    #[test]
    fn matched_press_fires_once() {
        let (feed, mgr) = setup();
        let (h, rx) = collector();
        mgr.start(
            &[Binding {
                id: 7,
                chord: chord("ctrl+<f1>"),
            }],
            h,
        )
        .unwrap();
        feed.send(KeyEvent::down(chord("ctrl+<f1>")));
        feed.send(KeyEvent {
            repeat: true,
            ..KeyEvent::down(chord("ctrl+<f1>"))
        });
        feed.send(KeyEvent::up(chord("ctrl+<f1>")));
        feed.send(KeyEvent::down(chord("<f1>")));
        let ev = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(ev.id, 7);
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn suspended_listener_emits_nothing() {
        let (feed, mgr) = setup();
        let (h, rx) = collector();
        mgr.start(
            &[Binding {
                id: 1,
                chord: chord("a"),
            }],
            h,
        )
        .unwrap();
        let s = mgr.suspender();
        {
            let _g = s.suspend();
            assert!(s.is_suspended());
            feed.send(KeyEvent::down(chord("a")));
            assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        }
        assert!(!s.is_suspended());
        feed.send(KeyEvent::down(chord("a")));
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap().id, 1);
    }

    #[test]
    fn press_during_suspension_is_dropped_when_dequeued_late() {
        let (feed, mgr) = setup();
        let (h, rx) = collector();
        mgr.start(
            &[Binding {
                id: 1,
                chord: chord("a"),
            }],
            h,
        )
        .unwrap();
        let s = mgr.suspender();
        let queued = {
            let _g = s.suspend();
            KeyEvent::down(chord("a"))
        };
        assert!(!s.is_suspended());
        feed.send(queued);
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        feed.send(KeyEvent::down(chord("a")));
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap().id, 1);
    }

    #[test]
    fn rebuild_replaces_table() {
        let (feed, mgr) = setup();
        let (h, rx) = collector();
        mgr.start(
            &[Binding {
                id: 1,
                chord: chord("a"),
            }],
            h.clone(),
        )
        .unwrap();
        mgr.start(
            &[Binding {
                id: 2,
                chord: chord("b"),
            }],
            h,
        )
        .unwrap();
        assert_eq!(mgr.bound(), vec![chord("b")]);
        feed.send(KeyEvent::down(chord("a")));
        feed.send(KeyEvent::down(chord("b")));
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap().id, 2);
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn empty_table_stops_listening() {
        let (_feed, mgr) = setup();
        let (h, _rx) = collector();
        mgr.start(
            &[Binding {
                id: 1,
                chord: chord("a"),
            }],
            h.clone(),
        )
        .unwrap();
        assert!(mgr.is_listening());
        mgr.start(&[], h).unwrap();
        assert!(!mgr.is_listening());
        assert!(mgr.bound().is_empty());
    }
}
