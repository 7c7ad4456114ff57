//! Listener thread body.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tracing::{debug, trace, warn};

use crate::{Error, Event, HotkeyHandler, KeySource, Registry, Shared, policy};

/// Poll interval for observing stop requests.
const POLL: Duration = Duration::from_millis(25);

pub(crate) struct Ctx {
    pub(crate) source: Arc<dyn KeySource>,
    pub(crate) registry: Arc<Registry>,
    pub(crate) shared: Arc<Shared>,
    pub(crate) stop: Arc<AtomicBool>,
    pub(crate) handler: Arc<dyn HotkeyHandler>,
}

pub(crate) fn run(ctx: Ctx) {
    while !ctx.stop.load(Ordering::SeqCst) {
        let ev = match ctx.source.next_event(POLL) {
            Ok(Some(ev)) => ev,
            Ok(None) => continue,
            Err(Error::SourceClosed) => {
                debug!("key_source_closed");
                break;
            }
            Err(e) => {
                warn!(error = %e, "key_source_error");
                break;
            }
        };
        // A stop request may have raced the wait; never dispatch against a
        // table that is being replaced.
        if ctx.stop.load(Ordering::SeqCst) {
            break;
        }
        let matched = ctx.registry.lookup(&ev.chord);
        let suspended = ctx.shared.suppressed(ev.at);
        let d = policy::classify(suspended, matched.map(|(id, _)| id), ev.kind, ev.repeat);
        trace!(chord = %ev.chord, kind = ?ev.kind, repeat = ev.repeat, suspended, emit = d.emit, "listener_event");
        if d.emit
            && let Some((id, chord)) = matched
        {
            ctx.handler.on_hotkey(Event {
                id,
                chord: chord.clone(),
                kind: ev.kind,
                repeat: ev.repeat,
            });
        }
    }
    debug!("listener_exited");
}
