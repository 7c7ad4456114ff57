//! Handoff from background threads to the UI thread.
//!
//! The UI thread is the only writer of model state. Listener and worker
//! threads describe what they want done as a [`UiTask`] and post it on a
//! bounded queue; the UI loop drains the queue and applies the tasks.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender, bounded};
use deck_model::{ActionKind, Argument, StatePatch};
use tracing::{trace, warn};

use crate::{Error, Result};

/// How long a producer waits for room in a full queue.
const POST_TIMEOUT: Duration = Duration::from_secs(2);

/// Work that must run on the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum UiTask {
    /// Run an action that needs the UI thread. Carries the action and
    /// argument the slot had when the hotkey fired, so later edits to the
    /// slot do not change what runs.
    Invoke {
        /// View the slot belonged to.
        view: usize,
        /// Slot index.
        slot: usize,
        /// Action at dispatch time.
        kind: ActionKind,
        /// Argument at dispatch time.
        argument: Argument,
    },
    /// Make `view` the active view.
    OpenView {
        /// Target view.
        view: usize,
    },
    /// Apply an invocation result to the slot that produced it. Dropped
    /// when no view has that name any more.
    Patch {
        /// Name of the view the slot belongs to.
        view: String,
        /// Slot index.
        slot: usize,
        /// Changes to apply.
        patch: StatePatch,
    },
}

/// Cloneable producer side of the UI queue.
#[derive(Clone, Debug)]
pub struct UiHandle {
    /// Bounded sender.
    tx: Sender<UiTask>,
}

impl UiHandle {
    /// Post `task`, waiting briefly if the queue is full.
    pub fn post(&self, task: UiTask) -> Result<()> {
        trace!(?task, "ui_post");
        match self.tx.send_timeout(task, POST_TIMEOUT) {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(task)) => {
                warn!(?task, "ui_queue_full");
                Err(Error::QueueFull)
            }
            Err(SendTimeoutError::Disconnected(_)) => Err(Error::ChannelClosed),
        }
    }
}

/// Consumer side of the UI queue, owned by the UI loop.
#[derive(Debug)]
pub struct UiQueue {
    /// Bounded receiver.
    rx: Receiver<UiTask>,
}

impl UiQueue {
    /// Next task without blocking.
    pub fn try_next(&self) -> Option<UiTask> {
        self.rx.try_recv().ok()
    }

    /// Next task, waiting up to `timeout`. `Err` once every producer is gone.
    pub fn next_timeout(&self, timeout: Duration) -> Result<Option<UiTask>> {
        match self.rx.recv_timeout(timeout) {
            Ok(t) => Ok(Some(t)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Error::ChannelClosed),
        }
    }

    /// The raw receiver, for `select!` in host loops.
    pub fn receiver(&self) -> &Receiver<UiTask> {
        &self.rx
    }
}

/// Create a UI queue holding at most `capacity` pending tasks.
pub fn ui_queue(capacity: usize) -> (UiHandle, UiQueue) {
    let (tx, rx) = bounded(capacity.max(1));
    (UiHandle { tx }, UiQueue { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_arrive_in_order() {
        let (h, q) = ui_queue(4);
        h.post(UiTask::OpenView { view: 2 }).unwrap();
        h.post(UiTask::OpenView { view: 0 }).unwrap();
        assert_eq!(q.try_next(), Some(UiTask::OpenView { view: 2 }));
        assert_eq!(q.try_next(), Some(UiTask::OpenView { view: 0 }));
        assert_eq!(q.try_next(), None);
    }

    #[test]
    fn closed_queue_is_reported() {
        let (h, q) = ui_queue(1);
        drop(q);
        assert!(matches!(
            h.post(UiTask::OpenView { view: 0 }),
            Err(Error::ChannelClosed)
        ));
    }

    #[test]
    fn consumer_sees_disconnect() {
        let (h, q) = ui_queue(1);
        drop(h);
        assert!(matches!(
            q.next_timeout(Duration::from_millis(5)),
            Err(Error::ChannelClosed)
        ));
    }
}
