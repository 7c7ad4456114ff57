//! Hotkey tables for the active view.
//!
//! A table is derived from the active view's live slots and installed as a
//! whole: the listener is stopped and restarted with the new table, never
//! edited in place. Each table carries the actions and arguments its slots
//! had when it was built, so a press the old listener accepted is run to
//! completion even if the table is replaced meanwhile.
//!
//! The listener thread never runs an action itself. Actions go to a worker,
//! or to the UI thread when they need it.

use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use deck_hotkey::{Binding, Event, HotkeyHandler, KeySource, Manager, Suspender};
use deck_keycode::Chord;
use deck_model::{ActionKind, Argument, ViewSet};
use deck_protocol::MsgToUi;
use tracing::{debug, trace, warn};

use crate::{Error, Invoker, Result, UiHandle, UiTask};

/// One bound slot, with the action it ran when the table was built.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    /// Slot index.
    pub slot: usize,
    /// Bound combination.
    pub chord: Chord,
    /// Action at build time.
    pub kind: ActionKind,
    /// Argument at build time.
    pub argument: Argument,
}

/// Hotkeys for one view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HotkeyTable {
    /// View the table was built from.
    view: usize,
    /// Name of that view, for routing results back to it.
    view_name: String,
    /// Entries in slot order.
    entries: Vec<TableEntry>,
}

impl HotkeyTable {
    /// Live slots of `view` that carry a hotkey.
    fn candidates(views: &ViewSet, view: usize) -> Result<Vec<TableEntry>> {
        Ok(views
            .resolved(view)?
            .into_iter()
            .enumerate()
            .filter(|(_, b)| !b.is_inert())
            .filter_map(|(slot, b)| {
                b.hotkey().map(|chord| TableEntry {
                    slot,
                    chord: chord.clone(),
                    kind: b.action(),
                    argument: b.argument().clone(),
                })
            })
            .collect())
    }

    /// Build the table for `view`, rejecting any combination bound twice.
    pub fn build(views: &ViewSet, view: usize) -> Result<Self> {
        let entries = Self::candidates(views, view)?;
        let mut seen = HashSet::with_capacity(entries.len());
        for e in &entries {
            let combo = e.chord.encode();
            if !seen.insert(combo.clone()) {
                return Err(Error::HotkeyConflict { combo });
            }
        }
        let view_name = views.view(view)?.name().to_string();
        Ok(Self {
            view,
            view_name,
            entries,
        })
    }

    /// Build the table for `view`, keeping the first slot of every contested
    /// combination. Returns the table and the dropped combinations.
    pub fn build_lenient(views: &ViewSet, view: usize) -> Result<(Self, Vec<String>)> {
        let mut seen = HashSet::new();
        let mut dropped = Vec::new();
        let entries = Self::candidates(views, view)?
            .into_iter()
            .filter(|e| {
                let combo = e.chord.encode();
                let fresh = seen.insert(combo.clone());
                if !fresh {
                    dropped.push(combo);
                }
                fresh
            })
            .collect();
        let view_name = views.view(view)?.name().to_string();
        Ok((
            Self {
                view,
                view_name,
                entries,
            },
            dropped,
        ))
    }

    /// View the table belongs to.
    pub fn view(&self) -> usize {
        self.view
    }

    /// Bound slots in slot order.
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// Number of bound slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The canonical encodings of every bound combination.
    pub fn encoded(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.chord.encode()).collect()
    }

    /// Slot bound to `combo`, if any.
    pub fn slot_for(&self, combo: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.chord.encode() == combo)
            .map(|e| e.slot)
    }
}

/// Runs on the listener thread for one installed table.
struct Dispatch {
    /// View the table was built from.
    view: usize,
    /// Name of that view.
    view_name: String,
    /// Indexed by binding id.
    entries: Vec<TableEntry>,
    /// Action runner.
    invoker: Invoker,
    /// Handoff for actions that need the UI thread.
    ui: UiHandle,
}

impl HotkeyHandler for Dispatch {
    fn on_hotkey(&self, ev: Event) {
        let Some(entry) = usize::try_from(ev.id)
            .ok()
            .and_then(|i| self.entries.get(i))
        else {
            warn!(id = ev.id, "hotkey_unknown_id");
            return;
        };
        let combo = entry.chord.encode();
        debug!(slot = entry.slot, combo = %combo, "hotkey_fired");
        if self
            .invoker
            .notifier()
            .send(MsgToUi::HotkeyTriggered {
                slot: entry.slot,
                combo,
            })
            .is_err()
        {
            trace!("ui_gone");
        }
        let desc = entry.kind.descriptor();
        if desc.requires_argument && !entry.argument.is_set() {
            self.invoker
                .notifier()
                .report(desc.name, &Error::NotConfigured { slot: entry.slot });
            return;
        }
        if desc.needs_ui_thread {
            let task = UiTask::Invoke {
                view: self.view,
                slot: entry.slot,
                kind: entry.kind,
                argument: entry.argument.clone(),
            };
            if let Err(e) = self.ui.post(task) {
                warn!(slot = entry.slot, error = %e, "hotkey_handoff_failed");
            }
        } else if let Err(e) = self.invoker.spawn(
            self.view_name.clone(),
            entry.slot,
            entry.kind,
            entry.argument.clone(),
        ) {
            warn!(slot = entry.slot, error = %e, "hotkey_worker_failed");
            self.invoker.notifier().report(desc.name, &e);
        }
    }
}

/// Owns the listener and the installed table.
pub struct HotkeyEngine {
    /// Listener lifecycle.
    manager: Manager,
    /// The installed table.
    installed: HotkeyTable,
}

impl HotkeyEngine {
    /// An idle engine reading key events from `source`.
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self {
            manager: Manager::new(source),
            installed: HotkeyTable::default(),
        }
    }

    /// Handle for pausing hotkeys during macro playback.
    pub fn suspender(&self) -> Suspender {
        self.manager.suspender()
    }

    /// The installed table.
    pub fn installed(&self) -> &HotkeyTable {
        &self.installed
    }

    /// True while a listener thread is running.
    pub fn is_listening(&self) -> bool {
        self.manager.is_listening()
    }

    /// Canonical encodings the listener is matching.
    pub fn bound(&self) -> BTreeSet<String> {
        self.manager.bound().iter().map(Chord::encode).collect()
    }

    /// Replace the running table with `table`. On error the previous table
    /// keeps running.
    pub fn install(&mut self, table: HotkeyTable, invoker: &Invoker, ui: &UiHandle) -> Result<()> {
        let bindings = table
            .entries
            .iter()
            .enumerate()
            .map(|(id, e)| {
                let id = u32::try_from(id).map_err(|_| Error::TooManyBindings {
                    count: table.entries.len(),
                })?;
                Ok(Binding {
                    id,
                    chord: e.chord.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let handler = Arc::new(Dispatch {
            view: table.view,
            view_name: table.view_name.clone(),
            entries: table.entries.clone(),
            invoker: invoker.clone(),
            ui: ui.clone(),
        });
        self.manager.start(&bindings, handler)?;
        debug!(view = table.view, count = table.len(), "hotkeys_installed");
        self.installed = table;
        Ok(())
    }

    /// Stop listening.
    pub fn stop(&mut self) {
        self.manager.stop();
        self.installed = HotkeyTable::default();
    }
}

#[cfg(test)]
mod tests {
    use deck_config::Layout;
    use deck_model::ActionCatalog;

    use super::*;

    fn views() -> ViewSet {
        let layout = Layout::from_json_str(
            "pad",
            r#"{"<NUMPAD7>": {"x":0,"y":0,"modifier":"ctrl"},
                "<NUMPAD8>": {"x":1,"y":0,"modifier":"ctrl"},
                "<NUMPAD9>": {"x":2,"y":0,"modifier":"ctrl"}}"#,
            None,
        )
        .unwrap();
        ViewSet::from_layout(&layout)
    }

    fn live(vs: &mut ViewSet, slot: usize) {
        let cat = ActionCatalog::standard();
        vs.slot_mut(0, slot)
            .unwrap()
            .assign(&cat, ActionKind::StopMedia, None, 0)
            .unwrap();
    }

    #[test]
    fn only_live_slots_are_bound() {
        let mut vs = views();
        live(&mut vs, 1);
        let t = HotkeyTable::build(&vs, 0).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.slot_for("<ctrl>+<numpad8>"), Some(1));
    }

    #[test]
    fn build_is_idempotent() {
        let mut vs = views();
        live(&mut vs, 1);
        live(&mut vs, 2);
        let a = HotkeyTable::build(&vs, 0).unwrap();
        let b = HotkeyTable::build(&vs, 0).unwrap();
        assert_eq!(a.encoded(), b.encoded());
        assert_eq!(a, b);
    }

    #[test]
    fn collision_is_rejected_strictly_and_dropped_leniently() {
        let mut vs = views();
        live(&mut vs, 1);
        live(&mut vs, 2);
        let chord = Chord::parse("ctrl+numpad8").unwrap();
        vs.slot_mut(0, 2).unwrap().set_hotkey(Some(chord));
        match HotkeyTable::build(&vs, 0) {
            Err(Error::HotkeyConflict { combo }) => assert_eq!(combo, "<ctrl>+<numpad8>"),
            other => panic!("unexpected {other:?}"),
        }
        let (t, dropped) = HotkeyTable::build_lenient(&vs, 0).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.entries()[0].slot, 1);
        assert_eq!(dropped, vec!["<ctrl>+<numpad8>".to_string()]);
    }

    #[test]
    fn order_of_modifiers_does_not_matter() {
        let a = Chord::parse("shift+ctrl+f1").unwrap();
        let b = Chord::parse("ctrl+shift+f1").unwrap();
        assert_eq!(a.encode(), b.encode());
    }
}
