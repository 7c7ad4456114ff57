//! UI-thread application state.
//!
//! [`App`] is the single writer of the view set. Pointer clicks, editor
//! commands and tasks handed off from the listener or workers all end up
//! here, on the UI thread. Edits that can change the active hotkey table
//! are validated by building the new table before the edit is kept.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use deck_config::{DEFAULT_UI_QUEUE_CAPACITY, Layout, LayoutData, save_layout};
use deck_hotkey::KeySource;
use deck_keycode::Chord;
use deck_model::{
    ActionCatalog, ActionKind, Argument, ButtonState, ChangeSet, Decoded, Error as ModelError,
    ImageTable, PersistenceCodec, StatePatch, ViewSet, style::Colors,
};
use deck_protocol::{MsgToUi, SlotFace, ipc::UiTx};
use macroplay::{Injector, MacroPlayer};
use tracing::{debug, info, trace, warn};

use crate::{
    Error, HotkeyEngine, HotkeyTable, Invoker, NotificationDispatcher, Result, Services, UiHandle,
    UiQueue, UiTask, ui_queue,
};

/// Tunables for an [`App`].
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// How long each macro step holds its keys.
    pub macro_hold: Duration,
    /// Capacity of the UI handoff queue.
    pub ui_queue_capacity: usize,
    /// Where [`App::save`] writes. `None` disables saving.
    pub save_path: Option<PathBuf>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            macro_hold: Duration::ZERO,
            ui_queue_capacity: DEFAULT_UI_QUEUE_CAPACITY,
            save_path: None,
        }
    }
}

/// Host-provided collaborators.
pub struct AppDeps {
    /// Raw key events for the hotkey listener.
    pub source: Arc<dyn KeySource>,
    /// Input injection for macros and typing.
    pub injector: Arc<dyn Injector>,
    /// Media, scene, browser and window collaborators.
    pub services: Services,
    /// Channel to the host UI.
    pub ui: UiTx,
}

/// Which view is shown and which slot is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditorSession {
    /// Index of the active view.
    pub active_view: usize,
    /// Slot selected by the first click, if any.
    pub selected_slot: Option<usize>,
}

/// Everything the slot editor shows for one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorInfo {
    /// Slot index.
    pub slot: usize,
    /// Bound action.
    pub action: ActionKind,
    /// Action display name.
    pub action_name: &'static str,
    /// Current argument.
    pub argument: Argument,
    /// Canonical hotkey encoding.
    pub hotkey: Option<String>,
    /// Displayed text.
    pub text: String,
    /// Default text.
    pub default_text: String,
    /// Image file.
    pub image: Option<String>,
    /// True for the locked back control.
    pub locked: bool,
    /// True when the slot is shared from the root view.
    pub shared: bool,
    /// True when the shared flag may be changed here.
    pub can_share: bool,
    /// Stored target of an open-view slot that points past the last view.
    pub dangling: Option<usize>,
}

/// The application as seen from the UI thread.
pub struct App {
    /// Action registry for this run.
    catalog: Arc<ActionCatalog>,
    /// Physical layout.
    layout: Layout,
    /// All views; the single source of truth for slot state.
    views: ViewSet,
    /// Image file table.
    images: ImageTable,
    /// Slot selected by the first click.
    selected: Option<usize>,
    /// Listener and installed table.
    hotkeys: HotkeyEngine,
    /// Action runner shared with the listener and workers.
    invoker: Invoker,
    /// Producer side of the UI queue, handed to the listener.
    ui: UiHandle,
    /// Consumer side of the UI queue.
    queue: UiQueue,
    /// Status text and redraw messages.
    notifier: NotificationDispatcher,
    /// Save destination.
    save_path: Option<PathBuf>,
}

impl App {
    /// Assemble the app from loaded state and show the root view.
    pub fn new(
        catalog: ActionCatalog,
        layout: Layout,
        decoded: Decoded,
        deps: AppDeps,
        opts: AppOptions,
    ) -> Result<Self> {
        let catalog = Arc::new(catalog);
        let (ui, queue) = ui_queue(opts.ui_queue_capacity);
        let notifier = NotificationDispatcher::new(deps.ui);
        let hotkeys = HotkeyEngine::new(deps.source);
        let player = MacroPlayer::new(deps.injector, hotkeys.suspender()).with_hold(opts.macro_hold);
        let invoker = Invoker::new(
            catalog.clone(),
            deps.services,
            player,
            ui.clone(),
            notifier.clone(),
        );
        for issue in &decoded.report.issues {
            if notifier.send_warn("Load", issue.to_string()).is_err() {
                trace!("ui_gone");
            }
        }
        let mut app = Self {
            catalog,
            layout,
            views: decoded.views,
            images: decoded.images,
            selected: None,
            hotkeys,
            invoker,
            ui,
            queue,
            notifier,
            save_path: opts.save_path,
        };
        app.activate(0)?;
        info!(
            layout = app.layout.name(),
            views = app.views.len(),
            "app_started"
        );
        Ok(app)
    }

    // ----- accessors -----

    /// All views.
    pub fn views(&self) -> &ViewSet {
        &self.views
    }

    /// The image table.
    pub fn images(&self) -> &ImageTable {
        &self.images
    }

    /// The physical layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The action registry.
    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// Hotkey listener state.
    pub fn hotkeys(&self) -> &HotkeyEngine {
        &self.hotkeys
    }

    /// The UI task queue, for host loops that `select!` on it.
    pub fn queue(&self) -> &UiQueue {
        &self.queue
    }

    /// Active view and selection.
    pub fn session(&self) -> EditorSession {
        EditorSession {
            active_view: self.views.active(),
            selected_slot: self.selected,
        }
    }

    /// How `slot` of the active view should be drawn.
    pub fn face(&self, slot: usize) -> Result<SlotFace> {
        let view = self.views.active();
        let b = self.views.slot(view, slot)?;
        let c = b.colors();
        Ok(SlotFace {
            slot,
            text: b.text().to_string(),
            fill: c.fill.clone(),
            border: c.border.clone(),
            hover: c.hover.clone(),
            image: b
                .image()
                .and_then(|i| self.images.get(i))
                .map(str::to_string),
            locked: b.is_locked(),
            shared: view != 0 && self.views.is_shared(slot),
        })
    }

    /// Faces of every slot of the active view.
    pub fn faces(&self) -> Vec<SlotFace> {
        (0..self.views.slot_count())
            .filter_map(|s| self.face(s).ok())
            .collect()
    }

    // ----- pointer and editor -----

    /// A pointer click: the first click selects, a second click on the
    /// selected slot invokes it. Either way older status text is dismissed.
    pub fn click(&mut self, slot: usize) -> Result<()> {
        if self.notifier.clear().is_err() {
            trace!("ui_gone");
        }
        if self.selected == Some(slot) {
            self.invoke_slot(slot)
        } else {
            self.select(slot).map(|_| ())
        }
    }

    /// Select `slot` for editing.
    pub fn select(&mut self, slot: usize) -> Result<EditorInfo> {
        let info = self.editor_info(slot)?;
        self.selected = Some(slot);
        self.send(MsgToUi::Selected { slot });
        if let Some(target) = info.dangling {
            self.notifier
                .report("Editor", &Error::DanglingReference { slot, target });
        }
        Ok(info)
    }

    /// Editor contents for `slot` of the active view.
    pub fn editor_info(&self, slot: usize) -> Result<EditorInfo> {
        let view = self.views.active();
        let b = self.views.slot(view, slot)?;
        let dangling = match (b.action(), b.argument()) {
            (ActionKind::OpenView, Argument::View(t)) if *t >= self.views.len() => Some(*t),
            _ => None,
        };
        Ok(EditorInfo {
            slot,
            action: b.action(),
            action_name: b.action().descriptor().name,
            argument: b.argument().clone(),
            hotkey: b.hotkey().map(Chord::encode),
            text: b.text().to_string(),
            default_text: b.default_text().to_string(),
            image: b
                .image()
                .and_then(|i| self.images.get(i))
                .map(str::to_string),
            locked: b.is_locked(),
            shared: self.views.is_shared(slot),
            can_share: view == 0 && slot != self.views.back_slot(),
            dangling,
        })
    }

    /// Invoke `slot` of the active view. Failures are also shown as status
    /// text.
    pub fn invoke_slot(&mut self, slot: usize) -> Result<()> {
        let result = self.try_invoke(slot);
        if let Err(e) = &result {
            let title = self
                .views
                .slot(self.views.active(), slot)
                .map_or("Action", |b| b.action().descriptor().name);
            self.notifier.report(title, e);
        }
        result
    }

    /// Invocation without reporting.
    fn try_invoke(&mut self, slot: usize) -> Result<()> {
        let view = self.views.active();
        let b = self.views.slot(view, slot)?;
        let (kind, argument) = (b.action(), b.argument().clone());
        let desc = kind.descriptor();
        if desc.inert {
            trace!(slot, "invoke_inert");
            return Ok(());
        }
        if desc.requires_argument && !argument.is_set() {
            return Err(Error::NotConfigured { slot });
        }
        debug!(view, slot, ?kind, "invoke");
        if desc.needs_ui_thread {
            return self.run_here(slot, kind, &argument);
        }
        let name = self.views.view(view)?.name().to_string();
        self.invoker.spawn(name, slot, kind, argument)
    }

    /// Actions that must run on this thread.
    fn run_here(&mut self, slot: usize, kind: ActionKind, argument: &Argument) -> Result<()> {
        match (kind, argument) {
            (ActionKind::OpenView, Argument::View(target)) => {
                if *target >= self.views.len() {
                    return Err(Error::DanglingReference {
                        slot,
                        target: *target,
                    });
                }
                self.open_view(*target)
            }
            _ => {
                self.invoker.run(kind, argument)?;
                Ok(())
            }
        }
    }

    /// Make `view` the active view.
    pub fn open_view(&mut self, view: usize) -> Result<()> {
        self.activate(view)
    }

    /// Switch views, rebuild hotkeys and redraw. Conflicts in the target view
    /// keep the first slot of each combination and are reported.
    fn activate(&mut self, view: usize) -> Result<()> {
        self.views.set_active(view)?;
        self.selected = None;
        self.rebuild_lenient()?;
        let name = self.views.view(view)?.name().to_string();
        info!(view, name = %name, "view_opened");
        self.send(MsgToUi::ViewChanged {
            index: view,
            name,
            slots: self.faces(),
        });
        Ok(())
    }

    /// Rebuild the active table, dropping contested combinations.
    fn rebuild_lenient(&mut self) -> Result<()> {
        let (table, dropped) = HotkeyTable::build_lenient(&self.views, self.views.active())?;
        for combo in dropped {
            warn!(combo = %combo, "hotkey_conflict");
            self.notifier
                .report("Hotkeys", &Error::HotkeyConflict { combo });
        }
        self.hotkeys.install(table, &self.invoker, &self.ui)
    }

    /// Rebuild the active table, failing on any conflict.
    fn rebuild_strict(&mut self) -> Result<()> {
        let table = HotkeyTable::build(&self.views, self.views.active())?;
        self.hotkeys.install(table, &self.invoker, &self.ui)
    }

    // ----- slot edits -----

    /// Edit `slot` of the active view. With `rebind`, the new hotkey table is
    /// installed before the edit is kept; if that fails the slot is restored
    /// and the old table keeps running. A shared slot edited from another
    /// view must also leave the root view free of conflicts.
    fn edit_slot<F>(&mut self, slot: usize, rebind: bool, f: F) -> Result<bool>
    where
        F: FnOnce(&mut ButtonState) -> Result<bool>,
    {
        let view = self.views.active();
        let before = self.views.slot(view, slot)?.clone();
        if !f(self.views.slot_mut(view, slot)?)? {
            debug!(slot, "edit_ignored_locked");
            return Ok(false);
        }
        if rebind && let Err(e) = self.check_root(view, slot).and_then(|()| self.rebuild_strict())
        {
            *self.views.slot_mut(view, slot)? = before;
            warn!(slot, error = %e, "edit_rolled_back");
            self.notifier.report("Hotkeys", &e);
            return Err(e);
        }
        self.refresh(&[slot]);
        Ok(true)
    }

    /// Fail if an edit of shared `slot` made from `view` conflicts in the
    /// root view.
    fn check_root(&self, view: usize, slot: usize) -> Result<()> {
        if view != 0 && self.views.is_shared(slot) {
            HotkeyTable::build(&self.views, 0)?;
        }
        Ok(())
    }

    /// Bind `kind` to `slot`, with `argument` or the action's default.
    pub fn assign(
        &mut self,
        slot: usize,
        kind: ActionKind,
        argument: Option<Argument>,
    ) -> Result<bool> {
        let catalog = self.catalog.clone();
        let row = self.layout.row(slot);
        let target = argument.as_ref().map_or(Some(0), Argument::view);
        let target_name = self.open_view_name(kind, target);
        self.edit_slot(slot, true, |b| {
            let changed = b.assign(&catalog, kind, argument, row)?;
            if changed && let Some(name) = &target_name {
                b.set_default_text(name);
            }
            Ok(changed)
        })
    }

    /// Replace the argument of `slot`.
    pub fn set_argument(&mut self, slot: usize, argument: Argument) -> Result<bool> {
        let kind = self.views.slot(self.views.active(), slot)?.action();
        let target_name = self.open_view_name(kind, argument.view());
        self.edit_slot(slot, true, |b| {
            let changed = b.set_argument(argument)?;
            if changed && let Some(name) = &target_name {
                b.set_default_text(name);
            }
            Ok(changed)
        })
    }

    /// Name of the view an open-view argument targets.
    fn open_view_name(&self, kind: ActionKind, target: Option<usize>) -> Option<String> {
        if kind != ActionKind::OpenView {
            return None;
        }
        let target = target?;
        self.views.view(target).ok().map(|v| v.name().to_string())
    }

    /// Bind or clear the hotkey of `slot`.
    pub fn set_hotkey(&mut self, slot: usize, hotkey: Option<Chord>) -> Result<bool> {
        self.edit_slot(slot, true, |b| Ok(b.set_hotkey(hotkey)))
    }

    /// Set the displayed text of `slot`.
    pub fn set_text(&mut self, slot: usize, text: &str) -> Result<bool> {
        self.edit_slot(slot, false, |b| Ok(b.set_text(text)))
    }

    /// Set the colors of `slot`.
    pub fn set_colors(&mut self, slot: usize, colors: Colors) -> Result<bool> {
        self.edit_slot(slot, false, |b| Ok(b.set_colors(colors)))
    }

    /// Show image `file` on `slot`, or clear it.
    pub fn set_image(&mut self, slot: usize, file: Option<&str>) -> Result<bool> {
        let ix = file.map(|f| self.images.add(f));
        self.edit_slot(slot, false, |b| Ok(b.set_image(ix)))
    }

    /// Share `slot` of the root view with every other view.
    pub fn set_shared(&mut self, slot: usize, shared: bool) -> Result<()> {
        if self.views.active() != 0 {
            return Err(Error::NotInRoot);
        }
        self.views.set_shared(slot, shared)?;
        debug!(slot, shared, "slot_shared");
        self.refresh(&[slot]);
        Ok(())
    }

    /// Apply a handed-off patch to `slot` of the view named `view`. The
    /// patch is dropped when that view is gone.
    fn apply_patch(&mut self, view: &str, slot: usize, patch: StatePatch) -> Result<()> {
        let Some(view) = self.views.name_to_index(view) else {
            debug!(view, slot, "patch_view_gone");
            return Ok(());
        };
        let rebinds = patch.argument.is_some();
        self.views.slot_mut(view, slot)?.apply_patch(patch)?;
        let active = self.views.active();
        let visible = view == active || self.views.is_shared(slot);
        if visible {
            if rebinds {
                self.rebuild_lenient()?;
            }
            self.refresh(&[slot]);
        }
        Ok(())
    }

    // ----- views -----

    /// Append a new blank view. Returns its index.
    pub fn new_view(&mut self, name: Option<&str>) -> Result<usize> {
        let (ix, changed) = self.views.insert_view(self.views.len(), name)?;
        self.after_structure(self.views.active(), &changed)?;
        Ok(ix)
    }

    /// Copy view `src` to just below it. Returns the copy's index.
    pub fn duplicate_view(&mut self, src: usize) -> Result<usize> {
        let before = self.views.active();
        let (ix, changed) = self.views.duplicate_view(src)?;
        self.after_structure(before, &changed)?;
        Ok(ix)
    }

    /// Delete view `ix`. Deleting the active view shows the previous one first.
    pub fn delete_view(&mut self, ix: usize) -> Result<()> {
        if ix == 0 {
            return Err(ModelError::RootImmutable.into());
        }
        if ix == self.views.active() {
            self.open_view(ix - 1)?;
        }
        let before = self.views.active();
        let changed = self.views.delete_view(ix)?;
        self.after_structure(before, &changed)
    }

    /// Move view `ix` one place up.
    pub fn move_view_up(&mut self, ix: usize) -> Result<()> {
        let before = self.views.active();
        let changed = self.views.move_up(ix)?;
        self.after_structure(before, &changed)
    }

    /// Move view `ix` one place down.
    pub fn move_view_down(&mut self, ix: usize) -> Result<()> {
        let before = self.views.active();
        let changed = self.views.move_down(ix)?;
        self.after_structure(before, &changed)
    }

    /// Rename view `ix`.
    pub fn rename_view(&mut self, ix: usize, name: &str) -> Result<()> {
        self.views.rename(ix, name)?;
        self.send_names();
        Ok(())
    }

    /// Redraw and rebind after views were added, removed or reordered.
    ///
    /// `before` is the active index before the change. The active view is
    /// rebound when its own references moved or its index changed.
    fn after_structure(&mut self, before: usize, changed: &ChangeSet) -> Result<()> {
        self.send_names();
        let active = self.views.active();
        if active != before || changed.contains(&active) {
            debug!(active, ?changed, "active_view_rewritten");
            self.rebuild_lenient()?;
            let name = self.views.view(active)?.name().to_string();
            self.send(MsgToUi::ViewChanged {
                index: active,
                name,
                slots: self.faces(),
            });
        }
        Ok(())
    }

    /// Tell the UI the current view names.
    fn send_names(&self) {
        let names = self
            .views
            .names()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.send(MsgToUi::ViewsChanged { names });
    }

    /// Redraw `slots` of the active view.
    fn refresh(&self, slots: &[usize]) {
        let slots = slots.iter().filter_map(|s| self.face(*s).ok()).collect();
        self.send(MsgToUi::SlotsChanged { slots });
    }

    /// Best-effort UI message.
    fn send(&self, msg: MsgToUi) {
        if self.notifier.send(msg).is_err() {
            trace!("ui_gone");
        }
    }

    // ----- handoff -----

    /// Apply one task handed off from another thread.
    pub fn handle(&mut self, task: UiTask) -> Result<()> {
        match task {
            UiTask::Invoke {
                view,
                slot,
                kind,
                argument,
            } => {
                debug!(view, slot, ?kind, "handoff_invoke");
                let result = self.run_here(slot, kind, &argument);
                if let Err(e) = &result {
                    self.notifier.report(kind.descriptor().name, e);
                }
                result
            }
            UiTask::OpenView { view } => {
                let result = self.open_view(view);
                if let Err(e) = &result {
                    self.notifier.report("Open View", e);
                }
                result
            }
            UiTask::Patch { view, slot, patch } => self.apply_patch(&view, slot, patch),
        }
    }

    /// Apply every queued task without blocking. Returns how many ran.
    pub fn pump(&mut self) -> usize {
        let mut n = 0;
        while let Some(task) = self.queue.try_next() {
            if let Err(e) = self.handle(task) {
                debug!(error = %e, "task_failed");
            }
            n += 1;
        }
        n
    }

    /// Wait for every outstanding action worker, including those started
    /// by the hotkey listener.
    pub fn wait_workers(&mut self) {
        self.invoker.join_workers();
    }

    // ----- persistence -----

    /// Stored form of the current state.
    pub fn layout_data(&self) -> LayoutData {
        PersistenceCodec::new(&self.catalog).encode(&self.views, &self.images)
    }

    /// Save to `path`, preserving other layouts in the file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        save_layout(path, self.layout.name(), self.layout_data())?;
        Ok(())
    }

    /// Save to the configured path. Returns false when none is configured.
    pub fn save(&self) -> Result<bool> {
        let Some(p) = &self.save_path else {
            return Ok(false);
        };
        self.save_to(p)?;
        if self
            .notifier
            .send_success("Save", format!("Saved to {}", p.display()))
            .is_err()
        {
            trace!("ui_gone");
        }
        Ok(true)
    }

    /// Stop listening and wait for workers.
    pub fn shutdown(&mut self) {
        self.hotkeys.stop();
        self.wait_workers();
        info!("app_stopped");
    }
}
