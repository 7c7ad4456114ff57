//! Action execution.
//!
//! [`Invoker::run`] performs one action on the calling thread and returns
//! any state patch for the slot that triggered it. Actions flagged as
//! needing the UI thread are never run here directly; they are posted to
//! the UI queue instead.
//!
//! [`Invoker::spawn`] runs an action on a short-lived worker. Every clone
//! of an invoker shares one worker list, so whoever owns the UI loop can
//! wait for workers started by the hotkey listener too.

use std::{
    path::PathBuf,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use deck_model::{
    ActionCatalog, ActionKind, Argument, Error as ModelError, MultiStep, StatePatch,
    style::{self, Colors},
};
use macroplay::MacroPlayer;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{Error, NotificationDispatcher, Result, Services, UiHandle, UiTask, shuffle};

/// Pause between two executed steps of a multi action.
pub const MULTI_STEP_DELAY: Duration = Duration::from_millis(200);

/// Runs actions against the collaborators. Cheap to clone and shared by
/// the UI thread, the hotkey listener and workers.
#[derive(Clone)]
pub struct Invoker {
    /// Resolves multi action steps.
    catalog: Arc<ActionCatalog>,
    /// External collaborators.
    services: Services,
    /// Macro and text playback.
    player: MacroPlayer,
    /// Handoff to the UI thread.
    ui: UiHandle,
    /// Status text.
    notifier: NotificationDispatcher,
    /// Workers started by any clone and not yet joined.
    workers: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Invoker {
    /// Assemble an invoker.
    pub fn new(
        catalog: Arc<ActionCatalog>,
        services: Services,
        player: MacroPlayer,
        ui: UiHandle,
        notifier: NotificationDispatcher,
    ) -> Self {
        Self {
            catalog,
            services,
            player,
            ui,
            notifier,
            workers: Arc::default(),
        }
    }

    /// The catalog steps are resolved against.
    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// The notification channel.
    pub fn notifier(&self) -> &NotificationDispatcher {
        &self.notifier
    }

    /// Run `kind` on the calling thread. Blocks for macros, typing and
    /// multi actions.
    pub fn run(&self, kind: ActionKind, argument: &Argument) -> Result<Option<StatePatch>> {
        use ActionKind as K;
        trace!(?kind, "action_run");
        let s = &self.services;
        match (kind, argument) {
            (K::NoOp, _) => {}
            (K::PlayMedia, Argument::Text(src)) => s.media.play(src)?,
            (K::StopMedia, _) => s.media.stop()?,
            (K::PauseMedia, _) => s.media.pause()?,
            (K::OpenView, Argument::View(view)) => self.ui.post(UiTask::OpenView { view: *view })?,
            (K::RunMacro, Argument::Macro(m)) => self.player.play(m)?,
            (K::OpenUrl, Argument::Text(url)) => s.urls.open(url)?,
            (K::TypeText, Argument::Text(text)) => self.player.type_text(text)?,
            (K::SetVolume, Argument::Volume(v)) => s.media.set_volume(*v)?,
            (K::ShuffleMedia, Argument::Text(dir)) => {
                shuffle::start(s.media.clone(), self.notifier.clone(), PathBuf::from(dir))?;
            }
            (K::ToggleRemoteScene, Argument::Text(scene)) => {
                let on = s.scenes.toggle_scene(scene)?;
                debug!(scene = %scene, on, "scene_toggled");
                return Ok(Some(StatePatch::colors(scene_colors(on))));
            }
            (K::SwitchRemoteSource, Argument::Text(src)) => s.scenes.switch_source(src)?,
            (K::MultiAction, Argument::Multi(steps)) => {
                self.run_multi(steps);
            }
            (K::MoveWindow, Argument::Window(w)) => s.windows.move_window(w)?,
            (kind, other) => {
                return Err(Error::Model(ModelError::InvalidArgument {
                    action: kind,
                    message: format!("cannot run with {other:?}"),
                }));
            }
        }
        Ok(None)
    }

    /// Walk `steps` in order and return how many ran.
    ///
    /// Steps whose action is unknown, inert, nested or missing its argument
    /// are skipped. A failing step is reported and does not stop the rest.
    /// Steps needing the UI thread are posted to it.
    pub fn run_multi(&self, steps: &[MultiStep]) -> usize {
        let mut ran = 0;
        for (i, step) in steps.iter().enumerate() {
            let Some(desc) = self.catalog.resolve(step.action) else {
                warn!(step = i, id = %step.action, "multi_step_unresolved");
                continue;
            };
            if desc.inert || desc.kind == ActionKind::MultiAction {
                debug!(step = i, kind = ?desc.kind, "multi_step_skipped");
                continue;
            }
            if desc.requires_argument && !step.argument.is_set() {
                warn!(step = i, kind = ?desc.kind, "multi_step_not_configured");
                continue;
            }
            if ran > 0 {
                thread::sleep(MULTI_STEP_DELAY);
            }
            ran += 1;
            if let Err(e) = self.run(desc.kind, &step.argument) {
                warn!(step = i, error = %e, "multi_step_failed");
                self.notifier.report(desc.name, &e);
            }
        }
        ran
    }

    /// Run on a short-lived worker. A resulting patch is posted back for
    /// `slot` of the view named `view`; a failure becomes a status message.
    pub fn spawn(
        &self,
        view: String,
        slot: usize,
        kind: ActionKind,
        argument: Argument,
    ) -> Result<()> {
        let this = self.clone();
        let handle = thread::Builder::new()
            .name("deck-action".into())
            .spawn(move || this.run_and_post(&view, slot, kind, &argument))?;
        let mut workers = self.workers.lock();
        workers.retain(|h| !h.is_finished());
        workers.push(handle);
        Ok(())
    }

    /// Number of workers that have not been joined yet.
    pub fn pending_workers(&self) -> usize {
        self.workers.lock().len()
    }

    /// Join every worker, including ones started while waiting.
    pub fn join_workers(&self) {
        loop {
            let batch: Vec<_> = self.workers.lock().drain(..).collect();
            if batch.is_empty() {
                break;
            }
            for h in batch {
                if h.join().is_err() {
                    warn!("action_worker_panicked");
                }
            }
        }
    }

    /// Run, then post the patch or report the failure.
    fn run_and_post(&self, view: &str, slot: usize, kind: ActionKind, arg: &Argument) {
        match self.run(kind, arg) {
            Ok(Some(patch)) => {
                let task = UiTask::Patch {
                    view: view.to_string(),
                    slot,
                    patch,
                };
                if let Err(e) = self.ui.post(task) {
                    warn!(view, slot, error = %e, "patch_dropped");
                }
            }
            Ok(None) => {}
            Err(e) => self.notifier.report(kind.descriptor().name, &e),
        }
    }
}

/// Slot colors mirroring a remote on/off state.
pub fn scene_colors(on: bool) -> Colors {
    Colors::filled(if on {
        style::FC_ACTIVE
    } else {
        style::FC_DEFAULT
    })
}
