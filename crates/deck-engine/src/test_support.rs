//! Recording collaborators for engine tests.
//! They are intended for use by the test suite only.

use std::{
    path::PathBuf,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use deck_model::WindowPlacement;
use deck_protocol::{MsgToUi, NotifyKind, ipc::UiRx};
use parking_lot::Mutex;

use crate::{
    MediaPlayer, SceneClient, ServiceError, ServiceResult, Services, UrlOpener, WindowMover,
};

/// One collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Call {
    Play(String),
    Stop,
    Pause,
    Volume(u8),
    Enqueue(usize),
    ToggleScene(String),
    SwitchSource(String),
    OpenUrl(String),
    MoveWindow(String),
}

/// Recorder contents.
#[derive(Default)]
struct State {
    calls: Vec<Call>,
    offline: bool,
    scenes_on: Vec<String>,
}

/// Records every call; can be switched offline to exercise failure paths.
#[derive(Default)]
pub struct RecordingServices {
    state: Mutex<State>,
}

impl RecordingServices {
    /// A fresh recorder.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// [`Services`] backed by this recorder.
    pub fn services(self: &Arc<Self>) -> Services {
        Services {
            media: self.clone(),
            scenes: self.clone(),
            urls: self.clone(),
            windows: self.clone(),
        }
    }

    /// Make every call fail with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Calls so far.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    /// Wait until at least `n` calls were recorded.
    pub fn wait_calls(&self, n: usize, timeout: Duration) -> Vec<Call> {
        let deadline = Instant::now() + timeout;
        loop {
            let calls = self.calls();
            if calls.len() >= n || Instant::now() >= deadline {
                return calls;
            }
            thread::sleep(Duration::from_millis(2));
        }
    }

    /// Log `call`, or fail when offline.
    fn record(&self, service: &'static str, call: Call) -> ServiceResult<()> {
        let mut st = self.state.lock();
        if st.offline {
            return Err(ServiceError::unavailable(service, "offline"));
        }
        st.calls.push(call);
        Ok(())
    }
}

impl MediaPlayer for RecordingServices {
    fn play(&self, source: &str) -> ServiceResult<()> {
        self.record("media", Call::Play(source.to_string()))
    }
    fn stop(&self) -> ServiceResult<()> {
        self.record("media", Call::Stop)
    }
    fn pause(&self) -> ServiceResult<()> {
        self.record("media", Call::Pause)
    }
    fn set_volume(&self, percent: u8) -> ServiceResult<()> {
        self.record("media", Call::Volume(percent))
    }
    fn enqueue(&self, playlist: Vec<PathBuf>) -> ServiceResult<()> {
        self.record("media", Call::Enqueue(playlist.len()))
    }
}

impl SceneClient for RecordingServices {
    fn toggle_scene(&self, scene: &str) -> ServiceResult<bool> {
        self.record("scenes", Call::ToggleScene(scene.to_string()))?;
        let mut st = self.state.lock();
        let on = if let Some(i) = st.scenes_on.iter().position(|s| s == scene) {
            st.scenes_on.remove(i);
            false
        } else {
            st.scenes_on.push(scene.to_string());
            true
        };
        Ok(on)
    }
    fn switch_source(&self, source: &str) -> ServiceResult<()> {
        self.record("scenes", Call::SwitchSource(source.to_string()))
    }
}

impl UrlOpener for RecordingServices {
    fn open(&self, url: &str) -> ServiceResult<()> {
        self.record("browser", Call::OpenUrl(url.to_string()))
    }
}

impl WindowMover for RecordingServices {
    fn move_window(&self, placement: &WindowPlacement) -> ServiceResult<()> {
        self.record("windows", Call::MoveWindow(placement.title.clone()))
    }
}

/// Drain `rx` and return every notification as `(kind, title, text)`.
pub fn drain_notifications(rx: &UiRx) -> Vec<(NotifyKind, String, String)> {
    rx.try_iter()
        .filter_map(|m| match m {
            MsgToUi::Notify { kind, title, text } => Some((kind, title, text)),
            _ => None,
        })
        .collect()
}

/// Wait up to `timeout` for a notification whose text contains `needle`.
pub fn recv_notification_containing(rx: &UiRx, needle: &str, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while let Some(left) = deadline.checked_duration_since(Instant::now()) {
        match rx.recv_timeout(left) {
            Ok(MsgToUi::Notify { text, .. }) if text.contains(needle) => return true,
            Ok(_) => {}
            Err(_) => return false,
        }
    }
    false
}
