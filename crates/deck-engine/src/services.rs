//! External collaborators invoked by actions.
//!
//! The core never talks to a media player, a scene switcher, a browser or a
//! window manager directly. Each is a narrow trait; hosts plug in real
//! implementations and tests plug in recorders.

use std::{path::PathBuf, sync::Arc};

use deck_model::WindowPlacement;
use thiserror::Error;
use tracing::debug;

/// Failure reported by a collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service could not be reached or refused the request.
    #[error("{service} unavailable: {message}")]
    Unavailable {
        /// Which collaborator.
        service: &'static str,
        /// What it said.
        message: String,
    },
}

impl ServiceError {
    /// Shorthand for [`ServiceError::Unavailable`].
    pub fn unavailable(service: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            service,
            message: message.into(),
        }
    }
}

/// Result of a collaborator call.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Audio playback.
pub trait MediaPlayer: Send + Sync {
    /// Start playing a file or stream.
    fn play(&self, source: &str) -> ServiceResult<()>;
    /// Stop playback.
    fn stop(&self) -> ServiceResult<()>;
    /// Toggle pause.
    fn pause(&self) -> ServiceResult<()>;
    /// Set output volume, `0..=100`.
    fn set_volume(&self, percent: u8) -> ServiceResult<()>;
    /// Replace the queue with `playlist` and start it.
    fn enqueue(&self, playlist: Vec<PathBuf>) -> ServiceResult<()>;
}

/// Remote scene control (streaming software and the like).
pub trait SceneClient: Send + Sync {
    /// Toggle `scene`; returns whether it is now on.
    fn toggle_scene(&self, scene: &str) -> ServiceResult<bool>;
    /// Switch the active source.
    fn switch_source(&self, source: &str) -> ServiceResult<()>;
}

/// Opens URLs in the user's browser.
pub trait UrlOpener: Send + Sync {
    /// Open `url`.
    fn open(&self, url: &str) -> ServiceResult<()>;
}

/// Moves and resizes windows.
pub trait WindowMover: Send + Sync {
    /// Move the first window whose title contains `placement.title`.
    fn move_window(&self, placement: &WindowPlacement) -> ServiceResult<()>;
}

/// The collaborators available to actions.
#[derive(Clone)]
pub struct Services {
    /// Audio playback.
    pub media: Arc<dyn MediaPlayer>,
    /// Remote scene control.
    pub scenes: Arc<dyn SceneClient>,
    /// Browser.
    pub urls: Arc<dyn UrlOpener>,
    /// Window manager.
    pub windows: Arc<dyn WindowMover>,
}

impl Services {
    /// Every collaborator reports itself unavailable.
    pub fn offline() -> Self {
        let off = Arc::new(Offline);
        Self {
            media: off.clone(),
            scenes: off.clone(),
            urls: off.clone(),
            windows: off,
        }
    }
}

/// Stand-in for hosts without any collaborators.
struct Offline;

impl Offline {
    /// Log and refuse.
    fn refuse<T>(service: &'static str, what: &str) -> ServiceResult<T> {
        debug!(service, what, "service_offline");
        Err(ServiceError::unavailable(service, "not connected"))
    }
}

impl MediaPlayer for Offline {
    fn play(&self, source: &str) -> ServiceResult<()> {
        Self::refuse("media player", source)
    }
    fn stop(&self) -> ServiceResult<()> {
        Self::refuse("media player", "stop")
    }
    fn pause(&self) -> ServiceResult<()> {
        Self::refuse("media player", "pause")
    }
    fn set_volume(&self, _percent: u8) -> ServiceResult<()> {
        Self::refuse("media player", "volume")
    }
    fn enqueue(&self, _playlist: Vec<PathBuf>) -> ServiceResult<()> {
        Self::refuse("media player", "enqueue")
    }
}

impl SceneClient for Offline {
    fn toggle_scene(&self, scene: &str) -> ServiceResult<bool> {
        Self::refuse("scene client", scene)
    }
    fn switch_source(&self, source: &str) -> ServiceResult<()> {
        Self::refuse("scene client", source)
    }
}

impl UrlOpener for Offline {
    fn open(&self, url: &str) -> ServiceResult<()> {
        Self::refuse("browser", url)
    }
}

impl WindowMover for Offline {
    fn move_window(&self, placement: &WindowPlacement) -> ServiceResult<()> {
        Self::refuse("window manager", &placement.title)
    }
}
