//! User settings (`~/.keydeck/settings.toml`).

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result, paths};

/// Default capacity of the listener-to-UI handoff queue.
pub const DEFAULT_UI_QUEUE_CAPACITY: usize = 64;

/// Tunable settings. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Layout descriptor file.
    pub layout: Option<PathBuf>,
    /// Save file.
    pub save_path: Option<PathBuf>,
    /// How long each macro step's keys are held, in milliseconds.
    pub macro_hold_ms: u64,
    /// Capacity of the bounded listener-to-UI queue.
    pub ui_queue_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            layout: None,
            save_path: None,
            macro_hold_ms: 0,
            ui_queue_capacity: DEFAULT_UI_QUEUE_CAPACITY,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml_str(source: &str, path: Option<&Path>) -> Result<Self> {
        let s: Self = toml::from_str(source).map_err(|e| Error::toml(path, source, &e))?;
        if s.ui_queue_capacity == 0 {
            return Err(Error::Validation {
                path: path.map(Path::to_path_buf),
                message: "ui_queue_capacity must be at least 1".into(),
            });
        }
        Ok(s)
    }

    /// Read settings.
    ///
    /// An explicit path must exist. Without one, `~/.keydeck/settings.toml` is
    /// used when present and defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => paths::default_settings_path(),
        };
        match fs::read_to_string(&path) {
            Ok(source) => Self::from_toml_str(&source, Some(&path)),
            Err(e) if explicit.is_none() && e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "settings_default");
                Ok(Self::default())
            }
            Err(e) => Err(Error::read(&path, &e)),
        }
    }

    /// Macro key hold as a duration.
    pub fn macro_hold(&self) -> Duration {
        Duration::from_millis(self.macro_hold_ms)
    }

    /// Effective layout path: CLI > settings > default.
    pub fn resolve_layout(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.layout.clone())
            .unwrap_or_else(paths::default_layout_path)
    }

    /// Effective save path: CLI > settings > default.
    pub fn resolve_save_path(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.save_path.clone())
            .unwrap_or_else(paths::default_save_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_default() {
        assert_eq!(Settings::from_toml_str("", None).unwrap(), Settings::default());
    }

    #[test]
    fn fields_parse() {
        let s = Settings::from_toml_str(
            "layout = \"/tmp/pad.json\"\nmacro_hold_ms = 30\nui_queue_capacity = 8\n",
            None,
        )
        .unwrap();
        assert_eq!(s.layout.as_deref(), Some(Path::new("/tmp/pad.json")));
        assert_eq!(s.macro_hold(), Duration::from_millis(30));
        assert_eq!(s.ui_queue_capacity, 8);
    }

    #[test]
    fn unknown_field_reports_location() {
        let err = Settings::from_toml_str("\nbogus = 1\n", None).unwrap_err();
        match err {
            Error::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(matches!(
            Settings::from_toml_str("ui_queue_capacity = 0", None),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn precedence_cli_then_settings_then_default() {
        let s = Settings {
            save_path: Some(PathBuf::from("/a/save.json")),
            ..Settings::default()
        };
        assert_eq!(
            s.resolve_save_path(Some(Path::new("/b/x.json"))),
            PathBuf::from("/b/x.json")
        );
        assert_eq!(s.resolve_save_path(None), PathBuf::from("/a/save.json"));
        assert_eq!(s.resolve_layout(None), paths::default_layout_path());
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("settings.toml");
        assert!(matches!(Settings::load(Some(&p)), Err(Error::Read { .. })));
    }
}
