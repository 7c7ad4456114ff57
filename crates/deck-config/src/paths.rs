//! Default file locations under `~/.keydeck`.

use std::{env, path::PathBuf};

/// `~/.keydeck`.
pub fn default_dir() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".keydeck");
    p
}

/// `~/.keydeck/settings.toml`.
pub fn default_settings_path() -> PathBuf {
    default_dir().join("settings.toml")
}

/// `~/.keydeck/savedata.json`.
pub fn default_save_path() -> PathBuf {
    default_dir().join("savedata.json")
}

/// `~/.keydeck/layouts/numpad.json`.
pub fn default_layout_path() -> PathBuf {
    crate::layout_file(&default_dir().join("layouts"), "numpad")
}
