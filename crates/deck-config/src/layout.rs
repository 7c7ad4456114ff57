//! Physical key layout descriptors.
//!
//! A layout is a JSON object mapping key ids to grid placement, in slot order:
//!
//! ```json
//! {
//!   "<NUMPAD7>": { "x": 0, "y": 0, "attr": "regular", "modifier": "ctrl" },
//!   "+":         { "x": 3, "y": 1, "attr": "tall", "modifier": null }
//! }
//! ```
//!
//! The key at grid position (0,0) is the reserved back slot. A layout
//! without one is rejected with [`Error::Layout`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use deck_keycode::Chord;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Footprint of a key on the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    /// One cell.
    #[default]
    Regular,
    /// Two rows high.
    Tall,
    /// Two columns wide.
    Wide,
}

impl SizeClass {
    /// `(rows, columns)` spanned.
    pub fn span(self) -> (u32, u32) {
        match self {
            Self::Regular => (1, 1),
            Self::Tall => (2, 1),
            Self::Wide => (1, 2),
        }
    }
}

/// Placement of one physical key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySpec {
    /// Grid column.
    pub x: u32,
    /// Grid row.
    pub y: u32,
    /// Footprint.
    #[serde(default)]
    pub attr: SizeClass,
    /// Modifier combined with the key id for the slot's default hotkey.
    #[serde(default)]
    pub modifier: Option<String>,
}

/// A validated key layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    name: String,
    keys: IndexMap<String, KeySpec>,
    back_slot: usize,
}

impl Layout {
    /// Parse and validate a layout from JSON text.
    pub fn from_json_str(name: &str, source: &str, path: Option<&Path>) -> Result<Self> {
        let keys: IndexMap<String, KeySpec> =
            serde_json::from_str(source).map_err(|e| Error::json(path, source, &e))?;
        Self::new(name, keys, path)
    }

    /// Build a layout from an ordered key map.
    pub fn new(name: &str, keys: IndexMap<String, KeySpec>, path: Option<&Path>) -> Result<Self> {
        let layout_err = |message: String| Error::Layout {
            path: path.map(Path::to_path_buf),
            message,
        };
        if keys.is_empty() {
            return Err(layout_err("layout defines no keys".into()));
        }
        let back_slot = keys
            .values()
            .position(|k| k.x == 0 && k.y == 0)
            .ok_or_else(|| {
                layout_err(format!(
                    "layout '{name}' has no key at grid position (0,0), which is required for the back button"
                ))
            })?;
        for (id, spec) in &keys {
            if Chord::from_pair(spec.modifier.as_deref().unwrap_or(""), id).is_none() {
                warn!(key = %id, modifier = ?spec.modifier, "layout_key_without_default_hotkey");
            }
        }
        debug!(name, slots = keys.len(), back_slot, "layout_loaded");
        Ok(Self {
            name: name.to_string(),
            keys,
            back_slot,
        })
    }

    /// Read a layout file. The layout name is the file stem.
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|e| Error::read(path, &e))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_json_str(&name, &source, Some(path))
    }

    /// Layout name, used as the save-file key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of slots.
    pub fn slot_count(&self) -> usize {
        self.keys.len()
    }

    /// Index of the (0,0) back slot.
    pub fn back_slot(&self) -> usize {
        self.back_slot
    }

    /// Key id and placement of slot `ix`.
    pub fn slot(&self, ix: usize) -> Option<(&str, &KeySpec)> {
        self.keys.get_index(ix).map(|(k, v)| (k.as_str(), v))
    }

    /// Slots in order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, &KeySpec)> {
        self.keys.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Default hotkey for slot `ix`: its layout modifier plus its key id.
    pub fn default_hotkey(&self, ix: usize) -> Option<Chord> {
        let (id, spec) = self.slot(ix)?;
        Chord::from_pair(spec.modifier.as_deref().unwrap_or(""), id)
    }

    /// Grid row of slot `ix`.
    pub fn row(&self, ix: usize) -> u32 {
        self.slot(ix).map_or(0, |(_, s)| s.y)
    }
}

/// Conventional location for a named layout under `dir`.
pub fn layout_file(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAD: &str = r#"{
        "<NUMPAD7>": {"x": 0, "y": 0, "attr": "regular", "modifier": "ctrl"},
        "<NUMPAD8>": {"x": 1, "y": 0, "attr": "regular", "modifier": "ctrl"},
        "+": {"x": 2, "y": 0, "attr": "tall", "modifier": null},
        "<NUMPAD0>": {"x": 0, "y": 2, "attr": "wide"}
    }"#;

    #[test]
    fn parses_in_order() {
        let l = Layout::from_json_str("pad", PAD, None).unwrap();
        assert_eq!(l.slot_count(), 4);
        assert_eq!(l.back_slot(), 0);
        assert_eq!(l.slot(2).unwrap().0, "+");
        assert_eq!(l.slot(3).unwrap().1.attr, SizeClass::Wide);
        assert_eq!(l.row(3), 2);
    }

    #[test]
    fn default_hotkeys_combine_modifier_and_key() {
        let l = Layout::from_json_str("pad", PAD, None).unwrap();
        assert_eq!(l.default_hotkey(0).unwrap().encode(), "<ctrl>+<numpad7>");
        assert_eq!(l.default_hotkey(2).unwrap().encode(), "+");
    }

    #[test]
    fn missing_origin_is_rejected() {
        let src = r#"{"a": {"x": 1, "y": 0}}"#;
        let err = Layout::from_json_str("bad", src, None).unwrap_err();
        assert!(matches!(err, Error::Layout { .. }));
        assert!(err.to_string().contains("(0,0)"));
    }

    #[test]
    fn syntax_error_has_location() {
        let err = Layout::from_json_str("bad", "{\n  \"a\": {\"x\": }\n}", None).unwrap_err();
        match err {
            Error::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
    }
}
