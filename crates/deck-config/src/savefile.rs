//! The persisted state document.
//!
//! One JSON file holds every layout's views:
//!
//! ```json
//! {
//!   "layouts": { "numpad": { "Main": [[4, 1, ["ctrl", "<numpad7>"], ["", "Media"], ["#1f6aa5", "#565b5e", "#014787"], null], ...] } },
//!   "images": ["/home/me/icons/play.png"],
//!   "globals": { "numpad": [false, true, ...] }
//! }
//! ```
//!
//! Saving only replaces the current layout's entries and the image table;
//! other layouts in the file are preserved.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::{Error, Result};

/// One slot as stored on disk:
/// `[persistent_id, argument, hotkey, (text, default_text), (fill, border, hover), image]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRecord(
    /// Persistent action id.
    pub u32,
    /// Action argument; shape depends on the action.
    pub Value,
    /// Hotkey as a `(modifier, key)` pair.
    pub Option<(String, String)>,
    /// Displayed text and default text.
    pub (String, String),
    /// Fill, border and hover colors.
    pub (String, String, String),
    /// Index into the image table.
    pub Option<usize>,
);

/// Views of one layout, in order. The first view is the root.
pub type ViewRecords = IndexMap<String, Vec<SlotRecord>>;

/// Everything stored for one layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutData {
    /// Ordered view name to slot records.
    pub views: ViewRecords,
    /// Image file table shared by all layouts.
    pub images: Vec<String>,
    /// Per-slot shared-across-views flags.
    pub shared: Vec<bool>,
}

/// The whole save file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    /// Layout name to views.
    #[serde(default)]
    pub layouts: IndexMap<String, ViewRecords>,
    /// Image file table.
    #[serde(default)]
    pub images: Vec<String>,
    /// Layout name to shared-slot flags.
    #[serde(default)]
    pub globals: IndexMap<String, Vec<bool>>,
}

impl SaveFile {
    /// Parse a save document.
    pub fn from_json_str(source: &str, path: Option<&Path>) -> Result<Self> {
        serde_json::from_str(source).map_err(|e| Error::json(path, source, &e))
    }

    /// Read the save file at `path`. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(source) => Self::from_json_str(&source, Some(path)).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "save_file_missing");
                Ok(None)
            }
            Err(e) => Err(Error::read(path, &e)),
        }
    }

    /// Stored data for `layout`, if any.
    pub fn layout(&self, layout: &str) -> Option<LayoutData> {
        let views = self.layouts.get(layout)?.clone();
        Some(LayoutData {
            views,
            images: self.images.clone(),
            shared: self.globals.get(layout).cloned().unwrap_or_default(),
        })
    }

    /// Replace `layout`'s entries and the image table with `data`.
    pub fn merge_layout(&mut self, layout: &str, data: LayoutData) {
        self.layouts.insert(layout.to_string(), data.views);
        self.globals.insert(layout.to_string(), data.shared);
        self.images = data.images;
    }

    /// Serialize and write to `path`, creating parent directories.
    ///
    /// The document is written to a sibling temp file and renamed into place.
    pub fn write(&self, path: &Path) -> Result<()> {
        let write_err = |e: &dyn ToString| Error::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|e| write_err(&e))?;
        }
        let body = serde_json::to_string(self).map_err(|e| write_err(&e))?;
        let tmp = tmp_path(path);
        fs::write(&tmp, body).map_err(|e| write_err(&e))?;
        fs::rename(&tmp, path).map_err(|e| write_err(&e))?;
        Ok(())
    }
}

/// Merge `data` for `layout` into the file at `path`, preserving other layouts.
pub fn save_layout(path: &Path, layout: &str, data: LayoutData) -> Result<()> {
    let mut file = SaveFile::load(path)?.unwrap_or_default();
    let views = data.views.len();
    file.merge_layout(layout, data);
    file.write(path)?;
    info!(path = %path.display(), layout, views, "saved");
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(pid: u32, arg: Value) -> SlotRecord {
        SlotRecord(
            pid,
            arg,
            Some(("ctrl".into(), "<numpad7>".into())),
            ("Go".into(), "".into()),
            ("#1f6aa5".into(), "#565b5e".into(), "#014787".into()),
            None,
        )
    }

    fn data(view: &str) -> LayoutData {
        let mut views = ViewRecords::new();
        views.insert(view.into(), vec![record(4, json!(1)), record(0, Value::Null)]);
        LayoutData {
            views,
            images: vec!["a.png".into()],
            shared: vec![false, true],
        }
    }

    #[test]
    fn slot_record_is_a_json_array() {
        let v = serde_json::to_value(record(4, json!(2))).unwrap();
        assert_eq!(
            v,
            json!([4, 2, ["ctrl", "<numpad7>"], ["Go", ""], ["#1f6aa5", "#565b5e", "#014787"], null])
        );
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SaveFile::load(&dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn save_preserves_other_layouts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("savedata.json");
        save_layout(&path, "numpad", data("Main")).unwrap();
        save_layout(&path, "tall", data("Other")).unwrap();
        let file = SaveFile::load(&path).unwrap().unwrap();
        assert_eq!(file.layouts.len(), 2);
        let numpad = file.layout("numpad").unwrap();
        assert_eq!(numpad.views.keys().collect::<Vec<_>>(), vec!["Main"]);
        assert_eq!(numpad.shared, vec![false, true]);
        assert!(file.layout("missing").is_none());
    }

    #[test]
    fn view_order_is_preserved() {
        let src = r#"{"layouts": {"p": {"Zed": [], "Alpha": [], "Mid": []}}}"#;
        let file = SaveFile::from_json_str(src, None).unwrap();
        let names: Vec<_> = file.layouts["p"].keys().cloned().collect();
        assert_eq!(names, vec!["Zed", "Alpha", "Mid"]);
        assert!(file.images.is_empty());
    }
}
