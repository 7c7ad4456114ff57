//! Flat table of image files referenced by slots.

use std::path::Path;

/// Image file names, indexed by slot `image` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageTable {
    files: Vec<String>,
}

impl ImageTable {
    /// A table over `files`, in order.
    pub fn new(files: Vec<String>) -> Self {
        Self { files }
    }

    /// Add `file`, reusing an entry with the same base name.
    pub fn add(&mut self, file: &str) -> usize {
        let base = basename(file);
        if let Some(ix) = self.files.iter().position(|f| basename(f) == base) {
            return ix;
        }
        self.files.push(file.to_string());
        self.files.len() - 1
    }

    /// File at `ix`.
    pub fn get(&self, ix: usize) -> Option<&str> {
        self.files.get(ix).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Entries in order.
    pub fn files(&self) -> &[String] {
        &self.files
    }
}

fn basename(f: &str) -> &str {
    Path::new(f)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_by_basename() {
        let mut t = ImageTable::default();
        assert_eq!(t.add("/a/play.png"), 0);
        assert_eq!(t.add("/b/stop.png"), 1);
        assert_eq!(t.add("/c/play.png"), 0);
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(1), Some("/b/stop.png"));
    }
}
