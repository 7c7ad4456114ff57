//! Error types for layout, save-file and settings loading.

use std::{
    cmp::{max, min},
    fmt::Write as _,
    io,
    path::{Path, PathBuf},
    result::Result as StdResult,
};

use thiserror::Error;

/// Crate-local `Result` alias.
pub type Result<T> = StdResult<T, Error>;

#[derive(Debug, Error, Clone)]
/// Errors produced while reading, parsing, validating or writing configuration.
pub enum Error {
    #[error("{message}")]
    /// I/O or filesystem read error.
    Read {
        /// Optional path associated with the read error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    #[error("{message}")]
    /// Syntax error with a concrete line/column location and excerpt.
    Parse {
        /// Optional path associated with the parse error.
        path: Option<PathBuf>,
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        col: usize,
        /// Human-readable error message.
        message: String,
        /// Rendered excerpt including a caret at the error location.
        excerpt: String,
    },
    #[error("{message}")]
    /// Well-formed input with invalid content.
    Validation {
        /// Optional path associated with the validation error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    #[error("{message}")]
    /// The layout descriptor cannot support a grid. Always fatal.
    Layout {
        /// Optional path of the layout file.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    #[error("{message}")]
    /// Failure writing the save file.
    Write {
        /// Path being written.
        path: PathBuf,
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Render a human-friendly error message including location and an excerpt when available.
    pub fn pretty(&self) -> String {
        match self {
            Self::Read { path, message } => match path {
                Some(p) => format!("Read error at {}: {}", p.display(), message),
                None => format!("Read error: {}", message),
            },
            Self::Parse {
                path,
                line,
                col,
                message,
                excerpt,
            } => match path {
                Some(p) => format!(
                    "Parse error at {}:{}:{}\n{}\n{}",
                    p.display(),
                    line,
                    col,
                    message,
                    excerpt
                ),
                None => format!(
                    "Parse error at line {}, column {}\n{}\n{}",
                    line, col, message, excerpt
                ),
            },
            Self::Validation { path, message } => match path {
                Some(p) => format!("Validation error in {}\n{}", p.display(), message),
                None => format!("Validation error\n{}", message),
            },
            Self::Layout { path, message } => match path {
                Some(p) => format!("Invalid layout {}\n{}", p.display(), message),
                None => format!("Invalid layout\n{}", message),
            },
            Self::Write { path, message } => {
                format!("Write error at {}: {}", path.display(), message)
            }
        }
    }

    /// Access the optional path attached to this error.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::Validation { path, .. }
            | Self::Layout { path, .. } => path.as_deref(),
            Self::Write { path, .. } => Some(path),
        }
    }

    pub(crate) fn read(path: &Path, e: &io::Error) -> Self {
        Self::Read {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        }
    }

    /// Wrap a JSON syntax or shape error with its location.
    pub(crate) fn json(path: Option<&Path>, source: &str, e: &serde_json::Error) -> Self {
        let (line, col) = (e.line().max(1), e.column().max(1));
        Self::Parse {
            path: path.map(Path::to_path_buf),
            line,
            col,
            message: e.to_string(),
            excerpt: excerpt_at(source, line, col),
        }
    }

    /// Wrap a TOML error, translating its byte span into a line/column.
    pub(crate) fn toml(path: Option<&Path>, source: &str, e: &toml::de::Error) -> Self {
        let offset = e.span().map(|s| s.start).unwrap_or(0);
        let (line, col) = line_col(source, offset);
        Self::Parse {
            path: path.map(Path::to_path_buf),
            line,
            col,
            message: e.message().to_string(),
            excerpt: excerpt_at(source, line, col),
        }
    }
}

/// 1-based line and column of byte `offset` in `source`.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let upto = &source[..offset.min(source.len())];
    let line = upto.matches('\n').count() + 1;
    let col = upto.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
    (line, col)
}

/// Build a small 2-3 line excerpt with a caret at `(line_no, col_no)`.
pub fn excerpt_at(source: &str, line_no: usize, col_no: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let total = lines.len();
    let start = max(1usize, line_no.saturating_sub(2));
    let end = min(total, line_no + 1);

    let mut out = String::new();
    for n in start..=end {
        let text = lines.get(n - 1).copied().unwrap_or("");
        let _ignored = writeln!(out, " {:>4} | {}", n, text);
        if n == line_no {
            let prefix = format!(" {:>4} | ", n);
            let _ignored = writeln!(
                out,
                "{}{}^",
                " ".repeat(prefix.len()),
                " ".repeat(col_no.saturating_sub(1))
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_marks_column() {
        let src = "a\nbcd\ne";
        let ex = excerpt_at(src, 2, 3);
        assert!(ex.contains("   2 | bcd"));
        assert!(ex.lines().any(|l| l.ends_with("  ^")));
    }

    #[test]
    fn line_col_from_offset() {
        assert_eq!(line_col("ab\ncd", 0), (1, 1));
        assert_eq!(line_col("ab\ncd", 4), (2, 2));
    }

    #[test]
    fn layout_errors_are_labelled() {
        let e = Error::Layout {
            path: None,
            message: "x".into(),
        };
        assert!(e.pretty().starts_with("Invalid layout"));
    }
}
