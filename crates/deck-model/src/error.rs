//! Error types for model mutations.
use std::result::Result as StdResult;

use thiserror::Error;

use crate::ActionKind;

/// Crate-local `Result` alias.
pub type Result<T> = StdResult<T, Error>;

/// Rejected model mutations. None of these leave partial state behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Error {
    /// The argument does not fit the action.
    #[error("Invalid argument for {action:?}: {message}")]
    InvalidArgument { action: ActionKind, message: String },
    /// A MultiAction step may not itself be a MultiAction.
    #[error("Multi actions cannot contain other multi actions")]
    NestedMultiAction,
    /// The action is not part of the live catalog.
    #[error("Action {0:?} is not available")]
    UnknownAction(ActionKind),
    /// A view index out of range.
    #[error("No view at index {index} (have {len})")]
    NoSuchView { index: usize, len: usize },
    /// A slot index out of range.
    #[error("No slot at index {index} (have {len})")]
    NoSuchSlot { index: usize, len: usize },
    /// The root view cannot be moved or deleted.
    #[error("The main view cannot be moved or deleted")]
    RootImmutable,
    /// View names must be unique and non-empty.
    #[error("Name already in use: {0}")]
    DuplicateName(String),
    /// View names must be non-empty.
    #[error("View name cannot be empty")]
    EmptyName,
    /// The back slot cannot be shared across views.
    #[error("The back button cannot be shared")]
    SharedBackSlot,
}
