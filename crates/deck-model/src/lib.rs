//! Deck model
//!
//! The editable state of a keydeck: which action each button runs, how the
//! buttons are grouped into views, and how all of that is written to disk.
//!
//! - [`ActionCatalog`]: the ordered action registry. Each action has a
//!   persistent id that survives catalog reordering.
//! - [`ButtonState`]: one slot's action, argument, hotkey, label and colors.
//! - [`ViewSet`]: the root view plus sub-views. Structural edits keep every
//!   `OpenView` reference pointing at the same view.
//! - [`PersistenceCodec`]: conversion to and from the stored slot records.
//!
//! Nothing here performs side effects; execution lives in the engine.

mod action;
mod argument;
mod button;
mod codec;
mod error;
mod images;
pub mod style;
mod view;

pub use action::{
    ActionCatalog, ActionDescriptor, ActionIndex, ActionKind, PERSISTENT_IDS, PersistentId,
};
pub use argument::{Argument, MultiStep, WindowPlacement};
pub use button::{BACK_TEXT, ButtonState, MAX_TEXT, StatePatch};
pub use codec::{Decoded, LoadIssue, LoadReport, PersistenceCodec};
pub use error::{Error, Result};
pub use images::ImageTable;
pub use view::{ChangeSet, DanglingRef, ROOT_NAME, View, ViewSet};
