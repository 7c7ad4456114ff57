//! Layout descriptors, the persisted state document, and user settings.
//!
//! - [`Layout`]: the ordered physical-key map that fixes the slot count and
//!   the reserved (0,0) back slot.
//! - [`SaveFile`]: views for every layout, the image table and shared-slot
//!   flags, merged per layout on save.
//! - [`Settings`]: `settings.toml` with path resolution.
//!
//! All errors render with [`Error::pretty`].
mod error;
mod layout;
pub mod paths;
mod savefile;
mod settings;

pub use error::{Error, Result, excerpt_at};
pub use layout::{KeySpec, Layout, SizeClass, layout_file};
pub use savefile::{LayoutData, SaveFile, SlotRecord, ViewRecords, save_layout};
pub use settings::{DEFAULT_UI_QUEUE_CAPACITY, Settings};
