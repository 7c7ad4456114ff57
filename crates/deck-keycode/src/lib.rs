//! deck-keycode: key tokens and hotkey specs for keydeck.
//!
//! - `Key`: a physical key token. Printable keys are literal characters;
//!   everything else (numpad, function, navigation, media keys) is a named token.
//! - `Modifier`: the fixed modifier vocabulary (control, shift, alt, meta).
//! - `Chord`: a modifier set plus one key, with the canonical hotkey encoding
//!   used as the lookup key of every hotkey table.
//!
//! The raw OS key-code table is not part of this crate; OS hooks translate
//! their native codes into `Key` values before handing them to the core.

mod key;
pub use key::Key;

mod modifiers;
pub use modifiers::{Modifier, modifiers_from_spec};

mod chord;
pub use chord::{Chord, KeyOrModifier};
