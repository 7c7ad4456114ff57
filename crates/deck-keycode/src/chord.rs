use std::{collections::BTreeSet, fmt, iter};

use serde::{Deserialize, Serialize};

use crate::{Key, Modifier, modifiers_from_spec};

/// A key chord: a set of modifiers plus a single key.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Chord {
    /// Set of modifier keys held down for this chord.
    pub modifiers: BTreeSet<Modifier>,
    /// The non-modifier key for this chord.
    pub key: Key,
}

impl Chord {
    /// A chord with no modifiers.
    pub fn bare(key: Key) -> Self {
        Self {
            modifiers: BTreeSet::new(),
            key,
        }
    }

    /// A chord from a modifier list and key.
    pub fn new(modifiers: impl IntoIterator<Item = Modifier>, key: Key) -> Self {
        Self {
            modifiers: modifiers.into_iter().collect(),
            key,
        }
    }

    /// Parses a chord specification of the form `"ctrl+shift+<f1>"`.
    ///
    /// - Case-insensitive for both modifiers and the key.
    /// - Components are separated by `+`; the last component is always the key.
    ///   A trailing `++` means the literal `+` key.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (mods, key_raw) = if s == "+" {
            ("", "+")
        } else if let Some(prefix) = s.strip_suffix("++") {
            (prefix, "+")
        } else {
            match s.rsplit_once('+') {
                Some((m, k)) => (m, k),
                None => ("", s),
            }
        };
        if key_raw.is_empty() {
            return None;
        }
        let key = Key::from_spec(key_raw)?;
        let modifiers = modifiers_from_spec(mods)?;
        Some(Self { modifiers, key })
    }

    /// Builds a chord from the stored `(modifier, key)` pair form.
    pub fn from_pair(modifier: &str, key: &str) -> Option<Self> {
        Some(Self {
            modifiers: modifiers_from_spec(modifier)?,
            key: Key::from_spec(key)?,
        })
    }

    /// The `(modifier, key)` pair form: `("ctrl+shift", "<f1>")`, or `("", "a")`.
    pub fn to_pair(&self) -> (String, String) {
        let mods: Vec<&str> = self.modifiers.iter().map(|m| m.to_spec()).collect();
        (mods.join("+"), self.key.token())
    }

    /// Returns the canonical hotkey encoding of this chord.
    ///
    /// Modifiers are emitted in the fixed order (control, shift, alt, meta) as
    /// bracketed tokens, followed by the key token. A chord with no modifiers
    /// encodes as the key token alone, so two chords encode equal iff they are
    /// the same combination.
    pub fn encode(&self) -> String {
        let mut out: Vec<String> = self
            .modifiers
            .iter()
            .map(|m| format!("<{}>", m.to_spec()))
            .collect();
        out.push(self.key.token());
        out.join("+")
    }

    /// Every physical key of this chord, modifiers first.
    pub fn keys(&self) -> impl Iterator<Item = KeyOrModifier> + '_ {
        self.modifiers
            .iter()
            .copied()
            .map(KeyOrModifier::Modifier)
            .chain(iter::once(KeyOrModifier::Key(self.key)))
    }
}

/// One physical key of a chord, for press/release synthesis.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyOrModifier {
    /// A modifier key.
    Modifier(Modifier),
    /// The main key.
    Key(Key),
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_chord() {
        let c = Chord::parse("shift+ctrl+<F1>").expect("parse");
        assert!(c.modifiers.contains(&Modifier::Shift));
        assert!(c.modifiers.contains(&Modifier::Control));
        assert_eq!(c.key, Key::F(1));
        assert_eq!(c.to_string(), "<ctrl>+<shift>+<f1>");
    }

    #[test]
    fn modifier_order_does_not_change_encoding() {
        let a = Chord::parse("alt+ctrl+a").expect("parse");
        let b = Chord::parse("<ctrl>+<alt>+A").expect("parse");
        assert_eq!(a.encode(), b.encode());
        assert_eq!(a.encode(), "<ctrl>+<alt>+a");
    }

    #[test]
    fn empty_modifier_is_literal_key() {
        assert_eq!(Chord::parse("a").expect("parse").encode(), "a");
        assert_eq!(Chord::parse("<numpad7>").expect("parse").encode(), "<numpad7>");
        assert_eq!(
            Chord::from_pair("", "<NUMPAD7>").expect("pair").encode(),
            "<numpad7>"
        );
    }

    #[test]
    fn plus_key() {
        assert_eq!(Chord::parse("+").expect("parse").key, Key::Char('+'));
        let c = Chord::parse("ctrl++").expect("parse");
        assert_eq!(c.key, Key::Char('+'));
        assert_eq!(c.encode(), "<ctrl>++");
    }

    #[test]
    fn pair_roundtrip() {
        let c = Chord::parse("meta+shift+<pause>").expect("parse");
        let (m, k) = c.to_pair();
        assert_eq!((m.as_str(), k.as_str()), ("shift+meta", "<pause>"));
        assert_eq!(Chord::from_pair(&m, &k), Some(c));
    }

    #[test]
    fn invalid_specs() {
        assert_eq!(Chord::parse(""), None);
        assert_eq!(Chord::parse("ctrl+"), None);
        assert_eq!(Chord::parse("hyper+a"), None);
    }
}
