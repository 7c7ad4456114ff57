use std::fmt;

use serde::{Deserialize, Serialize};

/// A physical key token.
///
/// Printable keys are stored as their (lowercased) literal character so that
/// numpad operators such as `+` or `*` encode exactly as they are typed. All
/// other keys are named tokens.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Key {
    /// A printable character key (letters are lowercase).
    Char(char),
    /// Numeric keypad digit, `0..=9`.
    Numpad(u8),
    /// Function key, `1..=24`.
    F(u8),
    Decimal,
    Return,
    Tab,
    Space,
    Escape,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Left,
    Up,
    Right,
    Down,
    Pause,
    VolumeMute,
    VolumeDown,
    VolumeUp,
    MediaNext,
    MediaPrev,
    MediaStop,
    MediaPlayPause,
}

/// Canonical spec names for the fixed named keys.
const NAMED: &[(Key, &str)] = &[
    (Key::Decimal, "decimal"),
    (Key::Return, "return"),
    (Key::Tab, "tab"),
    (Key::Space, "space"),
    (Key::Escape, "escape"),
    (Key::Backspace, "backspace"),
    (Key::Delete, "delete"),
    (Key::Insert, "insert"),
    (Key::Home, "home"),
    (Key::End, "end"),
    (Key::PageUp, "pageup"),
    (Key::PageDown, "pagedown"),
    (Key::Left, "left"),
    (Key::Up, "up"),
    (Key::Right, "right"),
    (Key::Down, "down"),
    (Key::Pause, "pause"),
    (Key::VolumeMute, "volumemute"),
    (Key::VolumeDown, "volumedown"),
    (Key::VolumeUp, "volumeup"),
    (Key::MediaNext, "medianexttrack"),
    (Key::MediaPrev, "mediaprevtrack"),
    (Key::MediaStop, "mediastop"),
    (Key::MediaPlayPause, "mediaplaypause"),
];

// Aliases that only apply to parsing specs (never emitted by to_spec).
const ALIASES: &[(Key, &str)] = &[
    (Key::Return, "enter"),
    (Key::Return, "ret"),
    (Key::Escape, "esc"),
    (Key::Backspace, "back"),
    (Key::Delete, "del"),
    (Key::Insert, "ins"),
    (Key::PageUp, "pgup"),
    (Key::PageUp, "prior"),
    (Key::PageDown, "pgdn"),
    (Key::PageDown, "next"),
    (Key::Decimal, "kpdecimal"),
    (Key::MediaNext, "medianext"),
    (Key::MediaPrev, "mediaprev"),
];

impl Key {
    /// Parses a key specification.
    ///
    /// - A single non-whitespace character is a literal key (`"+"`, `"a"`, `"7"`).
    /// - Named keys are case-insensitive and may be wrapped in angle brackets
    ///   (`"<NUMPAD7>"`, `"f13"`, `"<media_play_pause>"`); underscores are ignored.
    pub fn from_spec(s: &str) -> Option<Self> {
        if let Some(k) = Self::literal(s) {
            return Some(k);
        }
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .unwrap_or(trimmed);
        if let Some(k) = Self::literal(inner) {
            return Some(k);
        }
        let name: String = inner
            .chars()
            .filter(|c| *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        if let Some(n) = name.strip_prefix("numpad") {
            return n.parse::<u8>().ok().filter(|n| *n <= 9).map(Key::Numpad);
        }
        if let Some(n) = name.strip_prefix('f')
            && !n.is_empty()
            && n.bytes().all(|b| b.is_ascii_digit())
        {
            return n
                .parse::<u8>()
                .ok()
                .filter(|n| (1..=24).contains(n))
                .map(Key::F);
        }
        NAMED
            .iter()
            .chain(ALIASES.iter())
            .find(|(_, spec)| *spec == name)
            .map(|(k, _)| *k)
    }

    /// Single printable character, lowercased.
    fn literal(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let c = chars.next()?;
        if chars.next().is_some() || c.is_whitespace() || c.is_control() {
            return None;
        }
        Some(Key::Char(c.to_ascii_lowercase()))
    }

    /// Returns the canonical spec name, without brackets.
    pub fn to_spec(self) -> String {
        match self {
            Key::Char(c) => c.to_string(),
            Key::Numpad(n) => format!("numpad{n}"),
            Key::F(n) => format!("f{n}"),
            named => NAMED
                .iter()
                .find(|(k, _)| *k == named)
                .map(|(_, s)| (*s).to_string())
                .unwrap_or_default(),
        }
    }

    /// True for keys that encode as a literal character.
    pub fn is_printable(self) -> bool {
        matches!(self, Key::Char(_))
    }

    /// Hotkey token: a literal character, or the bracketed spec name.
    pub fn token(self) -> String {
        if self.is_printable() {
            self.to_spec()
        } else {
            format!("<{}>", self.to_spec())
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_keys() {
        assert_eq!(Key::from_spec("+"), Some(Key::Char('+')));
        assert_eq!(Key::from_spec("A"), Some(Key::Char('a')));
        assert_eq!(Key::from_spec("7"), Some(Key::Char('7')));
        assert_eq!(Key::from_spec(" "), None);
        assert_eq!(Key::Char('*').token(), "*");
    }

    #[test]
    fn named_keys_accept_brackets_and_case() {
        assert_eq!(Key::from_spec("<NUMPAD7>"), Some(Key::Numpad(7)));
        assert_eq!(Key::from_spec("numpad0"), Some(Key::Numpad(0)));
        assert_eq!(Key::from_spec("<F13>"), Some(Key::F(13)));
        assert_eq!(Key::from_spec("<DECIMAL>"), Some(Key::Decimal));
        assert_eq!(Key::from_spec("<media_play_pause>"), Some(Key::MediaPlayPause));
        assert_eq!(Key::from_spec("enter"), Some(Key::Return));
        assert_eq!(Key::from_spec("numpad10"), None);
        assert_eq!(Key::from_spec("f25"), None);
        assert_eq!(Key::from_spec("bogus"), None);
    }

    #[test]
    fn tokens_are_bracketed_for_named_keys() {
        assert_eq!(Key::F(1).token(), "<f1>");
        assert_eq!(Key::Numpad(3).token(), "<numpad3>");
        assert_eq!(Key::Return.to_string(), "<return>");
    }

    #[test]
    fn spec_roundtrip_for_named_keys() {
        for (k, _) in NAMED {
            assert_eq!(Key::from_spec(&k.token()), Some(*k), "{k:?}");
        }
        for n in 0..=9 {
            assert_eq!(Key::from_spec(&Key::Numpad(n).token()), Some(Key::Numpad(n)));
        }
    }
}
