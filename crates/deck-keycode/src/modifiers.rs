use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Modifier keys in the fixed hotkey vocabulary.
///
/// Declaration order is the canonical encoding order, so a `BTreeSet<Modifier>`
/// iterates control, shift, alt, meta regardless of insertion order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Modifier {
    /// Control.
    Control,
    /// Shift.
    Shift,
    /// Alt / Option / Menu.
    Alt,
    /// Meta / Windows / Command.
    Meta,
}

impl Modifier {
    /// All modifiers in canonical order.
    pub const ALL: [Self; 4] = [Self::Control, Self::Shift, Self::Alt, Self::Meta];

    /// Parses a modifier name, case-insensitive, with or without angle brackets.
    ///
    /// Accepts the hotkey names (`ctrl`, `shift`, `alt`, `meta`), the macro
    /// editor names (`CONTROL`, `SHIFT`, `ALT`, `WIN`) and the virtual-key names
    /// (`MENU`, `LWIN`).
    pub fn from_spec(s: &str) -> Option<Self> {
        let t = s.trim();
        let t = t
            .strip_prefix('<')
            .and_then(|x| x.strip_suffix('>'))
            .unwrap_or(t);
        match t.to_ascii_lowercase().as_str() {
            "ctrl" | "control" | "ctl" => Some(Self::Control),
            "shift" => Some(Self::Shift),
            "alt" | "opt" | "option" | "menu" => Some(Self::Alt),
            "meta" | "win" | "lwin" | "cmd" | "command" | "super" => Some(Self::Meta),
            _ => None,
        }
    }

    /// Canonical lowercase spec name.
    pub fn to_spec(self) -> &'static str {
        match self {
            Self::Control => "ctrl",
            Self::Shift => "shift",
            Self::Alt => "alt",
            Self::Meta => "meta",
        }
    }
}

/// Parses a `+`-joined modifier list such as `"<ctrl>+<shift>"` or `"CONTROL+WIN"`.
///
/// The empty string and `"none"` are the empty set. Returns `None` when any
/// component is not a modifier.
pub fn modifiers_from_spec(s: &str) -> Option<BTreeSet<Modifier>> {
    let t = s.trim();
    let mut set = BTreeSet::new();
    if t.is_empty() || t.eq_ignore_ascii_case("none") {
        return Some(set);
    }
    for part in t.split('+') {
        set.insert(Modifier::from_spec(part)?);
    }
    Some(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_specs() {
        assert_eq!(Modifier::from_spec("ctrl"), Some(Modifier::Control));
        assert_eq!(Modifier::from_spec("<ctrl>"), Some(Modifier::Control));
        assert_eq!(Modifier::from_spec("CONTROL"), Some(Modifier::Control));
        assert_eq!(Modifier::from_spec("MENU"), Some(Modifier::Alt));
        assert_eq!(Modifier::from_spec("WIN"), Some(Modifier::Meta));
        assert_eq!(Modifier::from_spec("hyper"), None);
        assert_eq!(Modifier::Alt.to_spec(), "alt");
    }

    #[test]
    fn modifier_lists() {
        let set = modifiers_from_spec("<shift>+<ctrl>").expect("parse");
        let order: Vec<_> = set.into_iter().collect();
        assert_eq!(order, vec![Modifier::Control, Modifier::Shift]);
        assert_eq!(modifiers_from_spec(""), Some(BTreeSet::new()));
        assert_eq!(modifiers_from_spec("none"), Some(BTreeSet::new()));
        assert_eq!(modifiers_from_spec("ctrl+q"), None);
    }
}
