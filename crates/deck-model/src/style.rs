//! Slot colors.

use serde::{Deserialize, Serialize};

/// Fill of a slot with no action.
pub const FC_EMPTY: &str = "#2b2b2b";
/// Default fill on even grid rows.
pub const FC_DEFAULT: &str = "#1f6aa5";
/// Default fill on odd grid rows.
pub const FC_DEFAULT2: &str = "#144870";
/// Fill for a remote toggle that is on.
pub const FC_ACTIVE: &str = "#2fa572";
/// Default border.
pub const BC_DEFAULT: &str = "#565b5e";

/// Fill, border and hover colors of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colors {
    /// Background.
    pub fill: String,
    /// Border.
    pub border: String,
    /// Background under the pointer.
    pub hover: String,
}

impl Colors {
    /// Fill `fill` with the default border and derived hover.
    pub fn filled(fill: &str) -> Self {
        Self {
            fill: fill.to_string(),
            border: BC_DEFAULT.to_string(),
            hover: hover_color(fill),
        }
    }

    /// The disabled look.
    pub fn empty() -> Self {
        Self::filled(FC_EMPTY)
    }

    /// True when showing the disabled look.
    pub fn is_empty(&self) -> bool {
        self.fill.eq_ignore_ascii_case(FC_EMPTY)
    }
}

impl Default for Colors {
    fn default() -> Self {
        Self::empty()
    }
}

/// Default fill for a slot on grid row `row`.
pub fn default_fill(row: u32) -> &'static str {
    if row % 2 == 0 { FC_DEFAULT } else { FC_DEFAULT2 }
}

/// Hover color for `fill`: each channel darkened by 30. Unparseable input is
/// returned unchanged.
pub fn hover_color(fill: &str) -> String {
    let Some(hex) = fill.strip_prefix('#').filter(|h| h.len() == 6) else {
        return fill.to_string();
    };
    let mut out = String::from("#");
    for i in 0..3 {
        let Ok(v) = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16) else {
            return fill.to_string();
        };
        out.push_str(&format!("{:02x}", v.saturating_sub(30)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_darkens_and_clamps() {
        assert_eq!(hover_color("#ffffff"), "#e1e1e1");
        assert_eq!(hover_color("#100a1e"), "#000000");
        assert_eq!(hover_color("red"), "red");
    }

    #[test]
    fn rows_alternate() {
        assert_eq!(default_fill(0), FC_DEFAULT);
        assert_eq!(default_fill(3), FC_DEFAULT2);
    }
}
