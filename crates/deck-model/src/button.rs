//! Per-slot state.

use deck_keycode::Chord;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    ActionCatalog, ActionKind, Argument, Error, Result,
    style::{self, Colors},
};

/// Maximum displayed text length, in characters.
pub const MAX_TEXT: usize = 35;

/// Default text of the back slot.
pub const BACK_TEXT: &str = "Back";

/// State changes returned by an action invocation and applied to the slot
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatePatch {
    /// New colors; applied even to locked slots.
    pub colors: Option<Colors>,
    /// New argument.
    #[serde(skip)]
    pub argument: Option<Argument>,
}

impl StatePatch {
    /// A patch that only recolors.
    pub fn colors(colors: Colors) -> Self {
        Self {
            colors: Some(colors),
            argument: None,
        }
    }

    /// True if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.colors.is_none() && self.argument.is_none()
    }
}

/// One physical slot's configuration.
///
/// While `locked`, every setter is a no-op; only [`ButtonState::unlock`]
/// and color patches get through.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonState {
    action: ActionKind,
    argument: Argument,
    hotkey: Option<Chord>,
    text: String,
    default_text: String,
    colors: Colors,
    image: Option<usize>,
    locked: bool,
}

impl Default for ButtonState {
    fn default() -> Self {
        Self::blank(None)
    }
}

impl ButtonState {
    /// An unassigned slot with the disabled look.
    pub fn blank(hotkey: Option<Chord>) -> Self {
        Self {
            action: ActionKind::NoOp,
            argument: Argument::None,
            hotkey,
            text: String::new(),
            default_text: String::new(),
            colors: Colors::empty(),
            image: None,
            locked: false,
        }
    }

    /// Rebuild a slot from stored parts without running assignment side effects.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        action: ActionKind,
        argument: Argument,
        hotkey: Option<Chord>,
        text: String,
        default_text: String,
        colors: Colors,
        image: Option<usize>,
    ) -> Self {
        Self {
            action,
            argument,
            hotkey,
            text,
            default_text,
            colors,
            image,
            locked: false,
        }
    }

    /// Bound action.
    pub fn action(&self) -> ActionKind {
        self.action
    }

    /// Bound argument.
    pub fn argument(&self) -> &Argument {
        &self.argument
    }

    /// Bound hotkey.
    pub fn hotkey(&self) -> Option<&Chord> {
        self.hotkey.as_ref()
    }

    /// Displayed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text shown when no user text is set.
    pub fn default_text(&self) -> &str {
        &self.default_text
    }

    /// Current colors.
    pub fn colors(&self) -> &Colors {
        &self.colors
    }

    /// Image table index overriding the action icon.
    pub fn image(&self) -> Option<usize> {
        self.image
    }

    /// True while setters are disabled.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Disable setters.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Re-enable setters.
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// True when the slot is inert (renders disabled, no hotkey).
    pub fn is_inert(&self) -> bool {
        self.action.descriptor().inert
    }

    /// Bind `kind`.
    ///
    /// Inert actions reset the slot to the disabled look. Otherwise the slot
    /// leaves the disabled look (fill chosen by grid `row`), takes the
    /// action's default text, and takes `argument` or the action's default
    /// argument. Returns false when locked.
    pub fn assign(
        &mut self,
        catalog: &ActionCatalog,
        kind: ActionKind,
        argument: Option<Argument>,
        row: u32,
    ) -> Result<bool> {
        if self.locked {
            return Ok(false);
        }
        let desc = *catalog.descriptor(kind).ok_or(Error::UnknownAction(kind))?;
        let argument = argument.unwrap_or_else(|| desc.default_argument());
        argument.check(kind)?;
        if desc.inert {
            self.deactivate();
            return Ok(true);
        }
        self.activate(row);
        self.action = kind;
        if let Some(t) = desc.default_text {
            self.set_default_text(t);
        }
        self.argument = argument;
        trace!(?kind, "slot_assigned");
        Ok(true)
    }

    /// Replace the argument. Returns false when locked.
    pub fn set_argument(&mut self, argument: Argument) -> Result<bool> {
        if self.locked {
            return Ok(false);
        }
        argument.check(self.action)?;
        self.argument = argument;
        Ok(true)
    }

    /// Replace the hotkey. Returns false when locked.
    pub fn set_hotkey(&mut self, hotkey: Option<Chord>) -> bool {
        if self.locked {
            return false;
        }
        self.hotkey = hotkey;
        true
    }

    /// Set the displayed text, truncated to [`MAX_TEXT`] characters. Empty
    /// text falls back to the default text.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.locked {
            return false;
        }
        self.text = truncate(text);
        self.fill_from_default();
        true
    }

    /// Set the default text. If the slot was showing the old default, it
    /// now shows the new one.
    pub fn set_default_text(&mut self, text: &str) -> bool {
        if self.locked {
            return false;
        }
        if self.text == truncate(&self.default_text) {
            self.text.clear();
        }
        self.default_text = text.to_string();
        self.fill_from_default();
        true
    }

    fn fill_from_default(&mut self) {
        if self.text.is_empty() && !self.default_text.is_empty() {
            self.text = truncate(&self.default_text);
        }
    }

    /// Replace colors. Returns false when locked.
    pub fn set_colors(&mut self, colors: Colors) -> bool {
        if self.locked {
            return false;
        }
        self.colors = colors;
        true
    }

    /// Override the action icon with an image table entry. Returns false when locked.
    pub fn set_image(&mut self, image: Option<usize>) -> bool {
        if self.locked {
            return false;
        }
        self.image = image;
        true
    }

    /// Apply an invocation result. Colors bypass the lock; the argument does not.
    pub fn apply_patch(&mut self, patch: StatePatch) -> Result<()> {
        if let Some(c) = patch.colors {
            self.colors = c;
        }
        if let Some(a) = patch.argument {
            self.set_argument(a)?;
        }
        Ok(())
    }

    /// Leave the disabled look, if showing it.
    pub fn activate(&mut self, row: u32) {
        if self.locked || !self.colors.is_empty() {
            return;
        }
        let fill = style::default_fill(row);
        self.colors.fill = fill.to_string();
        self.colors.hover = style::hover_color(fill);
    }

    /// Clear the binding and show the disabled look. The hotkey is kept.
    pub fn deactivate(&mut self) {
        if self.locked {
            return;
        }
        self.colors.fill = style::FC_EMPTY.to_string();
        self.colors.hover = style::hover_color(style::FC_EMPTY);
        self.default_text.clear();
        self.text.clear();
        self.action = ActionKind::NoOp;
        self.argument = Argument::None;
        self.image = None;
    }

    /// Turn this slot into the locked "return to root" control.
    pub fn make_back_slot(&mut self) {
        self.unlock();
        self.deactivate();
        self.action = ActionKind::OpenView;
        self.argument = Argument::View(0);
        self.set_default_text(BACK_TEXT);
        self.lock();
    }

    /// True if this is an open-view slot targeting `view`.
    pub fn targets_view(&self, view: usize) -> bool {
        self.action == ActionKind::OpenView && self.argument.view() == Some(view)
    }

    /// Mutable access to the argument for reference rewriting. Ignores the lock.
    pub(crate) fn argument_mut(&mut self) -> &mut Argument {
        &mut self.argument
    }
}

fn truncate(s: &str) -> String {
    s.chars().take(MAX_TEXT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{FC_DEFAULT2, FC_EMPTY};

    fn cat() -> ActionCatalog {
        ActionCatalog::standard()
    }

    #[test]
    fn assign_applies_defaults_and_activates() {
        let mut b = ButtonState::blank(None);
        assert!(b.assign(&cat(), ActionKind::PauseMedia, None, 1).unwrap());
        assert_eq!(b.action(), ActionKind::PauseMedia);
        assert_eq!(b.text(), "Pause Media");
        assert_eq!(b.colors().fill, FC_DEFAULT2);

        b.assign(&cat(), ActionKind::SetVolume, None, 1).unwrap();
        assert_eq!(b.argument(), &Argument::Volume(50));
        // Coming from a live action, the fill is left alone.
        assert_eq!(b.colors().fill, FC_DEFAULT2);
    }

    #[test]
    fn explicit_argument_wins() {
        let mut b = ButtonState::blank(None);
        b.assign(&cat(), ActionKind::OpenView, Some(Argument::View(3)), 0)
            .unwrap();
        assert_eq!(b.argument(), &Argument::View(3));
    }

    #[test]
    fn assign_inert_deactivates() {
        let mut b = ButtonState::blank(None);
        b.assign(&cat(), ActionKind::OpenUrl, Some(Argument::Text("x".into())), 0)
            .unwrap();
        b.set_image(Some(2));
        b.assign(&cat(), ActionKind::NoOp, None, 0).unwrap();
        assert_eq!(b.argument(), &Argument::None);
        assert_eq!(b.image(), None);
        assert_eq!(b.colors().fill, FC_EMPTY);
        assert!(b.is_inert());
    }

    #[test]
    fn locked_slot_ignores_setters() {
        let mut b = ButtonState::blank(None);
        b.make_back_slot();
        let before = b.clone();
        assert!(!b.assign(&cat(), ActionKind::StopMedia, None, 0).unwrap());
        assert!(!b.set_argument(Argument::View(2)).unwrap());
        assert!(!b.set_text("hi"));
        assert!(!b.set_hotkey(None));
        b.deactivate();
        assert_eq!(b, before);
        b.unlock();
        assert!(b.set_text("hi"));
    }

    #[test]
    fn color_patch_passes_lock() {
        let mut b = ButtonState::blank(None);
        b.make_back_slot();
        b.apply_patch(StatePatch::colors(Colors::filled("#010101")))
            .unwrap();
        assert_eq!(b.colors().fill, "#010101");
    }

    #[test]
    fn text_truncates_and_falls_back() {
        let mut b = ButtonState::blank(None);
        b.set_text(&"x".repeat(50));
        assert_eq!(b.text().chars().count(), MAX_TEXT);
        b.set_default_text("Default");
        b.set_text("");
        assert_eq!(b.text(), "Default");
        b.set_default_text("Other");
        assert_eq!(b.text(), "Other");
        b.set_text("Mine");
        b.set_default_text("Third");
        assert_eq!(b.text(), "Mine");
    }

    #[test]
    fn nested_multi_rejected_on_assign() {
        use crate::MultiStep;
        let mut b = ButtonState::blank(None);
        let arg = Argument::Multi(vec![MultiStep::new(
            ActionKind::MultiAction,
            Argument::Multi(vec![]),
        )]);
        assert_eq!(
            b.assign(&cat(), ActionKind::MultiAction, Some(arg), 0),
            Err(Error::NestedMultiAction)
        );
        assert_eq!(b.action(), ActionKind::NoOp);
    }
}
