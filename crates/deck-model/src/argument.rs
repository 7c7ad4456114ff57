//! Action arguments.

use macroplay::Macro;
use serde::{Deserialize, Serialize};

use crate::{ActionKind, Error, PersistentId, Result};

/// Target geometry for the window-move action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPlacement {
    /// Substring matched against window titles.
    pub title: String,
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// One step of a multi action.
///
/// The step refers to its action by persistent id so that a step whose
/// action is missing from the running catalog survives a round trip and is
/// skipped at invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiStep {
    /// Persistent id of the step's action.
    pub action: PersistentId,
    /// The step's argument.
    pub argument: Argument,
}

impl MultiStep {
    /// A step for a known action kind.
    pub fn new(kind: ActionKind, argument: Argument) -> Self {
        Self {
            action: kind.persistent_id(),
            argument,
        }
    }
}

/// Argument bound to a slot. The variant must match the slot's action.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Argument {
    /// Not configured.
    #[default]
    None,
    /// File path, URL, text to type, scene or source name.
    Text(String),
    /// Target view index.
    View(usize),
    /// Volume percentage, `0..=100`.
    Volume(u8),
    /// Keystroke sequence.
    Macro(Macro),
    /// Ordered sub-actions.
    Multi(Vec<MultiStep>),
    /// Window geometry.
    Window(WindowPlacement),
}

impl Argument {
    /// True if the argument carries something to act on.
    pub fn is_set(&self) -> bool {
        match self {
            Self::None => false,
            Self::Text(s) => !s.is_empty(),
            Self::Macro(m) => !m.is_empty(),
            Self::Multi(steps) => !steps.is_empty(),
            Self::View(_) | Self::Volume(_) | Self::Window(_) => true,
        }
    }

    /// The view index of an open-view argument.
    pub fn view(&self) -> Option<usize> {
        match self {
            Self::View(v) => Some(*v),
            _ => None,
        }
    }

    /// Check that this argument fits `kind`.
    ///
    /// `None` fits everything. Multi action steps may not themselves be multi
    /// actions; steps with unknown ids are accepted and skipped when run.
    pub fn check(&self, kind: ActionKind) -> Result<()> {
        use ActionKind as K;
        let ok = match (kind, self) {
            (_, Self::None) => true,
            (
                K::PlayMedia
                | K::OpenUrl
                | K::TypeText
                | K::ShuffleMedia
                | K::ToggleRemoteScene
                | K::SwitchRemoteSource,
                Self::Text(_),
            )
            | (K::OpenView, Self::View(_))
            | (K::RunMacro, Self::Macro(_))
            | (K::MoveWindow, Self::Window(_)) => true,
            (K::SetVolume, Self::Volume(v)) => *v <= 100,
            (K::MultiAction, Self::Multi(steps)) => {
                for step in steps {
                    match ActionKind::from_persistent_id(step.action) {
                        Some(K::MultiAction) => return Err(Error::NestedMultiAction),
                        Some(k) => step.argument.check(k)?,
                        None => {}
                    }
                }
                true
            }
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidArgument {
                action: kind,
                message: format!("{self:?}"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_forms() {
        assert!(!Argument::None.is_set());
        assert!(!Argument::Text(String::new()).is_set());
        assert!(!Argument::Multi(vec![]).is_set());
        assert!(Argument::View(0).is_set());
    }

    #[test]
    fn check_matches_shape() {
        assert!(Argument::View(2).check(ActionKind::OpenView).is_ok());
        assert!(Argument::Text("x".into()).check(ActionKind::OpenView).is_err());
        assert!(Argument::Volume(101).check(ActionKind::SetVolume).is_err());
        assert!(Argument::Text("x".into()).check(ActionKind::StopMedia).is_err());
        assert!(Argument::None.check(ActionKind::StopMedia).is_ok());
    }

    #[test]
    fn nested_multi_rejected() {
        let inner = Argument::Multi(vec![]);
        let outer = Argument::Multi(vec![
            MultiStep::new(ActionKind::StopMedia, Argument::None),
            MultiStep::new(ActionKind::MultiAction, inner),
        ]);
        assert_eq!(
            outer.check(ActionKind::MultiAction),
            Err(Error::NestedMultiAction)
        );
    }

    #[test]
    fn unknown_step_ids_are_accepted() {
        let arg = Argument::Multi(vec![MultiStep {
            action: PersistentId(999),
            argument: Argument::Text("?".into()),
        }]);
        assert!(arg.check(ActionKind::MultiAction).is_ok());
    }
}
