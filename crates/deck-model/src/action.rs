//! The action catalog.
//!
//! [`ActionKind`] is the closed set of behaviors a slot can be bound to. How
//! each kind is written to disk is a separate, append-only table
//! ([`PERSISTENT_IDS`]): the enum may be reordered or extended freely, but an
//! id, once assigned, always means the same variant.
//!
//! [`ActionCatalog`] is the ordered registry shown to the user. Its positions
//! ([`ActionIndex`]) are only meaningful for the current run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Argument, Error, Result};

/// Every action variant known to this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ActionKind {
    NoOp,
    PlayMedia,
    StopMedia,
    PauseMedia,
    OpenView,
    RunMacro,
    OpenUrl,
    TypeText,
    SetVolume,
    ShuffleMedia,
    ToggleRemoteScene,
    MultiAction,
    SwitchRemoteSource,
    MoveWindow,
}

/// Stable on-disk identity of an action variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistentId(pub u32);

impl fmt::Display for PersistentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Append-only persistent id assignments. Never renumber or reuse an entry.
pub const PERSISTENT_IDS: &[(ActionKind, u32)] = &[
    (ActionKind::NoOp, 0),
    (ActionKind::PlayMedia, 1),
    (ActionKind::StopMedia, 2),
    (ActionKind::PauseMedia, 3),
    (ActionKind::OpenView, 4),
    (ActionKind::RunMacro, 5),
    (ActionKind::OpenUrl, 6),
    (ActionKind::TypeText, 7),
    (ActionKind::SetVolume, 8),
    (ActionKind::ShuffleMedia, 9),
    (ActionKind::ToggleRemoteScene, 10),
    (ActionKind::MultiAction, 11),
    (ActionKind::SwitchRemoteSource, 12),
    (ActionKind::MoveWindow, 13),
];

impl ActionKind {
    /// All variants in declaration order.
    pub const ALL: [Self; 14] = [
        Self::NoOp,
        Self::PlayMedia,
        Self::StopMedia,
        Self::PauseMedia,
        Self::OpenView,
        Self::RunMacro,
        Self::OpenUrl,
        Self::TypeText,
        Self::SetVolume,
        Self::ShuffleMedia,
        Self::ToggleRemoteScene,
        Self::MultiAction,
        Self::SwitchRemoteSource,
        Self::MoveWindow,
    ];

    /// The variant's persistent id.
    pub fn persistent_id(self) -> PersistentId {
        PERSISTENT_IDS
            .iter()
            .find(|(k, _)| *k == self)
            .map(|(_, id)| PersistentId(*id))
            // Every variant is listed; see `every_kind_has_an_id`.
            .unwrap_or(PersistentId(0))
    }

    /// The variant a persistent id denotes, if any.
    pub fn from_persistent_id(id: PersistentId) -> Option<Self> {
        PERSISTENT_IDS
            .iter()
            .find(|(_, pid)| *pid == id.0)
            .map(|(k, _)| *k)
    }

    /// The static description of this variant.
    pub fn descriptor(self) -> ActionDescriptor {
        use ActionKind::*;
        let d = ActionDescriptor {
            kind: self,
            name: "",
            requires_argument: true,
            inert: false,
            needs_ui_thread: false,
            default_text: None,
        };
        match self {
            NoOp => ActionDescriptor {
                name: "No Action",
                requires_argument: false,
                inert: true,
                ..d
            },
            PlayMedia => ActionDescriptor {
                name: "Play Media",
                ..d
            },
            StopMedia => ActionDescriptor {
                name: "Stop Media",
                requires_argument: false,
                default_text: Some("Stop Media"),
                ..d
            },
            PauseMedia => ActionDescriptor {
                name: "Pause Media",
                requires_argument: false,
                default_text: Some("Pause Media"),
                ..d
            },
            OpenView => ActionDescriptor {
                name: "Open View",
                needs_ui_thread: true,
                ..d
            },
            RunMacro => ActionDescriptor {
                name: "Run Macro",
                ..d
            },
            OpenUrl => ActionDescriptor {
                name: "Open Web Page",
                ..d
            },
            TypeText => ActionDescriptor {
                name: "Type Text",
                ..d
            },
            SetVolume => ActionDescriptor {
                name: "Set Volume",
                ..d
            },
            ShuffleMedia => ActionDescriptor {
                name: "Shuffle Media",
                default_text: Some("Shuffle"),
                ..d
            },
            ToggleRemoteScene => ActionDescriptor {
                name: "Toggle Scene",
                ..d
            },
            MultiAction => ActionDescriptor {
                name: "Multi Action",
                ..d
            },
            SwitchRemoteSource => ActionDescriptor {
                name: "Switch Source",
                ..d
            },
            MoveWindow => ActionDescriptor {
                name: "Move Window",
                ..d
            },
        }
    }
}

/// Static properties of an action variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionDescriptor {
    /// The variant.
    pub kind: ActionKind,
    /// Display name.
    pub name: &'static str,
    /// Invocation needs a configured argument.
    pub requires_argument: bool,
    /// Renders its slot disabled and is never bound to a hotkey.
    pub inert: bool,
    /// Invocation must run on the UI loop.
    pub needs_ui_thread: bool,
    /// Text shown when the user has not set any.
    pub default_text: Option<&'static str>,
}

impl ActionDescriptor {
    /// Persistent id of the described variant.
    pub fn persistent_id(&self) -> PersistentId {
        self.kind.persistent_id()
    }

    /// Argument applied when the action is assigned without one.
    pub fn default_argument(&self) -> Argument {
        match self.kind {
            ActionKind::OpenView => Argument::View(0),
            ActionKind::OpenUrl => Argument::Text(String::new()),
            ActionKind::SetVolume => Argument::Volume(50),
            ActionKind::MultiAction => Argument::Multi(Vec::new()),
            _ => Argument::None,
        }
    }
}

/// Position of an action in the current run's catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionIndex(pub usize);

/// Ordered registry of the actions offered by this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCatalog {
    actions: Vec<ActionDescriptor>,
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ActionCatalog {
    /// Every variant, in declaration order.
    pub fn standard() -> Self {
        Self {
            actions: ActionKind::ALL.iter().map(|k| k.descriptor()).collect(),
        }
    }

    /// A catalog with the given order. Must contain `NoOp` and no duplicates;
    /// omitted variants are unavailable for this run.
    pub fn with_order(kinds: &[ActionKind]) -> Result<Self> {
        let mut actions: Vec<ActionDescriptor> = Vec::with_capacity(kinds.len());
        for k in kinds {
            if actions.iter().any(|a| a.kind == *k) {
                return Err(Error::InvalidArgument {
                    action: *k,
                    message: "listed twice in catalog".into(),
                });
            }
            actions.push(k.descriptor());
        }
        if !kinds.contains(&ActionKind::NoOp) {
            return Err(Error::UnknownAction(ActionKind::NoOp));
        }
        Ok(Self { actions })
    }

    /// Number of available actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Never true; `NoOp` is always present.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Descriptor at a runtime index.
    pub fn get(&self, ix: ActionIndex) -> Option<&ActionDescriptor> {
        self.actions.get(ix.0)
    }

    /// Runtime index of `kind`, if available in this run.
    pub fn index_of(&self, kind: ActionKind) -> Option<ActionIndex> {
        self.actions.iter().position(|a| a.kind == kind).map(ActionIndex)
    }

    /// Descriptor for `kind`, if available in this run.
    pub fn descriptor(&self, kind: ActionKind) -> Option<&ActionDescriptor> {
        self.actions.iter().find(|a| a.kind == kind)
    }

    /// True if `kind` is available.
    pub fn contains(&self, kind: ActionKind) -> bool {
        self.descriptor(kind).is_some()
    }

    /// Resolve a persistent id to a live action.
    pub fn resolve(&self, id: PersistentId) -> Option<&ActionDescriptor> {
        ActionKind::from_persistent_id(id).and_then(|k| self.descriptor(k))
    }

    /// Descriptors in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionDescriptor> {
        self.actions.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_kind_has_an_id() {
        for k in ActionKind::ALL {
            assert!(PERSISTENT_IDS.iter().any(|(x, _)| *x == k), "{k:?}");
        }
    }

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<u32> = PERSISTENT_IDS.iter().map(|(_, id)| *id).collect();
        assert_eq!(ids.len(), PERSISTENT_IDS.len());
    }

    #[test]
    fn known_ids_are_fixed() {
        assert_eq!(ActionKind::OpenView.persistent_id(), PersistentId(4));
        assert_eq!(ActionKind::MultiAction.persistent_id(), PersistentId(11));
        assert_eq!(ActionKind::MoveWindow.persistent_id(), PersistentId(13));
        assert_eq!(
            ActionKind::from_persistent_id(PersistentId(5)),
            Some(ActionKind::RunMacro)
        );
        assert_eq!(ActionKind::from_persistent_id(PersistentId(99)), None);
    }

    #[test]
    fn only_open_view_needs_ui() {
        let ui: Vec<_> = ActionKind::ALL
            .iter()
            .filter(|k| k.descriptor().needs_ui_thread)
            .collect();
        assert_eq!(ui, vec![&ActionKind::OpenView]);
    }

    #[test]
    fn reordered_catalog_resolves_by_id() {
        let cat = ActionCatalog::with_order(&[
            ActionKind::RunMacro,
            ActionKind::NoOp,
            ActionKind::OpenView,
        ])
        .unwrap();
        assert_eq!(cat.index_of(ActionKind::NoOp), Some(ActionIndex(1)));
        assert_eq!(
            cat.resolve(PersistentId(4)).map(|d| d.kind),
            Some(ActionKind::OpenView)
        );
        assert!(cat.resolve(PersistentId(1)).is_none());
    }

    #[test]
    fn catalog_requires_noop_once() {
        assert!(ActionCatalog::with_order(&[ActionKind::OpenView]).is_err());
        assert!(ActionCatalog::with_order(&[ActionKind::NoOp, ActionKind::NoOp]).is_err());
    }
}
