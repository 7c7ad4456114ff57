//! Views and the view set.
//!
//! Views refer to each other by position: an open-view slot stores the
//! target's index. Every operation that inserts, removes or reorders views
//! rewrites those indices across the whole set and reports which views
//! changed, so callers can redraw only what they must.
//!
//! Deleting a view that is still targeted does not repair the reference;
//! the stale index is shifted like any other and then points at whatever
//! now occupies it.

use std::collections::BTreeSet;

use deck_config::Layout;
use deck_keycode::Chord;
use tracing::debug;

use crate::{ActionKind, Argument, ButtonState, Error, Result};

/// Name given to the root view of a fresh set.
pub const ROOT_NAME: &str = "Main";

/// Indices of views whose slot data changed.
pub type ChangeSet = BTreeSet<usize>;

/// A named snapshot of every slot.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    name: String,
    slots: Vec<ButtonState>,
}

impl View {
    /// A view over `slots`.
    pub fn new(name: impl Into<String>, slots: Vec<ButtonState>) -> Self {
        Self {
            name: name.into(),
            slots,
        }
    }

    /// View name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This view's own slot snapshot. Shared slots are not resolved.
    pub fn slots(&self) -> &[ButtonState] {
        &self.slots
    }

    /// Apply `f` to every view index stored in this view: open-view slots and
    /// open-view steps of multi actions. Returns true if anything changed.
    fn rewrite_targets(&mut self, f: impl Fn(usize) -> usize) -> bool {
        let open_view = ActionKind::OpenView.persistent_id();
        let mut changed = false;
        let mut apply = |arg: &mut Argument| {
            if let Argument::View(v) = arg {
                let nv = f(*v);
                if nv != *v {
                    *v = nv;
                    changed = true;
                }
            }
        };
        for slot in &mut self.slots {
            match slot.action() {
                ActionKind::OpenView => apply(slot.argument_mut()),
                ActionKind::MultiAction => {
                    if let Argument::Multi(steps) = slot.argument_mut() {
                        for step in steps.iter_mut().filter(|s| s.action == open_view) {
                            apply(&mut step.argument);
                        }
                    }
                }
                _ => {}
            }
        }
        changed
    }

    /// Every stored view reference: `(slot, step, target)`.
    fn targets(&self) -> Vec<(usize, Option<usize>, usize)> {
        let open_view = ActionKind::OpenView.persistent_id();
        let mut out = Vec::new();
        for (i, slot) in self.slots.iter().enumerate() {
            match (slot.action(), slot.argument()) {
                (ActionKind::OpenView, Argument::View(v)) => out.push((i, None, *v)),
                (ActionKind::MultiAction, Argument::Multi(steps)) => {
                    for (s, step) in steps.iter().enumerate() {
                        if step.action == open_view
                            && let Argument::View(v) = step.argument
                        {
                            out.push((i, Some(s), v));
                        }
                    }
                }
                _ => {}
            }
        }
        out
    }
}

/// A view reference past the end of the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingRef {
    /// View holding the reference.
    pub view: usize,
    /// Slot holding the reference.
    pub slot: usize,
    /// Multi action step, when the reference is inside one.
    pub step: Option<usize>,
    /// The out-of-range target.
    pub target: usize,
}

/// Ordered views, the active view, and the per-slot shared flags.
///
/// View 0 is the root. It cannot be moved or deleted, and its back slot is
/// an ordinary slot; in every other view the back slot is a locked
/// "open view 0" control.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSet {
    views: Vec<View>,
    active: usize,
    shared: Vec<bool>,
    back_slot: usize,
    template: Vec<ButtonState>,
}

impl ViewSet {
    /// A set with a single blank root view.
    pub fn new(template: Vec<ButtonState>, back_slot: usize) -> Self {
        let n = template.len();
        Self {
            views: vec![View::new(ROOT_NAME, template.clone())],
            active: 0,
            shared: vec![false; n],
            back_slot,
            template,
        }
    }

    /// Blank slots carrying the layout's default hotkeys.
    pub fn template_for(layout: &Layout) -> Vec<ButtonState> {
        (0..layout.slot_count())
            .map(|i| ButtonState::blank(layout.default_hotkey(i)))
            .collect()
    }

    /// A fresh set for `layout`.
    pub fn from_layout(layout: &Layout) -> Self {
        Self::new(Self::template_for(layout), layout.back_slot())
    }

    /// Assemble a set from stored views. Slot lists are padded or cut to the
    /// template length and back slots are re-established.
    pub fn from_views(
        template: Vec<ButtonState>,
        back_slot: usize,
        views: Vec<View>,
        mut shared: Vec<bool>,
    ) -> Self {
        let n = template.len();
        let mut set = Self::new(template, back_slot);
        if !views.is_empty() {
            set.views = views;
        }
        for v in &mut set.views {
            v.slots.truncate(n);
            let len = v.slots.len();
            v.slots.extend_from_slice(&set.template[len..]);
        }
        shared.resize(n, false);
        if let Some(b) = shared.get_mut(back_slot) {
            *b = false;
        }
        set.shared = shared;
        set.ensure_back_slots();
        set
    }

    fn ensure_back_slots(&mut self) {
        let b = self.back_slot;
        for (i, v) in self.views.iter_mut().enumerate() {
            if let Some(slot) = v.slots.get_mut(b) {
                if i == 0 {
                    slot.unlock();
                } else {
                    slot.make_back_slot();
                }
            }
        }
    }

    /// Number of views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Never true; the root always exists.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Slots per view.
    pub fn slot_count(&self) -> usize {
        self.template.len()
    }

    /// The reserved back slot.
    pub fn back_slot(&self) -> usize {
        self.back_slot
    }

    /// All views in order.
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// View at `ix`.
    pub fn view(&self, ix: usize) -> Result<&View> {
        self.views.get(ix).ok_or(Error::NoSuchView {
            index: ix,
            len: self.views.len(),
        })
    }

    /// View names in order.
    pub fn names(&self) -> Vec<&str> {
        self.views.iter().map(View::name).collect()
    }

    /// Index of the view called `name`.
    pub fn name_to_index(&self, name: &str) -> Option<usize> {
        self.views.iter().position(|v| v.name == name)
    }

    /// Index of the active view.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Make `ix` the active view.
    pub fn set_active(&mut self, ix: usize) -> Result<()> {
        self.check_view(ix)?;
        self.active = ix;
        Ok(())
    }

    fn check_view(&self, ix: usize) -> Result<()> {
        if ix < self.views.len() {
            Ok(())
        } else {
            Err(Error::NoSuchView {
                index: ix,
                len: self.views.len(),
            })
        }
    }

    fn check_slot(&self, slot: usize) -> Result<()> {
        if slot < self.slot_count() {
            Ok(())
        } else {
            Err(Error::NoSuchSlot {
                index: slot,
                len: self.slot_count(),
            })
        }
    }

    /// The view whose snapshot holds `slot` when `view` is shown.
    fn owner(&self, view: usize, slot: usize) -> usize {
        if view != 0 && self.shared.get(slot).copied().unwrap_or(false) {
            0
        } else {
            view
        }
    }

    /// Slot `slot` as shown in `view`; shared slots resolve to the root.
    pub fn slot(&self, view: usize, slot: usize) -> Result<&ButtonState> {
        self.check_view(view)?;
        self.check_slot(slot)?;
        Ok(&self.views[self.owner(view, slot)].slots[slot])
    }

    /// Mutable slot as shown in `view`; writes to shared slots land in the root.
    pub fn slot_mut(&mut self, view: usize, slot: usize) -> Result<&mut ButtonState> {
        self.check_view(view)?;
        self.check_slot(slot)?;
        let owner = self.owner(view, slot);
        Ok(&mut self.views[owner].slots[slot])
    }

    /// Every slot of `view`, with shared slots resolved.
    pub fn resolved(&self, view: usize) -> Result<Vec<&ButtonState>> {
        self.check_view(view)?;
        Ok((0..self.slot_count())
            .map(|s| &self.views[self.owner(view, s)].slots[s])
            .collect())
    }

    /// `(slot, chord)` for every live slot of `view` with a hotkey.
    pub fn hotkey_bindings(&self, view: usize) -> Result<Vec<(usize, Chord)>> {
        Ok(self
            .resolved(view)?
            .into_iter()
            .enumerate()
            .filter(|(_, b)| !b.is_inert())
            .filter_map(|(i, b)| b.hotkey().map(|c| (i, c.clone())))
            .collect())
    }

    /// True if `slot` is shared across views.
    pub fn is_shared(&self, slot: usize) -> bool {
        self.shared.get(slot).copied().unwrap_or(false)
    }

    /// Shared flags, one per slot.
    pub fn shared_flags(&self) -> &[bool] {
        &self.shared
    }

    /// Mark `slot` as shared from the root view.
    pub fn set_shared(&mut self, slot: usize, shared: bool) -> Result<()> {
        self.check_slot(slot)?;
        if slot == self.back_slot && shared {
            return Err(Error::SharedBackSlot);
        }
        self.shared[slot] = shared;
        Ok(())
    }

    /// `base`, or `base (k)` with the smallest free `k`.
    pub fn unique_name(&self, base: &str) -> String {
        if self.name_to_index(base).is_none() {
            return base.to_string();
        }
        (1..)
            .map(|k| format!("{base} ({k})"))
            .find(|n| self.name_to_index(n).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    /// Name for the next new view: `View N`, made unique.
    pub fn next_view_name(&self) -> String {
        self.unique_name(&format!("View {}", self.views.len() + 1))
    }

    fn rewrite_all(&mut self, f: impl Fn(usize) -> usize, post: impl Fn(usize) -> usize) -> ChangeSet {
        let mut changed = ChangeSet::new();
        for (ix, v) in self.views.iter_mut().enumerate() {
            if v.rewrite_targets(&f) {
                changed.insert(post(ix));
            }
        }
        changed
    }

    fn shift_for_insert(&mut self, at: usize) -> ChangeSet {
        let changed = self.rewrite_all(
            |t| if t >= at { t + 1 } else { t },
            |ix| if ix >= at { ix + 1 } else { ix },
        );
        if self.active >= at {
            self.active += 1;
        }
        changed
    }

    /// Insert a blank view at `at` (`1..=len`). Returns its index and the
    /// views whose references were shifted.
    pub fn insert_view(&mut self, at: usize, name: Option<&str>) -> Result<(usize, ChangeSet)> {
        if at == 0 {
            return Err(Error::RootImmutable);
        }
        if at > self.views.len() {
            return Err(Error::NoSuchView {
                index: at,
                len: self.views.len(),
            });
        }
        let name = match name {
            Some(n) => self.check_new_name(n, None)?,
            None => self.next_view_name(),
        };
        let changed = self.shift_for_insert(at);
        let mut view = View::new(name, self.template.clone());
        if let Some(slot) = view.slots.get_mut(self.back_slot) {
            slot.make_back_slot();
        }
        debug!(at, name = %view.name, ?changed, "view_inserted");
        self.views.insert(at, view);
        Ok((at, changed))
    }

    /// Copy view `src` to just below it. The copy keeps the source's
    /// references, so they are shifted too.
    pub fn duplicate_view(&mut self, src: usize) -> Result<(usize, ChangeSet)> {
        self.check_view(src)?;
        let at = src + 1;
        let name = self.unique_name(&self.views[src].name);
        let changed = self.shift_for_insert(at);
        let mut copy = self.views[src].clone();
        copy.name = name;
        if let Some(slot) = copy.slots.get_mut(self.back_slot) {
            slot.make_back_slot();
        }
        debug!(src, at, name = %copy.name, ?changed, "view_duplicated");
        self.views.insert(at, copy);
        Ok((at, changed))
    }

    /// Remove view `ix`. References past it move down by one; references to
    /// it are left as they are. If it was active, the previous view becomes
    /// active.
    pub fn delete_view(&mut self, ix: usize) -> Result<ChangeSet> {
        if ix == 0 {
            return Err(Error::RootImmutable);
        }
        self.check_view(ix)?;
        if self.active >= ix {
            self.active -= 1;
        }
        let removed = self.views.remove(ix);
        let changed = self.rewrite_all(|t| if t > ix { t - 1 } else { t }, |p| p);
        debug!(ix, name = %removed.name, ?changed, "view_deleted");
        Ok(changed)
    }

    /// Exchange views `i` and `j` and every reference between them.
    pub fn swap_views(&mut self, i: usize, j: usize) -> Result<ChangeSet> {
        self.check_view(i)?;
        self.check_view(j)?;
        if i == 0 || j == 0 {
            return Err(Error::RootImmutable);
        }
        if i == j {
            return Ok(ChangeSet::new());
        }
        self.views.swap(i, j);
        if self.active == i {
            self.active = j;
        } else if self.active == j {
            self.active = i;
        }
        let changed = self.rewrite_all(
            |t| {
                if t == i {
                    j
                } else if t == j {
                    i
                } else {
                    t
                }
            },
            |p| p,
        );
        debug!(i, j, ?changed, "views_swapped");
        Ok(changed)
    }

    /// Move view `ix` one place up. The root stays first, so moving view 1
    /// up does nothing.
    pub fn move_up(&mut self, ix: usize) -> Result<ChangeSet> {
        self.check_view(ix)?;
        match ix {
            0 => Err(Error::RootImmutable),
            1 => Ok(ChangeSet::new()),
            _ => self.swap_views(ix - 1, ix),
        }
    }

    /// Move view `ix` one place down. Moving the last view does nothing.
    pub fn move_down(&mut self, ix: usize) -> Result<ChangeSet> {
        self.check_view(ix)?;
        if ix == 0 {
            return Err(Error::RootImmutable);
        }
        if ix + 1 == self.views.len() {
            return Ok(ChangeSet::new());
        }
        self.swap_views(ix, ix + 1)
    }

    fn check_new_name(&self, name: &str, own: Option<usize>) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        match self.name_to_index(name) {
            Some(ix) if Some(ix) != own => Err(Error::DuplicateName(name.to_string())),
            _ => Ok(name.to_string()),
        }
    }

    /// Rename view `ix`. Names must be unique.
    pub fn rename(&mut self, ix: usize, name: &str) -> Result<()> {
        self.check_view(ix)?;
        let name = self.check_new_name(name, Some(ix))?;
        self.views[ix].name = name;
        Ok(())
    }

    /// Stored view references that point past the last view.
    pub fn dangling_references(&self) -> Vec<DanglingRef> {
        let len = self.views.len();
        self.views
            .iter()
            .enumerate()
            .flat_map(|(vi, v)| {
                v.targets()
                    .into_iter()
                    .filter(move |(_, _, t)| *t >= len)
                    .map(move |(slot, step, target)| DanglingRef {
                        view: vi,
                        slot,
                        step,
                        target,
                    })
            })
            .collect()
    }

    /// Every stored reference as `(view, slot, step, target)`.
    pub fn references(&self) -> Vec<(usize, usize, Option<usize>, usize)> {
        self.views
            .iter()
            .enumerate()
            .flat_map(|(vi, v)| {
                v.targets()
                    .into_iter()
                    .map(move |(s, st, t)| (vi, s, st, t))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActionCatalog, MultiStep};

    const SLOTS: usize = 4;
    const BACK: usize = 0;

    fn set_with(names: &[&str]) -> ViewSet {
        let mut vs = ViewSet::new(vec![ButtonState::blank(None); SLOTS], BACK);
        vs.rename(0, names[0]).unwrap();
        for n in &names[1..] {
            vs.insert_view(vs.len(), Some(n)).unwrap();
        }
        vs
    }

    fn point(vs: &mut ViewSet, view: usize, slot: usize, target: usize) {
        vs.slot_mut(view, slot)
            .unwrap()
            .assign(
                &ActionCatalog::standard(),
                ActionKind::OpenView,
                Some(Argument::View(target)),
                0,
            )
            .unwrap();
    }

    fn target(vs: &ViewSet, view: usize, slot: usize) -> Option<usize> {
        vs.slot(view, slot).unwrap().argument().view()
    }

    #[test]
    fn back_slot_is_locked_outside_root() {
        let vs = set_with(&["Root", "A"]);
        assert!(!vs.slot(0, BACK).unwrap().is_locked());
        let b = vs.slot(1, BACK).unwrap();
        assert!(b.is_locked());
        assert!(b.targets_view(0));
    }

    #[test]
    fn insert_shifts_references_at_or_after() {
        let mut vs = set_with(&["Root", "A", "B"]);
        point(&mut vs, 0, 1, 1);
        point(&mut vs, 0, 2, 2);
        point(&mut vs, 2, 1, 1);
        let (at, changed) = vs.insert_view(1, None).unwrap();
        assert_eq!(at, 1);
        assert_eq!(vs.names(), vec!["Root", "View 4", "A", "B"]);
        assert_eq!(target(&vs, 0, 1), Some(2));
        assert_eq!(target(&vs, 0, 2), Some(3));
        assert_eq!(target(&vs, 3, 1), Some(2));
        assert_eq!(changed, ChangeSet::from([0, 3]));
    }

    #[test]
    fn delete_leaves_direct_reference_dangling() {
        let mut vs = set_with(&["Root", "A", "B", "C"]);
        point(&mut vs, 0, 1, 3);
        point(&mut vs, 0, 2, 2);
        let changed = vs.delete_view(2).unwrap();
        assert_eq!(target(&vs, 0, 1), Some(2));
        assert_eq!(target(&vs, 0, 2), Some(2));
        assert_eq!(vs.names(), vec!["Root", "A", "C"]);
        assert_eq!(changed, ChangeSet::from([0]));
    }

    #[test]
    fn delete_past_end_is_reported() {
        let mut vs = set_with(&["Root", "A"]);
        point(&mut vs, 0, 1, 1);
        vs.delete_view(1).unwrap();
        assert_eq!(
            vs.dangling_references(),
            vec![DanglingRef {
                view: 0,
                slot: 1,
                step: None,
                target: 1
            }]
        );
    }

    #[test]
    fn delete_active_moves_to_previous() {
        let mut vs = set_with(&["Root", "A", "B"]);
        vs.set_active(2).unwrap();
        vs.delete_view(2).unwrap();
        assert_eq!(vs.active(), 1);
        vs.set_active(1).unwrap();
        vs.insert_view(1, Some("X")).unwrap();
        assert_eq!(vs.active(), 2);
    }

    #[test]
    fn root_cannot_move_or_delete() {
        let mut vs = set_with(&["Root", "A"]);
        assert_eq!(vs.delete_view(0), Err(Error::RootImmutable));
        assert_eq!(vs.swap_views(0, 1), Err(Error::RootImmutable));
        assert_eq!(vs.move_up(1).unwrap(), ChangeSet::new());
        assert_eq!(vs.move_down(1).unwrap(), ChangeSet::new());
        assert_eq!(vs.names(), vec!["Root", "A"]);
    }

    #[test]
    fn swap_exchanges_references() {
        let mut vs = set_with(&["Root", "A", "B"]);
        point(&mut vs, 0, 1, 1);
        point(&mut vs, 0, 2, 2);
        let changed = vs.move_down(1).unwrap();
        assert_eq!(vs.names(), vec!["Root", "B", "A"]);
        assert_eq!(target(&vs, 0, 1), Some(2));
        assert_eq!(target(&vs, 0, 2), Some(1));
        assert_eq!(changed, ChangeSet::from([0]));
        // Back slots still target root.
        assert!(vs.slot(1, BACK).unwrap().targets_view(0));
    }

    #[test]
    fn duplicate_copies_and_shifts_copy() {
        let mut vs = set_with(&["Root", "A", "B"]);
        point(&mut vs, 1, 1, 2);
        let (at, _) = vs.duplicate_view(1).unwrap();
        assert_eq!(at, 2);
        assert_eq!(vs.names(), vec!["Root", "A", "A (1)", "B"]);
        assert_eq!(target(&vs, 1, 1), Some(3));
        assert_eq!(target(&vs, 2, 1), Some(3));
    }

    #[test]
    fn multi_steps_are_rewritten() {
        let mut vs = set_with(&["Root", "A", "B"]);
        let arg = Argument::Multi(vec![
            MultiStep::new(ActionKind::StopMedia, Argument::None),
            MultiStep::new(ActionKind::OpenView, Argument::View(2)),
        ]);
        vs.slot_mut(0, 1)
            .unwrap()
            .assign(&ActionCatalog::standard(), ActionKind::MultiAction, Some(arg), 0)
            .unwrap();
        let changed = vs.delete_view(1).unwrap();
        assert_eq!(changed, ChangeSet::from([0]));
        assert_eq!(vs.references(), vec![(0, 1, Some(1), 1), (1, 0, None, 0)]);
    }

    #[test]
    fn naming_rules() {
        let mut vs = set_with(&["Root", "View 3"]);
        assert_eq!(vs.next_view_name(), "View 3 (1)");
        assert_eq!(
            vs.rename(1, "Root"),
            Err(Error::DuplicateName("Root".into()))
        );
        assert_eq!(vs.rename(1, "  "), Err(Error::EmptyName));
        vs.rename(1, "View 3").unwrap();
        assert_eq!(vs.name_to_index("View 3"), Some(1));
    }

    #[test]
    fn shared_slot_resolves_to_root() {
        let mut vs = set_with(&["Root", "B", "C"]);
        vs.set_shared(2, true).unwrap();
        vs.slot_mut(1, 2).unwrap().set_text("edited in B");
        assert_eq!(vs.slot(2, 2).unwrap().text(), "edited in B");
        assert_eq!(vs.slot(0, 2).unwrap().text(), "edited in B");
        assert_eq!(vs.view(1).unwrap().slots()[2].text(), "");
        assert_eq!(vs.set_shared(BACK, true), Err(Error::SharedBackSlot));
    }
}
