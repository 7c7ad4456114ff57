//! Random view operations never redirect a reference to a different view,
//! except the documented case of references to a deleted view.

use std::collections::HashMap;

use deck_model::{ActionCatalog, ActionKind, Argument, ButtonState, ViewSet};
use proptest::prelude::*;

const SLOTS: usize = 5;
const BACK: usize = 0;

#[derive(Debug, Clone)]
enum Op {
    Insert(usize),
    Duplicate(usize),
    Delete(usize),
    Swap(usize, usize),
    MoveUp(usize),
    MoveDown(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<usize>().prop_map(Op::Insert),
        any::<usize>().prop_map(Op::Duplicate),
        any::<usize>().prop_map(Op::Delete),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Swap(a, b)),
        any::<usize>().prop_map(Op::MoveUp),
        any::<usize>().prop_map(Op::MoveDown),
    ]
}

/// `(holder view name, slot)` to target view name; `None` when dangling.
type Refs = HashMap<(String, usize), Option<String>>;

fn refs(vs: &ViewSet) -> Refs {
    let names = vs.names();
    vs.references()
        .into_iter()
        .filter(|(_, slot, step, _)| *slot != BACK && step.is_none())
        .map(|(v, slot, _, t)| {
            (
                (names[v].to_string(), slot),
                names.get(t).map(|n| n.to_string()),
            )
        })
        .collect()
}

fn build(extra: usize, seeds: &[usize]) -> ViewSet {
    let mut vs = ViewSet::new(vec![ButtonState::blank(None); SLOTS], BACK);
    for _ in 0..extra {
        vs.insert_view(vs.len(), None).unwrap();
    }
    let cat = ActionCatalog::standard();
    let total = vs.len();
    let mut k = 0;
    for v in 0..total {
        for s in 1..SLOTS {
            let t = seeds[k % seeds.len()] % total;
            k += 1;
            vs.slot_mut(v, s)
                .unwrap()
                .assign(&cat, ActionKind::OpenView, Some(Argument::View(t)), 0)
                .unwrap();
        }
    }
    vs
}

fn apply(vs: &mut ViewSet, op: &Op, before: &Refs) -> Refs {
    let len = vs.len();
    let mut expected = before.clone();
    match *op {
        Op::Insert(x) => {
            vs.insert_view(1 + x % len, None).unwrap();
        }
        Op::Duplicate(x) => {
            let src = x % len;
            let src_name = vs.names()[src].to_string();
            let (at, _) = vs.duplicate_view(src).unwrap();
            let copy = vs.names()[at].to_string();
            for ((holder, slot), t) in before {
                if *holder == src_name {
                    expected.insert((copy.clone(), *slot), t.clone());
                }
            }
        }
        Op::Delete(x) => {
            if len < 2 {
                return expected;
            }
            let ix = 1 + x % (len - 1);
            let gone = vs.names()[ix].to_string();
            vs.delete_view(ix).unwrap();
            let after = vs.names();
            let stale = after.get(ix).map(|n| n.to_string());
            expected = before
                .iter()
                .filter(|((holder, _), _)| *holder != gone)
                .map(|(k, t)| {
                    let t = if t.as_deref() == Some(gone.as_str()) {
                        stale.clone()
                    } else {
                        t.clone()
                    };
                    (k.clone(), t)
                })
                .collect();
        }
        Op::Swap(a, b) => {
            if len < 2 {
                return expected;
            }
            let i = 1 + a % (len - 1);
            let j = 1 + b % (len - 1);
            vs.swap_views(i, j).unwrap();
        }
        Op::MoveUp(x) => {
            if len >= 2 {
                vs.move_up(1 + x % (len - 1)).unwrap();
            }
        }
        Op::MoveDown(x) => {
            if len >= 2 {
                vs.move_down(1 + x % (len - 1)).unwrap();
            }
        }
    }
    expected
}

proptest! {
    #[test]
    fn references_follow_their_views(
        extra in 0usize..4,
        seeds in prop::collection::vec(any::<usize>(), 1..16),
        ops in prop::collection::vec(op(), 1..12),
    ) {
        let mut vs = build(extra, &seeds);
        for op in &ops {
            let before = refs(&vs);
            let expected = apply(&mut vs, op, &before);
            prop_assert_eq!(refs(&vs), expected, "after {:?}", op);
            prop_assert_eq!(vs.views()[0].name(), "Main");
            for v in 1..vs.len() {
                prop_assert!(vs.slot(v, BACK).unwrap().targets_view(0));
            }
        }
    }
}
