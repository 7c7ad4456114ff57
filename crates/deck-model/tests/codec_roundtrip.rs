//! Saving and reloading keeps every slot's action identity and argument,
//! even when the running catalog lists its actions in a different order.

use deck_config::{Layout, SaveFile};
use deck_model::{
    ActionCatalog, ActionKind, Argument, ImageTable, MultiStep, PersistenceCodec, ViewSet,
    WindowPlacement,
};
use macroplay::Macro;

const LAYOUT: &str = r#"{
    "<NUMPAD7>": {"x": 0, "y": 0, "modifier": "ctrl"},
    "<NUMPAD8>": {"x": 1, "y": 0, "modifier": "ctrl"},
    "<NUMPAD9>": {"x": 2, "y": 0, "modifier": "ctrl"},
    "<NUMPAD4>": {"x": 0, "y": 1, "modifier": "ctrl+shift"}
}"#;

fn populated(cat: &ActionCatalog, layout: &Layout) -> (ViewSet, ImageTable) {
    let mut vs = ViewSet::from_layout(layout);
    let (sub, _) = vs.insert_view(1, Some("Media")).unwrap();
    let mut images = ImageTable::default();
    let icon = images.add("/icons/play.png");

    let steps = vec![
        MultiStep::new(ActionKind::StopMedia, Argument::None),
        MultiStep::new(ActionKind::OpenView, Argument::View(sub)),
        MultiStep::new(ActionKind::TypeText, Argument::Text("hello".into())),
    ];
    let root_slot = vs.slot_mut(0, 1).unwrap();
    root_slot
        .assign(cat, ActionKind::MultiAction, Some(Argument::Multi(steps)), 0)
        .unwrap();
    root_slot.set_text("Combo");
    root_slot.set_image(Some(icon));

    let m = Macro::record([("CONTROL", "c"), ("", "<F5>")]).unwrap();
    vs.slot_mut(0, 2)
        .unwrap()
        .assign(cat, ActionKind::RunMacro, Some(Argument::Macro(m)), 0)
        .unwrap();
    vs.slot_mut(0, 3)
        .unwrap()
        .assign(cat, ActionKind::OpenView, Some(Argument::View(sub)), 1)
        .unwrap();

    vs.slot_mut(sub, 1)
        .unwrap()
        .assign(cat, ActionKind::SetVolume, Some(Argument::Volume(30)), 0)
        .unwrap();
    let place = WindowPlacement {
        title: "Notes".into(),
        x: 10,
        y: 20,
        width: 800,
        height: 600,
    };
    vs.slot_mut(sub, 2)
        .unwrap()
        .assign(cat, ActionKind::MoveWindow, Some(Argument::Window(place)), 0)
        .unwrap();
    vs.set_shared(3, true).unwrap();
    (vs, images)
}

#[test]
fn round_trip_survives_catalog_reordering() {
    let layout = Layout::from_json_str("pad", LAYOUT, None).unwrap();
    let saving = ActionCatalog::standard();
    let (vs, images) = populated(&saving, &layout);

    let data = PersistenceCodec::new(&saving).encode(&vs, &images);
    let mut file = SaveFile::default();
    file.merge_layout("pad", data.clone());
    let text = serde_json::to_string(&file).unwrap();
    let reread = SaveFile::from_json_str(&text, None).unwrap();

    let mut order = ActionKind::ALL.to_vec();
    order.reverse();
    let loading = ActionCatalog::with_order(&order).unwrap();
    assert_ne!(
        loading.index_of(ActionKind::MultiAction),
        saving.index_of(ActionKind::MultiAction)
    );

    let decoded = PersistenceCodec::new(&loading).decode(reread.layout("pad").as_ref(), &layout);
    assert!(decoded.report.is_clean(), "{:?}", decoded.report);
    assert_eq!(decoded.views.names(), vs.names());
    assert_eq!(decoded.views.shared_flags(), vs.shared_flags());
    assert_eq!(decoded.images, images);

    for (before, after) in vs.views().iter().zip(decoded.views.views()) {
        for (i, (b, a)) in before.slots().iter().zip(after.slots()).enumerate() {
            assert_eq!(
                (b.action().persistent_id(), b.argument()),
                (a.action().persistent_id(), a.argument()),
                "view {} slot {i}",
                before.name()
            );
        }
    }

    let again = PersistenceCodec::new(&loading).encode(&decoded.views, &decoded.images);
    assert_eq!(again, data);
}

#[test]
fn records_are_keyed_by_persistent_id() {
    let layout = Layout::from_json_str("pad", LAYOUT, None).unwrap();
    let cat = ActionCatalog::standard();
    let (vs, images) = populated(&cat, &layout);
    let data = PersistenceCodec::new(&cat).encode(&vs, &images);
    let main = &data.views["Main"];
    assert_eq!(main[1].0, 11);
    assert_eq!(
        main[1].1,
        serde_json::json!([[2, null], [4, 1], [7, "hello"]])
    );
    assert_eq!(main[2].1, serde_json::json!([["ctrl", "c"], ["", "<f5>"]]));
    assert_eq!(main[1].5, Some(0));
    assert_eq!(main[1].2, Some(("ctrl".to_string(), "<numpad8>".to_string())));
}
