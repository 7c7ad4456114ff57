use deck_engine::HotkeyTable;
use deck_model::{PersistenceCodec, ViewSet};
use serde_json::{Value, json};

use crate::Loaded;

/// Print every load issue, dangling reference and hotkey conflict.
/// Returns the process exit code: 0 when nothing was found.
pub fn check(loaded: &Loaded) -> i32 {
    let views = &loaded.decoded.views;
    let mut problems = 0usize;

    for issue in &loaded.decoded.report.issues {
        println!("load: {issue}");
        problems += 1;
    }
    for d in views.dangling_references() {
        let name = view_name(views, d.view);
        match d.step {
            Some(step) => println!(
                "dangling: view '{name}' slot {} step {step} opens view {}",
                d.slot, d.target
            ),
            None => println!(
                "dangling: view '{name}' slot {} opens view {}",
                d.slot, d.target
            ),
        }
        problems += 1;
    }
    for ix in 0..views.len() {
        match HotkeyTable::build_lenient(views, ix) {
            Ok((_, dropped)) => {
                for combo in dropped {
                    println!(
                        "conflict: view '{}' binds {combo} more than once",
                        view_name(views, ix)
                    );
                    problems += 1;
                }
            }
            Err(e) => {
                println!("error: view '{}': {e}", view_name(views, ix));
                problems += 1;
            }
        }
    }

    if problems == 0 {
        println!(
            "OK: layout '{}', {} slots, {} views",
            loaded.layout.name(),
            loaded.layout.slot_count(),
            views.len()
        );
        0
    } else {
        println!("{problems} problem(s) found");
        1
    }
}

/// Print the decoded views as pretty JSON.
pub fn dump(loaded: &Loaded) -> i32 {
    let doc = dump_value(loaded);
    match serde_json::to_string_pretty(&doc) {
        Ok(s) => {
            println!("{s}");
            0
        }
        Err(e) => {
            eprintln!("Failed to serialize views: {e}");
            1
        }
    }
}

/// The JSON document written by [`dump`].
fn dump_value(loaded: &Loaded) -> Value {
    let codec = PersistenceCodec::new(&loaded.catalog);
    let views = &loaded.decoded.views;
    let images = &loaded.decoded.images;
    let doc_views: Vec<Value> = views
        .views()
        .iter()
        .map(|v| {
            let slots: Vec<Value> = v
                .slots()
                .iter()
                .enumerate()
                .map(|(ix, b)| {
                    let key = loaded.layout.slot(ix);
                    json!({
                        "slot": ix,
                        "key": key.map(|(k, _)| k),
                        "span": key.map(|(_, spec)| spec.attr.span()),
                        "action": b.action().descriptor().name,
                        "argument": codec.encode_argument(b.argument()),
                        "hotkey": b.hotkey().map(|c| c.encode()),
                        "text": b.text(),
                        "default_text": b.default_text(),
                        "fill": &b.colors().fill,
                        "image": b.image().and_then(|i| images.get(i)),
                        "locked": b.is_locked(),
                        "shared": views.is_shared(ix),
                    })
                })
                .collect();
            json!({ "name": v.name(), "slots": slots })
        })
        .collect();
    json!({
        "layout": loaded.layout.name(),
        "back_slot": views.back_slot(),
        "views": doc_views,
    })
}

/// Name of view `ix`, or a placeholder.
fn view_name(views: &ViewSet, ix: usize) -> &str {
    views.view(ix).map_or("?", |v| v.name())
}

#[cfg(test)]
mod tests {
    use deck_config::{Layout, Settings};
    use deck_model::{ActionCatalog, ActionKind, Argument, PersistenceCodec};

    use super::*;

    const PAD: &str = r#"{
        "<numpad7>": {"x": 0, "y": 0, "modifier": "ctrl"},
        "<numpad8>": {"x": 1, "y": 0, "modifier": "ctrl"},
        "<numpad9>": {"x": 2, "y": 0, "modifier": "ctrl"}
    }"#;

    fn loaded() -> Loaded {
        let layout = Layout::from_json_str("pad", PAD, None).unwrap();
        let catalog = ActionCatalog::standard();
        let decoded = PersistenceCodec::new(&catalog).decode(None, &layout);
        Loaded {
            settings: Settings::default(),
            layout,
            save_path: None,
            catalog,
            decoded,
        }
    }

    #[test]
    fn fresh_state_checks_clean() {
        assert_eq!(check(&loaded()), 0);
    }

    #[test]
    fn dangling_reference_fails_check() {
        let mut l = loaded();
        let v = l.decoded.views.insert_view(1, Some("A")).unwrap().0;
        let b = l.decoded.views.slot_mut(v, 1).unwrap();
        b.assign(&l.catalog, ActionKind::OpenView, Some(Argument::View(7)), 0)
            .unwrap();
        assert_eq!(check(&l), 1);
    }

    #[test]
    fn dump_lists_views_and_back_slot() {
        let mut l = loaded();
        l.decoded.views.insert_view(1, Some("A")).unwrap();
        let doc = dump_value(&l);
        assert_eq!(doc["layout"], "pad");
        assert_eq!(doc["views"][1]["name"], "A");
        assert_eq!(doc["views"][1]["slots"][0]["locked"], true);
        assert_eq!(doc["views"][0]["slots"][1]["hotkey"], "<ctrl>+<numpad8>");
        assert_eq!(doc["views"][0]["slots"][1]["span"], json!([1, 1]));
    }
}
