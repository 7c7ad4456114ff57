//! Integration tests for the layout and settings files shipped in `layouts/`.

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use deck_config::{Layout, Settings};

    fn layouts_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent() // crates
            .and_then(|p| p.parent()) // workspace root
            .expect("workspace root")
            .join("layouts")
    }

    #[test]
    fn parse_all_shipped_layouts() {
        let mut found = 0usize;
        for entry in fs::read_dir(layouts_dir()).expect("read layouts dir") {
            let path = entry.unwrap().path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            found += 1;
            let layout = Layout::load(&path);
            assert!(
                layout.is_ok(),
                "failed to load {}: {:?}",
                path.display(),
                layout.err()
            );
            let layout = layout.unwrap();
            for ix in 0..layout.slot_count() {
                assert!(
                    layout.default_hotkey(ix).is_some(),
                    "{}: slot {ix} has no default hotkey",
                    path.display()
                );
            }
        }
        assert!(found > 0, "no .json files found in layouts");
    }

    #[test]
    fn numpad_back_slot_is_top_left() {
        let layout = Layout::load(&layouts_dir().join("numpad.json")).unwrap();
        assert_eq!(layout.name(), "numpad");
        assert_eq!(layout.slot_count(), 17);
        let (_, spec) = layout.slot(layout.back_slot()).unwrap();
        assert_eq!((spec.x, spec.y), (0, 0));
    }

    #[test]
    fn example_settings_parse() {
        let path = layouts_dir().join("settings.example.toml");
        let src = fs::read_to_string(&path).unwrap();
        let s = Settings::from_toml_str(&src, Some(&path)).unwrap();
        assert_eq!(s.ui_queue_capacity, 64);
        assert_eq!(s.layout, Some(PathBuf::from("layouts/numpad.json")));
    }
}
