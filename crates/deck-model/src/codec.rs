//! Mapping between live views and the stored slot records.
//!
//! Actions are written by persistent id, never by catalog position, so the
//! catalog can be reordered or extended between runs. Anything that cannot
//! be decoded is reset to `NoOp` for that one slot (or step) and reported in
//! a [`LoadReport`]; a damaged slot never fails the whole load.

use std::fmt;

use deck_config::{Layout, LayoutData, SlotRecord, ViewRecords};
use deck_keycode::Chord;
use macroplay::Macro;
use serde_json::{Value, json};
use tracing::warn;

use crate::{
    ActionCatalog, ActionKind, Argument, ButtonState, ImageTable, MultiStep, PersistentId, View,
    ViewSet, WindowPlacement, style::Colors,
};

/// Something that was repaired while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadIssue {
    /// A slot's action or argument could not be decoded; the slot was reset.
    CorruptSlot {
        /// View name.
        view: String,
        /// Slot index.
        slot: usize,
        /// Stored persistent id.
        persistent_id: u32,
        /// What went wrong.
        reason: String,
    },
    /// A multi action step could not be decoded; the step was reset.
    CorruptStep {
        /// View name.
        view: String,
        /// Slot index.
        slot: usize,
        /// Step index.
        step: usize,
        /// What went wrong.
        reason: String,
    },
    /// A view had the wrong number of slots for the layout.
    SlotCountMismatch {
        /// View name.
        view: String,
        /// Slots in the layout.
        expected: usize,
        /// Slots stored.
        found: usize,
    },
    /// A stored hotkey did not parse; the slot has none.
    BadHotkey {
        /// View name.
        view: String,
        /// Slot index.
        slot: usize,
        /// Stored `(modifier, key)`.
        pair: (String, String),
    },
    /// An image index past the end of the image table.
    MissingImage {
        /// View name.
        view: String,
        /// Slot index.
        slot: usize,
        /// Stored index.
        index: usize,
    },
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CorruptSlot {
                view,
                slot,
                persistent_id,
                reason,
            } => write!(
                f,
                "{view} slot {slot}: action {persistent_id} reset ({reason})"
            ),
            Self::CorruptStep {
                view,
                slot,
                step,
                reason,
            } => write!(f, "{view} slot {slot} step {step}: reset ({reason})"),
            Self::SlotCountMismatch {
                view,
                expected,
                found,
            } => write!(f, "{view}: {found} slots stored, layout has {expected}"),
            Self::BadHotkey { view, slot, pair } => {
                write!(f, "{view} slot {slot}: bad hotkey {:?}+{:?}", pair.0, pair.1)
            }
            Self::MissingImage { view, slot, index } => {
                write!(f, "{view} slot {slot}: no image {index}")
            }
        }
    }
}

/// Repairs made during a load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Every repair, in file order.
    pub issues: Vec<LoadIssue>,
}

impl LoadReport {
    /// True when nothing needed repair.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Record and log one repair.
    fn push(&mut self, issue: LoadIssue) {
        warn!(%issue, "load_issue");
        self.issues.push(issue);
    }
}

/// The outcome of decoding a layout's stored data.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Views, with the root first and active.
    pub views: ViewSet,
    /// The image table.
    pub images: ImageTable,
    /// Repairs made.
    pub report: LoadReport,
}

/// Converts between [`ViewSet`] and stored records for one catalog.
#[derive(Debug, Clone, Copy)]
pub struct PersistenceCodec<'a> {
    catalog: &'a ActionCatalog,
}

impl<'a> PersistenceCodec<'a> {
    /// A codec resolving ids against `catalog`.
    pub fn new(catalog: &'a ActionCatalog) -> Self {
        Self { catalog }
    }

    /// Stored form of an argument.
    pub fn encode_argument(&self, arg: &Argument) -> Value {
        match arg {
            Argument::None => Value::Null,
            Argument::Text(s) => Value::String(s.clone()),
            Argument::View(v) => json!(v),
            Argument::Volume(v) => json!(v),
            Argument::Macro(m) => Value::Array(
                m.to_pairs()
                    .into_iter()
                    .map(|(a, b)| json!([a, b]))
                    .collect(),
            ),
            Argument::Multi(steps) => Value::Array(
                steps
                    .iter()
                    .map(|s| json!([s.action.0, self.encode_argument(&s.argument)]))
                    .collect(),
            ),
            Argument::Window(w) => json!({
                "title": w.title,
                "x": w.x,
                "y": w.y,
                "width": w.width,
                "height": w.height,
            }),
        }
    }

    /// Decode a single-action argument for `kind`. Multi action steps that
    /// fail to decode are reported through `bad_step` and replaced by `NoOp`.
    fn decode_argument(
        &self,
        kind: ActionKind,
        value: &Value,
        bad_step: &mut dyn FnMut(usize, String),
    ) -> Result<Argument, String> {
        use ActionKind as K;
        if value.is_null() || !kind.descriptor().requires_argument {
            return Ok(Argument::None);
        }
        let shape = || format!("unexpected argument {value}");
        match kind {
            K::PlayMedia
            | K::OpenUrl
            | K::TypeText
            | K::ShuffleMedia
            | K::ToggleRemoteScene
            | K::SwitchRemoteSource => value
                .as_str()
                .map(|s| Argument::Text(s.to_string()))
                .ok_or_else(shape),
            K::OpenView => value
                .as_u64()
                .and_then(|v| usize::try_from(v).ok())
                .map(Argument::View)
                .ok_or_else(shape),
            K::SetVolume => value
                .as_u64()
                .filter(|v| *v <= 100)
                .and_then(|v| u8::try_from(v).ok())
                .map(Argument::Volume)
                .ok_or_else(shape),
            K::RunMacro => serde_json::from_value::<Macro>(value.clone())
                .map(Argument::Macro)
                .map_err(|e| e.to_string()),
            K::MoveWindow => serde_json::from_value::<WindowPlacement>(value.clone())
                .map(Argument::Window)
                .map_err(|e| e.to_string()),
            K::MultiAction => {
                let items = value.as_array().ok_or_else(shape)?;
                let steps = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        self.decode_step(item).unwrap_or_else(|reason| {
                            bad_step(i, reason);
                            MultiStep::new(ActionKind::NoOp, Argument::None)
                        })
                    })
                    .collect();
                Ok(Argument::Multi(steps))
            }
            K::NoOp | K::StopMedia | K::PauseMedia => Ok(Argument::None),
        }
    }

    /// One `[persistent_id, argument]` step.
    fn decode_step(&self, item: &Value) -> Result<MultiStep, String> {
        let (pid, arg) = match item.as_array().map(Vec::as_slice) {
            Some([pid, arg]) => (pid, arg),
            _ => return Err(format!("malformed step {item}")),
        };
        let pid = pid
            .as_u64()
            .and_then(|p| u32::try_from(p).ok())
            .ok_or_else(|| format!("bad action id {pid}"))?;
        let desc = self
            .catalog
            .resolve(PersistentId(pid))
            .ok_or_else(|| format!("unknown action id {pid}"))?;
        if desc.kind == ActionKind::MultiAction {
            return Err("nested multi action".into());
        }
        let argument = self.decode_argument(desc.kind, arg, &mut |_, _| {})?;
        Ok(MultiStep {
            action: PersistentId(pid),
            argument,
        })
    }

    /// Stored form of one slot.
    pub fn encode_slot(&self, b: &ButtonState) -> SlotRecord {
        let pid = self
            .catalog
            .descriptor(b.action())
            .map_or(b.action().persistent_id(), |d| d.persistent_id());
        let c = b.colors();
        SlotRecord(
            pid.0,
            self.encode_argument(b.argument()),
            b.hotkey().map(Chord::to_pair),
            (b.text().to_string(), b.default_text().to_string()),
            (c.fill.clone(), c.border.clone(), c.hover.clone()),
            b.image(),
        )
    }

    /// One stored slot; damage resets the slot and lands in `report`.
    fn decode_slot(
        &self,
        rec: &SlotRecord,
        view: &str,
        slot: usize,
        images: usize,
        report: &mut LoadReport,
    ) -> ButtonState {
        let hotkey = rec.2.as_ref().and_then(|(m, k)| {
            let chord = Chord::from_pair(m, k);
            if chord.is_none() {
                report.push(LoadIssue::BadHotkey {
                    view: view.to_string(),
                    slot,
                    pair: (m.clone(), k.clone()),
                });
            }
            chord
        });
        let corrupt = |reason: String| LoadIssue::CorruptSlot {
            view: view.to_string(),
            slot,
            persistent_id: rec.0,
            reason,
        };
        let Some(desc) = self.catalog.resolve(PersistentId(rec.0)) else {
            report.push(corrupt("unknown action id".into()));
            return ButtonState::blank(hotkey);
        };
        let mut bad_steps = Vec::new();
        let argument = match self.decode_argument(desc.kind, &rec.1, &mut |step, reason| {
            bad_steps.push((step, reason))
        }) {
            Ok(a) => a,
            Err(reason) => {
                report.push(corrupt(reason));
                return ButtonState::blank(hotkey);
            }
        };
        for (step, reason) in bad_steps {
            report.push(LoadIssue::CorruptStep {
                view: view.to_string(),
                slot,
                step,
                reason,
            });
        }
        let image = rec.5.filter(|ix| {
            let ok = *ix < images;
            if !ok {
                report.push(LoadIssue::MissingImage {
                    view: view.to_string(),
                    slot,
                    index: *ix,
                });
            }
            ok
        });
        let (fill, border, hover) = rec.4.clone();
        ButtonState::from_parts(
            desc.kind,
            argument,
            hotkey,
            rec.3.0.chars().take(crate::MAX_TEXT).collect(),
            rec.3.1.clone(),
            Colors {
                fill,
                border,
                hover,
            },
            image,
        )
    }

    /// Stored form of a whole view set.
    pub fn encode(&self, views: &ViewSet, images: &ImageTable) -> LayoutData {
        let mut out = ViewRecords::new();
        for v in views.views() {
            let records = v.slots().iter().map(|b| self.encode_slot(b)).collect();
            out.insert(v.name().to_string(), records);
        }
        LayoutData {
            views: out,
            images: images.files().to_vec(),
            shared: views.shared_flags().to_vec(),
        }
    }

    /// Rebuild a view set for `layout` from stored data. `None` (nothing
    /// stored for this layout) yields a fresh set.
    pub fn decode(&self, data: Option<&LayoutData>, layout: &Layout) -> Decoded {
        let template = ViewSet::template_for(layout);
        let Some(data) = data else {
            return Decoded {
                views: ViewSet::new(template, layout.back_slot()),
                images: ImageTable::default(),
                report: LoadReport::default(),
            };
        };
        let mut report = LoadReport::default();
        let images = ImageTable::new(data.images.clone());
        let expected = template.len();
        let views = data
            .views
            .iter()
            .map(|(name, records)| {
                if records.len() != expected {
                    report.push(LoadIssue::SlotCountMismatch {
                        view: name.clone(),
                        expected,
                        found: records.len(),
                    });
                }
                let slots = records
                    .iter()
                    .take(expected)
                    .enumerate()
                    .map(|(i, r)| self.decode_slot(r, name, i, images.len(), &mut report))
                    .collect();
                View::new(name.clone(), slots)
            })
            .collect();
        Decoded {
            views: ViewSet::from_views(template, layout.back_slot(), views, data.shared.clone()),
            images,
            report,
        }
    }
}
