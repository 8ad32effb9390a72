//! Publishing a [`MetricsSnapshot`] to named presentation slots.
//!
//! Each slot pairs an element id with a formatter and the metric it is rated
//! by. Sinks report whether a slot exists; writes to absent slots do nothing.

use std::collections::{HashMap, HashSet};

use super::{
    metrics::MetricsSnapshot,
    quality::{Metric, QualityTier, classify},
};

pub const STATUS_SLOT: &str = "model-status";
pub const PREVIEW_SLOT: &str = "model-preview";

/// A named target for text, a quality class and visibility.
pub trait StatsSink {
    /// Returns `false` if the slot does not exist.
    fn set_text(&mut self, slot: &str, text: &str) -> bool;

    /// Replace any previous tier class on `slot` with `class`.
    fn set_quality_class(&mut self, slot: &str, class: &str) -> bool;

    fn set_visible(&mut self, slot: &str, visible: bool) -> bool;
}

pub struct DiagnosticSlot {
    pub id: &'static str,
    pub format: fn(&MetricsSnapshot) -> String,
    pub metric: fn(&MetricsSnapshot) -> Metric,
}

pub const SLOTS: &[DiagnosticSlot] = &[
    DiagnosticSlot {
        id: "faceCount",
        format: |s| group_thousands(s.face_count),
        metric: |s| Metric::FaceCount(s.face_count),
    },
    DiagnosticSlot {
        id: "hasTextures",
        format: |s| yes_no(s.has_textures()),
        metric: |s| Metric::HasTextures(s.has_textures()),
    },
    DiagnosticSlot {
        id: "PBRTextureCount",
        format: |s| s.pbr_texture_count.to_string(),
        metric: |s| Metric::PbrTextureCount(s.pbr_texture_count),
    },
    DiagnosticSlot {
        id: "meshCount",
        format: |s| group_thousands(s.mesh_count),
        metric: |s| Metric::MeshCount(s.mesh_count),
    },
    DiagnosticSlot {
        id: "materialCount",
        format: |s| group_thousands(s.material_count),
        metric: |s| Metric::MaterialCount(s.material_count),
    },
    DiagnosticSlot {
        id: "triangleDensity",
        format: |s| format!("{:.2} triangles/m³", s.triangle_density),
        metric: |s| Metric::TriangleDensity(s.triangle_density),
    },
    DiagnosticSlot {
        id: "boundingBox",
        format: |s| {
            format!(
                "{:.2}m × {:.2}m × {:.2}m",
                s.dimensions.x, s.dimensions.y, s.dimensions.z
            )
        },
        metric: |s| Metric::BoundingBoxVolume(s.volume),
    },
    DiagnosticSlot {
        id: "hasAnimations",
        format: |s| yes_no(s.has_animations),
        metric: |s| Metric::HasAnimations(s.has_animations),
    },
];

pub const TIER_CLASSES: [&str; 4] = ["text-success", "text-warning", "text-danger", "text-muted"];

pub fn class_for(tier: QualityTier) -> &'static str {
    match tier {
        QualityTier::Good => TIER_CLASSES[0],
        QualityTier::Warning => TIER_CLASSES[1],
        QualityTier::Bad => TIER_CLASSES[2],
        QualityTier::Neutral => TIER_CLASSES[3],
    }
}

/// Write every slot of `snapshot` to `sink`. Returns how many slots were present.
pub fn publish(snapshot: &MetricsSnapshot, sink: &mut dyn StatsSink) -> usize {
    let mut present = 0;
    for slot in SLOTS {
        if !sink.set_text(slot.id, &(slot.format)(snapshot)) {
            log::trace!("No element for {}", slot.id);
            continue;
        }
        present += 1;
        let tier = classify((slot.metric)(snapshot));
        sink.set_quality_class(slot.id, class_for(tier));
    }
    present
}

/// Show the download progress in the status slot and reveal the preview.
pub fn show_progress(sink: &mut dyn StatsSink, fraction: Option<f32>) {
    sink.set_visible(PREVIEW_SLOT, true);
    sink.set_text(STATUS_SLOT, &crate::resources::fetch::progress_text(fraction));
}

pub fn show_loaded(sink: &mut dyn StatsSink) {
    sink.set_visible(STATUS_SLOT, false);
}

pub fn show_error(sink: &mut dyn StatsSink, reason: &str) {
    sink.set_text(STATUS_SLOT, &format!("Error loading model: {}", reason));
    sink.set_visible(STATUS_SLOT, true);
    sink.set_visible(PREVIEW_SLOT, false);
}

/// `1234567` → `"1,234,567"`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn yes_no(value: bool) -> String {
    (if value { "Yes" } else { "No" }).to_string()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlotState {
    pub text: String,
    pub class: Option<String>,
    pub visible: bool,
}

/// In-memory sink with a fixed set of slots, for headless runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    slots: HashMap<String, SlotState>,
}

impl MemorySink {
    pub fn with_slots<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let slots = ids
            .into_iter()
            .map(|id| {
                (
                    id.to_string(),
                    SlotState {
                        visible: true,
                        ..Default::default()
                    },
                )
            })
            .collect();
        Self { slots }
    }

    /// Every diagnostic slot plus the status and preview slots.
    pub fn complete() -> Self {
        Self::with_slots(
            SLOTS
                .iter()
                .map(|slot| slot.id)
                .chain([STATUS_SLOT, PREVIEW_SLOT]),
        )
    }

    pub fn slot(&self, id: &str) -> Option<&SlotState> {
        self.slots.get(id)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.slots.get(id).map(|slot| slot.text.as_str())
    }

    pub fn class(&self, id: &str) -> Option<&str> {
        self.slots.get(id).and_then(|slot| slot.class.as_deref())
    }
}

impl StatsSink for MemorySink {
    fn set_text(&mut self, slot: &str, text: &str) -> bool {
        match self.slots.get_mut(slot) {
            Some(state) => {
                state.text = text.to_string();
                true
            }
            None => false,
        }
    }

    fn set_quality_class(&mut self, slot: &str, class: &str) -> bool {
        match self.slots.get_mut(slot) {
            Some(state) => {
                state.class = Some(class.to_string());
                true
            }
            None => false,
        }
    }

    fn set_visible(&mut self, slot: &str, visible: bool) -> bool {
        match self.slots.get_mut(slot) {
            Some(state) => {
                state.visible = visible;
                true
            }
            None => false,
        }
    }
}

/// Sink that writes every slot to the log. Accepts any slot id.
#[derive(Debug, Default)]
pub struct LogSink {
    hidden: HashSet<String>,
}

impl StatsSink for LogSink {
    fn set_text(&mut self, slot: &str, text: &str) -> bool {
        if !self.hidden.contains(slot) {
            log::info!("{}: {}", slot, text);
        }
        true
    }

    fn set_quality_class(&mut self, slot: &str, class: &str) -> bool {
        log::debug!("{} rated {}", slot, class);
        true
    }

    fn set_visible(&mut self, slot: &str, visible: bool) -> bool {
        if visible {
            self.hidden.remove(slot);
        } else {
            self.hidden.insert(slot.to_string());
        }
        true
    }
}

/// Sink writing to elements of the page by id.
#[cfg(target_arch = "wasm32")]
pub struct DocumentSink {
    document: web_sys::Document,
}

#[cfg(target_arch = "wasm32")]
impl DocumentSink {
    pub fn new() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self { document })
    }

    fn element(&self, slot: &str) -> Option<web_sys::HtmlElement> {
        use wasm_bindgen::JsCast;
        self.document
            .get_element_by_id(slot)?
            .dyn_into::<web_sys::HtmlElement>()
            .ok()
    }
}

#[cfg(target_arch = "wasm32")]
impl StatsSink for DocumentSink {
    fn set_text(&mut self, slot: &str, text: &str) -> bool {
        let Some(element) = self.element(slot) else {
            return false;
        };
        element.set_text_content(Some(text));
        true
    }

    fn set_quality_class(&mut self, slot: &str, class: &str) -> bool {
        let Some(element) = self.element(slot) else {
            return false;
        };
        let classes = element.class_list();
        for old in TIER_CLASSES {
            let _ = classes.remove_1(old);
        }
        classes.add_1(class).is_ok()
    }

    fn set_visible(&mut self, slot: &str, visible: bool) -> bool {
        let Some(element) = self.element(slot) else {
            return false;
        };
        let display = if visible { "block" } else { "none" };
        element.style().set_property("display", display).is_ok()
    }
}
