//! Scale reference shown while the viewer is immersive.
//!
//! The overlay has two halves. The 3D half is a grid and axes drawn by the
//! renderer ([`ReferenceHelpers`]). The 2D half is a set of text labels
//! (axis names and distance markers), a grid spacing readout and a compass,
//! owned by an [`OverlaySurface`]. Every immersive frame the label anchors
//! are projected through the camera so the labels stick to the grid.

use std::collections::HashMap;

use cgmath::{Point3, Vector3};

use crate::{
    camera::{Camera, Projection},
    data_structures::{bounds::BoundingVolume, model::LineVertex},
    framing,
    viewport::ViewportConfig,
};

pub const DEFAULT_GRID_SIZE: f32 = 100.0;
const GRID_DIVISIONS: u32 = 10;
const MARKER_RANGE: std::ops::RangeInclusive<i32> = -5..=5;

const GRID_CENTER_COLOR: [f32; 3] = [0.267, 0.267, 0.267];
const GRID_COLOR: [f32; 3] = [0.533, 0.533, 0.533];

/// The three DOM-like containers the overlay draws into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Container {
    Labels,
    Scale,
    Compass,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LabelId(pub usize);

/// What a label marks, which also decides its colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    AxisX,
    AxisY,
    AxisZ,
    /// Distance marker along the left edge of the grid, running in z.
    MarkerX(i32),
    /// Distance marker along the far edge of the grid, running in x.
    MarkerZ(i32),
}

impl Anchor {
    pub fn color(&self) -> &'static str {
        match self {
            Anchor::AxisX => "red",
            Anchor::AxisY => "green",
            Anchor::AxisZ => "blue",
            Anchor::MarkerX(_) | Anchor::MarkerZ(_) => "#888",
        }
    }

    pub fn text(&self, grid_size: f32) -> String {
        let spacing = grid_size / GRID_DIVISIONS as f32;
        match self {
            Anchor::AxisX => "X".to_string(),
            Anchor::AxisY => "Y".to_string(),
            Anchor::AxisZ => "Z".to_string(),
            Anchor::MarkerX(i) | Anchor::MarkerZ(i) => format!("{:.1}", *i as f32 * spacing),
        }
    }

    /// World position of the anchor for a grid of `grid_size` at height `ground`.
    pub fn position(&self, grid_size: f32, ground: f32) -> Point3<f32> {
        let half = grid_size / 2.0;
        let spacing = grid_size / GRID_DIVISIONS as f32;
        match *self {
            Anchor::AxisX => Point3::new(half, ground, 0.0),
            Anchor::AxisY => Point3::new(0.0, half + ground, 0.0),
            Anchor::AxisZ => Point3::new(0.0, ground, half),
            Anchor::MarkerX(i) => Point3::new(-half, ground, i as f32 * spacing),
            Anchor::MarkerZ(i) => Point3::new(i as f32 * spacing, ground, -half),
        }
    }

    /// Axis labels first, then the x and z marker pairs from -5 to 5.
    pub fn all() -> Vec<Anchor> {
        let mut anchors = vec![Anchor::AxisX, Anchor::AxisY, Anchor::AxisZ];
        for i in MARKER_RANGE {
            anchors.push(Anchor::MarkerX(i));
            anchors.push(Anchor::MarkerZ(i));
        }
        anchors
    }
}

/// Where the overlay's 2D parts live.
///
/// Operations on a missing container are no-ops; `create_label` then returns
/// `None`.
pub trait OverlaySurface {
    fn set_container_visible(&mut self, container: Container, visible: bool) -> bool;

    fn clear_container(&mut self, container: Container);

    fn create_label(&mut self, text: &str, color: &str) -> Option<LabelId>;

    fn set_label_text(&mut self, label: LabelId, text: &str);

    /// Move a label to pixel coordinates relative to the pane.
    fn place_label(&mut self, label: LabelId, x: f32, y: f32);

    /// Write the spacing readout inside the scale container.
    fn set_grid_spacing(&mut self, text: &str) -> bool;

    fn rotate_compass(&mut self, degrees: f32) -> bool;
}

/// Grid and axes line geometry, rebuilt whenever the overlay is enabled or
/// reconfigured. `generation` changes with every rebuild so the renderer
/// knows when to re-upload.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceHelpers {
    pub grid: Vec<LineVertex>,
    pub axes: Vec<LineVertex>,
    pub generation: u64,
}

impl ReferenceHelpers {
    pub fn new(grid_size: f32, ground: f32, generation: u64) -> Self {
        Self {
            grid: grid_lines(grid_size, GRID_DIVISIONS, ground),
            axes: axes_lines(grid_size / 2.0, ground),
            generation,
        }
    }

    pub fn vertices(&self) -> impl Iterator<Item = &LineVertex> {
        self.grid.iter().chain(self.axes.iter())
    }
}

/// Square grid on the xz plane, centred on the origin at height `y`.
fn grid_lines(size: f32, divisions: u32, y: f32) -> Vec<LineVertex> {
    let half = size / 2.0;
    let step = size / divisions as f32;
    let center = divisions / 2;
    let mut lines = Vec::with_capacity((divisions as usize + 1) * 4);
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let color = if i == center {
            GRID_CENTER_COLOR
        } else {
            GRID_COLOR
        };
        for (a, b) in [([-half, y, k], [half, y, k]), ([k, y, -half], [k, y, half])] {
            lines.push(LineVertex { position: a, color });
            lines.push(LineVertex { position: b, color });
        }
    }
    lines
}

fn axes_lines(length: f32, y: f32) -> Vec<LineVertex> {
    let axes = [
        ([length, 0.0, 0.0], [1.0, 0.0, 0.0]),
        ([0.0, length, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, length], [0.0, 0.0, 1.0]),
    ];
    axes.iter()
        .flat_map(|(end, color)| {
            [
                LineVertex {
                    position: [0.0, y, 0.0],
                    color: *color,
                },
                LineVertex {
                    position: [end[0], end[1] + y, end[2]],
                    color: *color,
                },
            ]
        })
        .collect()
}

/// Pixel coordinates of `point` in a viewport, y growing downwards.
pub fn project_to_screen(
    camera: &Camera,
    projection: &Projection,
    point: Point3<f32>,
    viewport: &ViewportConfig,
) -> (f32, f32) {
    let ndc = camera.project(point, projection);
    (
        (ndc.x * 0.5 + 0.5) * viewport.width as f32,
        (-ndc.y * 0.5 + 0.5) * viewport.height as f32,
    )
}

/// Compass needle angle in degrees for a camera looking along `forward`.
/// The needle points back along the view direction.
pub fn compass_rotation(forward: Vector3<f32>) -> f32 {
    forward.x.atan2(forward.z).to_degrees() - 180.0
}

/// Owns the overlay of one render pane.
pub struct OverlayController<S: OverlaySurface> {
    surface: S,
    grid_size: f32,
    ground_position: f32,
    enabled: bool,
    helpers: Option<ReferenceHelpers>,
    labels: HashMap<Anchor, LabelId>,
    generation: u64,
}

impl<S: OverlaySurface> OverlayController<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            grid_size: DEFAULT_GRID_SIZE,
            ground_position: 0.0,
            enabled: false,
            helpers: None,
            labels: HashMap::new(),
            generation: 0,
        }
    }

    pub fn grid_size(&self) -> f32 {
        self.grid_size
    }

    pub fn ground_position(&self) -> f32 {
        self.ground_position
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Grid and axes to draw, present only while enabled.
    pub fn helpers(&self) -> Option<&ReferenceHelpers> {
        self.helpers.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Size the grid for a newly loaded model.
    pub fn configure(&mut self, bounds: &BoundingVolume, ground_position: f32) {
        self.grid_size = framing::grid_size(bounds.max_dimension());
        self.ground_position = ground_position;
        log::debug!(
            "Overlay grid {} at ground {}",
            self.grid_size,
            self.ground_position
        );
        for (anchor, label) in &self.labels {
            self.surface.set_label_text(*label, &anchor.text(self.grid_size));
        }
        if self.enabled {
            self.rebuild_helpers();
            self.write_grid_spacing();
        }
    }

    pub fn enable(&mut self) {
        if self.enabled {
            return;
        }
        self.enabled = true;

        self.surface.set_container_visible(Container::Compass, true);
        self.rebuild_helpers();

        if self.surface.set_container_visible(Container::Labels, true) && self.labels.is_empty() {
            self.create_labels();
        }
        if self.surface.set_container_visible(Container::Scale, true) {
            self.write_grid_spacing();
        }
    }

    /// Release the helpers and hide the 2D parts. Labels stay for the next enable.
    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.helpers = None;
        self.surface.set_container_visible(Container::Compass, false);
        self.surface.set_container_visible(Container::Labels, false);
        self.surface.set_container_visible(Container::Scale, false);
    }

    /// Reposition every label and turn the compass. Does nothing while disabled.
    pub fn update(&mut self, camera: &Camera, projection: &Projection, viewport: &ViewportConfig) {
        if !self.enabled {
            return;
        }
        for (anchor, label) in &self.labels {
            let point = anchor.position(self.grid_size, self.ground_position);
            let (x, y) = project_to_screen(camera, projection, point, viewport);
            self.surface.place_label(*label, x, y);
        }
        self.surface
            .rotate_compass(compass_rotation(camera.forward()));
    }

    fn rebuild_helpers(&mut self) {
        self.generation += 1;
        self.helpers = Some(ReferenceHelpers::new(
            self.grid_size,
            self.ground_position,
            self.generation,
        ));
    }

    fn create_labels(&mut self) {
        self.surface.clear_container(Container::Labels);
        for anchor in Anchor::all() {
            match self
                .surface
                .create_label(&anchor.text(self.grid_size), anchor.color())
            {
                Some(label) => {
                    self.labels.insert(anchor, label);
                }
                None => {
                    log::warn!("Overlay labels could not be created");
                    self.labels.clear();
                    return;
                }
            }
        }
    }

    fn write_grid_spacing(&mut self) {
        let spacing = self.grid_size / GRID_DIVISIONS as f32;
        self.surface.set_grid_spacing(&format!("{:.1}m", spacing));
    }
}

/// A label kept by [`HeadlessSurface`].
#[derive(Clone, Debug, PartialEq)]
pub struct HeadlessLabel {
    pub text: String,
    pub color: String,
    pub position: Option<(f32, f32)>,
}

/// In-memory overlay surface for native windows and tests.
#[derive(Debug)]
pub struct HeadlessSurface {
    visible: HashMap<Container, bool>,
    pub labels: Vec<HeadlessLabel>,
    pub grid_spacing: Option<String>,
    pub compass_degrees: Option<f32>,
}

impl HeadlessSurface {
    /// A surface with all three containers present and hidden.
    pub fn new() -> Self {
        Self::with_containers(&[Container::Labels, Container::Scale, Container::Compass])
    }

    pub fn with_containers(containers: &[Container]) -> Self {
        Self {
            visible: containers.iter().map(|c| (*c, false)).collect(),
            labels: Vec::new(),
            grid_spacing: None,
            compass_degrees: None,
        }
    }

    /// `None` if the container does not exist.
    pub fn is_visible(&self, container: Container) -> Option<bool> {
        self.visible.get(&container).copied()
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlaySurface for HeadlessSurface {
    fn set_container_visible(&mut self, container: Container, visible: bool) -> bool {
        match self.visible.get_mut(&container) {
            Some(state) => {
                *state = visible;
                true
            }
            None => false,
        }
    }

    fn clear_container(&mut self, container: Container) {
        if container == Container::Labels {
            self.labels.clear();
        }
    }

    fn create_label(&mut self, text: &str, color: &str) -> Option<LabelId> {
        if !self.visible.contains_key(&Container::Labels) {
            return None;
        }
        self.labels.push(HeadlessLabel {
            text: text.to_string(),
            color: color.to_string(),
            position: None,
        });
        Some(LabelId(self.labels.len() - 1))
    }

    fn set_label_text(&mut self, label: LabelId, text: &str) {
        if let Some(label) = self.labels.get_mut(label.0) {
            label.text = text.to_string();
        }
    }

    fn place_label(&mut self, label: LabelId, x: f32, y: f32) {
        if let Some(label) = self.labels.get_mut(label.0) {
            label.position = Some((x, y));
        }
    }

    fn set_grid_spacing(&mut self, text: &str) -> bool {
        if !self.visible.contains_key(&Container::Scale) {
            return false;
        }
        self.grid_spacing = Some(text.to_string());
        true
    }

    fn rotate_compass(&mut self, degrees: f32) -> bool {
        if !self.visible.contains_key(&Container::Compass) {
            return false;
        }
        self.compass_degrees = Some(degrees);
        true
    }
}

/// Overlay drawn into page elements: `labels-container`, `scale-container`
/// (with `grid-spacing-value`) and `compassContainer`.
#[cfg(target_arch = "wasm32")]
pub struct DocumentSurface {
    document: web_sys::Document,
    labels: Vec<web_sys::HtmlElement>,
}

#[cfg(target_arch = "wasm32")]
impl DocumentSurface {
    pub fn new() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self {
            document,
            labels: Vec::new(),
        })
    }

    fn html(&self, id: &str) -> Option<web_sys::HtmlElement> {
        use wasm_bindgen::JsCast;
        self.document
            .get_element_by_id(id)?
            .dyn_into::<web_sys::HtmlElement>()
            .ok()
    }

    fn container(&self, container: Container) -> Option<web_sys::HtmlElement> {
        self.html(match container {
            Container::Labels => "labels-container",
            Container::Scale => "scale-container",
            Container::Compass => "compassContainer",
        })
    }
}

#[cfg(target_arch = "wasm32")]
impl OverlaySurface for DocumentSurface {
    fn set_container_visible(&mut self, container: Container, visible: bool) -> bool {
        let Some(element) = self.container(container) else {
            return false;
        };
        let display = if visible { "block" } else { "none" };
        element.style().set_property("display", display).is_ok()
    }

    fn clear_container(&mut self, container: Container) {
        if let Some(element) = self.container(container) {
            element.set_inner_html("");
        }
        if container == Container::Labels {
            self.labels.clear();
        }
    }

    fn create_label(&mut self, text: &str, color: &str) -> Option<LabelId> {
        use wasm_bindgen::JsCast;
        let container = self.container(Container::Labels)?;
        let label = self
            .document
            .create_element("div")
            .ok()?
            .dyn_into::<web_sys::HtmlElement>()
            .ok()?;
        label.set_class_name("axis-label");
        label.style().set_property("color", color).ok()?;
        label.set_text_content(Some(text));
        container.append_child(&label).ok()?;
        self.labels.push(label);
        Some(LabelId(self.labels.len() - 1))
    }

    fn set_label_text(&mut self, label: LabelId, text: &str) {
        if let Some(label) = self.labels.get(label.0) {
            label.set_text_content(Some(text));
        }
    }

    fn place_label(&mut self, label: LabelId, x: f32, y: f32) {
        if let Some(label) = self.labels.get(label.0) {
            let style = label.style();
            let _ = style.set_property("left", &format!("{}px", x));
            let _ = style.set_property("top", &format!("{}px", y));
        }
    }

    fn set_grid_spacing(&mut self, text: &str) -> bool {
        if self.container(Container::Scale).is_none() {
            return false;
        }
        match self.html("grid-spacing-value") {
            Some(element) => {
                element.set_text_content(Some(text));
                true
            }
            None => false,
        }
    }

    fn rotate_compass(&mut self, degrees: f32) -> bool {
        let Some(compass) = self.container(Container::Compass) else {
            return false;
        };
        compass
            .style()
            .set_property("transform", &format!("rotate({}deg)", degrees))
            .is_ok()
    }
}

impl<T: OverlaySurface + ?Sized> OverlaySurface for Box<T> {
    fn set_container_visible(&mut self, container: Container, visible: bool) -> bool {
        (**self).set_container_visible(container, visible)
    }

    fn clear_container(&mut self, container: Container) {
        (**self).clear_container(container)
    }

    fn create_label(&mut self, text: &str, color: &str) -> Option<LabelId> {
        (**self).create_label(text, color)
    }

    fn set_label_text(&mut self, label: LabelId, text: &str) {
        (**self).set_label_text(label, text)
    }

    fn place_label(&mut self, label: LabelId, x: f32, y: f32) {
        (**self).place_label(label, x, y)
    }

    fn set_grid_spacing(&mut self, text: &str) -> bool {
        (**self).set_grid_spacing(text)
    }

    fn rotate_compass(&mut self, degrees: f32) -> bool {
        (**self).rotate_compass(degrees)
    }
}
