mod common;

use std::{cell::RefCell, rc::Rc, sync::Arc, time::Duration};

use cgmath::{Deg, Rad, Vector3};
use common::test_utils::{approx_eq, cube_geometry, mesh, scene};
use model_preview::{
    camera::{Camera, CameraControls, Projection},
    data_structures::{
        bounds::BoundingVolume,
        instance::Instance,
        material::Material,
        scene_graph::{MeshNode, SceneNode},
    },
    frame_loop::{Clock, FrameLoop},
    overlay::{Container, HeadlessSurface, LabelId, OverlaySurface, ReferenceHelpers},
    render::Renderer,
    resources::{
        LoadedModel,
        animation::{AnimationChannel, AnimationClip, Keyframes},
    },
    viewport::{RenderTarget, ViewportConfig},
};

type Log = Rc<RefCell<Vec<&'static str>>>;

struct FakeRenderer {
    log: Log,
    size: ViewportConfig,
    uploads: u32,
    /// x of the first child of the root at every render
    rendered_x: Vec<f32>,
    with_helpers: Vec<bool>,
}

impl RenderTarget for FakeRenderer {
    fn backing_size(&self) -> ViewportConfig {
        self.size
    }

    fn set_backing_size(&mut self, size: ViewportConfig) {
        self.log.borrow_mut().push("resize");
        self.size = size;
    }
}

impl Renderer for FakeRenderer {
    fn upload(&mut self, _scene: &dyn SceneNode) {
        self.uploads += 1;
    }

    fn render(
        &mut self,
        scene: &dyn SceneNode,
        _camera: &Camera,
        _projection: &Projection,
        helpers: Option<&ReferenceHelpers>,
    ) -> Result<(), wgpu::SurfaceError> {
        self.log.borrow_mut().push("render");
        if let Some(child) = scene.get_children().first() {
            self.rendered_x.push(child.get_local_transform().position.x);
        }
        self.with_helpers.push(helpers.is_some());
        Ok(())
    }

    fn render_background(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.log.borrow_mut().push("background");
        Ok(())
    }
}

struct FakeControls {
    log: Log,
}

impl CameraControls for FakeControls {
    fn update(&mut self, _camera: &mut Camera, _dt: Duration) {
        self.log.borrow_mut().push("controls");
    }
}

struct FakeClock {
    log: Log,
    step: Duration,
}

impl Clock for FakeClock {
    fn delta(&mut self) -> Duration {
        self.log.borrow_mut().push("clock");
        self.step
    }
}

/// Records compass updates, which happen once per overlay update.
struct RecordingSurface {
    log: Log,
    inner: HeadlessSurface,
}

impl OverlaySurface for RecordingSurface {
    fn set_container_visible(&mut self, container: Container, visible: bool) -> bool {
        self.inner.set_container_visible(container, visible)
    }

    fn clear_container(&mut self, container: Container) {
        self.inner.clear_container(container)
    }

    fn create_label(&mut self, text: &str, color: &str) -> Option<LabelId> {
        self.inner.create_label(text, color)
    }

    fn set_label_text(&mut self, label: LabelId, text: &str) {
        self.inner.set_label_text(label, text)
    }

    fn place_label(&mut self, label: LabelId, x: f32, y: f32) {
        self.inner.place_label(label, x, y)
    }

    fn set_grid_spacing(&mut self, text: &str) -> bool {
        self.inner.set_grid_spacing(text)
    }

    fn rotate_compass(&mut self, degrees: f32) -> bool {
        self.log.borrow_mut().push("overlay");
        self.inner.rotate_compass(degrees)
    }
}

type TestLoop = FrameLoop<FakeRenderer, FakeControls, RecordingSurface>;

fn frame_loop(log: &Log, backing: ViewportConfig) -> TestLoop {
    let pane = ViewportConfig::new(800, 600);
    FrameLoop::new(
        FakeRenderer {
            log: log.clone(),
            size: backing,
            uploads: 0,
            rendered_x: Vec::new(),
            with_helpers: Vec::new(),
        },
        FakeControls { log: log.clone() },
        Projection::new(pane.width, pane.height, Deg(50.0), 0.1, 1000.0),
        pane,
        RecordingSurface {
            log: log.clone(),
            inner: HeadlessSurface::new(),
        },
        Box::new(FakeClock {
            log: log.clone(),
            step: Duration::from_millis(500),
        }),
    )
}

/// A cube (node 0) that slides from x = 0 to x = 10 over one second.
fn sliding_cube() -> LoadedModel {
    let node: Box<dyn SceneNode> = Box::new(
        MeshNode::new(mesh(0, cube_geometry(2.0), Arc::new(Material::new("plain"))))
            .with_source_index(0),
    );
    LoadedModel {
        scene: scene(vec![node]),
        animations: vec![AnimationClip {
            name: "slide".to_string(),
            channels: vec![AnimationChannel {
                target: 0,
                keyframes: Keyframes::Translation(vec![
                    Vector3::new(0.0, 0.0, 0.0),
                    Vector3::new(10.0, 0.0, 0.0),
                ]),
                timestamps: vec![0.0, 1.0],
            }],
        }],
    }
}

fn static_cube(offset: Vector3<f32>) -> LoadedModel {
    let mut root = common::test_utils::cube_scene(2.0);
    root.set_local_transform(Instance::from(offset));
    LoadedModel {
        scene: root,
        animations: Vec::new(),
    }
}

#[test]
fn should_run_frame_steps_in_order() {
    let log: Log = Rc::default();
    let mut frame_loop = frame_loop(&log, ViewportConfig::new(1, 1));
    frame_loop.install(sliding_cube(), 75.0);
    frame_loop.set_screen(ViewportConfig::new(1920, 1080));
    frame_loop.set_immersive(true);
    log.borrow_mut().clear();

    frame_loop.tick().expect("tick");

    assert_eq!(
        *log.borrow(),
        vec!["clock", "resize", "controls", "overlay", "render"]
    );
    // the mixer ran before rendering: half way through the slide
    assert_eq!(frame_loop.renderer().rendered_x, vec![5.0]);
    assert_eq!(frame_loop.renderer().with_helpers, vec![true]);
}

#[test]
fn should_skip_overlay_when_not_immersive() {
    let log: Log = Rc::default();
    let mut frame_loop = frame_loop(&log, ViewportConfig::new(800, 600));
    frame_loop.install(static_cube(Vector3::new(0.0, 0.0, 0.0)), 75.0);
    log.borrow_mut().clear();

    frame_loop.tick().expect("tick");

    assert_eq!(*log.borrow(), vec!["clock", "controls", "render"]);
    assert_eq!(frame_loop.renderer().with_helpers, vec![false]);
}

#[test]
fn should_resize_only_once_for_a_stable_size() {
    let log: Log = Rc::default();
    let mut frame_loop = frame_loop(&log, ViewportConfig::new(1, 1));
    frame_loop.install(static_cube(Vector3::new(0.0, 0.0, 0.0)), 75.0);

    frame_loop.tick().expect("tick");
    frame_loop.tick().expect("tick");

    let resizes = log.borrow().iter().filter(|step| **step == "resize").count();
    assert_eq!(resizes, 1);
    assert_eq!(frame_loop.renderer().size, ViewportConfig::new(800, 600));
}

#[test]
fn should_not_tick_until_started() {
    let log: Log = Rc::default();
    let mut frame_loop = frame_loop(&log, ViewportConfig::new(800, 600));

    frame_loop.tick().expect("tick");
    assert!(log.borrow().is_empty());
    assert!(!frame_loop.is_running());

    frame_loop.install(static_cube(Vector3::new(0.0, 0.0, 0.0)), 75.0);
    assert!(frame_loop.is_running());
    frame_loop.stop();
    log.borrow_mut().clear();

    frame_loop.tick().expect("tick");
    assert!(log.borrow().is_empty());
}

#[test]
fn should_draw_background_only_while_idle() {
    let log: Log = Rc::default();
    let mut frame_loop = frame_loop(&log, ViewportConfig::new(800, 600));

    frame_loop.render_idle().expect("idle");
    assert_eq!(*log.borrow(), vec!["background"]);

    frame_loop.install(static_cube(Vector3::new(0.0, 0.0, 0.0)), 75.0);
    log.borrow_mut().clear();
    frame_loop.render_idle().expect("idle");
    assert!(log.borrow().is_empty());
}

#[test]
fn should_frame_and_recentre_installed_model() {
    let log: Log = Rc::default();
    let mut frame_loop = frame_loop(&log, ViewportConfig::new(800, 600));

    let snapshot = frame_loop.install(static_cube(Vector3::new(3.0, 0.0, 0.0)), 75.0);

    assert_eq!(snapshot.face_count, 12);
    // bounds are reported as loaded, before recentering
    assert_eq!(snapshot.bounds.min, Vector3::new(2.0, -1.0, -1.0));
    assert_eq!(frame_loop.metrics(), Some(&snapshot));
    assert_eq!(frame_loop.renderer().uploads, 1);

    let camera = frame_loop.camera();
    assert!(approx_eq(camera.position.x, 3.0));
    assert!(approx_eq(camera.position.z, 1.954));
    assert_eq!(camera.target, cgmath::Point3::new(0.0, 0.0, 0.0));
    assert_eq!(frame_loop.projection().fovy(), Rad::from(Deg(75.0f32)));

    let scene = frame_loop.scene().expect("scene installed");
    let center = BoundingVolume::from_scene(scene).center();
    assert!(approx_eq(center.x, 0.0) && approx_eq(center.y, 0.0) && approx_eq(center.z, 0.0));
    assert_eq!(frame_loop.overlay().grid_size(), 2.0);
}

#[test]
fn should_toggle_overlay_with_immersive_mode() {
    let log: Log = Rc::default();
    let mut frame_loop = frame_loop(&log, ViewportConfig::new(800, 600));
    frame_loop.install(static_cube(Vector3::new(0.0, 0.0, 0.0)), 75.0);

    frame_loop.set_immersive(true);
    frame_loop.set_immersive(true);
    assert!(frame_loop.is_immersive());
    assert!(frame_loop.overlay().is_enabled());
    assert_eq!(frame_loop.overlay().surface().inner.labels.len(), 25);

    frame_loop.set_immersive(false);
    assert!(!frame_loop.overlay().is_enabled());
    assert!(frame_loop.overlay().helpers().is_none());
    assert_eq!(
        frame_loop.overlay().surface().inner.is_visible(Container::Labels),
        Some(false)
    );
}

#[test]
fn should_restore_pane_after_fullscreen_round_trip() {
    let log: Log = Rc::default();
    let mut frame_loop = frame_loop(&log, ViewportConfig::new(800, 600));
    frame_loop.install(static_cube(Vector3::new(0.0, 0.0, 0.0)), 75.0);

    // the resize reaches the loop before any redraw has synced fullscreen
    frame_loop.resize_window(ViewportConfig::new(1920, 1080), true, true);
    assert!(frame_loop.is_immersive());
    frame_loop.tick().expect("tick");
    assert_eq!(frame_loop.renderer().size, ViewportConfig::new(1920, 1080));

    frame_loop.resize_window(ViewportConfig::new(800, 600), false, true);
    assert!(!frame_loop.is_immersive());
    frame_loop.tick().expect("tick");
    assert_eq!(frame_loop.renderer().size, ViewportConfig::new(800, 600));
    assert!(approx_eq(frame_loop.projection().aspect(), 800.0 / 600.0));
}

#[test]
fn should_keep_fixed_pane_when_window_resizes() {
    let log: Log = Rc::default();
    let mut frame_loop = frame_loop(&log, ViewportConfig::new(800, 600));
    frame_loop.install(static_cube(Vector3::new(0.0, 0.0, 0.0)), 75.0);

    frame_loop.resize_window(ViewportConfig::new(1024, 768), false, false);
    frame_loop.tick().expect("tick");

    assert_eq!(frame_loop.renderer().size, ViewportConfig::new(800, 600));
}
