//! The per-frame cycle of a render pane.
//!
//! Each [`FrameLoop::tick`] runs, in this order: clock, animation mixer,
//! resize reconciliation, camera controls, overlay (immersive only), render.
//! The loop only ticks between [`FrameLoop::start`] and [`FrameLoop::stop`];
//! loading a model starts it.

use cgmath::Deg;
use instant::{Duration, Instant};

use crate::{
    camera::{Camera, CameraControls, Projection},
    data_structures::scene_graph::SceneNode,
    diagnostics::metrics::{self, MetricsSnapshot},
    framing::{self, CameraPlacement},
    overlay::{OverlayController, OverlaySurface},
    render::Renderer,
    resources::{LoadedModel, animation::AnimationMixer},
    viewport::{ResizeReconciler, ViewportConfig},
};

/// Source of the time elapsed between ticks.
pub trait Clock {
    fn delta(&mut self) -> Duration;
}

#[derive(Debug)]
pub struct SystemClock {
    last: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn delta(&mut self) -> Duration {
        let dt = self.last.elapsed();
        self.last = Instant::now();
        dt
    }
}

pub struct FrameLoop<R: Renderer, C: CameraControls, S: OverlaySurface> {
    renderer: R,
    controls: C,
    camera: Camera,
    projection: Projection,
    reconciler: ResizeReconciler,
    overlay: OverlayController<S>,
    clock: Box<dyn Clock>,
    scene: Option<Box<dyn SceneNode>>,
    mixer: Option<AnimationMixer>,
    metrics: Option<MetricsSnapshot>,
    placement: Option<CameraPlacement>,
    screen: ViewportConfig,
    immersive: bool,
    running: bool,
}

impl<R: Renderer, C: CameraControls, S: OverlaySurface> FrameLoop<R, C, S> {
    pub fn new(
        renderer: R,
        controls: C,
        projection: Projection,
        pane: ViewportConfig,
        surface: S,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            renderer,
            controls,
            camera: Camera::default(),
            projection,
            reconciler: ResizeReconciler::new(pane),
            overlay: OverlayController::new(surface),
            clock,
            scene: None,
            mixer: None,
            metrics: None,
            placement: None,
            screen: pane,
            immersive: false,
            running: false,
        }
    }

    /// Take ownership of a loaded model, frame it and start the loop.
    /// Returns the model's statistics.
    pub fn install(&mut self, model: LoadedModel, fov_degrees: f32) -> MetricsSnapshot {
        let LoadedModel {
            mut scene,
            animations,
        } = model;

        let snapshot = metrics::collect(&*scene, &animations);
        let bounds = snapshot.bounds;
        let placement = framing::frame(&bounds, fov_degrees);
        framing::recenter(&mut *scene, &bounds);

        self.camera.position = placement.position;
        self.camera.look_at(placement.target);
        self.projection.set_fovy(Deg(fov_degrees));
        self.overlay.configure(&bounds, placement.ground_position);
        self.mixer = AnimationMixer::new(animations);
        self.renderer.upload(&*scene);

        log::info!(
            "Framed model at distance {:.3}, ground at {:.3}",
            placement.distance,
            placement.ground_position
        );
        self.scene = Some(scene);
        self.metrics = Some(snapshot);
        self.placement = Some(placement);
        self.start();
        snapshot
    }

    pub fn start(&mut self) {
        if !self.running {
            log::debug!("Frame loop started");
        }
        // discard the time spent before starting
        self.clock.delta();
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Frame loop stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one frame. Does nothing while stopped or before a model is installed.
    pub fn tick(&mut self) -> Result<(), wgpu::SurfaceError> {
        if !self.running {
            return Ok(());
        }
        let Some(scene) = self.scene.as_mut() else {
            return Ok(());
        };

        let dt = self.clock.delta();
        if let Some(mixer) = self.mixer.as_mut() {
            mixer.update(&mut **scene, dt.as_secs_f32());
        }
        self.reconciler.reconcile(
            &mut self.renderer,
            &mut self.projection,
            self.immersive,
            self.screen,
        );
        self.controls.update(&mut self.camera, dt);
        if self.immersive {
            let viewport = self.reconciler.target_size(true, self.screen);
            self.overlay
                .update(&self.camera, &self.projection, &viewport);
        }
        self.renderer.render(
            &**scene,
            &self.camera,
            &self.projection,
            self.overlay.helpers(),
        )
    }

    /// Draw the bare background while no model is shown. Does nothing while running.
    pub fn render_idle(&mut self) -> Result<(), wgpu::SurfaceError> {
        if self.running {
            return Ok(());
        }
        self.reconciler.reconcile(
            &mut self.renderer,
            &mut self.projection,
            self.immersive,
            self.screen,
        );
        self.renderer.render_background()
    }

    /// Enter or leave immersive mode. Repeated calls with the same value are no-ops.
    pub fn set_immersive(&mut self, immersive: bool) {
        if self.immersive == immersive {
            return;
        }
        self.immersive = immersive;
        if immersive {
            self.overlay.enable();
        } else {
            self.overlay.disable();
        }
    }

    pub fn is_immersive(&self) -> bool {
        self.immersive
    }

    /// Size of the whole screen, used while immersive.
    pub fn set_screen(&mut self, screen: ViewportConfig) {
        self.screen = screen;
    }

    /// Size of the pane, used while not immersive.
    pub fn set_pane(&mut self, pane: ViewportConfig) {
        self.reconciler.pane = pane;
    }

    /// Apply a window resize. `fullscreen` is the window's state at the time
    /// of the resize, which may be ahead of the last synced immersive flag.
    /// The pane follows the window only outside fullscreen and only when
    /// `follow_pane` is set.
    pub fn resize_window(&mut self, size: ViewportConfig, fullscreen: bool, follow_pane: bool) {
        self.set_immersive(fullscreen);
        self.set_screen(size);
        if !fullscreen && follow_pane {
            self.set_pane(size);
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn controls_mut(&mut self) -> &mut C {
        &mut self.controls
    }

    pub fn overlay(&self) -> &OverlayController<S> {
        &self.overlay
    }

    pub fn scene(&self) -> Option<&dyn SceneNode> {
        self.scene.as_deref()
    }

    pub fn metrics(&self) -> Option<&MetricsSnapshot> {
        self.metrics.as_ref()
    }

    pub fn placement(&self) -> Option<&CameraPlacement> {
        self.placement.as_ref()
    }
}
