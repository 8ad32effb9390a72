//! Keeping the render target, camera aspect and pane size in agreement.

use crate::camera::Projection;

/// Size of the render pane in physical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl ViewportConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for ViewportConfig {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

/// Something drawn into with a resizable backing store.
pub trait RenderTarget {
    fn backing_size(&self) -> ViewportConfig;

    fn set_backing_size(&mut self, size: ViewportConfig);
}

/// Resizes the render target to the pane (or the whole screen while
/// immersive) only when the size actually changed.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResizeReconciler {
    pub pane: ViewportConfig,
}

impl ResizeReconciler {
    pub fn new(pane: ViewportConfig) -> Self {
        Self { pane }
    }

    pub fn target_size(&self, immersive: bool, screen: ViewportConfig) -> ViewportConfig {
        if immersive { screen } else { self.pane }
    }

    /// Returns `true` if the target was resized.
    pub fn reconcile(
        &self,
        target: &mut dyn RenderTarget,
        projection: &mut Projection,
        immersive: bool,
        screen: ViewportConfig,
    ) -> bool {
        let size = self.target_size(immersive, screen);
        if size.is_degenerate() || target.backing_size() == size {
            return false;
        }
        log::debug!("Resizing render target to {}x{}", size.width, size.height);
        target.set_backing_size(size);
        projection.resize(size.width, size.height);
        projection.update_projection_matrix();
        true
    }
}
