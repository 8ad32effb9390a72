//! Initial camera placement for a freshly loaded model.

use cgmath::Point3;

use crate::data_structures::{bounds::BoundingVolume, scene_graph::SceneNode};

/// Where the camera starts and where the ground plane sits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPlacement {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    /// Distance at which the largest extent fills the vertical field of view.
    pub distance: f32,
    /// Height of the model's lowest point once recentred.
    pub ground_position: f32,
}

/// Place the camera so the whole model is visible.
///
/// Assumes the model has been [`recenter`]ed, so the camera can look at the
/// origin.
pub fn frame(bounds: &BoundingVolume, fov_degrees: f32) -> CameraPlacement {
    let center = bounds.center();
    let size = bounds.size();
    let max_dim = bounds.max_dimension();
    let half_fov = fov_degrees.to_radians() / 2.0;
    let distance = (max_dim / 2.0 / half_fov.tan()).abs();

    CameraPlacement {
        position: Point3::new(center.x, center.y, distance * 1.5),
        target: Point3::new(0.0, 0.0, 0.0),
        distance,
        ground_position: -(size.y / 2.0) - bounds.min_y(),
    }
}

/// Move `root` so the centre of `bounds` lands on the world origin.
pub fn recenter(root: &mut dyn SceneNode, bounds: &BoundingVolume) {
    let mut transform = root.get_local_transform().clone();
    transform.position -= bounds.center();
    root.set_local_transform(transform);
}

/// Extent of the reference grid for a model whose largest side is `max_dim`.
///
/// Large models get a grid rounded up to a multiple of 50, small ones keep
/// their own size.
pub fn grid_size(max_dim: f32) -> f32 {
    if max_dim >= 5.0 {
        (max_dim / 50.0).ceil() * 50.0
    } else {
        max_dim
    }
}

