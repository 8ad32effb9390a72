//! Axis-aligned bounding volumes.

use cgmath::{ElementWise, Vector3, Zero};

use crate::data_structures::scene_graph::{SceneNode, traverse};

/// An axis-aligned box `{min, max}`.
///
/// An empty box (nothing expanded into it yet) reports a zero size and a
/// centre at the origin, so derived values are always finite and
/// `size()` never has negative components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingVolume {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl BoundingVolume {
    pub fn empty() -> Self {
        Self {
            min: Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn expand_by_point(&mut self, point: Vector3<f32>) {
        self.min = Vector3::new(
            self.min.x.min(point.x),
            self.min.y.min(point.y),
            self.min.z.min(point.z),
        );
        self.max = Vector3::new(
            self.max.x.max(point.x),
            self.max.y.max(point.y),
            self.max.z.max(point.z),
        );
    }

    pub fn center(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::zero();
        }
        (self.min + self.max) * 0.5
    }

    /// Per-axis extent.
    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            return Vector3::zero();
        }
        self.max.sub_element_wise(self.min)
    }

    pub fn max_dimension(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }

    pub fn volume(&self) -> f64 {
        let size = self.size();
        size.x as f64 * size.y as f64 * size.z as f64
    }

    /// Lowest point along y, zero for an empty box.
    pub fn min_y(&self) -> f32 {
        if self.is_empty() { 0.0 } else { self.min.y }
    }

    /// World-space bounds over every mesh vertex below `root`.
    pub fn from_scene(root: &dyn SceneNode) -> Self {
        let mut bounds = Self::empty();
        traverse(root, &mut |node, world| {
            if let Some(mesh) = node.as_mesh() {
                for position in &mesh.geometry.positions {
                    let point = *world * Vector3::from(*position).extend(1.0);
                    bounds.expand_by_point(point.truncate());
                }
            }
        });
        bounds
    }
}

impl Default for BoundingVolume {
    fn default() -> Self {
        Self::empty()
    }
}
