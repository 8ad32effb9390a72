use std::{collections::HashSet, sync::Arc};

use cgmath::Vector3;

use crate::{
    data_structures::{
        bounds::BoundingVolume,
        material::TextureSlot,
        scene_graph::{SceneNode, traverse},
    },
    resources::animation::AnimationClip,
};

/// Geometry, material and texture statistics of one loaded asset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricsSnapshot {
    pub face_count: u64,
    pub mesh_count: u64,
    pub material_count: u64,
    pub pbr_texture_count: u64,
    pub other_texture_count: u64,
    pub has_animations: bool,
    /// World-space bounds the dimensions were taken from.
    pub bounds: BoundingVolume,
    /// Size of the world-space bounding box.
    pub dimensions: Vector3<f32>,
    pub volume: f64,
    /// Faces per cubic metre. The volume is clamped to at least 1 so
    /// degenerate (flat or empty) assets still report a finite value.
    pub triangle_density: f64,
}

impl MetricsSnapshot {
    pub fn has_textures(&self) -> bool {
        self.pbr_texture_count + self.other_texture_count > 0
    }
}

/// Walk `scene` once and gather a [`MetricsSnapshot`].
///
/// Materials and textures shared between meshes are counted once.
pub fn collect(scene: &dyn SceneNode, animations: &[AnimationClip]) -> MetricsSnapshot {
    let mut triangles = 0.0f64;
    let mut mesh_count = 0u64;
    let mut materials = HashSet::new();
    let mut pbr_textures = HashSet::new();
    let mut other_textures = HashSet::new();

    traverse(scene, &mut |node, _| {
        let Some(mesh) = node.as_mesh() else {
            return;
        };
        mesh_count += 1;
        triangles += mesh.geometry.triangle_count();

        for material in mesh.materials.iter() {
            if !materials.insert(Arc::as_ptr(material)) {
                continue;
            }
            for slot in TextureSlot::ALL {
                let Some(texture) = material.texture(slot) else {
                    continue;
                };
                let set = if slot.is_pbr() {
                    &mut pbr_textures
                } else {
                    &mut other_textures
                };
                set.insert(Arc::as_ptr(texture));
            }
        }
    });

    let bounds = BoundingVolume::from_scene(scene);
    let face_count = triangles.floor() as u64;
    let volume = bounds.volume();
    let snapshot = MetricsSnapshot {
        face_count,
        mesh_count,
        material_count: materials.len() as u64,
        pbr_texture_count: pbr_textures.len() as u64,
        other_texture_count: other_textures.len() as u64,
        has_animations: !animations.is_empty(),
        bounds,
        dimensions: bounds.size(),
        volume,
        triangle_density: face_count as f64 / volume.max(1.0),
    };
    log::debug!("Model statistics: {:?}", snapshot);
    snapshot
}
