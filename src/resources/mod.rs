//! Loading of packaged glTF assets into the preview's scene graph.
//!
//! Loading is the one asynchronous operation of the viewer. It reports through
//! [`LoadEvent`]: any number of `Progress` events followed by exactly one
//! `Loaded` or `Failed`. Failures are never retried here; the caller decides.

use std::sync::Arc;

use anyhow::{Context as _, bail};
use futures::future::{AbortHandle, Abortable};
use gltf::{animation::util::ReadOutputs, mesh::Mode};

use crate::data_structures::{
    instance::Instance,
    material::{Material, Materials, TextureRef, TextureSlot},
    scene_graph::{ContainerNode, Geometry, MeshData, MeshNode, SceneNode},
};
use crate::resources::animation::{AnimationChannel, AnimationClip, Keyframes};

pub mod animation;
pub mod fetch;
pub mod validate;

/// A parsed asset: its scene graph and animation clips.
pub struct LoadedModel {
    pub scene: Box<dyn SceneNode>,
    pub animations: Vec<AnimationClip>,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("animations", &self.animations.len())
            .finish()
    }
}

#[derive(Debug)]
pub enum LoadEvent {
    /// Fraction of the transfer completed, in `[0, 1]`. `None` while the
    /// total size is unknown.
    Progress(Option<f32>),
    Loaded(LoadedModel),
    /// Human-readable reason.
    Failed(String),
}

/// Fetch and parse `source`, reporting every step to `on_event`.
pub async fn load_model(source: &str, assets_dir: &str, on_event: &mut dyn FnMut(LoadEvent)) {
    let result = fetch_and_parse(source, assets_dir, &mut |fraction| {
        on_event(LoadEvent::Progress(fraction))
    })
    .await;
    match result {
        Ok(model) => {
            log::info!("Loaded {}", source);
            on_event(LoadEvent::Loaded(model));
        }
        Err(e) => {
            log::error!("Error loading model {}: {:#}", source, e);
            on_event(LoadEvent::Failed(format!("{:#}", e)));
        }
    }
}

async fn fetch_and_parse(
    source: &str,
    assets_dir: &str,
    on_progress: &mut dyn FnMut(Option<f32>),
) -> anyhow::Result<LoadedModel> {
    let bytes = fetch::load_binary(source, assets_dir, &mut |loaded, total| {
        on_progress(fetch::progress_fraction(loaded, total))
    })
    .await?;
    load_model_gltf(&bytes, assets_dir).await
}

/// Handle to cancel a pending load.
#[derive(Clone, Debug)]
pub struct LoadTask {
    handle: AbortHandle,
}

impl LoadTask {
    /// Wrap `future` so it can be cancelled; the wrapped future resolves to
    /// `Err(Aborted)` once [`LoadTask::cancel`] was called.
    pub fn new<F: Future>(future: F) -> (Abortable<F>, Self) {
        let (future, handle) = futures::future::abortable(future);
        (future, Self { handle })
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_aborted()
    }
}

/// Parse a glTF document (binary or JSON) into a scene graph with animations.
///
/// Buffers referenced by URI are fetched relative to `assets_dir`.
pub async fn load_model_gltf(bytes: &[u8], assets_dir: &str) -> anyhow::Result<LoadedModel> {
    let gltf = gltf::Gltf::from_slice(bytes).context("not a readable glTF asset")?;

    // Load buffers
    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => match gltf.blob.as_deref() {
                Some(blob) => buffer_data.push(blob.into()),
                None => bail!("binary chunk referenced but missing"),
            },
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                bail!("embedded data URIs are not supported, package the asset as .glb")
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = fetch::load_binary(uri, assets_dir, &mut |_, _| ()).await?;
                buffer_data.push(bin);
            }
        }
    }

    // Textures are shared by index so materials referencing the same image
    // end up holding the same allocation.
    let textures: Vec<Arc<TextureRef>> = gltf
        .textures()
        .map(|texture| {
            let name = texture
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("texture_{}", texture.index()));
            TextureRef::new(name, Some(texture.index()))
        })
        .collect();
    let materials: Vec<Arc<Material>> = gltf
        .materials()
        .map(|material| Arc::new(to_material(&material, &textures)))
        .collect();

    let mut builder = SceneBuilder {
        buffers: &buffer_data,
        materials: &materials,
        default_material: None,
        next_mesh_id: 0,
    };
    let mut root = ContainerNode::new("Scene");
    if let Some(scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) {
        for node in scene.nodes() {
            let child = builder.node(node);
            root.add_child(child);
        }
    } else {
        log::warn!("Asset contains no scene");
    }

    let animations = gltf
        .animations()
        .map(|animation| load_animation(&animation, &buffer_data))
        .collect();

    Ok(LoadedModel {
        scene: Box::new(root),
        animations,
    })
}

fn to_material(material: &gltf::Material, textures: &[Arc<TextureRef>]) -> Material {
    let name = material
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("material_{}", material.index().unwrap_or_default()));
    let mut result = Material::new(name);
    let lookup = |index: usize| textures.get(index).cloned();

    let pbr = material.pbr_metallic_roughness();
    if let Some(texture) = pbr.base_color_texture().and_then(|info| lookup(info.texture().index())) {
        result.set_texture(TextureSlot::BaseColor, texture);
    }
    // glTF packs metalness and roughness into one image that serves both slots
    if let Some(texture) = pbr
        .metallic_roughness_texture()
        .and_then(|info| lookup(info.texture().index()))
    {
        result.set_texture(TextureSlot::Metalness, texture.clone());
        result.set_texture(TextureSlot::Roughness, texture);
    }
    if let Some(texture) = material
        .normal_texture()
        .and_then(|normal| lookup(normal.texture().index()))
    {
        result.set_texture(TextureSlot::Normal, texture);
    }
    if let Some(texture) = material
        .occlusion_texture()
        .and_then(|occlusion| lookup(occlusion.texture().index()))
    {
        result.set_texture(TextureSlot::AmbientOcclusion, texture);
    }
    if let Some(texture) = material
        .emissive_texture()
        .and_then(|info| lookup(info.texture().index()))
    {
        result.set_texture(TextureSlot::Emissive, texture);
    }
    for (extension, property, slot) in EXTENSION_TEXTURES {
        if let Some(texture) = extension_texture(material, extension, property).and_then(lookup) {
            result.set_texture(*slot, texture);
        }
    }
    result
}

/// Texture slots filled from material extensions: (extension, property, slot).
const EXTENSION_TEXTURES: &[(&str, &str, TextureSlot)] = &[
    ("KHR_materials_clearcoat", "clearcoatTexture", TextureSlot::Clearcoat),
    (
        "KHR_materials_clearcoat",
        "clearcoatRoughnessTexture",
        TextureSlot::ClearcoatRoughness,
    ),
    (
        "KHR_materials_clearcoat",
        "clearcoatNormalTexture",
        TextureSlot::ClearcoatNormal,
    ),
    ("KHR_materials_sheen", "sheenColorTexture", TextureSlot::SheenColor),
];

/// Texture index of `property` inside the material extension `extension`.
fn extension_texture(material: &gltf::Material, extension: &str, property: &str) -> Option<usize> {
    let index = material
        .extension_value(extension)?
        .get(property)?
        .get("index")?
        .as_u64()?;
    usize::try_from(index).ok()
}

struct SceneBuilder<'a> {
    buffers: &'a [Vec<u8>],
    materials: &'a [Arc<Material>],
    // Primitives without a material share one default material
    default_material: Option<Arc<Material>>,
    next_mesh_id: u32,
}

impl SceneBuilder<'_> {
    fn node(&mut self, node: gltf::Node) -> Box<dyn SceneNode> {
        let (translation, rotation, scale) = node.transform().decomposed();
        let transform = Instance::from_decomposed(translation, rotation, scale);

        let mut meshes: Vec<MeshData> = match node.mesh() {
            Some(mesh) => mesh
                .primitives()
                .filter_map(|primitive| self.primitive(&mesh, &primitive))
                .collect(),
            None => Vec::new(),
        };

        // A node with exactly one drawable primitive is itself the mesh,
        // otherwise it groups one mesh per primitive.
        let mut scene_node: Box<dyn SceneNode> = if meshes.len() == 1 {
            let mesh = meshes.remove(0);
            Box::new(MeshNode::new(mesh).with_source_index(node.index()))
        } else {
            let name = node
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("node_{}", node.index()));
            let mut container = ContainerNode::new(name).with_source_index(node.index());
            for mesh in meshes {
                container.add_child(Box::new(MeshNode::new(mesh)));
            }
            Box::new(container)
        };
        scene_node.set_local_transform(transform);

        for child in node.children() {
            let child_node = self.node(child);
            scene_node.add_child(child_node);
        }
        scene_node
    }

    fn primitive(&mut self, mesh: &gltf::Mesh, primitive: &gltf::Primitive) -> Option<MeshData> {
        let mode = primitive.mode();
        if !matches!(mode, Mode::Triangles | Mode::TriangleStrip | Mode::TriangleFan) {
            log::debug!(
                "Skipping {:?} primitive of mesh {:?}; only triangles are previewed",
                mode,
                mesh.name()
            );
            return None;
        }
        let buffers = self.buffers;
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .map(|positions| positions.collect())
            .unwrap_or_default();
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|normals| normals.collect())
            .unwrap_or_default();
        let indices: Option<Vec<u32>> = reader
            .read_indices()
            .map(|indices| indices.into_u32().collect());

        let indices = match mode {
            Mode::TriangleStrip => Some(strip_to_list(
                &indices.unwrap_or_else(|| (0..positions.len() as u32).collect()),
            )),
            Mode::TriangleFan => Some(fan_to_list(
                &indices.unwrap_or_else(|| (0..positions.len() as u32).collect()),
            )),
            _ => indices,
        };

        let material = match primitive
            .material()
            .index()
            .and_then(|index| self.materials.get(index))
        {
            Some(material) => material.clone(),
            None => self
                .default_material
                .get_or_insert_with(|| Arc::new(Material::new("default")))
                .clone(),
        };

        let id = self.next_mesh_id;
        self.next_mesh_id += 1;
        Some(MeshData {
            id,
            name: mesh.name().unwrap_or("unknown_mesh").to_string(),
            geometry: Geometry {
                positions,
                normals,
                indices,
            },
            materials: Materials::Single(material),
        })
    }
}

fn strip_to_list(strip: &[u32]) -> Vec<u32> {
    let mut list = Vec::with_capacity(strip.len().saturating_sub(2) * 3);
    for i in 0..strip.len().saturating_sub(2) {
        // every other triangle is flipped to keep a consistent winding
        if i % 2 == 0 {
            list.extend_from_slice(&[strip[i], strip[i + 1], strip[i + 2]]);
        } else {
            list.extend_from_slice(&[strip[i + 1], strip[i], strip[i + 2]]);
        }
    }
    list
}

fn fan_to_list(fan: &[u32]) -> Vec<u32> {
    let mut list = Vec::with_capacity(fan.len().saturating_sub(2) * 3);
    for i in 1..fan.len().saturating_sub(1) {
        list.extend_from_slice(&[fan[0], fan[i], fan[i + 1]]);
    }
    list
}

fn load_animation(animation: &gltf::Animation, buffer_data: &[Vec<u8>]) -> AnimationClip {
    let mut channels = Vec::new();
    for channel in animation.channels() {
        let reader = channel.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));
        let timestamps: Vec<f32> = match reader.read_inputs() {
            Some(inputs) => inputs.collect(),
            None => {
                log::warn!("No timestamps found in channel {}", channel.index());
                Vec::new()
            }
        };
        let keyframes = match reader.read_outputs() {
            Some(ReadOutputs::Translations(translations)) => {
                Keyframes::Translation(translations.map(cgmath::Vector3::from).collect())
            }
            Some(ReadOutputs::Rotations(rotations)) => Keyframes::Rotation(
                rotations
                    .into_f32()
                    .map(|q| cgmath::Quaternion::new(q[3], q[0], q[1], q[2]))
                    .collect(),
            ),
            Some(ReadOutputs::Scales(scales)) => {
                Keyframes::Scale(scales.map(cgmath::Vector3::from).collect())
            }
            Some(ReadOutputs::MorphTargetWeights(_)) => Keyframes::Other,
            None => {
                log::warn!("No keyframes found in channel {}", channel.index());
                Keyframes::Other
            }
        };
        channels.push(AnimationChannel {
            target: channel.target().node().index(),
            keyframes,
            timestamps,
        });
    }
    AnimationClip {
        name: animation.name().unwrap_or("Default").to_string(),
        channels,
    }
}
