#![allow(dead_code)]

use std::sync::Arc;

use model_preview::data_structures::{
    material::{Material, Materials},
    scene_graph::{ContainerNode, Geometry, MeshData, MeshNode, SceneNode},
};

/// Corners of an axis-aligned cube of edge `size` centred on the origin.
pub fn cube_positions(size: f32) -> Vec<[f32; 3]> {
    let h = size / 2.0;
    vec![
        [-h, -h, -h],
        [h, -h, -h],
        [h, h, -h],
        [-h, h, -h],
        [-h, -h, h],
        [h, -h, h],
        [h, h, h],
        [-h, h, h],
    ]
}

/// Twelve triangles over the corners of [`cube_positions`].
pub const CUBE_INDICES: [u32; 36] = [
    0, 2, 1, 0, 3, 2, // back
    4, 5, 6, 4, 6, 7, // front
    0, 1, 5, 0, 5, 4, // bottom
    3, 7, 6, 3, 6, 2, // top
    0, 4, 7, 0, 7, 3, // left
    1, 2, 6, 1, 6, 5, // right
];

pub fn cube_geometry(size: f32) -> Geometry {
    Geometry::indexed(cube_positions(size), CUBE_INDICES.to_vec())
}

pub fn mesh(id: u32, geometry: Geometry, material: Arc<Material>) -> MeshData {
    MeshData {
        id,
        name: format!("mesh_{}", id),
        geometry,
        materials: Materials::Single(material),
    }
}

pub fn mesh_node(id: u32, geometry: Geometry, material: Arc<Material>) -> Box<dyn SceneNode> {
    Box::new(MeshNode::new(mesh(id, geometry, material)))
}

/// A root container holding `children`.
pub fn scene(children: Vec<Box<dyn SceneNode>>) -> Box<dyn SceneNode> {
    let mut root = ContainerNode::new("Scene");
    for child in children {
        root.add_child(child);
    }
    Box::new(root)
}

/// A scene with one cube of edge `size` and a plain material.
pub fn cube_scene(size: f32) -> Box<dyn SceneNode> {
    scene(vec![mesh_node(
        0,
        cube_geometry(size),
        Arc::new(Material::new("plain")),
    )])
}

fn padded(mut data: Vec<u8>, pad: u8) -> Vec<u8> {
    while data.len() % 4 != 0 {
        data.push(pad);
    }
    data
}

/// Assemble a binary glTF container from a JSON document and a BIN chunk.
pub fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let json = padded(json.as_bytes().to_vec(), b' ');
    let bin = padded(bin.to_vec(), 0);
    let total = 12 + 8 + json.len() + if bin.is_empty() { 0 } else { 8 + bin.len() };

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    if !bin.is_empty() {
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin);
    }
    out
}

fn position_bytes(positions: &[[f32; 3]]) -> Vec<u8> {
    positions
        .iter()
        .flat_map(|p| p.iter().flat_map(|c| c.to_le_bytes()))
        .collect()
}

/// A cube mesh drawn by two nodes (the second moved 3 units along x) that
/// share one material. The material uses a base colour texture and a
/// metallic-roughness texture.
pub fn textured_cube_glb() -> Vec<u8> {
    cube_glb(
        r#"{
    "name": "painted",
    "pbrMetallicRoughness": {
      "baseColorTexture": {"index": 0},
      "metallicRoughnessTexture": {"index": 1}
    }
  }"#,
        2,
    )
}

/// The two-node cube with a lacquered material: clearcoat and clearcoat
/// roughness share texture 0, clearcoat normal is texture 1 and the sheen
/// colour is texture 2.
pub fn lacquered_cube_glb() -> Vec<u8> {
    cube_glb(
        r#"{
    "name": "lacquer",
    "extensions": {
      "KHR_materials_clearcoat": {
        "clearcoatFactor": 1.0,
        "clearcoatTexture": {"index": 0},
        "clearcoatRoughnessTexture": {"index": 0},
        "clearcoatNormalTexture": {"index": 1}
      },
      "KHR_materials_sheen": {
        "sheenColorTexture": {"index": 2}
      }
    }
  }"#,
        3,
    )
}

fn cube_glb(material: &str, texture_count: usize) -> Vec<u8> {
    let mut bin = position_bytes(&cube_positions(2.0));
    for index in CUBE_INDICES {
        bin.extend_from_slice(&(index as u16).to_le_bytes());
    }
    let textures: Vec<String> = (0..texture_count)
        .map(|i| format!(r#"{{"source": {}}}"#, i))
        .collect();
    let images: Vec<String> = (0..texture_count)
        .map(|i| format!(r#"{{"uri": "texture_{}.png"}}"#, i))
        .collect();
    let json = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "extensionsUsed": ["KHR_materials_clearcoat", "KHR_materials_sheen"],
  "scene": 0,
  "scenes": [{{"nodes": [0, 1]}}],
  "nodes": [
    {{"name": "left", "mesh": 0}},
    {{"name": "right", "mesh": 0, "translation": [3.0, 0.0, 0.0]}}
  ],
  "meshes": [{{"name": "cube", "primitives": [{{"attributes": {{"POSITION": 0}}, "indices": 1, "material": 0}}]}}],
  "materials": [{material}],
  "textures": [{textures}],
  "images": [{images}],
  "buffers": [{{"byteLength": {total}}}],
  "bufferViews": [
    {{"buffer": 0, "byteOffset": 0, "byteLength": 96, "target": 34962}},
    {{"buffer": 0, "byteOffset": 96, "byteLength": 72, "target": 34963}}
  ],
  "accessors": [
    {{"bufferView": 0, "componentType": 5126, "count": 8, "type": "VEC3", "min": [-1.0, -1.0, -1.0], "max": [1.0, 1.0, 1.0]}},
    {{"bufferView": 1, "componentType": 5123, "count": 36, "type": "SCALAR"}}
  ]
}}"#,
        textures = textures.join(", "),
        images = images.join(", "),
        total = bin.len()
    );
    glb(&json, &bin)
}

/// A single non-indexed triangle without a material.
pub fn triangle_glb() -> Vec<u8> {
    let bin = position_bytes(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    let json = format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "scenes": [{{"nodes": [0]}}],
  "nodes": [{{"mesh": 0}}],
  "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}}}]}}],
  "buffers": [{{"byteLength": {total}}}],
  "bufferViews": [{{"buffer": 0, "byteLength": {total}}}],
  "accessors": [
    {{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}}
  ]
}}"#,
        total = bin.len()
    );
    glb(&json, &bin)
}

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}
