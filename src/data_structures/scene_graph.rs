//! Scene graph and hierarchical scene organization.
//!
//! A loaded asset becomes a tree of [`SceneNode`]s: containers that only
//! carry a transform and children, and mesh nodes that additionally own
//! geometry and reference shared materials. The tree is CPU-side; the
//! renderer uploads mesh buffers from it and re-reads world transforms every
//! frame so animated nodes move.

use cgmath::SquareMatrix;

use crate::data_structures::{instance::Instance, material::Materials};

/// Vertex data of a mesh. `indices` is `None` for non-indexed geometry.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Option<Vec<u32>>,
}

impl Geometry {
    pub fn indexed(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals: Vec::new(),
            indices: Some(indices),
        }
    }

    pub fn non_indexed(positions: Vec<[f32; 3]>) -> Self {
        Self {
            positions,
            normals: Vec::new(),
            indices: None,
        }
    }

    /// Triangles described by this geometry. Fractional when the element count
    /// is not a multiple of three; callers floor the accumulated total.
    pub fn triangle_count(&self) -> f64 {
        match &self.indices {
            Some(indices) => indices.len() as f64 / 3.0,
            None => self.positions.len() as f64 / 3.0,
        }
    }
}

/// Everything a renderable mesh node carries besides its transform.
#[derive(Clone, Debug)]
pub struct MeshData {
    /// Unique per loaded scene; keys the renderer's GPU buffers.
    pub id: u32,
    pub name: String,
    pub geometry: Geometry,
    pub materials: Materials,
}

pub trait SceneNode {
    fn get_local_transform(&self) -> &Instance;

    fn set_local_transform(&mut self, instance: Instance);

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.get_children_mut().push(child);
    }

    /// `Some` for renderable mesh nodes.
    fn as_mesh(&self) -> Option<&MeshData> {
        None
    }

    /// Index of the node in the source asset, used to bind animation channels.
    fn source_index(&self) -> Option<usize> {
        None
    }
}

/// Visit `root` and every descendant once, depth first, together with the
/// node's world matrix.
pub fn traverse(
    root: &dyn SceneNode,
    visit: &mut dyn FnMut(&dyn SceneNode, &cgmath::Matrix4<f32>),
) {
    walk(root, &cgmath::Matrix4::identity(), visit);
}

fn walk(
    node: &dyn SceneNode,
    parent: &cgmath::Matrix4<f32>,
    visit: &mut dyn FnMut(&dyn SceneNode, &cgmath::Matrix4<f32>),
) {
    let world = *parent * node.get_local_transform().to_matrix();
    visit(node, &world);
    for child in node.get_children() {
        walk(child.as_ref(), &world, visit);
    }
}

/// Mutable depth-first visit of `root` and all descendants.
pub fn traverse_mut(root: &mut dyn SceneNode, visit: &mut dyn FnMut(&mut dyn SceneNode)) {
    visit(&mut *root);
    for child in root.get_children_mut() {
        traverse_mut(child.as_mut(), visit);
    }
}

pub struct ContainerNode {
    pub name: String,
    pub transform: Instance,
    pub children: Vec<Box<dyn SceneNode>>,
    source_index: Option<usize>,
}

impl ContainerNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Instance::new(),
            children: Vec::new(),
            source_index: None,
        }
    }

    pub fn with_source_index(mut self, index: usize) -> Self {
        self.source_index = Some(index);
        self
    }
}

impl SceneNode for ContainerNode {
    fn get_local_transform(&self) -> &Instance {
        &self.transform
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.transform = instance;
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn source_index(&self) -> Option<usize> {
        self.source_index
    }
}

pub struct MeshNode {
    pub transform: Instance,
    pub children: Vec<Box<dyn SceneNode>>,
    pub mesh: MeshData,
    source_index: Option<usize>,
}

impl MeshNode {
    pub fn new(mesh: MeshData) -> Self {
        Self {
            transform: Instance::new(),
            children: Vec::new(),
            mesh,
            source_index: None,
        }
    }

    pub fn with_source_index(mut self, index: usize) -> Self {
        self.source_index = Some(index);
        self
    }
}

impl SceneNode for MeshNode {
    fn get_local_transform(&self) -> &Instance {
        &self.transform
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.transform = instance;
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn as_mesh(&self) -> Option<&MeshData> {
        Some(&self.mesh)
    }

    fn source_index(&self) -> Option<usize> {
        self.source_index
    }
}
