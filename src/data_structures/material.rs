//! Materials and their named texture slots.
//!
//! Materials and textures are shared between meshes through [`Arc`]; two
//! meshes use "the same" material exactly when they hold the same allocation.
//! Diagnostics rely on that identity to deduplicate.

use std::{collections::HashMap, sync::Arc};

/// The fifteen texture slots a material may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Metalness,
    Roughness,
    Normal,
    AmbientOcclusion,
    Emissive,
    Clearcoat,
    ClearcoatRoughness,
    ClearcoatNormal,
    BaseColor,
    Bump,
    Displacement,
    Alpha,
    Environment,
    SheenColor,
    Specular,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 15] = [
        TextureSlot::Metalness,
        TextureSlot::Roughness,
        TextureSlot::Normal,
        TextureSlot::AmbientOcclusion,
        TextureSlot::Emissive,
        TextureSlot::Clearcoat,
        TextureSlot::ClearcoatRoughness,
        TextureSlot::ClearcoatNormal,
        TextureSlot::BaseColor,
        TextureSlot::Bump,
        TextureSlot::Displacement,
        TextureSlot::Alpha,
        TextureSlot::Environment,
        TextureSlot::SheenColor,
        TextureSlot::Specular,
    ];

    /// Whether textures in this slot count as physically-based-rendering maps.
    pub fn is_pbr(self) -> bool {
        matches!(
            self,
            TextureSlot::Metalness
                | TextureSlot::Roughness
                | TextureSlot::Normal
                | TextureSlot::AmbientOcclusion
                | TextureSlot::Emissive
                | TextureSlot::Clearcoat
                | TextureSlot::ClearcoatRoughness
                | TextureSlot::ClearcoatNormal
        )
    }

    /// Conventional slot name, as used by web material models.
    pub fn name(self) -> &'static str {
        match self {
            TextureSlot::Metalness => "metalnessMap",
            TextureSlot::Roughness => "roughnessMap",
            TextureSlot::Normal => "normalMap",
            TextureSlot::AmbientOcclusion => "aoMap",
            TextureSlot::Emissive => "emissiveMap",
            TextureSlot::Clearcoat => "clearcoatMap",
            TextureSlot::ClearcoatRoughness => "clearcoatRoughnessMap",
            TextureSlot::ClearcoatNormal => "clearcoatNormalMap",
            TextureSlot::BaseColor => "map",
            TextureSlot::Bump => "bumpMap",
            TextureSlot::Displacement => "displacementMap",
            TextureSlot::Alpha => "alphaMap",
            TextureSlot::Environment => "envMap",
            TextureSlot::SheenColor => "sheenColorMap",
            TextureSlot::Specular => "specularMap",
        }
    }
}

/// A texture referenced by a material. Only its identity and provenance matter
/// to the preview; pixels stay in the asset.
#[derive(Debug)]
pub struct TextureRef {
    pub name: String,
    pub source_index: Option<usize>,
}

impl TextureRef {
    pub fn new(name: impl Into<String>, source_index: Option<usize>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            source_index,
        })
    }
}

#[derive(Debug, Default)]
pub struct Material {
    pub name: String,
    slots: HashMap<TextureSlot, Arc<TextureRef>>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: HashMap::new(),
        }
    }

    pub fn with_texture(mut self, slot: TextureSlot, texture: Arc<TextureRef>) -> Self {
        self.slots.insert(slot, texture);
        self
    }

    pub fn set_texture(&mut self, slot: TextureSlot, texture: Arc<TextureRef>) {
        self.slots.insert(slot, texture);
    }

    pub fn texture(&self, slot: TextureSlot) -> Option<&Arc<TextureRef>> {
        self.slots.get(&slot)
    }
}

/// The material(s) assigned to a mesh: a single value or a list (multi-material meshes).
#[derive(Clone, Debug)]
pub enum Materials {
    Single(Arc<Material>),
    List(Vec<Arc<Material>>),
}

impl Materials {
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Material>> {
        let slice: &[Arc<Material>] = match self {
            Materials::Single(material) => std::slice::from_ref(material),
            Materials::List(materials) => materials,
        };
        slice.iter()
    }
}

impl From<Arc<Material>> for Materials {
    fn from(material: Arc<Material>) -> Self {
        Materials::Single(material)
    }
}
