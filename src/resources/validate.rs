//! Upload-time acceptance check for binary glTF files.
//!
//! Runs before an asset is stored or previewed: the file must be a `.glb`,
//! start with the glTF magic and describe at least a closed box worth of
//! geometry.

use anyhow::bail;

/// Smallest accepted geometry: a cube has 8 corners and 12 triangles.
pub const MIN_VERTICES: u64 = 8;
pub const MIN_TRIANGLES: u64 = 12;

const GLB_MAGIC: &[u8; 4] = b"glTF";

/// Geometry totals declared by an accepted asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlbSummary {
    pub vertex_count: u64,
    pub triangle_count: u64,
}

/// Accept or reject an uploaded file by name and content.
pub fn validate_glb(file_name: &str, bytes: &[u8]) -> anyhow::Result<GlbSummary> {
    let is_glb = std::path::Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("glb"));
    if !is_glb {
        bail!("Only .glb files are supported.");
    }
    if bytes.len() < GLB_MAGIC.len() || &bytes[..GLB_MAGIC.len()] != GLB_MAGIC {
        bail!("The uploaded file does not appear to be a valid GLB file.");
    }
    let Ok(gltf) = gltf::Gltf::from_slice(bytes) else {
        bail!("The uploaded file does not appear to be a valid GLB file.");
    };

    let mut summary = GlbSummary {
        vertex_count: 0,
        triangle_count: 0,
    };
    for mesh in gltf.meshes() {
        for primitive in mesh.primitives() {
            let vertices = primitive
                .get(&gltf::Semantic::Positions)
                .map(|accessor| accessor.count() as u64)
                .unwrap_or(0);
            let elements = primitive
                .indices()
                .map(|accessor| accessor.count() as u64)
                .unwrap_or(vertices);
            summary.vertex_count += vertices;
            summary.triangle_count += elements / 3;
        }
    }
    log::debug!(
        "{}: {} vertices, {} triangles",
        file_name,
        summary.vertex_count,
        summary.triangle_count
    );

    if summary.vertex_count < MIN_VERTICES || summary.triangle_count < MIN_TRIANGLES {
        bail!("GLB file must have some valid shape.");
    }
    Ok(summary)
}
