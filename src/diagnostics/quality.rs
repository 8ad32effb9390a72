/// How a metric value rates for real-time preview.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QualityTier {
    Good,
    Warning,
    Bad,
    Neutral,
}

/// A named metric together with its value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Metric {
    FaceCount(u64),
    TriangleDensity(f64),
    MeshCount(u64),
    MaterialCount(u64),
    HasTextures(bool),
    PbrTextureCount(u64),
    BoundingBoxVolume(f64),
    HasAnimations(bool),
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::FaceCount(_) => "faceCount",
            Metric::TriangleDensity(_) => "triangleDensity",
            Metric::MeshCount(_) => "meshCount",
            Metric::MaterialCount(_) => "materialCount",
            Metric::HasTextures(_) => "hasTextures",
            Metric::PbrTextureCount(_) => "PBRTextureCount",
            Metric::BoundingBoxVolume(_) => "boundingBox",
            Metric::HasAnimations(_) => "hasAnimations",
        }
    }
}

const FACE_COUNT_GOOD: u64 = 5_000;
const FACE_COUNT_WARNING: u64 = 100_000;
const DENSITY_GOOD: f64 = 500.0;
const DENSITY_WARNING: f64 = 1_000.0;
const VOLUME_GOOD: f64 = 0.01;
const VOLUME_WARNING: f64 = 0.001;

/// Rate a single metric. Upper bounds of the good and warning bands are
/// inclusive, so 5000 faces is still good and 1000 triangles/m³ a warning.
pub fn classify(metric: Metric) -> QualityTier {
    use QualityTier::*;
    match metric {
        // an asset without faces has nothing to preview
        Metric::FaceCount(0) => Bad,
        Metric::FaceCount(faces) if faces <= FACE_COUNT_GOOD => Good,
        Metric::FaceCount(faces) if faces <= FACE_COUNT_WARNING => Warning,
        Metric::FaceCount(_) => Bad,

        Metric::TriangleDensity(density) if density > 0.0 && density <= DENSITY_GOOD => Good,
        Metric::TriangleDensity(density) if density > 0.0 && density <= DENSITY_WARNING => {
            Warning
        }
        Metric::TriangleDensity(_) => Bad,

        Metric::MeshCount(count) | Metric::MaterialCount(count) => {
            if count >= 1 {
                Good
            } else {
                Bad
            }
        }

        Metric::HasTextures(true) => Good,
        Metric::HasTextures(false) => Warning,

        Metric::PbrTextureCount(count) if count > 0 => Good,
        Metric::PbrTextureCount(_) => Warning,

        Metric::BoundingBoxVolume(volume) if volume > VOLUME_GOOD => Good,
        Metric::BoundingBoxVolume(volume) if volume > VOLUME_WARNING => Warning,
        Metric::BoundingBoxVolume(_) => Bad,

        Metric::HasAnimations(true) => Good,
        Metric::HasAnimations(false) => Neutral,
    }
}
