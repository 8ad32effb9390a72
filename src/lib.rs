//! model-preview
//!
//! A cross-platform viewer for a single glTF model, native and in the browser.
//! It loads a model, frames the camera around it, renders it with orbit
//! controls and reports quality diagnostics (face count, triangle density,
//! materials, textures, animations) rated good, warning or bad.
//!
//! High-level modules
//! - `camera`: camera, projection, orbit controller and camera uniforms
//! - `context`: GPU and window context that owns device/queue/pipelines
//! - `data_structures`: scene graph, meshes, materials, bounds
//! - `diagnostics`: metric collection, quality classification and reporting
//! - `flow`: the winit application tying loading and rendering together
//! - `frame_loop`: the per-frame cycle of a pane
//! - `framing`: camera placement from a model's bounds
//! - `overlay`: grid, axes, labels and compass shown in fullscreen
//! - `pipelines`: mesh and line render pipelines
//! - `resources`: fetching, parsing and validating glTF binaries
//! - `render`: drawing a scene graph
//! - `viewport`: pane/screen size reconciliation
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod diagnostics;
pub mod flow;
pub mod frame_loop;
pub mod framing;
pub mod options;
pub mod overlay;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod viewport;

// Re-exports commonly used types for convenience in downstream code.
pub use diagnostics::metrics::MetricsSnapshot;
pub use diagnostics::quality::QualityTier;
pub use flow::run;
pub use options::PreviewOptions;
pub use resources::{LoadEvent, LoadedModel};
