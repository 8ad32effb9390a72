//! Engine data structures: scene graph, materials, bounds, transforms and GPU formats.
//!
//! - `scene_graph` holds the hierarchical CPU-side scene of a loaded asset
//! - `material` contains shared materials and their named texture slots
//! - `bounds` is the axis-aligned bounding volume query over a scene
//! - `instance` holds per-node transformation data and its GPU layout
//! - `model` defines vertex formats and uploaded mesh buffers
//! - `texture` wraps the renderer's depth texture

pub mod bounds;
pub mod instance;
pub mod material;
pub mod model;
pub mod scene_graph;
pub mod texture;
