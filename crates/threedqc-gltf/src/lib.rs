//! threedqc glTF - Reference validator for glTF 2.0 and GLB assets
//!
//! Probes model structure with the `gltf` crate, measures textures with `image`, and
//! evaluates a baseline rule set. Rules it cannot evaluate are reported as not tested.

mod backend;
mod error;
mod export;
mod gltf_loader;
mod rules;
mod texture;

pub use backend::{recommended_schema, GltfValidator};
pub use error::GltfError;
pub use export::{to_csv, to_json};
pub use gltf_loader::{probe_glb, probe_gltf_files};
pub use rules::evaluate;
pub use texture::probe_dimensions;
