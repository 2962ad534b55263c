//! Input files and the data validators extract from them

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::report::StructuralReport;

/// A user-supplied file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    name: String,
    bytes: Arc<[u8]>,
}

impl FileBlob {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// File name without any directory part.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the contents.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lower-cased extension, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// Bounding dimensions of a model or product, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub height: f64,
    pub length: f64,
    pub width: f64,
}

impl Dimensions {
    pub fn new(height: f64, length: f64, width: f64) -> Self {
        Self {
            height,
            length,
            width,
        }
    }

    pub fn sum(&self) -> f64 {
        self.height + self.length + self.width
    }

    pub fn min(&self) -> f64 {
        self.height.min(self.length).min(self.width)
    }

    pub fn max(&self) -> f64 {
        self.height.max(self.length).max(self.width)
    }
}

/// Object counts gathered while loading a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStats {
    pub nodes: u64,
    pub meshes: u64,
    pub primitives: u64,
    pub materials: u64,
    pub triangles: u64,
}

/// Size of one texture image referenced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

/// A model as loaded by a validator.
#[derive(Debug, Clone, Default)]
pub struct LoadedModel {
    /// Name of the primary file (the `.glb`, or the `.gltf` descriptor).
    pub filename: String,
    /// Total size of all submitted files.
    pub file_size_bytes: u64,
    pub dimensions: Dimensions,
    pub stats: ModelStats,
    pub textures: Vec<TextureInfo>,
    /// Whether every root node has an identity transform.
    pub clean_root_transforms: bool,
    /// Structural validation messages.
    pub issues: StructuralReport,
    /// Raw contents, present only for single-file binary loads.
    pub binary: Option<Arc<[u8]>>,
    /// Every submitted file, for multi-file loads.
    pub files: Vec<FileBlob>,
}

/// Product metadata supplied alongside a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
}
