use threedqc_session::LoadError;

/// Errors that can occur while probing glTF assets.
#[derive(Debug, thiserror::Error)]
pub enum GltfError {
    #[error("failed to parse glTF '{name}': {message}")]
    Parse { name: String, message: String },

    #[error("no .gltf descriptor among {0} submitted files")]
    NoDescriptor(usize),

    #[error("failed to read image '{name}': {message}")]
    Image { name: String, message: String },

    #[error("invalid JSON in '{name}': {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<GltfError> for LoadError {
    fn from(err: GltfError) -> Self {
        match err {
            GltfError::NoDescriptor(_) => LoadError::MissingFile {
                name: "model".to_string(),
                missing: "*.gltf".to_string(),
            },
            GltfError::Parse { ref name, .. } | GltfError::Image { ref name, .. } => {
                LoadError::Parse {
                    name: name.clone(),
                    message: err.to_string(),
                }
            }
            GltfError::Json { name, source } => LoadError::Parse {
                name,
                message: source.to_string(),
            },
        }
    }
}
