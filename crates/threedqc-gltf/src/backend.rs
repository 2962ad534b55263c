use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use threedqc_core::{
    Bounds, DimensionBounds, FileBlob, GutterWidths, LoadedModel, ProductInfo, Report,
    SchemaConfig,
};
use threedqc_session::{LoadError, ReportInput, Validator, ValidatorError};

use crate::error::GltfError;
use crate::{export, gltf_loader, rules};

const VERSION: &str = concat!("threedqc-gltf ", env!("CARGO_PKG_VERSION"));

/// Defaults for real-time commerce assets.
pub fn recommended_schema() -> SchemaConfig {
    let dimension = DimensionBounds {
        maximum: 100,
        minimum: 0,
        percent_tolerance: 3,
    };
    let mut schema = SchemaConfig {
        version: "1.0".to_string(),
        file_size_in_kb: Bounds::new(1, 5120),
        materials: Bounds::new(-1, 5),
        ..Default::default()
    };

    let model = &mut schema.model;
    model.object_count.nodes = Bounds::new(-1, -1);
    model.object_count.meshes = Bounds::new(-1, -1);
    model.object_count.primitives = Bounds::new(-1, -1);
    model.triangles = Bounds::new(-1, 100_000);
    model.require_clean_root_node_transform = true;
    model.require_manifold_edges = true;

    schema.product.dimensions.height = dimension;
    schema.product.dimensions.length = dimension;
    schema.product.dimensions.width = dimension;

    let textures = &mut schema.textures;
    textures.height = Bounds::new(512, 2048);
    textures.width = Bounds::new(512, 2048);
    textures.pbr_color_range = Bounds::new(30, 243);
    textures.require_dimensions_be_powers_of_two = true;

    let uvs = &mut schema.uvs;
    uvs.gutter_width = GutterWidths {
        resolution_256: 2,
        resolution_512: 4,
        resolution_1024: 8,
        resolution_2048: 16,
        resolution_4096: 32,
    };
    uvs.pixels_per_meter = Bounds::new(-1, -1);
    uvs.require_not_inverted = true;
    uvs.require_range_zero_to_one = true;
    schema
}

/// Validator backed by the `gltf` and `image` crates.
#[derive(Debug, Clone)]
pub struct GltfValidator {
    recommended: SchemaConfig,
}

impl GltfValidator {
    pub fn new() -> Self {
        Self::with_recommended(recommended_schema())
    }

    /// Use a different schema as the recommended default.
    pub fn with_recommended(recommended: SchemaConfig) -> Self {
        Self { recommended }
    }
}

impl Default for GltfValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_json<T: DeserializeOwned>(file: &FileBlob) -> Result<T, GltfError> {
    serde_json::from_slice(file.bytes()).map_err(|source| GltfError::Json {
        name: file.name().to_string(),
        source,
    })
}

/// Run CPU-bound probing off the async workers.
async fn probe<F>(name: String, work: F) -> Result<LoadedModel, LoadError>
where
    F: FnOnce() -> Result<LoadedModel, GltfError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(LoadError::from),
        Err(err) => Err(LoadError::Aborted(format!("probing '{}': {}", name, err))),
    }
}

#[async_trait]
impl Validator for GltfValidator {
    fn version(&self) -> &str {
        VERSION
    }

    fn recommended_schema(&self) -> SchemaConfig {
        self.recommended.clone()
    }

    async fn load_schema_file(&self, file: FileBlob) -> Result<SchemaConfig, LoadError> {
        let schema: SchemaConfig = parse_json(&file)?;
        debug!("Parsed schema '{}' version {}", file.name(), schema.version);
        Ok(schema)
    }

    async fn load_product_info(&self, file: FileBlob) -> Result<ProductInfo, LoadError> {
        Ok(parse_json(&file)?)
    }

    async fn load_glb(&self, file: FileBlob) -> Result<LoadedModel, LoadError> {
        info!("Probing '{}' ({} bytes)", file.name(), file.len());
        let name = file.name().to_string();
        probe(name, move || gltf_loader::probe_glb(&file)).await
    }

    async fn load_gltf_files(&self, files: Vec<FileBlob>) -> Result<LoadedModel, LoadError> {
        info!("Probing {} glTF files", files.len());
        let name = files
            .iter()
            .map(FileBlob::name)
            .collect::<Vec<_>>()
            .join(", ");
        probe(name, move || gltf_loader::probe_gltf_files(files)).await
    }

    fn generate_report(&self, input: ReportInput<'_>) -> Result<Report, ValidatorError> {
        Ok(Report {
            items: rules::evaluate(input.model, input.schema, input.product_info),
        })
    }

    fn report_json(&self, report: &Report) -> Result<String, ValidatorError> {
        export::to_json(report).map_err(|e| ValidatorError(e.to_string()))
    }

    fn report_csv(&self, report: &Report) -> Result<String, ValidatorError> {
        Ok(export::to_csv(report))
    }
}
