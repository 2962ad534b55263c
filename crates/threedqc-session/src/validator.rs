use async_trait::async_trait;

use threedqc_core::{FileBlob, LoadedModel, ProductInfo, Report, SchemaConfig};

use crate::error::{LoadError, ValidatorError};

/// Everything report generation reads.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub model: &'a LoadedModel,
    pub schema: &'a SchemaConfig,
    /// Present only when the product info slot is loaded.
    pub product_info: Option<&'a ProductInfo>,
}

/// The validation engine a session delegates to.
///
/// Loads take `&self` and return owned data, so a session can keep several in flight and
/// decide itself when their results become current.
#[async_trait]
pub trait Validator: Send + Sync + 'static {
    /// Version string shown to the user.
    fn version(&self) -> &str;

    /// Recommended default schema.
    fn recommended_schema(&self) -> SchemaConfig;

    async fn load_schema_file(&self, file: FileBlob) -> Result<SchemaConfig, LoadError>;

    async fn load_product_info(&self, file: FileBlob) -> Result<ProductInfo, LoadError>;

    /// Load a single self-contained binary model.
    async fn load_glb(&self, file: FileBlob) -> Result<LoadedModel, LoadError>;

    /// Load a model split across a JSON descriptor and sibling files.
    async fn load_gltf_files(&self, files: Vec<FileBlob>) -> Result<LoadedModel, LoadError>;

    /// Run every rule. Must return identical output for identical input.
    fn generate_report(&self, input: ReportInput<'_>) -> Result<Report, ValidatorError>;

    fn report_json(&self, report: &Report) -> Result<String, ValidatorError>;

    fn report_csv(&self, report: &Report) -> Result<String, ValidatorError>;
}
