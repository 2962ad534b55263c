#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use threedqc_core::{
    Bounds, Dimensions, FileBlob, IssueMessage, LoadedModel, ProductInfo, Report, ReportItem,
    SchemaConfig, Severity, StructuralReport, STRUCTURAL_RULE_NAME,
};
use threedqc_session::{LoadError, ReportInput, Validator, ValidatorError};

/// Validator with behavior scripted by file name.
///
/// `broken*` fails to parse, `panic*` panics inside the load, `invalid*` contains a structural
/// error. Everything else loads.
pub struct ScriptedValidator {
    pub recommended: SchemaConfig,
    pub fail_reports: bool,
}

impl Default for ScriptedValidator {
    fn default() -> Self {
        Self {
            recommended: recommended(),
            fail_reports: false,
        }
    }
}

pub fn recommended() -> SchemaConfig {
    let mut cfg = SchemaConfig {
        version: "1.0.0".to_string(),
        file_size_in_kb: Bounds::new(-1, 5),
        materials: Bounds::new(-1, -1),
        ..Default::default()
    };
    cfg.model.triangles = Bounds::new(-1, 1000);
    cfg
}

pub fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

pub fn glb(name: &str, size: usize) -> FileBlob {
    FileBlob::new(name, vec![7u8; size])
}

pub fn json_file(name: &str, json: &str) -> FileBlob {
    FileBlob::new(name, json.as_bytes().to_vec())
}

pub fn schema_file(cfg: &SchemaConfig) -> FileBlob {
    json_file("schema.json", &serde_json::to_string(cfg).unwrap())
}

fn model_issues(name: &str) -> StructuralReport {
    let mut issues = StructuralReport::default();
    issues.push(IssueMessage::new("UNUSED_OBJECT", Severity::Info, "Unused object.", "/meshes/0"));
    if name.starts_with("invalid") {
        issues.push(IssueMessage::new(
            "ACCESSOR_TOTAL_OFFSET_ALIGNMENT",
            Severity::Error,
            "Misaligned.",
            "/accessors/2",
        ));
    }
    issues
}

fn check(name: &str) -> Result<(), LoadError> {
    if name.starts_with("broken") {
        return Err(LoadError::Parse {
            name: name.to_string(),
            message: "unexpected end of file".to_string(),
        });
    }
    if name.starts_with("panic") {
        panic!("validator crashed on {name}");
    }
    Ok(())
}

#[async_trait]
impl Validator for ScriptedValidator {
    fn version(&self) -> &str {
        "scripted-1.0"
    }

    fn recommended_schema(&self) -> SchemaConfig {
        self.recommended.clone()
    }

    async fn load_schema_file(&self, file: FileBlob) -> Result<SchemaConfig, LoadError> {
        serde_json::from_slice(file.bytes()).map_err(|e| LoadError::Parse {
            name: file.name().to_string(),
            message: e.to_string(),
        })
    }

    async fn load_product_info(&self, file: FileBlob) -> Result<ProductInfo, LoadError> {
        serde_json::from_slice(file.bytes()).map_err(|e| LoadError::Parse {
            name: file.name().to_string(),
            message: e.to_string(),
        })
    }

    async fn load_glb(&self, file: FileBlob) -> Result<LoadedModel, LoadError> {
        check(file.name())?;
        tokio::task::yield_now().await;
        Ok(LoadedModel {
            filename: file.name().to_string(),
            file_size_bytes: file.len() as u64,
            dimensions: Dimensions::new(1.0, 2.0, 3.0),
            issues: model_issues(file.name()),
            binary: Some(file.shared_bytes()),
            ..Default::default()
        })
    }

    async fn load_gltf_files(&self, files: Vec<FileBlob>) -> Result<LoadedModel, LoadError> {
        let descriptor = files
            .iter()
            .find(|f| f.extension().as_deref() == Some("gltf"))
            .ok_or_else(|| LoadError::MissingFile {
                name: "model".to_string(),
                missing: "*.gltf".to_string(),
            })?;
        check(descriptor.name())?;
        tokio::task::yield_now().await;
        Ok(LoadedModel {
            filename: descriptor.name().to_string(),
            file_size_bytes: files.iter().map(|f| f.len() as u64).sum(),
            dimensions: Dimensions::new(0.5, 0.5, 0.5),
            issues: model_issues(descriptor.name()),
            files: files.clone(),
            ..Default::default()
        })
    }

    fn generate_report(&self, input: ReportInput<'_>) -> Result<Report, ValidatorError> {
        if self.fail_reports {
            return Err(ValidatorError("rule engine unavailable".to_string()));
        }
        let size_kb = input.model.file_size_bytes as f64 / 1024.0;
        let size = input.schema.file_size_in_kb;
        let mut items = vec![
            ReportItem {
                name: STRUCTURAL_RULE_NAME.to_string(),
                tested: true,
                pass: !input.model.issues.has_errors(),
                message: format!("{} messages", input.model.issues.messages.len()),
                component_message: String::new(),
                guidelines_url: "https://example.com/gltf".to_string(),
            },
            ReportItem {
                name: "File Size".to_string(),
                tested: size.is_tested(),
                pass: size.admits(size_kb),
                message: format!("{:.1}kb", size_kb),
                component_message: String::new(),
                guidelines_url: "https://example.com/size".to_string(),
            },
            ReportItem {
                name: "Beveled Edges".to_string(),
                tested: false,
                pass: false,
                message: "Not tested".to_string(),
                component_message: String::new(),
                guidelines_url: String::new(),
            },
        ];
        if let Some(info) = input.product_info {
            items.push(ReportItem {
                name: "Product Dimensions".to_string(),
                tested: info.dimensions.is_some(),
                pass: info.dimensions == Some(input.model.dimensions),
                message: String::new(),
                component_message: String::new(),
                guidelines_url: String::new(),
            });
        }
        Ok(Report { items })
    }

    fn report_json(&self, report: &Report) -> Result<String, ValidatorError> {
        serde_json::to_string_pretty(report).map_err(|e| ValidatorError(e.to_string()))
    }

    fn report_csv(&self, report: &Report) -> Result<String, ValidatorError> {
        let mut csv = String::from("name,tested,pass,message\n");
        for item in report.items() {
            csv.push_str(&format!(
                "{},{},{},{}\n",
                item.name, item.tested, item.pass, item.message
            ));
        }
        Ok(csv)
    }
}
