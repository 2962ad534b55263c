use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio::sync::oneshot;
use tracing::info;

use threedqc_core::{FileBlob, LoadState, PreviewSink, ResourceKind};
use threedqc_gltf::GltfValidator;
use threedqc_session::{
    Dispatcher, ExportArtifact, ExportError, ExportFormat, Session, UiEvent,
};

use crate::cli::{CheckArgs, SchemaArgs, SchemaInput};
use crate::output::Summary;
use crate::preview::LogPreview;
use crate::settings::AppSettings;

/// Result of `check`: what was printed and which files were written.
#[derive(Debug)]
pub struct CheckOutcome {
    pub summary: Summary,
    pub written: Vec<PathBuf>,
}

pub async fn read_blob(path: &Path) -> Result<FileBlob> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Not a file path: {}", path.display()))?
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(FileBlob::new(name, bytes))
}

async fn write_artifact(dir: &Path, artifact: &ExportArtifact) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(&artifact.filename);
    tokio::fs::write(&path, &artifact.contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(path)
}

/// A session on the recommended schema, with the requested schema file and edits applied.
pub async fn prepare_session(input: &SchemaInput) -> Result<Session<GltfValidator>> {
    let mut session = Session::new(GltfValidator::new());
    session.use_recommended_schema();

    if let Some(path) = &input.schema {
        let file = read_blob(path).await?;
        if session.load_schema(file).await == LoadState::Failed {
            let reason = session
                .slot(ResourceKind::Schema)
                .error_message()
                .unwrap_or("unknown error")
                .to_string();
            bail!("Schema {} could not be loaded: {}", path.display(), reason);
        }
    }

    if !input.assignments.is_empty() {
        for (key, value) in &input.assignments {
            session
                .edit_field(key, value)
                .with_context(|| format!("Cannot set {key}"))?;
        }
        session
            .save_schema()
            .context("Schema overrides are not valid")?;
    }
    Ok(session)
}

pub async fn check(args: CheckArgs, settings: &AppSettings) -> Result<CheckOutcome> {
    let session = prepare_session(&args.schema).await?;

    let mut files = Vec::with_capacity(args.model.len());
    for path in &args.model {
        files.push(read_blob(path).await?);
    }
    let product_info = match &args.product_info {
        Some(path) => Some(read_blob(path).await?),
        None => None,
    };

    // Model and product info load side by side.
    let mut dispatcher = Dispatcher::new(session);
    dispatcher.handle(UiEvent::ModelFiles(files));
    if let Some(file) = product_info {
        dispatcher.handle(UiEvent::ProductInfoFile(file));
    }
    dispatcher.drain().await;

    let formats = if args.no_export {
        Vec::new()
    } else if args.formats.is_empty() {
        settings.output.formats.clone()
    } else {
        args.formats.clone()
    };
    let out_dir = args
        .out
        .clone()
        .unwrap_or_else(|| settings.output.directory.clone());

    let mut written = Vec::new();
    for format in formats {
        let (reply, answer) = oneshot::channel();
        dispatcher.handle(UiEvent::Export {
            format: ExportFormat::from(format),
            reply,
        });
        match answer.await.context("Export request was dropped")? {
            Ok(artifact) => written.push(write_artifact(&out_dir, &artifact).await?),
            Err(ExportError::NoReport) => {
                info!("No report to export");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    let session = dispatcher.into_session();
    if settings.preview.enabled {
        if let Some(setup) = session.preview() {
            LogPreview.present(setup);
        }
    }

    Ok(CheckOutcome {
        summary: Summary::from_session(&session),
        written,
    })
}

/// Write the effective schema document and return its path.
pub async fn schema(args: SchemaArgs, settings: &AppSettings) -> Result<PathBuf> {
    let session = prepare_session(&args.schema).await?;
    let artifact = session.export_schema()?;
    let dir = args.out.unwrap_or_else(|| settings.output.directory.clone());
    write_artifact(&dir, &artifact).await
}
