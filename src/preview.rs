use tracing::info;

use threedqc_core::{PreviewSetup, PreviewSink, PreviewSource};

/// Stands in for a 3D viewport: reports the framing it would use.
#[derive(Debug, Default)]
pub struct LogPreview;

impl PreviewSink for LogPreview {
    fn present(&mut self, setup: &PreviewSetup) {
        let framing = &setup.framing;
        let source = match &setup.source {
            PreviewSource::Binary(bytes) => format!("binary asset, {} bytes", bytes.len()),
            PreviewSource::Files { descriptor, files } => {
                format!("{} with {} files", descriptor, files.len())
            }
        };
        info!(
            radius = framing.radius,
            near = framing.near,
            far = framing.far,
            target = ?framing.target,
            eye = ?framing.eye(),
            "Preview ready: {}",
            source
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use threedqc_core::{Dimensions, LoadedModel};

    use super::*;

    #[test]
    fn presents_binary_models() {
        let model = LoadedModel {
            dimensions: Dimensions::new(1.0, 1.0, 1.0),
            binary: Some(Arc::from(vec![0u8; 4])),
            ..Default::default()
        };
        let setup = PreviewSetup::for_model(&model).unwrap();
        assert!(matches!(setup.source, PreviewSource::Binary(ref bytes) if bytes.len() == 4));
        LogPreview.present(&setup);
    }
}
