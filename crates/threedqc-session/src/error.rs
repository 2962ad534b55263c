use thiserror::Error;

use threedqc_core::DecodeError;

/// A resource load that did not produce a usable resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("no files supplied")]
    NoFiles,

    #[error("failed to parse '{name}': {message}")]
    Parse { name: String, message: String },

    #[error("'{name}' is missing required file '{missing}'")]
    MissingFile { name: String, missing: String },

    #[error("not loaded: {0}")]
    NotLoaded(String),

    #[error("load task aborted: {0}")]
    Aborted(String),
}

/// Failure reported by the validator outside of loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidatorError(pub String);

/// Report generation or projection failed; the previous view is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("report generation failed: {0}")]
    Generation(#[from] ValidatorError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("no report has been generated")]
    NoReport,

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl From<ValidatorError> for ExportError {
    fn from(err: ValidatorError) -> Self {
        ExportError::Serialization(err.0)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(LoadError::NoFiles.to_string(), "no files supplied");

        let parse = LoadError::Parse {
            name: "chair.glb".into(),
            message: "bad magic".into(),
        };
        assert!(parse.to_string().contains("chair.glb"));

        let render = RenderError::from(ValidatorError("boom".into()));
        assert!(render.to_string().contains("boom"));

        let export: ExportError = ValidatorError("csv".into()).into();
        assert!(matches!(export, ExportError::Serialization(_)));
    }
}
