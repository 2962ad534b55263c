//! threedqc Core - Shared types for the 3D asset quality check orchestrator
//!
//! This crate provides the foundational pieces used by the session and the validators:
//! - Validation schema configuration and its flat form representation
//! - Resource load slots for the model, product info and schema inputs
//! - Report items, severity lookup and row classification
//! - Export file naming and camera framing for the model preview

pub mod asset;
pub mod form;
pub mod naming;
pub mod preview;
pub mod report;
pub mod resource;
pub mod schema;

pub use asset::{Dimensions, FileBlob, LoadedModel, ModelStats, ProductInfo, TextureInfo};
pub use form::{DecodeError, FormError, FormField, SchemaForm};
pub use naming::{name_for, Clock, FixedClock, SystemClock, EXPORT_MARKER, SCHEMA_EXPORT_NAME};
pub use preview::{CameraFraming, PreviewSetup, PreviewSink, PreviewSource};
pub use report::{
    IssueMessage, Report, ReportItem, RowStatus, Severity, StructuralReport, STRUCTURAL_RULE_NAME,
};
pub use resource::{Indicator, LoadState, ResourceKind, ResourceSlot};
pub use schema::{
    Bounds, DimensionBounds, GutterWidths, ModelRules, ObjectCounts, ProductDimensions,
    ProductRules, SchemaConfig, TextureRules, UvRules,
};
