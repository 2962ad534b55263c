//! Default camera framing for previewing a loaded model
//!
//! Only the framing is computed here; drawing is left to whatever engine implements
//! [`PreviewSink`].

use std::f32::consts::PI;
use std::sync::Arc;

use glam::Vec3;

use crate::asset::{Dimensions, FileBlob, LoadedModel};

/// Orbit camera parameters around a model standing on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFraming {
    /// Horizontal orbit angle in radians
    pub alpha: f32,
    /// Vertical orbit angle in radians
    pub beta: f32,
    /// Distance from the target
    pub radius: f32,
    /// Point the camera looks at
    pub target: Vec3,
    pub lower_radius_limit: f32,
    pub upper_radius_limit: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
    pub panning_limit: f32,
    /// Position of the single hemispheric light
    pub light_position: Vec3,
}

impl CameraFraming {
    pub fn for_dimensions(dimensions: &Dimensions) -> Self {
        let radius = dimensions.sum() as f32;
        Self {
            alpha: PI / 2.0,
            beta: PI / 2.5,
            radius,
            target: Vec3::new(0.0, dimensions.height as f32 / 2.0, 0.0),
            lower_radius_limit: radius / 2.0,
            upper_radius_limit: radius * 3.0 / 2.0,
            near: dimensions.min() as f32 / 10.0,
            far: dimensions.max() as f32 * 10.0,
            panning_limit: radius / 2.0,
            light_position: Vec3::new(0.0, radius, 0.0),
        }
    }

    /// Camera position implied by the orbit angles.
    pub fn eye(&self) -> Vec3 {
        let offset = Vec3::new(
            self.radius * self.alpha.cos() * self.beta.sin(),
            self.radius * self.beta.cos(),
            self.radius * self.alpha.sin() * self.beta.sin(),
        );
        self.target + offset
    }
}

/// What the preview engine should load.
#[derive(Debug, Clone)]
pub enum PreviewSource {
    /// A self-contained binary asset already in memory
    Binary(Arc<[u8]>),
    /// A JSON descriptor plus the sibling files it references
    Files {
        descriptor: String,
        files: Vec<FileBlob>,
    },
}

/// Everything an engine needs to show the model.
#[derive(Debug, Clone)]
pub struct PreviewSetup {
    pub framing: CameraFraming,
    pub source: PreviewSource,
}

impl PreviewSetup {
    /// `None` when the model carries neither in-memory bytes nor a descriptor file.
    pub fn for_model(model: &LoadedModel) -> Option<Self> {
        let framing = CameraFraming::for_dimensions(&model.dimensions);
        let source = match &model.binary {
            Some(bytes) => PreviewSource::Binary(Arc::clone(bytes)),
            None => {
                let descriptor = model
                    .files
                    .iter()
                    .find(|f| f.extension().as_deref() == Some("gltf"))?;
                PreviewSource::Files {
                    descriptor: descriptor.name().to_string(),
                    files: model.files.clone(),
                }
            }
        };
        Some(Self { framing, source })
    }
}

/// Receives preview setups; implemented by a rendering front-end.
pub trait PreviewSink: Send {
    fn present(&mut self, setup: &PreviewSetup);
}
