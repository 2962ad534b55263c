//! Validation schema configuration
//!
//! Mirrors the JSON layout of 3D Commerce schema files, so a config can be read from and
//! written to the same documents the validators consume.

use serde::{Deserialize, Serialize};

/// An inclusive integer range. A negative bound leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub maximum: i64,
    pub minimum: i64,
}

impl Bounds {
    pub const fn new(minimum: i64, maximum: i64) -> Self {
        Self { maximum, minimum }
    }

    /// A range with both sides open is not checked at all.
    pub fn is_tested(&self) -> bool {
        self.maximum >= 0 || self.minimum >= 0
    }

    /// Whether `value` falls inside the range, treating negative bounds as open.
    pub fn admits(&self, value: f64) -> bool {
        let above_min = self.minimum < 0 || value >= self.minimum as f64;
        let below_max = self.maximum < 0 || value <= self.maximum as f64;
        above_min && below_max
    }
}

/// Bounds for one product dimension, plus the allowed deviation from the product info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionBounds {
    pub maximum: i64,
    pub minimum: i64,
    pub percent_tolerance: i64,
}

impl DimensionBounds {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.minimum, self.maximum)
    }

    /// Whether `actual` lies within `percent_tolerance` percent of `expected`.
    pub fn within_tolerance(&self, actual: f64, expected: f64) -> bool {
        let slack = expected.abs() * self.percent_tolerance.max(0) as f64 / 100.0;
        (actual - expected).abs() <= slack
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectCounts {
    pub nodes: Bounds,
    pub meshes: Bounds,
    pub primitives: Bounds,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRules {
    pub object_count: ObjectCounts,
    pub require_beveled_edges: bool,
    pub require_clean_root_node_transform: bool,
    pub require_manifold_edges: bool,
    pub triangles: Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductDimensions {
    pub height: DimensionBounds,
    pub length: DimensionBounds,
    pub width: DimensionBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductRules {
    pub dimensions: ProductDimensions,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureRules {
    pub height: Bounds,
    pub pbr_color_range: Bounds,
    pub require_dimensions_be_powers_of_two: bool,
    pub require_dimensions_be_quadratic: bool,
    pub width: Bounds,
}

/// Minimum gutter width in pixels between UV islands, per texture resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GutterWidths {
    #[serde(rename = "resolution256")]
    pub resolution_256: i64,
    #[serde(rename = "resolution512")]
    pub resolution_512: i64,
    #[serde(rename = "resolution1024")]
    pub resolution_1024: i64,
    #[serde(rename = "resolution2048")]
    pub resolution_2048: i64,
    #[serde(rename = "resolution4096")]
    pub resolution_4096: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UvRules {
    pub gutter_width: GutterWidths,
    pub pixels_per_meter: Bounds,
    pub require_not_inverted: bool,
    pub require_not_overlapping: bool,
    pub require_range_zero_to_one: bool,
}

/// The complete set of validation bounds and requirement flags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaConfig {
    pub version: String,
    pub file_size_in_kb: Bounds,
    pub materials: Bounds,
    pub model: ModelRules,
    pub product: ProductRules,
    pub textures: TextureRules,
    pub uvs: UvRules,
}
